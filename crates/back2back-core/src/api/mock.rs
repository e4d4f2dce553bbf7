//! In-memory stand-in for the member API.
//!
//! All mock data is owned by the `MockApi` instance, so two instances never
//! see each other's updates. Every call waits for the configured latency,
//! and a failure can be queued for the next call to a given operation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{GymApi, SourceError};
use crate::error::ResourceError;
use crate::models::{GymLocation, MembershipPlan, UserInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    FetchGymLocations,
    UpdatePrimaryGym,
    FetchMembershipPlans,
    FetchCurrentMembership,
    UpdateMembership,
    FetchUserInfo,
    UpdateUserInfo,
}

#[derive(Debug, Clone)]
struct MockData {
    locations: Vec<GymLocation>,
    plans: Vec<MembershipPlan>,
    current_plan_id: String,
    user: UserInfo,
}

pub struct MockApi {
    latency: Duration,
    data: Mutex<MockData>,
    failures: Mutex<HashMap<MockOperation, SourceError>>,
    calls: Mutex<HashMap<MockOperation, usize>>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl MockApi {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            data: Mutex::new(MockData::seed()),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Make the next call to `operation` fail with `error`.
    pub async fn fail_next(&self, operation: MockOperation, error: SourceError) {
        self.failures.lock().await.insert(operation, error);
    }

    /// Number of calls made to `operation`, including failed ones.
    pub async fn call_count(&self, operation: MockOperation) -> usize {
        self.calls.lock().await.get(&operation).copied().unwrap_or(0)
    }

    async fn begin(&self, operation: MockOperation) -> Result<(), SourceError> {
        *self.calls.lock().await.entry(operation).or_insert(0) += 1;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.failures.lock().await.remove(&operation) {
            Some(error) => {
                debug!(?operation, %error, "Injected mock failure");
                Err(error)
            }
            None => Ok(()),
        }
    }
}

impl MockData {
    fn seed() -> Self {
        Self {
            locations: vec![
                location("1", "Back2Back Downtown", "123 Main Street", "Los Angeles, CA 90012", true),
                location("2", "Back2Back Westside", "456 Ocean Ave", "Santa Monica, CA 90401", false),
                location("3", "Back2Back Valley", "789 Ventura Blvd", "Sherman Oaks, CA 91403", false),
            ],
            plans: vec![
                plan(
                    "1",
                    "24 HR Free Weights",
                    69.99,
                    50.0,
                    124.72,
                    &["unlimited classes", "program access", "free weights"],
                    "Full access to 24 HR Free Weights and Outdoor GYM",
                ),
                plan(
                    "2",
                    "24 HR Free Weights / Burn40",
                    119.99,
                    100.0,
                    228.46,
                    &["unlimited classes", "program access", "Burn40", "free weights", "BurnBarbell"],
                    "24 HR access to free weights, unlimited access to Burn40",
                ),
                plan(
                    "3",
                    "CrossFit Included Full Access",
                    159.99,
                    100.0,
                    269.95,
                    &["unlimited classes", "program access", "Burn40", "CrossFit", "free weights"],
                    "CrossFit, Burn30, and 24 HR Free Weights (CrossFit experience required)",
                ),
                plan("4", "Drop-In", 0.0, 0.0, 20.0, &[], "Pay per visit"),
            ],
            current_plan_id: "1".to_string(),
            user: UserInfo {
                full_name: "John Doe".to_string(),
                email: "john.doe@example.com".to_string(),
                phone_number: "3105551234".to_string(),
                profile_picture: None,
            },
        }
    }
}

fn location(id: &str, name: &str, address: &str, city: &str, is_primary: bool) -> GymLocation {
    GymLocation {
        id: id.to_string(),
        name: name.to_string(),
        address: address.to_string(),
        city: city.to_string(),
        is_primary,
    }
}

fn plan(
    id: &str,
    name: &str,
    price: f64,
    enrollment: f64,
    from_price: f64,
    features: &[&str],
    description: &str,
) -> MembershipPlan {
    MembershipPlan {
        id: id.to_string(),
        name: name.to_string(),
        price,
        enrollment,
        from_price,
        features: features.iter().map(|f| f.to_string()).collect(),
        description: description.to_string(),
    }
}

#[async_trait]
impl GymApi for MockApi {
    async fn fetch_gym_locations(&self) -> Result<Vec<GymLocation>, SourceError> {
        self.begin(MockOperation::FetchGymLocations).await?;
        Ok(self.data.lock().await.locations.clone())
    }

    async fn update_primary_gym(&self, location_id: &str) -> Result<(), SourceError> {
        self.begin(MockOperation::UpdatePrimaryGym).await?;
        let mut data = self.data.lock().await;
        let updated = GymLocation::with_primary(&data.locations, location_id).ok_or_else(|| {
            SourceError::Validation(format!("Unknown gym location: {}", location_id))
        })?;
        data.locations = updated;
        info!(location_id, "Updated primary gym");
        Ok(())
    }

    async fn fetch_membership_plans(&self) -> Result<Vec<MembershipPlan>, SourceError> {
        self.begin(MockOperation::FetchMembershipPlans).await?;
        Ok(self.data.lock().await.plans.clone())
    }

    async fn fetch_current_membership(&self) -> Result<String, SourceError> {
        self.begin(MockOperation::FetchCurrentMembership).await?;
        Ok(self.data.lock().await.current_plan_id.clone())
    }

    async fn update_membership(&self, plan_id: &str) -> Result<(), SourceError> {
        self.begin(MockOperation::UpdateMembership).await?;
        let mut data = self.data.lock().await;
        if MembershipPlan::find(&data.plans, plan_id).is_none() {
            return Err(SourceError::Validation(format!("Unknown membership plan: {}", plan_id)));
        }
        data.current_plan_id = plan_id.to_string();
        info!(plan_id, "Updated membership");
        Ok(())
    }

    async fn fetch_user_info(&self) -> Result<UserInfo, SourceError> {
        self.begin(MockOperation::FetchUserInfo).await?;
        Ok(self.data.lock().await.user.clone())
    }

    async fn update_user_info(&self, info: &UserInfo) -> Result<(), SourceError> {
        self.begin(MockOperation::UpdateUserInfo).await?;
        info.validate().map_err(|e| match e {
            ResourceError::Validation(message) => SourceError::Validation(message),
            other => SourceError::Validation(other.to_string()),
        })?;
        self.data.lock().await.user = info.clone();
        info!("Updated user info");
        Ok(())
    }
}
