//! Remote data source for the Back2Back member API.
//!
//! `GymApi` is the seam every hook fetches and updates through:
//! - `ApiClient`: HTTP client for the member API (bearer token auth)
//! - `MockApi`: in-memory stand-in with simulated latency, used until the
//!   backend ships and in tests

pub mod client;
pub mod error;
pub mod mock;

use async_trait::async_trait;

pub use client::ApiClient;
pub use error::SourceError;
pub use mock::{MockApi, MockOperation};

use crate::models::{GymLocation, MembershipPlan, UserInfo};

#[async_trait]
pub trait GymApi: Send + Sync {
    async fn fetch_gym_locations(&self) -> Result<Vec<GymLocation>, SourceError>;
    async fn update_primary_gym(&self, location_id: &str) -> Result<(), SourceError>;

    async fn fetch_membership_plans(&self) -> Result<Vec<MembershipPlan>, SourceError>;
    /// Id of the member's current plan
    async fn fetch_current_membership(&self) -> Result<String, SourceError>;
    async fn update_membership(&self, plan_id: &str) -> Result<(), SourceError>;

    async fn fetch_user_info(&self) -> Result<UserInfo, SourceError>;
    async fn update_user_info(&self, info: &UserInfo) -> Result<(), SourceError>;
}
