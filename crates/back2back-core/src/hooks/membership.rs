use std::sync::Arc;

use crate::api::GymApi;
use crate::error::ResourceError;
use crate::models::MembershipPlan;
use crate::resource::{CachedResource, Resource, ResourceRegistry};

pub const MEMBERSHIP_PLANS_KEY: &str = "membership:plans";
pub const CURRENT_MEMBERSHIP_KEY: &str = "membership:current";

/// Available plans together with the member's current selection.
#[derive(Debug, Clone)]
pub struct MembershipView {
    pub plans: Resource<Vec<MembershipPlan>>,
    pub current: Resource<String>,
}

impl MembershipView {
    pub fn loading(&self) -> bool {
        self.plans.is_loading() || self.current.is_loading()
    }

    pub fn error(&self) -> Option<ResourceError> {
        self.plans
            .last_error
            .clone()
            .or_else(|| self.current.last_error.clone())
    }

    pub fn current_plan(&self) -> Option<MembershipPlan> {
        let plans = self.plans.value.as_deref()?;
        let current = self.current.value.as_deref()?;
        MembershipPlan::find(plans, current).cloned()
    }
}

pub struct Membership {
    plans: CachedResource<Vec<MembershipPlan>>,
    current: CachedResource<String>,
    api: Arc<dyn GymApi>,
}

impl Membership {
    pub async fn new(registry: &ResourceRegistry, api: Arc<dyn GymApi>) -> Result<Self, ResourceError> {
        Ok(Self {
            plans: registry.resource(MEMBERSHIP_PLANS_KEY).await?,
            current: registry.resource(CURRENT_MEMBERSHIP_KEY).await?,
            api,
        })
    }

    /// Load plans and the current selection concurrently.
    pub async fn reload(&self) -> MembershipView {
        let plans_api = Arc::clone(&self.api);
        let current_api = Arc::clone(&self.api);
        let (plans, current) = tokio::join!(
            self.plans
                .load(move || async move { plans_api.fetch_membership_plans().await }),
            self.current
                .load(move || async move { current_api.fetch_current_membership().await }),
        );
        MembershipView { plans, current }
    }

    pub fn snapshot(&self) -> MembershipView {
        MembershipView {
            plans: self.plans.snapshot(),
            current: self.current.snapshot(),
        }
    }

    pub fn current_plan(&self) -> Option<MembershipPlan> {
        self.snapshot().current_plan()
    }

    /// Switch to `plan_id`. Unknown plans are rejected before any request.
    pub async fn change_plan(&self, plan_id: &str) -> Result<(), ResourceError> {
        if let Some(plans) = self.plans.snapshot().value {
            if MembershipPlan::find(&plans, plan_id).is_none() {
                return Err(ResourceError::Validation(format!(
                    "Unknown membership plan: {}",
                    plan_id
                )));
            }
        }

        let api = Arc::clone(&self.api);
        self.current
            .mutate(plan_id.to_string(), move |id| async move {
                api.update_membership(&id).await
            })
            .await
    }

    /// Forget the cached plans and current selection.
    pub async fn clear(&self) -> Result<(), ResourceError> {
        self.plans.clear().await?;
        self.current.clear().await
    }

    pub fn unmount(&self) {
        self.plans.unmount();
        self.current.unmount();
    }
}
