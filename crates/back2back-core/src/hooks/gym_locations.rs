use std::sync::Arc;

use crate::api::GymApi;
use crate::error::ResourceError;
use crate::models::GymLocation;
use crate::resource::{CachedResource, Resource, ResourceRegistry};

pub const GYM_LOCATIONS_KEY: &str = "gym:locations";

/// The member's gym locations and which one is primary.
pub struct GymLocations {
    resource: CachedResource<Vec<GymLocation>>,
    api: Arc<dyn GymApi>,
}

impl GymLocations {
    pub async fn new(registry: &ResourceRegistry, api: Arc<dyn GymApi>) -> Result<Self, ResourceError> {
        Ok(Self {
            resource: registry.resource(GYM_LOCATIONS_KEY).await?,
            api,
        })
    }

    pub async fn reload(&self) -> Resource<Vec<GymLocation>> {
        let api = Arc::clone(&self.api);
        self.resource
            .load(move || async move { api.fetch_gym_locations().await })
            .await
    }

    pub fn snapshot(&self) -> Resource<Vec<GymLocation>> {
        self.resource.snapshot()
    }

    pub fn locations(&self) -> Vec<GymLocation> {
        self.snapshot().value.unwrap_or_default()
    }

    pub fn loading(&self) -> bool {
        self.snapshot().is_loading()
    }

    pub fn error(&self) -> Option<ResourceError> {
        self.snapshot().last_error
    }

    pub fn primary(&self) -> Option<GymLocation> {
        GymLocation::find_primary(&self.locations()).cloned()
    }

    /// Make `location_id` the primary gym, showing the change immediately.
    pub async fn set_primary(&self, location_id: &str) -> Result<(), ResourceError> {
        let current = self.snapshot().value.ok_or_else(|| {
            ResourceError::Precondition("gym locations are not loaded".to_string())
        })?;
        let updated = GymLocation::with_primary(&current, location_id).ok_or_else(|| {
            ResourceError::Validation(format!("Unknown gym location: {}", location_id))
        })?;

        let api = Arc::clone(&self.api);
        let id = location_id.to_string();
        self.resource
            .mutate(updated, move |_| async move { api.update_primary_gym(&id).await })
            .await
    }

    /// Forget the cached locations.
    pub async fn clear(&self) -> Result<(), ResourceError> {
        self.resource.clear().await
    }

    pub fn unmount(&self) {
        self.resource.unmount();
    }
}
