use std::sync::Arc;

use crate::api::GymApi;
use crate::error::ResourceError;
use crate::models::UserInfo;
use crate::resource::{CachedResource, Resource, ResourceRegistry};

pub const USER_PROFILE_KEY: &str = "user:profile";

/// The member's editable profile.
pub struct UserProfile {
    resource: CachedResource<UserInfo>,
    api: Arc<dyn GymApi>,
}

impl UserProfile {
    pub async fn new(registry: &ResourceRegistry, api: Arc<dyn GymApi>) -> Result<Self, ResourceError> {
        Ok(Self {
            resource: registry.resource(USER_PROFILE_KEY).await?,
            api,
        })
    }

    pub async fn reload(&self) -> Resource<UserInfo> {
        let api = Arc::clone(&self.api);
        self.resource
            .load(move || async move { api.fetch_user_info().await })
            .await
    }

    pub fn snapshot(&self) -> Resource<UserInfo> {
        self.resource.snapshot()
    }

    pub fn user_info(&self) -> Option<UserInfo> {
        self.snapshot().value
    }

    pub fn loading(&self) -> bool {
        self.snapshot().is_loading()
    }

    pub fn error(&self) -> Option<ResourceError> {
        self.snapshot().last_error
    }

    /// Save an edited profile.
    ///
    /// The edit is normalized and validated first; invalid input is returned
    /// as `ResourceError::Validation` without touching state or cache.
    pub async fn update(&self, edited: UserInfo) -> Result<(), ResourceError> {
        let info = edited.normalized();
        info.validate()?;

        let api = Arc::clone(&self.api);
        self.resource
            .mutate(info, move |info| async move { api.update_user_info(&info).await })
            .await
    }

    pub async fn clear(&self) -> Result<(), ResourceError> {
        self.resource.clear().await
    }

    pub fn unmount(&self) {
        self.resource.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockApi, MockOperation, SourceError};
    use crate::cache::MemoryStore;
    use crate::resource::Status;

    async fn setup() -> (UserProfile, Arc<MockApi>) {
        let registry = ResourceRegistry::new(Arc::new(MemoryStore::new()));
        let api = Arc::new(MockApi::default());
        let hook = UserProfile::new(&registry, api.clone()).await.unwrap();
        (hook, api)
    }

    #[tokio::test]
    async fn test_update_normalizes_and_commits() {
        let (hook, api) = setup().await;
        hook.reload().await;

        let mut edited = hook.user_info().unwrap();
        edited.full_name = "  Jane Doe ".into();
        edited.phone_number = "(310) 555-9876".into();
        hook.update(edited).await.unwrap();

        let saved = hook.user_info().unwrap();
        assert_eq!(saved.full_name, "Jane Doe");
        assert_eq!(saved.phone_number, "3105559876");
        assert_eq!(api.fetch_user_info().await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_invalid_edit_is_rejected_before_request() {
        let (hook, api) = setup().await;
        hook.reload().await;

        let mut edited = hook.user_info().unwrap();
        edited.email = "john.doe".into();

        assert!(matches!(
            hook.update(edited).await,
            Err(ResourceError::Validation(_))
        ));
        assert_eq!(api.call_count(MockOperation::UpdateUserInfo).await, 0);
        assert_eq!(hook.user_info().unwrap().email, "john.doe@example.com");
    }

    #[tokio::test]
    async fn test_update_before_load_fails() {
        let (hook, _api) = setup().await;
        let info = UserInfo {
            full_name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone_number: "3105551234".into(),
            profile_picture: None,
        };

        assert!(matches!(
            hook.update(info).await,
            Err(ResourceError::Precondition(_))
        ));
    }

    #[tokio::test]
    async fn test_cold_start_failure() {
        let (hook, api) = setup().await;
        api.fail_next(MockOperation::FetchUserInfo, SourceError::Server("500".into()))
            .await;

        let snapshot = hook.reload().await;

        assert_eq!(snapshot.status, Status::Error);
        assert!(hook.user_info().is_none());
        assert!(hook.error().is_some());
    }
}
