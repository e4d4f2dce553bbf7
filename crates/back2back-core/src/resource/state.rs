use chrono::{DateTime, Utc};

use crate::cache::format_age;
use crate::error::ResourceError;

/// Cached data older than this is worth pointing out to the member.
/// Gym locations and plans change rarely; an hour-old copy is still useful.
const OUTDATED_AFTER_MINUTES: i64 = 60;

/// Lifecycle state of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Read-only snapshot of a cached resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource<T> {
    pub key: String,
    pub value: Option<T>,
    pub status: Status,
    pub last_error: Option<ResourceError>,
    /// Value came from the persisted cache and no fetch has confirmed it yet.
    pub stale: bool,
    pub cached_at: Option<DateTime<Utc>>,
}

impl<T> Resource<T> {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            status: Status::Idle,
            last_error: None,
            stale: false,
            cached_at: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }

    /// Error with nothing to show: the view renders an error/empty state.
    pub fn is_failed(&self) -> bool {
        self.status == Status::Error && self.value.is_none()
    }

    /// "Updated 5m ago" text for the displayed value, if its age is known.
    pub fn age_display(&self) -> Option<String> {
        self.cached_at.map(format_age)
    }

    /// The displayed value is known to be more than an hour old.
    pub fn is_outdated(&self) -> bool {
        matches!(self.cached_at, Some(at) if (Utc::now() - at).num_minutes() > OUTDATED_AFTER_MINUTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_resource_is_idle() {
        let resource: Resource<String> = Resource::new("user:profile");
        assert_eq!(resource.status, Status::Idle);
        assert!(resource.value.is_none());
        assert!(!resource.stale);
        assert!(!resource.is_failed());
        assert_eq!(resource.age_display(), None);
    }

    #[test]
    fn test_is_failed_only_without_value() {
        let mut resource: Resource<u32> = Resource::new("k");
        resource.status = Status::Error;
        assert!(resource.is_failed());
        resource.value = Some(1);
        assert!(!resource.is_failed());
    }

    #[test]
    fn test_is_outdated_after_an_hour() {
        let mut resource: Resource<u32> = Resource::new("k");
        assert!(!resource.is_outdated());

        resource.cached_at = Some(Utc::now() - chrono::Duration::minutes(5));
        assert!(!resource.is_outdated());

        resource.cached_at = Some(Utc::now() - chrono::Duration::minutes(61));
        assert!(resource.is_outdated());
        assert_eq!(resource.age_display().as_deref(), Some("1h ago"));
    }
}
