use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::cached::CachedResource;
use crate::cache::KeyValueStore;
use crate::error::ResourceError;

/// Process-wide lookup of resources by key.
///
/// Every hook asking for the same key gets a handle to the same
/// `CachedResource`, so loads for that key are de-duplicated across hooks.
/// Once a resource is unmounted the next request builds a fresh one.
pub struct ResourceRegistry {
    store: Arc<dyn KeyValueStore>,
    resources: Mutex<HashMap<String, Box<dyn Any + Send + Sync>>>,
}

impl ResourceRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            resources: Mutex::new(HashMap::new()),
        }
    }

    /// Get the live resource for `key`, creating it on first request.
    pub async fn resource<T>(&self, key: &str) -> Result<CachedResource<T>, ResourceError>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let mut resources = self.resources.lock().await;
        if let Some(existing) = resources.get(key) {
            match existing.downcast_ref::<CachedResource<T>>() {
                Some(resource) if resource.is_mounted() => return Ok(resource.clone()),
                Some(_) => debug!(key, "Replacing unmounted resource"),
                None => {
                    return Err(ResourceError::Precondition(format!(
                        "resource '{}' is already registered with a different type",
                        key
                    )))
                }
            }
        }

        let resource = CachedResource::<T>::new(key, Arc::clone(&self.store))?;
        resources.insert(key.to_string(), Box::new(resource.clone()));
        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;

    fn registry() -> ResourceRegistry {
        ResourceRegistry::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_same_key_shares_resource() {
        let registry = registry();
        let a = registry.resource::<String>("user:profile").await.unwrap();
        let b = registry.resource::<String>("user:profile").await.unwrap();

        a.load(|| async { Ok("John".to_string()) }).await;

        assert_eq!(b.snapshot().value.as_deref(), Some("John"));
    }

    #[tokio::test]
    async fn test_type_clash_is_rejected() {
        let registry = registry();
        registry.resource::<String>("membership:current").await.unwrap();

        let result = registry.resource::<Vec<String>>("membership:current").await;
        assert!(matches!(result, Err(ResourceError::Precondition(_))));
    }

    #[tokio::test]
    async fn test_unmounted_resource_is_replaced() {
        let registry = registry();
        let first = registry.resource::<String>("user:profile").await.unwrap();
        first.unmount();

        let second = registry.resource::<String>("user:profile").await.unwrap();
        assert!(second.is_mounted());
        assert!(!first.is_mounted());
    }
}
