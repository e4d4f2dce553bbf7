use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use super::state::{Resource, Status};
use crate::api::SourceError;
use crate::cache::{CacheEntry, Codec, JsonCodec, KeyValueStore};
use crate::error::{ResourceError, StorageError};

type LoadOperation<T> = Shared<BoxFuture<'static, Resource<T>>>;

/// One named piece of remote data, hydrated from the persisted cache and
/// reconciled with the remote source.
///
/// Cloning is cheap and yields a handle to the same resource: the same
/// snapshot, the same in-flight load and the same mount state.
pub struct CachedResource<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for CachedResource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<T> {
    key: String,
    store: Arc<dyn KeyValueStore>,
    codec: Box<dyn Codec<T>>,
    state: watch::Sender<Resource<T>>,
    inflight: Mutex<Option<LoadOperation<T>>>,
    /// Held for a whole mutation and while a load commits its fetch result,
    /// so store writes for one key never interleave.
    commit: Mutex<()>,
    /// Bumped whenever a mutation or clear starts. A load that observes a
    /// newer generation than the one it started with skips its cached value,
    /// and drops its fetched value if a newer one is displayed.
    generation: AtomicU64,
    mounted: AtomicBool,
}

/// Value a mutation can roll back to.
struct Durable<T> {
    value: T,
    stale: bool,
    cached_at: Option<chrono::DateTime<Utc>>,
}

impl<T> CachedResource<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Create a resource stored as JSON under `key`.
    pub fn new(key: impl Into<String>, store: Arc<dyn KeyValueStore>) -> Result<Self, ResourceError> {
        Self::with_codec(key, store, JsonCodec)
    }
}

impl<T> CachedResource<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn with_codec<C>(
        key: impl Into<String>,
        store: Arc<dyn KeyValueStore>,
        codec: C,
    ) -> Result<Self, ResourceError>
    where
        C: Codec<T> + 'static,
    {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ResourceError::Precondition(
                "resource key must not be empty".to_string(),
            ));
        }

        let (state, _) = watch::channel(Resource::new(key.clone()));
        Ok(Self {
            inner: Arc::new(Inner {
                key,
                store,
                codec: Box::new(codec),
                state,
                inflight: Mutex::new(None),
                commit: Mutex::new(()),
                generation: AtomicU64::new(0),
                mounted: AtomicBool::new(true),
            }),
        })
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Resource<T> {
        self.inner.state.borrow().clone()
    }

    /// Observe every state transition, including transient optimistic values.
    pub fn subscribe(&self) -> watch::Receiver<Resource<T>> {
        self.inner.state.subscribe()
    }

    /// Load the resource: serve the cached value if there is one, then
    /// refresh it from the remote source.
    ///
    /// A call made while another load for this resource is in flight joins
    /// that load and its `fetch` is never invoked.
    pub async fn load<F, Fut>(&self, fetch: F) -> Resource<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, SourceError>> + Send + 'static,
    {
        let operation = {
            let mut inflight = self.inner.inflight.lock().await;
            match inflight.as_ref() {
                Some(existing) => {
                    debug!(key = %self.inner.key, "Joining in-flight load");
                    existing.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let operation = async move { inner.run_load(fetch).await }
                        .boxed()
                        .shared();
                    *inflight = Some(operation.clone());
                    operation
                }
            }
        };
        operation.await
    }

    /// Optimistically replace the value, then confirm with the remote source.
    ///
    /// On failure the previous value is restored in memory and in the store,
    /// and the error is returned. Mutations on one resource run one at a time.
    pub async fn mutate<F, Fut>(&self, new_value: T, update: F) -> Result<(), ResourceError>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<(), SourceError>>,
    {
        let inner = &self.inner;
        let _commit = inner.commit.lock().await;

        let mounted = inner.is_mounted();
        let mut previous: Option<Durable<T>> = None;
        inner.state.send_if_modified(|r| {
            let Some(value) = r.value.clone() else {
                return false;
            };
            inner.generation.fetch_add(1, Ordering::AcqRel);
            previous = Some(Durable {
                value,
                stale: r.stale,
                cached_at: r.cached_at,
            });
            if !mounted {
                return false;
            }
            r.value = Some(new_value.clone());
            r.cached_at = Some(Utc::now());
            r.last_error = None;
            true
        });

        let previous = previous.ok_or_else(|| {
            ResourceError::Precondition(format!(
                "cannot mutate '{}' before it has a value",
                inner.key
            ))
        })?;

        if let Err(e) = inner.write_cache(&new_value).await {
            warn!(key = %inner.key, error = %e, "Failed to cache optimistic value");
        }

        match update(new_value).await {
            Ok(()) => {
                info!(key = %inner.key, "Mutation committed");
                inner.apply(|r| {
                    r.stale = false;
                    r.status = Status::Ready;
                });
                Ok(())
            }
            Err(e) => {
                let error = ResourceError::from(e);
                warn!(key = %inner.key, error = %error, "Mutation rejected, reverting");
                inner.restore_cache(&previous.value).await;
                inner.apply(|r| {
                    r.value = Some(previous.value);
                    r.stale = previous.stale;
                    r.cached_at = previous.cached_at;
                    r.last_error = Some(error.clone());
                });
                Err(error)
            }
        }
    }

    /// Drop the persisted entry and reset the in-memory state to idle.
    pub async fn clear(&self) -> Result<(), ResourceError> {
        let inner = &self.inner;
        let _commit = inner.commit.lock().await;
        inner.generation.fetch_add(1, Ordering::AcqRel);
        inner.store.remove(&inner.key).await?;
        inner.apply(|r| *r = Resource::new(inner.key.clone()));
        Ok(())
    }

    /// Detach the owning scope. Operations still in flight complete without
    /// touching in-memory state; the persisted entry is kept.
    pub fn unmount(&self) {
        if self.inner.mounted.swap(false, Ordering::AcqRel) {
            debug!(key = %self.inner.key, "Resource unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.is_mounted()
    }
}

impl<T> Inner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Apply a state transition unless the scope has been torn down.
    fn apply(&self, f: impl FnOnce(&mut Resource<T>)) -> bool {
        if !self.is_mounted() {
            debug!(key = %self.key, "Skipping state update after unmount");
            return false;
        }
        self.state.send_modify(f);
        true
    }

    async fn read_cache(&self) -> Option<CacheEntry<T>> {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "Cache miss");
                return None;
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read cache, using network only");
                return None;
            }
        };

        match self.codec.decode(&self.key, &raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    async fn write_cache(&self, value: &T) -> Result<(), StorageError> {
        let raw = self.codec.encode(&self.key, value)?;
        self.store.set(&self.key, &raw).await
    }

    async fn restore_cache(&self, previous: &T) {
        if let Err(e) = self.write_cache(previous).await {
            error!(key = %self.key, error = %e, "Failed to restore cache after rejected mutation");
            // An absent entry is better than one holding the rejected value
            if let Err(e) = self.store.remove(&self.key).await {
                error!(key = %self.key, error = %e, "Failed to drop cache entry");
            }
        }
    }

    async fn run_load<F, Fut>(&self, fetch: F) -> Resource<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let started_at = self.generation.load(Ordering::Acquire);
        self.apply(|r| {
            r.status = Status::Loading;
            r.last_error = None;
        });

        // Fast path: show the cached value before the network answers.
        if let Some(entry) = self.read_cache().await {
            let generation = &self.generation;
            if self.is_mounted() {
                self.state.send_if_modified(|r| {
                    if generation.load(Ordering::Acquire) != started_at {
                        return false;
                    }
                    debug!(key = %r.key, "Serving cached value while refreshing");
                    r.value = Some(entry.value);
                    r.stale = true;
                    r.status = Status::Ready;
                    r.cached_at = entry.cached_at;
                    true
                });
            }
        }

        let fetched = fetch().await;

        {
            let _commit = self.commit.lock().await;
            // A mutation committed after this fetch started. A clear leaves
            // nothing newer to protect, so the fetch result still applies.
            let superseded = self.generation.load(Ordering::Acquire) != started_at
                && self.state.borrow().value.is_some();
            if superseded {
                debug!(key = %self.key, "Discarding fetch result, resource changed while loading");
                self.apply(|r| {
                    if r.status == Status::Loading {
                        r.status = Status::Ready;
                    }
                });
            } else {
                match fetched {
                    Ok(fresh) => {
                        if let Err(e) = self.write_cache(&fresh).await {
                            warn!(key = %self.key, error = %e, "Failed to cache fetched value");
                        }
                        self.apply(|r| {
                            r.value = Some(fresh);
                            r.stale = false;
                            r.status = Status::Ready;
                            r.last_error = None;
                            r.cached_at = Some(Utc::now());
                        });
                    }
                    Err(e) => {
                        let error = ResourceError::from(e);
                        let has_value = self.state.borrow().value.is_some();
                        if has_value {
                            warn!(key = %self.key, error = %error, "Refresh failed, keeping current value");
                        } else {
                            warn!(key = %self.key, error = %error, "Load failed with nothing to show");
                        }
                        self.apply(|r| {
                            if r.value.is_some() {
                                r.status = Status::Ready;
                            } else {
                                r.status = Status::Error;
                                r.last_error = Some(error);
                            }
                        });
                    }
                }
            }
        }

        self.inflight.lock().await.take();
        self.state.borrow().clone()
    }
}
