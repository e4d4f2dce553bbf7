//! Cache-then-network resources.
//!
//! A `CachedResource<T>` shows the persisted value for its key immediately
//! (marked stale), refreshes it from the remote source, and writes the fresh
//! value back. Mutations are applied optimistically to memory and cache and
//! rolled back if the remote rejects them.
//!
//! ```text
//! idle --load()--> loading --(cache hit)--> ready(stale)
//! loading --(fetch ok)--> ready
//! loading --(fetch err, no cache)--> error --load()--> loading
//! ready --mutate() ok--> ready (new value)
//! ready --mutate() err--> ready (reverted)
//! ```

pub mod cached;
pub mod registry;
pub mod state;

pub use cached::CachedResource;
pub use registry::ResourceRegistry;
pub use state::{Resource, Status};
