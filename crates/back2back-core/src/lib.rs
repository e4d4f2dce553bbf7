//! Back2Back core - the data layer behind the member app.
//!
//! Screens read remote data through `CachedResource`, which shows the last
//! persisted value immediately, refreshes it from the member API, and applies
//! edits optimistically with rollback on failure.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod hooks;
pub mod models;
pub mod resource;
pub mod utils;

pub use api::{ApiClient, GymApi, MockApi, SourceError};
pub use cache::{FileStore, KeyValueStore, MemoryStore};
pub use config::Config;
pub use error::{ResourceError, StorageError};
pub use resource::{CachedResource, Resource, ResourceRegistry, Status};
