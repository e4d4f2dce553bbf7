//! Local caching module for offline data access.
//!
//! This module provides the persisted key-value store that every
//! `CachedResource` reads on load and writes after a fetch or mutation:
//! - `KeyValueStore`: async string store trait
//! - `MemoryStore`: in-process implementation
//! - `FileStore`: one JSON file per key under the cache directory
//!
//! Values are written as a `CachedData` JSON envelope by `JsonCodec`.

pub mod entry;
pub mod manager;
pub mod store;

pub use entry::{format_age, CacheEntry, CachedData, Codec, JsonCodec};
pub use manager::FileStore;
pub use store::{KeyValueStore, MemoryStore};
