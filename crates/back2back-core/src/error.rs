//! Error taxonomy for cached resources.
//!
//! `StorageError` comes from the persisted key-value store and `SourceError`
//! (see [`crate::api::SourceError`]) from the remote data source. Both fold
//! into `ResourceError`, which is what hooks and views see.

use thiserror::Error;

use crate::api::SourceError;

/// Failure reported by a [`crate::cache::KeyValueStore`] or a cache codec.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on cache key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode cache entry '{key}': {message}")]
    Encode { key: String, message: String },

    #[error("Failed to decode cache entry '{key}': {message}")]
    Decode { key: String, message: String },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Error surfaced by a [`crate::resource::CachedResource`].
///
/// Cloneable so it can live inside a `Resource<T>` snapshot that is shared
/// between every caller joined on the same load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// Persisted store read/write failed. The cache is an optimization, so
    /// this is logged and recovered locally rather than surfaced.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: {0}")]
    Server(String),

    /// The remote rejected caller-supplied data. Always surfaced.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Programmer error, e.g. mutating a resource that has no value yet.
    #[error("Precondition failed: {0}")]
    Precondition(String),
}

impl ResourceError {
    /// Network and server failures may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, ResourceError::Network(_) | ResourceError::Server(_))
    }

    /// Short message suitable for a status line or toast.
    pub fn user_message(&self) -> &'static str {
        match self {
            ResourceError::Storage(_) => "Could not access local data",
            ResourceError::Network(_) => "Check your connection and try again",
            ResourceError::Server(_) => "The server could not complete the request",
            ResourceError::Validation(_) => "Some of the information is invalid",
            ResourceError::Precondition(_) => "Data is not loaded yet",
        }
    }
}

impl From<StorageError> for ResourceError {
    fn from(e: StorageError) -> Self {
        ResourceError::Storage(e.to_string())
    }
}

impl From<SourceError> for ResourceError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Network(msg) => ResourceError::Network(msg),
            SourceError::Server(msg) => ResourceError::Server(msg),
            SourceError::Validation(msg) => ResourceError::Validation(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_errors_keep_their_kind() {
        assert_eq!(
            ResourceError::from(SourceError::Validation("bad email".into())),
            ResourceError::Validation("bad email".into())
        );
        assert_eq!(
            ResourceError::from(SourceError::Network("offline".into())),
            ResourceError::Network("offline".into())
        );
    }

    #[test]
    fn test_storage_error_folds_into_storage() {
        let err = StorageError::Decode {
            key: "user:profile".into(),
            message: "EOF".into(),
        };
        match ResourceError::from(err) {
            ResourceError::Storage(msg) => assert!(msg.contains("user:profile")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_is_transient() {
        assert!(ResourceError::Network("x".into()).is_transient());
        assert!(ResourceError::Server("x".into()).is_transient());
        assert!(!ResourceError::Validation("x".into()).is_transient());
        assert!(!ResourceError::Precondition("x".into()).is_transient());
    }
}
