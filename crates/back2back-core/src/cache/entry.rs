use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::StorageError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }
}

/// Render how long ago `at` was, e.g. "5m ago" or "2h ago".
pub fn format_age(at: DateTime<Utc>) -> String {
    let minutes = (Utc::now() - at).num_minutes();
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

/// A decoded cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub value: T,
    /// Unknown for entries written without an envelope.
    pub cached_at: Option<DateTime<Utc>>,
}

/// Converts values to and from the string form kept in the persisted store.
pub trait Codec<T>: Send + Sync {
    fn encode(&self, key: &str, value: &T) -> Result<String, StorageError>;
    fn decode(&self, key: &str, raw: &str) -> Result<CacheEntry<T>, StorageError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry<T> {
    Enveloped(CachedData<T>),
    Bare(T),
}

/// JSON codec writing a `CachedData` envelope.
///
/// Decoding also accepts a bare JSON value, so entries written by clients
/// that stored the payload directly still hydrate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T> Codec<T> for JsonCodec
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, key: &str, value: &T) -> Result<String, StorageError> {
        serde_json::to_string(&CachedData::new(value)).map_err(|e| StorageError::Encode {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    fn decode(&self, key: &str, raw: &str) -> Result<CacheEntry<T>, StorageError> {
        let stored: StoredEntry<T> =
            serde_json::from_str(raw).map_err(|e| StorageError::Decode {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(match stored {
            StoredEntry::Enveloped(cached) => CacheEntry {
                value: cached.data,
                cached_at: Some(cached.cached_at),
            },
            StoredEntry::Bare(value) => CacheEntry {
                value,
                cached_at: None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Gym {
        id: String,
    }

    #[test]
    fn test_format_age_just_now() {
        assert_eq!(format_age(Utc::now()), "just now");
        // Clock skew
        assert_eq!(format_age(Utc::now() + Duration::minutes(3)), "just now");
    }

    #[test]
    fn test_format_age_rounding() {
        assert_eq!(format_age(Utc::now() - Duration::minutes(5)), "5m ago");
        assert_eq!(format_age(Utc::now() - Duration::minutes(95)), "2h ago");
        assert_eq!(format_age(Utc::now() - Duration::minutes(70)), "1h ago");
        assert_eq!(format_age(Utc::now() - Duration::hours(36)), "2d ago");
        assert_eq!(format_age(Utc::now() + Duration::minutes(3)), "just now");
    }

    #[test]
    fn test_json_codec_writes_envelope() {
        let gym = Gym { id: "1".into() };
        let raw = Codec::<Gym>::encode(&JsonCodec, "gym", &gym).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["data"]["id"], "1");
        assert!(json["cached_at"].is_string());

        let entry: CacheEntry<Gym> = JsonCodec.decode("gym", &raw).unwrap();
        assert_eq!(entry.value, gym);
        assert!(entry.cached_at.is_some());
    }

    #[test]
    fn test_json_codec_reads_bare_value() {
        let entry: CacheEntry<Gym> = JsonCodec.decode("gym", r#"{"id":"2"}"#).unwrap();
        assert_eq!(entry.value, Gym { id: "2".into() });
        assert_eq!(entry.cached_at, None);
    }

    #[test]
    fn test_json_codec_rejects_garbage() {
        let result: Result<CacheEntry<Gym>, _> = JsonCodec.decode("gym", "not json");
        assert!(matches!(result, Err(StorageError::Decode { .. })));
    }
}
