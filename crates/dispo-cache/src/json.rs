//! Typed access on top of [`KvStore`]: values are stored as JSON text.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CacheError;
use crate::store::KvStore;

/// Reads and decodes `key`.
///
/// # Errors
///
/// Returns [`CacheError::Unavailable`] if the backend fails and
/// [`CacheError::Serialization`] if the stored text is not a valid `T`.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, CacheError> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| CacheError::Serialization(format!("{key}: {e}"))),
        None => Ok(None),
    }
}

/// Encodes `value` and writes it under `key`.
///
/// # Errors
///
/// Returns [`CacheError::Serialization`] if encoding fails and
/// [`CacheError::Unavailable`] if the backend rejects the write.
pub async fn put_json<T: Serialize + ?Sized>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
    ttl_secs: u64,
) -> Result<(), CacheError> {
    let raw =
        serde_json::to_string(value).map_err(|e| CacheError::Serialization(format!("{key}: {e}")))?;
    store.put(key, raw, ttl_secs).await
}
