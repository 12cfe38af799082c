use async_trait::async_trait;

use crate::error::CacheError;

/// A TTL key-value store holding serialized values.
///
/// Implementations must be safe to share across concurrent requests without
/// extra locking; writes for the same key are last-write-wins.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key` for `ttl_secs` seconds.
    async fn put(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError>;
}

/// Stand-in for "no cache configured": every read misses, every write is
/// accepted and dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStore;

#[async_trait]
impl KvStore for NoopStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: String, _ttl_secs: u64) -> Result<(), CacheError> {
        Ok(())
    }
}
