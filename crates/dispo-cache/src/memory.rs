//! Process-local TTL store.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::CacheError;
use crate::store::KvStore;

/// Longest lifetime an entry can get; larger TTLs are clamped to it so the
/// deadline never overflows `Instant`.
const MAX_TTL: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory [`KvStore`] with per-entry expiry.
///
/// Unbounded: entries are only removed when read after they expire.
/// Uses `tokio::time::Instant` so tests can drive expiry with a paused clock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: evict unless a concurrent put already refreshed it.
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.expires_at <= now) {
            entries.remove(key);
            tracing::trace!(key, "evicted expired cache entry");
        }
        Ok(None)
    }

    async fn put(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
        let expires_at = Instant::now() + Duration::from_secs(ttl_secs).min(MAX_TTL);
        self.entries
            .write()
            .await
            .insert(key.to_owned(), Entry { value, expires_at });
        Ok(())
    }
}
