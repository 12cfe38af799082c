//! Structured events emitted by the aggregator.
//!
//! The aggregator never logs directly; it reports [`FetchEvent`]s to an
//! injected [`FetchObserver`]. Production wiring uses [`TracingObserver`],
//! tests can swap in a recorder and assert on what happened.

/// Something worth reporting while fetching or caching.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    CacheHit {
        key: String,
    },
    CacheMiss {
        key: String,
    },
    /// The cache backend failed on read; treated as a miss.
    CacheReadFailed {
        key: String,
        error: String,
    },
    /// A cached value could not be decoded; treated as a miss.
    CacheDecodeFailed {
        key: String,
        error: String,
    },
    CacheStored {
        key: String,
        items: usize,
        ttl_secs: u64,
    },
    /// The write-back failed; the fetched value is still returned.
    CacheWriteFailed {
        key: String,
        error: String,
    },
    /// Fetching the retailer list failed; callers get an empty list.
    StoreListFailed {
        error: String,
    },
    /// One store's menu fetch failed.
    StoreFailed {
        store_id: String,
        store_name: String,
        error: String,
    },
    /// A multi-store fetch settled.
    AggregateCompleted {
        stores: usize,
        stores_with_specials: usize,
        total_specials: usize,
        failed: usize,
        elapsed_secs: f64,
    },
}

pub trait FetchObserver: Send + Sync {
    fn record(&self, event: &FetchEvent);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FetchObserver for TracingObserver {
    fn record(&self, event: &FetchEvent) {
        match event {
            FetchEvent::CacheHit { key } => tracing::debug!(key = %key, "cache hit"),
            FetchEvent::CacheMiss { key } => tracing::debug!(key = %key, "cache miss"),
            FetchEvent::CacheReadFailed { key, error } => {
                tracing::warn!(key = %key, error = %error, "cache read failed — treating as miss");
            }
            FetchEvent::CacheDecodeFailed { key, error } => {
                tracing::warn!(
                    key = %key,
                    error = %error,
                    "cached value did not decode — treating as miss"
                );
            }
            FetchEvent::CacheStored {
                key,
                items,
                ttl_secs,
            } => tracing::debug!(key = %key, items, ttl_secs, "cached upstream result"),
            FetchEvent::CacheWriteFailed { key, error } => {
                tracing::warn!(key = %key, error = %error, "cache write failed");
            }
            FetchEvent::StoreListFailed { error } => {
                tracing::warn!(error = %error, "store list fetch failed — returning empty list");
            }
            FetchEvent::StoreFailed {
                store_id,
                store_name,
                error,
            } => tracing::warn!(
                store_id = %store_id,
                store_name = %store_name,
                error = %error,
                "store specials fetch failed"
            ),
            FetchEvent::AggregateCompleted {
                stores,
                stores_with_specials,
                total_specials,
                failed,
                elapsed_secs,
            } => tracing::info!(
                stores,
                stores_with_specials,
                total_specials,
                failed,
                elapsed_secs,
                "multi-store specials fetch complete"
            ),
        }
    }
}
