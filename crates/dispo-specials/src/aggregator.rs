use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use dispo_cache::{
    get_json, put_json, specials_key, CacheError, KvStore, NoopStore, DEFAULT_TTL_SECS,
    STORE_LIST_KEY,
};
use dispo_core::{
    retain_on_special, round_secs, AggregateResult, SpecialProduct, Store, StoreRef,
    StoreSpecials,
};
use dispo_dutchie::{DutchieClient, DutchieError};
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::observer::{FetchEvent, FetchObserver, TracingObserver};

/// Stores per sequential batch in [`SpecialsAggregator::fetch_multiple_store_specials_batched`].
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Cache-aside front for the Dutchie client.
///
/// Holds no per-request state, so one instance can serve any number of
/// concurrent renders. The only shared mutable resource is the cache.
pub struct SpecialsAggregator {
    client: DutchieClient,
    cache: Arc<dyn KvStore>,
    observer: Arc<dyn FetchObserver>,
    ttl_secs: u64,
}

/// Per-store outcomes accumulated across one or more fan-outs.
#[derive(Default)]
struct Settled {
    store_specials: Vec<StoreSpecials>,
    errors: Vec<String>,
    failed_store_ids: Vec<String>,
}

impl SpecialsAggregator {
    /// An aggregator with no cache and `tracing`-backed events.
    #[must_use]
    pub fn new(client: DutchieClient) -> Self {
        Self {
            client,
            cache: Arc::new(NoopStore),
            observer: Arc::new(TracingObserver),
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn KvStore>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[must_use]
    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Every retailer, from cache when possible.
    ///
    /// Upstream failure yields an empty list. Only non-empty lists are cached.
    pub async fn fetch_store_list(&self) -> Vec<Store> {
        if let Some(stores) = self.read_cached::<Vec<Store>>(STORE_LIST_KEY).await {
            return stores;
        }

        match self.client.list_retailers().await {
            Ok(stores) => {
                if !stores.is_empty() {
                    self.write_cached(STORE_LIST_KEY, &stores).await;
                }
                stores
            }
            Err(err) => {
                self.observer.record(&FetchEvent::StoreListFailed {
                    error: err.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// Products on special at one store, from cache when possible.
    ///
    /// Upstream failure is reported and yields an empty list.
    pub async fn fetch_store_specials(
        &self,
        store_id: &str,
        store_name: &str,
    ) -> Vec<SpecialProduct> {
        match self.try_fetch_store_specials(store_id).await {
            Ok(specials) => specials,
            Err(err) => {
                self.report_store_failure(store_id, store_name, &err);
                Vec::new()
            }
        }
    }

    /// Fetches specials for every store at once and waits for all of them.
    ///
    /// Successful stores with specials appear in input order; failed stores
    /// only show up in `errors` / `failed_store_ids`.
    pub async fn fetch_multiple_store_specials(&self, stores: &[StoreRef]) -> AggregateResult {
        let started = Instant::now();
        let mut settled = Settled::default();
        self.fan_out(stores, &mut settled).await;
        self.finish(stores.len(), settled, started)
    }

    /// Like [`Self::fetch_multiple_store_specials`], but fans out at most
    /// `batch_size` stores at a time, one batch after another. A batch size
    /// of zero is treated as one.
    pub async fn fetch_multiple_store_specials_batched(
        &self,
        stores: &[StoreRef],
        batch_size: usize,
    ) -> AggregateResult {
        let started = Instant::now();
        let mut settled = Settled::default();
        for batch in stores.chunks(batch_size.max(1)) {
            self.fan_out(batch, &mut settled).await;
        }
        self.finish(stores.len(), settled, started)
    }

    async fn try_fetch_store_specials(
        &self,
        store_id: &str,
    ) -> Result<Vec<SpecialProduct>, DutchieError> {
        let key = specials_key(store_id);
        if let Some(specials) = self.read_cached::<Vec<SpecialProduct>>(&key).await {
            return Ok(specials);
        }

        let products = self.client.list_menu_products(store_id).await?;
        let specials = retain_on_special(products);
        if !specials.is_empty() {
            self.write_cached(&key, &specials).await;
        }
        Ok(specials)
    }

    /// Runs one fetch per store concurrently and settles all of them.
    /// `join_all` yields outcomes in input order regardless of completion order.
    async fn fan_out(&self, stores: &[StoreRef], settled: &mut Settled) {
        let outcomes = join_all(stores.iter().map(|store| async move {
            (store, self.try_fetch_store_specials(&store.id).await)
        }))
        .await;

        for (store, outcome) in outcomes {
            match outcome {
                Ok(specials) if specials.is_empty() => {}
                Ok(specials) => settled
                    .store_specials
                    .push(StoreSpecials::new(store.clone(), specials)),
                Err(err) => {
                    self.report_store_failure(&store.id, &store.name, &err);
                    settled.errors.push(format!("{}: {err}", store.name));
                    settled.failed_store_ids.push(store.id.clone());
                }
            }
        }
    }

    fn finish(&self, store_count: usize, settled: Settled, started: Instant) -> AggregateResult {
        let total_specials = settled.store_specials.iter().map(|s| s.count).sum();
        let elapsed_secs = round_secs(started.elapsed());

        self.observer.record(&FetchEvent::AggregateCompleted {
            stores: store_count,
            stores_with_specials: settled.store_specials.len(),
            total_specials,
            failed: settled.errors.len(),
            elapsed_secs,
        });

        AggregateResult {
            store_specials: settled.store_specials,
            total_specials,
            errors: settled.errors,
            failed_store_ids: settled.failed_store_ids,
            store_count,
            elapsed_secs,
            fetched_at: Utc::now(),
        }
    }

    fn report_store_failure(&self, store_id: &str, store_name: &str, err: &DutchieError) {
        self.observer.record(&FetchEvent::StoreFailed {
            store_id: store_id.to_owned(),
            store_name: store_name.to_owned(),
            error: err.to_string(),
        });
    }

    /// Cache read that never fails: backend and decode errors read as a miss.
    async fn read_cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match get_json::<T>(self.cache.as_ref(), key).await {
            Ok(Some(value)) => {
                self.observer.record(&FetchEvent::CacheHit {
                    key: key.to_owned(),
                });
                Some(value)
            }
            Ok(None) => {
                self.observer.record(&FetchEvent::CacheMiss {
                    key: key.to_owned(),
                });
                None
            }
            Err(CacheError::Serialization(error)) => {
                self.observer.record(&FetchEvent::CacheDecodeFailed {
                    key: key.to_owned(),
                    error,
                });
                None
            }
            Err(err) => {
                self.observer.record(&FetchEvent::CacheReadFailed {
                    key: key.to_owned(),
                    error: err.to_string(),
                });
                None
            }
        }
    }

    /// Best-effort write-back; failures are reported and dropped.
    async fn write_cached<T: Serialize>(&self, key: &str, items: &[T]) {
        match put_json(self.cache.as_ref(), key, items, self.ttl_secs).await {
            Ok(()) => self.observer.record(&FetchEvent::CacheStored {
                key: key.to_owned(),
                items: items.len(),
                ttl_secs: self.ttl_secs,
            }),
            Err(err) => self.observer.record(&FetchEvent::CacheWriteFailed {
                key: key.to_owned(),
                error: err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use dispo_dutchie::ClientConfig;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<FetchEvent>>);

    impl FetchObserver for Recorder {
        fn record(&self, event: &FetchEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    fn unreachable_client() -> DutchieClient {
        // Port 1 on localhost refuses connections immediately.
        DutchieClient::new(ClientConfig::new("http://127.0.0.1:1/graphql", "t"))
            .expect("client construction should not fail")
    }

    #[tokio::test]
    async fn empty_store_slice_settles_immediately() {
        let recorder = Arc::new(Recorder::default());
        let aggregator =
            SpecialsAggregator::new(unreachable_client()).with_observer(recorder.clone());

        let result = aggregator.fetch_multiple_store_specials(&[]).await;

        assert!(result.store_specials.is_empty());
        assert!(result.errors.is_empty());
        assert_eq!(result.total_specials, 0);
        assert_eq!(result.store_count, 0);

        let events = recorder.0.lock().unwrap();
        assert!(matches!(
            events.as_slice(),
            [FetchEvent::AggregateCompleted { stores: 0, .. }]
        ));
    }

    #[tokio::test]
    async fn zero_batch_size_is_treated_as_one() {
        let aggregator = SpecialsAggregator::new(unreachable_client());
        let stores = vec![StoreRef::new("a", "A"), StoreRef::new("b", "B")];

        let result = aggregator
            .fetch_multiple_store_specials_batched(&stores, 0)
            .await;

        assert_eq!(result.store_count, 2);
        assert_eq!(result.failed_store_ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn unreachable_upstream_degrades_to_empty_store_list() {
        let recorder = Arc::new(Recorder::default());
        let aggregator =
            SpecialsAggregator::new(unreachable_client()).with_observer(recorder.clone());

        assert!(aggregator.fetch_store_list().await.is_empty());
        let events = recorder.0.lock().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, FetchEvent::StoreListFailed { .. })));
    }
}
