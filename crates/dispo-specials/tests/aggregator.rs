//! Integration tests for `SpecialsAggregator` against a wiremock upstream.
//!
//! Each store's menu is routed by matching the `retailerId` GraphQL variable,
//! so one mock server can stand in for many stores with different behavior.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dispo_cache::{specials_key, CacheError, KvStore, MemoryStore, STORE_LIST_KEY};
use dispo_core::{SpecialProduct, StoreRef, Variant};
use dispo_dutchie::{ClientConfig, DutchieClient};
use dispo_specials::{FetchEvent, FetchObserver, SpecialsAggregator};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Recorder(Mutex<Vec<FetchEvent>>);

impl Recorder {
    fn events(&self) -> Vec<FetchEvent> {
        self.0.lock().unwrap().clone()
    }
}

impl FetchObserver for Recorder {
    fn record(&self, event: &FetchEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

/// A cache backend that is configured but broken.
struct FailingStore;

#[async_trait]
impl KvStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn put(&self, _key: &str, _value: String, _ttl_secs: u64) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

fn client(server: &MockServer, timeout: Duration) -> DutchieClient {
    let config =
        ClientConfig::new(format!("{}/graphql", server.uri()), "test-token").with_timeout(timeout);
    DutchieClient::new(config).expect("client construction should not fail")
}

fn product_json(id: &str, on_special: bool) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("Product {id}"),
        "brand": { "name": "Acme" },
        "category": "FLOWER",
        "image": format!("https://images.example/{id}.jpg"),
        "potencyThc": { "formatted": "20%" },
        "variants": [
            {
                "id": format!("{id}-v1"),
                "option": "1g",
                "priceRec": 20,
                "specialPriceRec": if on_special { json!(15) } else { json!(null) },
                "quantity": 5
            }
        ]
    })
}

/// Menu with `specials` discounted products followed by `regular` full-price ones.
fn menu_json(store_id: &str, specials: usize, regular: usize) -> serde_json::Value {
    let mut products: Vec<serde_json::Value> = (0..specials)
        .map(|i| product_json(&format!("{store_id}-s{i}"), true))
        .collect();
    products.extend((0..regular).map(|i| product_json(&format!("{store_id}-r{i}"), false)));
    json!({ "data": { "menu": { "products": products } } })
}

async fn mount_menu(server: &MockServer, store_id: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "retailerId": store_id } })))
        .respond_with(response)
        .mount(server)
        .await;
}

fn cached_special(id: &str) -> SpecialProduct {
    SpecialProduct {
        id: id.to_string(),
        name: "Cached Gummies".to_string(),
        brand: None,
        category: Some("EDIBLES".to_string()),
        subcategory: None,
        image_url: None,
        description: None,
        thc: Some("10mg".to_string()),
        cbd: None,
        variants: vec![Variant {
            id: format!("{id}-v"),
            option: "10pk".to_string(),
            price_cents: 2500,
            special_price_cents: Some(2000),
            quantity: Some(10),
        }],
    }
}

// ---------------------------------------------------------------------------
// Multi-store fan-out
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mixed_outcomes_settle_into_results_and_errors() {
    let server = MockServer::start().await;
    mount_menu(
        &server,
        "a",
        ResponseTemplate::new(200).set_body_json(menu_json("a", 2, 1)),
    )
    .await;
    mount_menu(
        &server,
        "b",
        ResponseTemplate::new(200)
            .set_body_json(menu_json("b", 3, 0))
            .set_delay(Duration::from_secs(3)),
    )
    .await;
    mount_menu(
        &server,
        "c",
        ResponseTemplate::new(200).set_body_json(menu_json("c", 0, 4)),
    )
    .await;

    let aggregator = SpecialsAggregator::new(client(&server, Duration::from_millis(300)));
    let stores = vec![
        StoreRef::new("a", "A"),
        StoreRef::new("b", "B"),
        StoreRef::new("c", "C"),
    ];

    let result = aggregator.fetch_multiple_store_specials(&stores).await;

    assert_eq!(result.store_specials.len(), 1);
    assert_eq!(result.store_specials[0].store, StoreRef::new("a", "A"));
    assert_eq!(result.store_specials[0].count, 2);
    assert_eq!(result.total_specials, 2);
    assert_eq!(result.errors, vec!["B: Request timeout after 300ms"]);
    assert_eq!(result.failed_store_ids, vec!["b"]);
    assert_eq!(result.store_count, 3);
    assert!(result.elapsed_secs < 3.0, "timed-out store must not hold the join");
}

#[tokio::test]
async fn every_store_lands_in_at_most_one_bucket() {
    let server = MockServer::start().await;
    let mut stores = Vec::new();
    for i in 0..9 {
        let id = format!("s{i}");
        let response = match i % 3 {
            0 => ResponseTemplate::new(200).set_body_json(menu_json(&id, 1, 1)),
            1 => ResponseTemplate::new(500).set_body_string("boom"),
            _ => ResponseTemplate::new(200).set_body_json(menu_json(&id, 0, 2)),
        };
        mount_menu(&server, &id, response).await;
        stores.push(StoreRef::new(id.clone(), format!("Store {i}")));
    }

    let aggregator = SpecialsAggregator::new(client(&server, Duration::from_secs(5)));
    let result = aggregator.fetch_multiple_store_specials(&stores).await;

    let with_specials: HashSet<&str> = result
        .store_specials
        .iter()
        .map(|s| s.store.id.as_str())
        .collect();
    let failed: HashSet<&str> = result.failed_store_ids.iter().map(String::as_str).collect();

    assert!(with_specials.is_disjoint(&failed));
    assert_eq!(with_specials, HashSet::from(["s0", "s3", "s6"]));
    assert_eq!(failed, HashSet::from(["s1", "s4", "s7"]));
    assert_eq!(result.errors.len(), result.failed_store_ids.len());
    assert!(result.store_specials.len() + result.errors.len() <= stores.len());
    assert!(result.errors[0].starts_with("Store 1: HTTP 500"));
}

#[tokio::test]
async fn results_follow_input_order_not_completion_order() {
    let server = MockServer::start().await;
    // Earlier stores answer later.
    for (i, id) in ["first", "second", "third"].iter().enumerate() {
        let delay = Duration::from_millis(300 - 100 * i as u64);
        mount_menu(
            &server,
            id,
            ResponseTemplate::new(200)
                .set_body_json(menu_json(id, 1, 0))
                .set_delay(delay),
        )
        .await;
    }

    let aggregator = SpecialsAggregator::new(client(&server, Duration::from_secs(5)));
    let stores = vec![
        StoreRef::new("first", "First"),
        StoreRef::new("second", "Second"),
        StoreRef::new("third", "Third"),
    ];
    let result = aggregator.fetch_multiple_store_specials(&stores).await;

    let order: Vec<&str> = result
        .store_specials
        .iter()
        .map(|s| s.store.id.as_str())
        .collect();
    assert_eq!(order, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn batched_fetch_matches_unbounded_fetch() {
    let server = MockServer::start().await;
    let mut stores = Vec::new();
    for i in 0..25 {
        let id = format!("store-{i:02}");
        let response = if i % 7 == 3 {
            ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{ "message": "retailer disabled" }]
            }))
        } else {
            ResponseTemplate::new(200).set_body_json(menu_json(&id, i % 4, 1))
        };
        mount_menu(&server, &id, response).await;
        stores.push(StoreRef::new(id, format!("Store {i}")));
    }

    let aggregator = SpecialsAggregator::new(client(&server, Duration::from_secs(5)));
    let unbounded = aggregator.fetch_multiple_store_specials(&stores).await;
    let batched = aggregator
        .fetch_multiple_store_specials_batched(&stores, 10)
        .await;

    assert_eq!(batched.store_specials, unbounded.store_specials);
    assert_eq!(batched.errors, unbounded.errors);
    assert_eq!(batched.failed_store_ids, unbounded.failed_store_ids);
    assert_eq!(batched.total_specials, unbounded.total_specials);
    assert_eq!(batched.store_count, 25);
    assert!(batched
        .errors
        .iter()
        .all(|e| e.ends_with("GraphQL error: retailer disabled")));
}

#[tokio::test]
async fn aggregate_completion_is_reported() {
    let server = MockServer::start().await;
    mount_menu(
        &server,
        "a",
        ResponseTemplate::new(200).set_body_json(menu_json("a", 2, 0)),
    )
    .await;
    mount_menu(&server, "b", ResponseTemplate::new(502)).await;

    let recorder = Arc::new(Recorder::default());
    let aggregator = SpecialsAggregator::new(client(&server, Duration::from_secs(5)))
        .with_observer(recorder.clone());

    aggregator
        .fetch_multiple_store_specials(&[StoreRef::new("a", "A"), StoreRef::new("b", "B")])
        .await;

    let events = recorder.events();
    assert!(events.iter().any(|e| matches!(
        e,
        FetchEvent::StoreFailed { store_id, .. } if store_id == "b"
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        FetchEvent::AggregateCompleted {
            stores: 2,
            stores_with_specials: 1,
            total_specials: 2,
            failed: 1,
            ..
        }
    )));
}

// ---------------------------------------------------------------------------
// Single-store specials and caching
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_specials_are_filtered_and_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "retailerId": "a" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(menu_json("a", 2, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryStore::new());
    let aggregator =
        SpecialsAggregator::new(client(&server, Duration::from_secs(5))).with_cache(cache.clone());

    let first = aggregator.fetch_store_specials("a", "A").await;
    let second = aggregator.fetch_store_specials("a", "A").await;

    assert_eq!(first.len(), 2, "only discounted products are kept");
    assert!(first.iter().all(SpecialProduct::is_on_special));
    assert_eq!(first, second, "second read is served from cache");
    assert!(cache.get(&specials_key("a")).await.unwrap().is_some());
}

#[tokio::test]
async fn cached_specials_skip_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryStore::new());
    let cached = vec![cached_special("k1")];
    cache
        .put(
            &specials_key("a"),
            serde_json::to_string(&cached).unwrap(),
            900,
        )
        .await
        .unwrap();

    let aggregator =
        SpecialsAggregator::new(client(&server, Duration::from_secs(5))).with_cache(cache);
    let result = aggregator
        .fetch_multiple_store_specials(&[StoreRef::new("a", "A")])
        .await;

    assert_eq!(result.store_specials.len(), 1);
    assert_eq!(result.store_specials[0].specials, cached);
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn empty_specials_are_not_cached() {
    let server = MockServer::start().await;
    mount_menu(
        &server,
        "c",
        ResponseTemplate::new(200).set_body_json(menu_json("c", 0, 2)),
    )
    .await;

    let cache = Arc::new(MemoryStore::new());
    let aggregator =
        SpecialsAggregator::new(client(&server, Duration::from_secs(5))).with_cache(cache.clone());

    assert!(aggregator.fetch_store_specials("c", "C").await.is_empty());
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn expired_specials_are_refetched_from_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "retailerId": "a" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(menu_json("a", 1, 0)))
        .expect(2)
        .mount(&server)
        .await;

    let aggregator = SpecialsAggregator::new(client(&server, Duration::from_secs(5)))
        .with_cache(Arc::new(MemoryStore::new()))
        .with_ttl_secs(900);

    assert_eq!(aggregator.fetch_store_specials("a", "A").await.len(), 1);
    assert_eq!(aggregator.fetch_store_specials("a", "A").await.len(), 1);

    // Only the cache window runs on the paused clock; HTTP stays on real time.
    tokio::time::pause();
    tokio::time::advance(Duration::from_secs(901)).await;
    tokio::time::resume();

    assert_eq!(aggregator.fetch_store_specials("a", "A").await.len(), 1);
}

#[tokio::test]
async fn oversized_ttl_still_caches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "retailerId": "a" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(menu_json("a", 1, 0)))
        .expect(1)
        .mount(&server)
        .await;

    let recorder = Arc::new(Recorder::default());
    let aggregator = SpecialsAggregator::new(client(&server, Duration::from_secs(5)))
        .with_cache(Arc::new(MemoryStore::new()))
        .with_observer(recorder.clone())
        .with_ttl_secs(u64::MAX);

    assert_eq!(aggregator.fetch_store_specials("a", "A").await.len(), 1);
    assert_eq!(aggregator.fetch_store_specials("a", "A").await.len(), 1);
    assert!(recorder
        .events()
        .iter()
        .any(|e| matches!(e, FetchEvent::CacheStored { ttl_secs: u64::MAX, .. })));
}

#[tokio::test]
async fn store_specials_failure_returns_empty() {
    let server = MockServer::start().await;
    mount_menu(&server, "x", ResponseTemplate::new(401).set_body_string("bad token")).await;

    let recorder = Arc::new(Recorder::default());
    let aggregator = SpecialsAggregator::new(client(&server, Duration::from_secs(5)))
        .with_observer(recorder.clone());

    assert!(aggregator.fetch_store_specials("x", "X").await.is_empty());
    assert!(recorder.events().iter().any(|e| matches!(
        e,
        FetchEvent::StoreFailed { store_name, error, .. }
            if store_name == "X" && error.contains("401")
    )));
}

#[tokio::test]
async fn broken_cache_degrades_to_upstream() {
    let server = MockServer::start().await;
    mount_menu(
        &server,
        "a",
        ResponseTemplate::new(200).set_body_json(menu_json("a", 1, 0)),
    )
    .await;

    let recorder = Arc::new(Recorder::default());
    let aggregator = SpecialsAggregator::new(client(&server, Duration::from_secs(5)))
        .with_cache(Arc::new(FailingStore))
        .with_observer(recorder.clone());

    let specials = aggregator.fetch_store_specials("a", "A").await;
    assert_eq!(specials.len(), 1);

    let events = recorder.events();
    assert!(events
        .iter()
        .any(|e| matches!(e, FetchEvent::CacheReadFailed { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, FetchEvent::CacheWriteFailed { .. })));
}

#[tokio::test]
async fn undecodable_cache_entry_is_a_miss() {
    let server = MockServer::start().await;
    mount_menu(
        &server,
        "a",
        ResponseTemplate::new(200).set_body_json(menu_json("a", 1, 0)),
    )
    .await;

    let cache = Arc::new(MemoryStore::new());
    cache
        .put(&specials_key("a"), "{\"not\":\"a list\"}".to_string(), 900)
        .await
        .unwrap();

    let recorder = Arc::new(Recorder::default());
    let aggregator = SpecialsAggregator::new(client(&server, Duration::from_secs(5)))
        .with_cache(cache)
        .with_observer(recorder.clone());

    assert_eq!(aggregator.fetch_store_specials("a", "A").await.len(), 1);
    assert!(recorder
        .events()
        .iter()
        .any(|e| matches!(e, FetchEvent::CacheDecodeFailed { .. })));
}

// ---------------------------------------------------------------------------
// Store list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_list_is_fetched_once_then_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "retailers": [
                    { "id": "r-1", "name": "Downtown", "address": "1 Main St", "phone": null },
                    { "id": "r-2", "name": "Riverside", "address": null, "phone": "555-0100" }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryStore::new());
    let aggregator =
        SpecialsAggregator::new(client(&server, Duration::from_secs(5))).with_cache(cache.clone());

    let first = aggregator.fetch_store_list().await;
    let second = aggregator.fetch_store_list().await;

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    assert!(cache.get(STORE_LIST_KEY).await.unwrap().is_some());
}

#[tokio::test]
async fn empty_store_list_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "retailers": [] } })),
        )
        .mount(&server)
        .await;

    let cache = Arc::new(MemoryStore::new());
    let aggregator =
        SpecialsAggregator::new(client(&server, Duration::from_secs(5))).with_cache(cache.clone());

    assert!(aggregator.fetch_store_list().await.is_empty());
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn store_list_failure_returns_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let aggregator = SpecialsAggregator::new(client(&server, Duration::from_secs(5)))
        .with_cache(Arc::new(FailingStore));

    assert!(aggregator.fetch_store_list().await.is_empty());
}
