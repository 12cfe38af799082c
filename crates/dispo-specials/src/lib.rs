//! Cache-aside orchestration of per-store specials fetches.
//!
//! [`SpecialsAggregator`] sits between the render layer and the Dutchie
//! client: it checks the cache, falls back to upstream on a miss, writes back
//! what it fetched, and fans multi-store requests out concurrently. It never
//! fails; every upstream or cache problem turns into an empty result or an
//! entry in [`dispo_core::AggregateResult::errors`].

pub mod aggregator;
pub mod observer;

pub use aggregator::{SpecialsAggregator, DEFAULT_BATCH_SIZE};
pub use observer::{FetchEvent, FetchObserver, TracingObserver};
