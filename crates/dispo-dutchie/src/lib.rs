//! Client for the Dutchie Plus GraphQL API.
//!
//! Exactly two queries are supported: the retailer list and one retailer's
//! menu. Every call is a single timed attempt; retry policy belongs to the
//! caller.

pub mod client;
pub mod error;
pub mod normalize;
pub mod query;
pub mod types;

pub use client::{ClientConfig, DutchieClient};
pub use error::DutchieError;
pub use normalize::{normalize_product, normalize_retailer};
pub use query::Query;
