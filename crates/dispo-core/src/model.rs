//! Value types shared between the upstream client, the aggregator, and
//! whatever renders the results.
//!
//! Everything here is a per-request snapshot: built fresh from upstream (or
//! the cache), handed to the render layer, then dropped. All types are serde
//! round-trippable because the cache stores them as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format::calculate_discount;

/// A dispensary location as reported by the upstream retailer list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    /// Opaque upstream retailer identifier.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// The minimal store descriptor the render layer passes in: an id to query
/// and a name to label errors with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRef {
    pub id: String,
    pub name: String,
}

impl StoreRef {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl From<&Store> for StoreRef {
    fn from(store: &Store) -> Self {
        Self {
            id: store.id.clone(),
            name: store.name.clone(),
        }
    }
}

/// One purchasable option of a product (e.g. `"1g"`, `"1/8oz"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    /// Option label as shown on the menu.
    pub option: String,
    /// Regular price in cents.
    pub price_cents: i64,
    /// Discounted price in cents, when the upstream menu reports one.
    #[serde(default)]
    pub special_price_cents: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i32>,
}

impl Variant {
    /// A variant is on special when it carries a positive discounted price
    /// strictly below a positive regular price. An equal discounted price does
    /// not count, and neither does a zero one.
    #[must_use]
    pub fn is_on_special(&self) -> bool {
        self.price_cents > 0
            && self
                .special_price_cents
                .is_some_and(|special| special > 0 && special < self.price_cents)
    }

    /// Whole-percent discount for this variant, `0` when not on special.
    #[must_use]
    pub fn discount_percent(&self) -> u32 {
        self.special_price_cents
            .map_or(0, |special| calculate_discount(self.price_cents, special))
    }
}

/// A menu product. After [`retain_on_special`] only products with at least
/// one discounted variant remain; the full variant list is kept intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Formatted THC potency, e.g. `"24.5%"`.
    #[serde(default)]
    pub thc: Option<String>,
    /// Formatted CBD potency.
    #[serde(default)]
    pub cbd: Option<String>,
    pub variants: Vec<Variant>,
}

impl SpecialProduct {
    #[must_use]
    pub fn is_on_special(&self) -> bool {
        self.variants.iter().any(Variant::is_on_special)
    }

    /// Largest discount across all variants.
    #[must_use]
    pub fn best_discount(&self) -> u32 {
        self.variants
            .iter()
            .map(Variant::discount_percent)
            .max()
            .unwrap_or(0)
    }
}

/// Keeps only products that have at least one variant on special,
/// preserving input order. Applying it twice is the same as applying it once.
#[must_use]
pub fn retain_on_special(mut products: Vec<SpecialProduct>) -> Vec<SpecialProduct> {
    products.retain(SpecialProduct::is_on_special);
    products
}

/// A store paired with the specials found on its menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSpecials {
    pub store: StoreRef,
    pub specials: Vec<SpecialProduct>,
    pub count: usize,
}

impl StoreSpecials {
    #[must_use]
    pub fn new(store: StoreRef, specials: Vec<SpecialProduct>) -> Self {
        let count = specials.len();
        Self {
            store,
            specials,
            count,
        }
    }
}

/// Everything the render layer needs from one multi-store specials fetch.
///
/// Every requested store lands in exactly one place: a `store_specials`
/// entry, an `errors` entry, or nowhere (it answered with zero specials).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Stores with at least one special, in input order.
    pub store_specials: Vec<StoreSpecials>,
    pub total_specials: usize,
    /// `"{store name}: {reason}"` for every store whose fetch failed.
    pub errors: Vec<String>,
    /// Ids of the failed stores, parallel to `errors`. Names are not unique,
    /// so callers that need to tell "unavailable" from "no specials" should
    /// join on these.
    pub failed_store_ids: Vec<String>,
    /// Number of stores requested.
    pub store_count: usize,
    /// Wall-clock seconds, two decimal places.
    pub elapsed_secs: f64,
    pub fetched_at: DateTime<Utc>,
}

impl AggregateResult {
    /// Percentage of requested stores whose fetch did not fail.
    /// An empty request is reported as fully successful.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.store_count == 0 {
            return 100.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = (self.store_count - self.errors.len()) as f64 / self.store_count as f64;
        rate * 100.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store_specials.is_empty()
    }

    #[must_use]
    pub fn failed(&self, store_id: &str) -> bool {
        self.failed_store_ids.iter().any(|id| id == store_id)
    }
}
