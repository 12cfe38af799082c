//! Conversion from raw GraphQL shapes to [`dispo_core`] model types.

use dispo_core::{SpecialProduct, Store, Variant};

use crate::types::{RawPotency, RawProduct, RawRetailer, RawVariant};

#[must_use]
pub fn normalize_retailer(raw: RawRetailer) -> Store {
    Store {
        id: raw.id,
        name: raw.name,
        address: non_empty(raw.address),
        phone: non_empty(raw.phone),
    }
}

/// Flattens a raw menu product. Does not filter; see
/// [`dispo_core::retain_on_special`].
#[must_use]
pub fn normalize_product(raw: RawProduct) -> SpecialProduct {
    SpecialProduct {
        id: raw.id,
        name: raw.name,
        brand: raw.brand.and_then(|b| non_empty(b.name)),
        category: non_empty(raw.category),
        subcategory: non_empty(raw.subcategory),
        image_url: non_empty(raw.image),
        description: non_empty(raw.description),
        thc: formatted(raw.potency_thc),
        cbd: formatted(raw.potency_cbd),
        variants: raw.variants.into_iter().map(normalize_variant).collect(),
    }
}

fn normalize_variant(raw: RawVariant) -> Variant {
    Variant {
        id: raw.id,
        option: raw.option.unwrap_or_default(),
        price_cents: raw.price_rec.map_or(0, dollars_to_cents),
        special_price_cents: raw.special_price_rec.map(dollars_to_cents),
        quantity: raw.quantity,
    }
}

/// Dollars as reported upstream → integer cents, rounded to the nearest cent.
#[allow(clippy::cast_possible_truncation)]
fn dollars_to_cents(dollars: f64) -> i64 {
    (dollars * 100.0).round() as i64
}

fn formatted(potency: Option<RawPotency>) -> Option<String> {
    potency.and_then(|p| non_empty(p.formatted))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
