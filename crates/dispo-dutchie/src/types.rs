//! Raw response shapes from the Dutchie Plus GraphQL endpoint.
//!
//! ### Envelope
//! Every response is `{ "data": ..., "errors": [...] }`. `errors` is absent on
//! success; when present it is a list of `{ "message": ... }` objects and
//! `data` may be `null` or partially populated.
//!
//! ### Prices
//! `priceRec` / `specialPriceRec` are JSON numbers in dollars (`45`, `37.5`).
//! `specialPriceRec` is `null` when no special is running. Normalization
//! converts both to integer cents.
//!
//! ### Nested objects
//! `brand`, `potencyThc` and `potencyCbd` are objects that may be `null`;
//! only their `name` / `formatted` fields are used.

use serde::Deserialize;

/// Top-level GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlErrorItem>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlErrorItem {
    pub message: String,
}

/// `data` payload of the `Retailers` query.
#[derive(Debug, Deserialize)]
pub struct RetailersData {
    #[serde(default)]
    pub retailers: Vec<RawRetailer>,
}

#[derive(Debug, Deserialize)]
pub struct RawRetailer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// `data` payload of the `MenuProducts` query.
#[derive(Debug, Deserialize)]
pub struct MenuData {
    /// `null` when the retailer exists but has no published menu.
    #[serde(default)]
    pub menu: Option<RawMenu>,
}

#[derive(Debug, Deserialize)]
pub struct RawMenu {
    #[serde(default)]
    pub products: Vec<RawProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<RawBrand>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub potency_thc: Option<RawPotency>,
    #[serde(default)]
    pub potency_cbd: Option<RawPotency>,
    #[serde(default)]
    pub variants: Vec<RawVariant>,
}

#[derive(Debug, Deserialize)]
pub struct RawBrand {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawPotency {
    #[serde(default)]
    pub formatted: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariant {
    pub id: String,
    #[serde(default)]
    pub option: Option<String>,
    /// Regular recreational price in dollars.
    #[serde(default)]
    pub price_rec: Option<f64>,
    /// Discounted recreational price in dollars, `null` when not on special.
    #[serde(default)]
    pub special_price_rec: Option<f64>,
    #[serde(default)]
    pub quantity: Option<i32>,
}
