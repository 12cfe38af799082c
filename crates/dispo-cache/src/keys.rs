//! Cache key layout. Keys are namespaced by kind so the store list and the
//! per-store specials never collide.

/// Every entry lives for fifteen minutes.
pub const DEFAULT_TTL_SECS: u64 = 900;

pub const STORE_LIST_KEY: &str = "dutchie:stores:all";

#[must_use]
pub fn specials_key(store_id: &str) -> String {
    format!("dutchie:specials:{store_id}")
}
