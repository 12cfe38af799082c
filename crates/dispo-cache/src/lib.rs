//! Advisory key-value cache used in front of the upstream API.
//!
//! The cache is allowed to be missing, slow, or lossy. Callers treat every
//! error as a miss; an expired entry reads exactly like an absent one.

pub mod error;
pub mod json;
pub mod keys;
pub mod memory;
pub mod store;

pub use error::CacheError;
pub use json::{get_json, put_json};
pub use keys::{specials_key, DEFAULT_TTL_SECS, STORE_LIST_KEY};
pub use memory::MemoryStore;
pub use store::{KvStore, NoopStore};
