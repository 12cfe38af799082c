use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend is missing, unreachable, or rejected the operation.
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// A value could not be encoded for, or decoded from, the cache.
    #[error("cache serialization failed: {0}")]
    Serialization(String),
}
