use thiserror::Error;

/// Errors returned by [`crate::DutchieClient`].
#[derive(Debug, Error)]
pub enum DutchieError {
    /// No complete response arrived within the per-call budget.
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The endpoint answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response carried a GraphQL `errors` list, or no `data` at all.
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}
