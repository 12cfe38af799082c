//! HTTP transport for the Dutchie Plus GraphQL endpoint.
//!
//! Wraps `reqwest` with bearer-token auth, a per-call time budget, and the
//! GraphQL envelope check. Non-2xx statuses surface as
//! [`DutchieError::Http`], a populated `errors` list as
//! [`DutchieError::GraphQl`], and a blown budget as [`DutchieError::Timeout`].

use std::time::Duration;

use dispo_core::{AppConfig, SpecialProduct, Store};
use reqwest::{header, Client, Url};
use serde::de::DeserializeOwned;

use crate::error::DutchieError;
use crate::normalize::{normalize_product, normalize_retailer};
use crate::query::Query;
use crate::types::{GraphQlResponse, MenuData, RetailersData};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything the client needs to reach the API, sourced at startup rather
/// than from process-wide constants.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_token: String,
    /// Budget applied by the typed helpers ([`DutchieClient::list_retailers`],
    /// [`DutchieClient::list_menu_products`]).
    pub timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    #[must_use]
    pub fn new(api_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_token: api_token.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: "dispo/0.1 (specials)".to_string(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            api_url: config.dutchie_api_url.clone(),
            api_token: config.dutchie_api_token.clone(),
            timeout: Duration::from_millis(config.dutchie_timeout_ms),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &"[redacted]")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Client for the two supported Dutchie Plus queries.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct DutchieClient {
    client: Client,
    api_url: Url,
    api_token: String,
    timeout: Duration,
}

impl DutchieClient {
    /// # Errors
    ///
    /// Returns [`DutchieError::InvalidConfig`] if `api_url` does not parse or
    /// the token is empty, and [`DutchieError::Transport`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, DutchieError> {
        let api_url = Url::parse(&config.api_url).map_err(|e| {
            DutchieError::InvalidConfig(format!("invalid API URL '{}': {e}", config.api_url))
        })?;
        if config.api_token.trim().is_empty() {
            return Err(DutchieError::InvalidConfig("API token is empty".to_string()));
        }

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            api_url,
            api_token: config.api_token,
            timeout: config.timeout,
        })
    }

    /// Sends one GraphQL request and returns its `data` payload.
    ///
    /// The whole exchange, including reading the body, must finish within
    /// `timeout`; otherwise the request is dropped. No retries.
    ///
    /// # Errors
    ///
    /// - [`DutchieError::Timeout`] if `timeout` elapses first.
    /// - [`DutchieError::Http`] on a non-2xx status, carrying the body.
    /// - [`DutchieError::GraphQl`] if the envelope has errors or no data.
    /// - [`DutchieError::Transport`] on network failure.
    /// - [`DutchieError::Deserialize`] if the body is not a GraphQL envelope.
    pub async fn execute_query(
        &self,
        query: Query,
        variables: serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, DutchieError> {
        let exchange = self.send(query, variables);
        match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::debug!(%query, timeout_ms, "Dutchie request abandoned after timeout");
                Err(DutchieError::Timeout { timeout_ms })
            }
        }
    }

    /// Lists every retailer visible to the configured token.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::execute_query`].
    pub async fn list_retailers(&self) -> Result<Vec<Store>, DutchieError> {
        let data = self
            .execute_query(Query::Retailers, serde_json::json!({}), self.timeout)
            .await?;
        let parsed: RetailersData = decode(data, "Retailers")?;
        Ok(parsed.retailers.into_iter().map(normalize_retailer).collect())
    }

    /// Lists one retailer's full menu, unfiltered.
    ///
    /// A retailer without a published menu yields an empty list.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::execute_query`].
    pub async fn list_menu_products(
        &self,
        retailer_id: &str,
    ) -> Result<Vec<SpecialProduct>, DutchieError> {
        let variables = serde_json::json!({ "retailerId": retailer_id });
        let data = self
            .execute_query(Query::MenuProducts, variables, self.timeout)
            .await?;
        let parsed: MenuData = decode(data, &format!("MenuProducts(retailerId={retailer_id})"))?;
        Ok(parsed
            .menu
            .map(|menu| menu.products.into_iter().map(normalize_product).collect())
            .unwrap_or_default())
    }

    async fn send(
        &self,
        query: Query,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, DutchieError> {
        let body = serde_json::json!({
            "query": query.text(),
            "variables": variables,
        });

        let response = self
            .client
            .post(self.api_url.clone())
            .bearer_auth(&self.api_token)
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(DutchieError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: GraphQlResponse =
            serde_json::from_str(&text).map_err(|e| DutchieError::Deserialize {
                context: format!("{query} response envelope"),
                source: e,
            })?;

        check_graphql_errors(envelope)
    }
}

/// Extracts `data`, turning a non-empty `errors` list into one joined message.
fn check_graphql_errors(envelope: GraphQlResponse) -> Result<serde_json::Value, DutchieError> {
    if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
        let joined = errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(DutchieError::GraphQl(joined));
    }

    match envelope.data {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(DutchieError::GraphQl("response contained no data".to_string())),
    }
}

fn decode<T: DeserializeOwned>(data: serde_json::Value, context: &str) -> Result<T, DutchieError> {
    serde_json::from_value(data).map_err(|e| DutchieError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
