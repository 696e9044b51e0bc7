//! Order snapshot fetch
//!
//! Client for the business system that assembles order snapshots. The
//! relay makes exactly one attempt per request with a bounded timeout;
//! retry policy belongs to the caller showing the error, never to this
//! layer.

use std::time::Duration;

use shared::OrderSnapshot;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The referenced order does not exist
    #[error("{0}")]
    NotFound(String),

    /// Source unreachable, timed out, or answered with a failure status
    #[error("{0}")]
    Unavailable(String),

    /// The response body does not match the snapshot contract
    #[error("invalid snapshot payload: {0}")]
    Contract(String),
}

/// HTTP client for the order snapshot source
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one order snapshot by its reference
    #[instrument(skip(self))]
    pub async fn fetch_order(&self, order_ref: &str) -> Result<OrderSnapshot, UpstreamError> {
        let url = self.order_url(order_ref)?;
        self.fetch(url, order_ref).await
    }

    /// Fetch the most recent order, optionally scoped to a register
    /// and/or a cashier
    #[instrument(skip(self))]
    pub async fn fetch_last_order(
        &self,
        register_id: Option<i64>,
        user_id: Option<i64>,
    ) -> Result<OrderSnapshot, UpstreamError> {
        let mut url = self.parse_base()?;
        url.path_segments_mut()
            .map_err(|_| UpstreamError::Unavailable("upstream URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["pos", "orders", "latest"]);

        if let Some(register_id) = register_id {
            url.query_pairs_mut()
                .append_pair("register_id", &register_id.to_string());
        }
        if let Some(user_id) = user_id {
            url.query_pairs_mut()
                .append_pair("user_id", &user_id.to_string());
        }

        self.fetch(url, "latest").await
    }

    async fn fetch(
        &self,
        url: reqwest::Url,
        what: &str,
    ) -> Result<OrderSnapshot, UpstreamError> {
        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Unavailable(format!("snapshot fetch timed out for {what}"))
            } else {
                UpstreamError::Unavailable(format!("snapshot fetch failed for {what}: {e}"))
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound(format!("order {what} not found")));
        }
        if !status.is_success() {
            return Err(UpstreamError::Unavailable(format!(
                "upstream answered {status} for {what}"
            )));
        }

        let snapshot: OrderSnapshot = response
            .json()
            .await
            .map_err(|e| UpstreamError::Contract(e.to_string()))?;

        info!(order = %snapshot.name, total = snapshot.amount_total, "snapshot fetched");
        Ok(snapshot)
    }

    fn order_url(&self, order_ref: &str) -> Result<reqwest::Url, UpstreamError> {
        let mut url = self.parse_base()?;
        url.path_segments_mut()
            .map_err(|_| UpstreamError::Unavailable("upstream URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["pos", "orders", order_ref]);
        Ok(url)
    }

    fn parse_base(&self) -> Result<reqwest::Url, UpstreamError> {
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| UpstreamError::Unavailable(format!("invalid upstream URL: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_url_escapes_reference_slashes() {
        let client =
            UpstreamClient::new("http://localhost:8069/", Duration::from_secs(10)).unwrap();
        let url = client.order_url("Shop/0042").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8069/pos/orders/Shop%2F0042"
        );
    }

    #[tokio::test]
    async fn unreachable_upstream_is_reported_not_retried() {
        // Nothing listens on port 9; the single attempt fails cleanly
        let client = UpstreamClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = client.fetch_order("Shop/0042").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Unavailable(_)));
    }
}
