//! Chain status source

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::TornConfig;
use crate::error::{Error, Result};
use crate::models::{ChainReport, ChainResponse};

/// Fetches the faction's current chain status.
///
/// `Ok(ChainReport::ApiError(_))` means the API answered but refused;
/// `Err(_)` means no usable answer arrived at all.
#[async_trait]
pub trait StatusProvider: Send + Sync {
    /// Fetch the current chain status
    async fn fetch_chain(&self) -> Result<ChainReport>;
}

/// Torn API v1 client for `faction/?selections=chain`
pub struct TornClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TornClient {
    /// Create a client; every request is bounded by `config.request_timeout`
    pub fn new(config: &TornConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("chainwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl StatusProvider for TornClient {
    async fn fetch_chain(&self) -> Result<ChainReport> {
        let url = format!("{}/faction/", self.base_url);

        // The key travels in the query string, so strip URLs from errors.
        let response = self
            .client
            .get(&url)
            .query(&[("selections", "chain"), ("key", self.api_key.as_str())])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::Http(e.without_url()))?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;

        let parsed: ChainResponse =
            serde_json::from_str(&body).map_err(|e| Error::Decode(e.to_string()))?;

        debug!("Fetched chain details");
        Ok(parsed.into())
    }
}
