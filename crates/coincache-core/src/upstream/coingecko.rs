//! HTTP client for the CoinGecko market API.
//!
//! Two endpoints are used:
//! 1. `GET /coins/list` to resolve a human name to a canonical id
//! 2. `GET /coins/markets?vs_currency=...&ids={id}` for the snapshot itself

use super::MarketFetcher;
use crate::config::NetworkConfig;
use crate::error::{CoincacheError, Result};
use crate::models::Coin;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Helper to create an upstream error without a reqwest source.
fn upstream_err(msg: String) -> CoincacheError {
    CoincacheError::Upstream {
        message: msg,
        source: None,
    }
}

/// One entry of `GET /coins/list`.
#[derive(Debug, Clone, Deserialize)]
struct CoinListEntry {
    id: String,
    name: String,
}

/// HTTP client for the CoinGecko API.
pub struct CoinGeckoClient {
    base_url: String,
    client: reqwest::Client,
    /// Pro API key, sent as a request header when present.
    api_key: Option<String>,
}

impl CoinGeckoClient {
    /// Create a new client against the public API base URL.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_base_url(NetworkConfig::COINGECKO_API_BASE, api_key)
    }

    /// Create a new client targeting the given base URL.
    pub fn with_base_url(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(NetworkConfig::REQUEST_TIMEOUT)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| CoincacheError::Upstream {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(e),
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            api_key,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut request = self.client.get(url);
        if let Some(ref key) = self.api_key {
            request = request.header(NetworkConfig::API_KEY_HEADER, key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: String = response.text().await.unwrap_or_default();
            return Err(upstream_err(format!(
                "GET {} returned {}: {}",
                url, status, body
            )));
        }

        response.json::<T>().await.map_err(|e| CoincacheError::Upstream {
            message: format!("Failed to decode response from {}: {}", url, e),
            source: Some(e),
        })
    }
}

/// Find the canonical id whose name matches, ignoring case.
fn match_coin_id(entries: &[CoinListEntry], name: &str) -> Option<String> {
    let wanted = name.trim();
    entries
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(wanted))
        .map(|entry| entry.id.clone())
}

#[async_trait]
impl MarketFetcher for CoinGeckoClient {
    async fn resolve(&self, name: &str) -> Result<String> {
        let url = format!("{}/coins/list", self.base_url);
        debug!("Resolving coin name '{}' via {}", name, url);

        let entries: Vec<CoinListEntry> = self.get_json(&url).await?;

        match_coin_id(&entries, name).ok_or_else(|| CoincacheError::CoinNotFound {
            name: name.to_string(),
        })
    }

    async fn fetch_snapshot(&self, id: &str) -> Result<Coin> {
        let url = format!(
            "{}/coins/markets?vs_currency={}&ids={}",
            self.base_url,
            NetworkConfig::VS_CURRENCY,
            id
        );
        debug!("Fetching market snapshot for '{}'", id);

        let mut coins: Vec<Coin> = self.get_json(&url).await?;

        if coins.is_empty() {
            return Err(CoincacheError::CoinNotFound {
                name: id.to_string(),
            });
        }

        Ok(coins.swap_remove(0))
    }
}
