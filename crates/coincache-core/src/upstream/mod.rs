//! Upstream market data retrieval.
//!
//! The coordinator depends on the [`MarketFetcher`] trait; the CoinGecko
//! implementation lives in [`coingecko`]. Credentials and request timeouts
//! are the fetcher's concern, never the coordinator's.

mod coingecko;

pub use coingecko::CoinGeckoClient;

use crate::error::Result;
use crate::models::Coin;
use async_trait::async_trait;

/// Upstream source of market snapshots.
#[async_trait]
pub trait MarketFetcher: Send + Sync {
    /// Resolve a human-readable coin name to its canonical upstream id.
    ///
    /// Returns [`crate::CoincacheError::CoinNotFound`] when the name matches
    /// nothing upstream.
    async fn resolve(&self, name: &str) -> Result<String>;

    /// Fetch the current market snapshot for a canonical id.
    ///
    /// Every attempt is bounded by the client's request timeout; a fetch
    /// that never returns must not pin its caller indefinitely.
    async fn fetch_snapshot(&self, id: &str) -> Result<Coin>;
}
