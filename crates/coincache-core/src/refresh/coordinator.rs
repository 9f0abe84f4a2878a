//! Read-through refresh coordination.

use super::{normalize_key, FreshnessTracker, KeyLocks};
use crate::config::CacheConfig;
use crate::error::{CoincacheError, Result};
use crate::models::Coin;
use crate::store::QuoteStore;
use crate::upstream::MarketFetcher;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Coordinates conditional refreshes so that concurrent requests for the
/// same coin collapse into a single upstream fetch.
///
/// All key-scoped work (the staleness check, the fetch+persist pair, and
/// the final read-back) happens under that key's lock, so a lookup can
/// never race an in-flight upsert for the same key. Requests for distinct
/// keys proceed fully in parallel.
pub struct RefreshCoordinator {
    fetcher: Arc<dyn MarketFetcher>,
    store: Arc<dyn QuoteStore>,
    locks: KeyLocks,
    freshness: FreshnessTracker,
    ttl: Duration,
}

impl RefreshCoordinator {
    /// Create a coordinator with the default refresh TTL.
    pub fn new(fetcher: Arc<dyn MarketFetcher>, store: Arc<dyn QuoteStore>) -> Self {
        Self::with_ttl(fetcher, store, CacheConfig::REFRESH_TTL)
    }

    /// Create a coordinator with a custom refresh TTL.
    pub fn with_ttl(
        fetcher: Arc<dyn MarketFetcher>,
        store: Arc<dyn QuoteStore>,
        ttl: Duration,
    ) -> Self {
        Self {
            fetcher,
            store,
            locks: KeyLocks::new(),
            freshness: FreshnessTracker::new(),
            ttl,
        }
    }

    /// Return the persisted snapshot for `name`, refreshing it first if it
    /// is stale or missing.
    ///
    /// Refresh failures are absorbed: an upstream or persist error degrades
    /// to serving the last persisted snapshot. Only the final lookup decides
    /// the caller-visible outcome: a storage failure there surfaces as an
    /// error, and an empty result as [`CoincacheError::CoinNotFound`].
    pub async fn get_or_refresh(&self, name: &str) -> Result<Coin> {
        let key = normalize_key(name);

        let lock = self.locks.lock_for(&key);
        let _guard = lock.lock().await;

        if self.freshness.is_stale(&key, self.ttl, Instant::now()) {
            match self.refresh(&key).await {
                Ok(()) => self.freshness.mark_refreshed(&key, Instant::now()),
                Err(e) => {
                    warn!("Refresh for '{}' failed, serving last known good: {}", key, e);
                }
            }
        } else {
            debug!("Snapshot for '{}' is fresh, skipping upstream fetch", key);
        }

        // Still inside the critical section: a lookup here observes the
        // upsert above, and nothing else can interleave for this key.
        match self.store.lookup(&key)? {
            Some(coin) => Ok(coin),
            None => Err(CoincacheError::CoinNotFound { name: key }),
        }
    }

    /// Resolve, fetch, and persist one snapshot. The freshness tracker is
    /// untouched here; the caller advances it only when this returns Ok.
    async fn refresh(&self, key: &str) -> Result<()> {
        let id = self.fetcher.resolve(key).await?;
        let mut coin = self.fetcher.fetch_snapshot(&id).await?;
        coin.last_updated = Utc::now();
        self.store.upsert(&coin)?;
        debug!("Refreshed '{}' (id '{}')", key, coin.id);
        Ok(())
    }
}
