//! Coincache Core - read-through cache for per-coin market data.
//!
//! This crate provides the refresh coordination layer: a client asks for a
//! coin by name, and the coordinator decides whether the persisted snapshot
//! is still fresh, fetches a new one from the upstream market API if not,
//! and always answers from the durable store. Concurrent requests for the
//! same coin are collapsed into a single upstream fetch.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use coincache_core::{CoinGeckoClient, RefreshCoordinator, SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> coincache_core::Result<()> {
//!     let store = Arc::new(SqliteStore::new("./coincache.sqlite")?);
//!     let fetcher = Arc::new(CoinGeckoClient::new(None)?);
//!     let coordinator = RefreshCoordinator::new(fetcher, store);
//!
//!     let coin = coordinator.get_or_refresh("bitcoin").await?;
//!     println!("{} = {} EUR", coin.name, coin.current_price);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod refresh;
pub mod store;
pub mod upstream;

// Re-export commonly used types
pub use error::{CoincacheError, Result};
pub use models::{Coin, Roi};
pub use refresh::{FreshnessTracker, KeyLocks, RefreshCoordinator};
pub use store::{QuoteStore, SqliteStore};
pub use upstream::{CoinGeckoClient, MarketFetcher};
