//! Centralized configuration for coincache.
//!
//! Constants for network operations, cache freshness, and storage paths.

use std::time::Duration;

/// Cache freshness configuration.
pub struct CacheConfig;

impl CacheConfig {
    /// Maximum age of a persisted snapshot before it is refreshed.
    pub const REFRESH_TTL: Duration = Duration::from_secs(600);
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
    pub const USER_AGENT: &'static str = "coincache/0.1";
    pub const COINGECKO_API_BASE: &'static str = "https://api.coingecko.com/api/v3";
    /// Header used by CoinGecko for pro API keys.
    pub const API_KEY_HEADER: &'static str = "x-cg-pro-api-key";
    /// Currency the market endpoint is queried in.
    pub const VS_CURRENCY: &'static str = "eur";
}

/// Storage configuration.
pub struct StorageConfig;

impl StorageConfig {
    pub const DEFAULT_DB_FILENAME: &'static str = "coincache.sqlite";
}
