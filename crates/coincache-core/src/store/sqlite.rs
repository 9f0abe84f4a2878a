//! SQLite-backed snapshot store.

use super::QuoteStore;
use crate::error::{CoincacheError, Result};
use crate::models::{Coin, Roi};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// SQLite-based store for coin snapshots.
///
/// Thread-safe via internal mutex on the connection; safe to share across
/// concurrent refreshes for different keys.
pub struct SqliteStore {
    /// Database connection (wrapped for thread safety).
    conn: Arc<Mutex<Connection>>,
}

/// Raw row as it comes off the wire; timestamps and the roi blob are parsed
/// after the rusqlite closure returns.
struct CoinRow {
    id: String,
    symbol: String,
    name: String,
    image: String,
    current_price: f64,
    market_cap: i64,
    market_cap_rank: i32,
    fully_diluted_valuation: i64,
    total_volume: i64,
    high_24h: f64,
    low_24h: f64,
    price_change_24h: f64,
    price_change_percentage_24h: f64,
    market_cap_change_24h: i64,
    market_cap_change_percentage_24h: f64,
    circulating_supply: f64,
    total_supply: f64,
    max_supply: Option<f64>,
    ath: f64,
    ath_change_percentage: f64,
    ath_date: String,
    atl: f64,
    atl_change_percentage: f64,
    atl_date: String,
    roi: Option<String>,
    last_updated: String,
}

impl CoinRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            symbol: row.get(1)?,
            name: row.get(2)?,
            image: row.get(3)?,
            current_price: row.get(4)?,
            market_cap: row.get(5)?,
            market_cap_rank: row.get(6)?,
            fully_diluted_valuation: row.get(7)?,
            total_volume: row.get(8)?,
            high_24h: row.get(9)?,
            low_24h: row.get(10)?,
            price_change_24h: row.get(11)?,
            price_change_percentage_24h: row.get(12)?,
            market_cap_change_24h: row.get(13)?,
            market_cap_change_percentage_24h: row.get(14)?,
            circulating_supply: row.get(15)?,
            total_supply: row.get(16)?,
            max_supply: row.get(17)?,
            ath: row.get(18)?,
            ath_change_percentage: row.get(19)?,
            ath_date: row.get(20)?,
            atl: row.get(21)?,
            atl_change_percentage: row.get(22)?,
            atl_date: row.get(23)?,
            roi: row.get(24)?,
            last_updated: row.get(25)?,
        })
    }

    fn into_coin(self) -> Result<Coin> {
        let roi: Option<Roi> = match self.roi {
            Some(blob) => Some(serde_json::from_str(&blob).map_err(|e| {
                CoincacheError::Json {
                    message: format!("Failed to decode stored roi: {}", e),
                    source: Some(e),
                }
            })?),
            None => None,
        };

        Ok(Coin {
            id: self.id,
            symbol: self.symbol,
            name: self.name,
            image: self.image,
            current_price: self.current_price,
            market_cap: self.market_cap,
            market_cap_rank: self.market_cap_rank,
            fully_diluted_valuation: self.fully_diluted_valuation,
            total_volume: self.total_volume,
            high_24h: self.high_24h,
            low_24h: self.low_24h,
            price_change_24h: self.price_change_24h,
            price_change_percentage_24h: self.price_change_percentage_24h,
            market_cap_change_24h: self.market_cap_change_24h,
            market_cap_change_percentage_24h: self.market_cap_change_percentage_24h,
            circulating_supply: self.circulating_supply,
            total_supply: self.total_supply,
            max_supply: self.max_supply,
            ath: self.ath,
            ath_change_percentage: self.ath_change_percentage,
            ath_date: parse_timestamp(&self.ath_date),
            atl: self.atl,
            atl_change_percentage: self.atl_change_percentage,
            atl_date: parse_timestamp(&self.atl_date),
            roi,
            last_updated: parse_timestamp(&self.last_updated),
        })
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl SqliteStore {
    /// Open (or create) a store at the specified database path.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoincacheError::Database {
                message: format!("Failed to create store directory: {}", e),
                source: None,
            })?;
        }

        let conn = Connection::open(db_path).map_err(|e| CoincacheError::Database {
            message: format!("Failed to open store database: {}", e),
            source: Some(e),
        })?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| CoincacheError::Database {
                message: format!("Failed to set pragmas: {}", e),
                source: Some(e),
            })?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.init_schema()?;

        Ok(store)
    }

    /// Open an in-memory store. Used by tests and ephemeral deployments.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| CoincacheError::Database {
            message: format!("Failed to open in-memory database: {}", e),
            source: Some(e),
        })?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.init_schema()?;

        Ok(store)
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| CoincacheError::Database {
            message: format!("Failed to lock database: {}", e),
            source: None,
        })
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS coins (
                id TEXT PRIMARY KEY,
                symbol TEXT NOT NULL,
                name TEXT NOT NULL,
                image TEXT NOT NULL,
                current_price REAL NOT NULL,
                market_cap INTEGER NOT NULL,
                market_cap_rank INTEGER NOT NULL,
                fully_diluted_valuation INTEGER NOT NULL,
                total_volume INTEGER NOT NULL,
                high_24h REAL NOT NULL,
                low_24h REAL NOT NULL,
                price_change_24h REAL NOT NULL,
                price_change_percentage_24h REAL NOT NULL,
                market_cap_change_24h INTEGER NOT NULL,
                market_cap_change_percentage_24h REAL NOT NULL,
                circulating_supply REAL NOT NULL,
                total_supply REAL NOT NULL,
                max_supply REAL,
                ath REAL NOT NULL,
                ath_change_percentage REAL NOT NULL,
                ath_date TEXT NOT NULL,
                atl REAL NOT NULL,
                atl_change_percentage REAL NOT NULL,
                atl_date TEXT NOT NULL,
                roi TEXT,
                last_updated TEXT NOT NULL
            );

            -- Lookups are by name, not id
            CREATE INDEX IF NOT EXISTS idx_coins_name ON coins(name);
            "#,
        )
        .map_err(|e| CoincacheError::Database {
            message: format!("Failed to initialize store schema: {}", e),
            source: Some(e),
        })?;

        Ok(())
    }
}

impl QuoteStore for SqliteStore {
    fn upsert(&self, coin: &Coin) -> Result<()> {
        let roi_json = match &coin.roi {
            Some(roi) => Some(serde_json::to_string(roi).map_err(|e| CoincacheError::Json {
                message: format!("Failed to encode roi: {}", e),
                source: Some(e),
            })?),
            None => None,
        };

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            INSERT INTO coins (
                id, symbol, name, image, current_price, market_cap, market_cap_rank,
                fully_diluted_valuation, total_volume, high_24h, low_24h,
                price_change_24h, price_change_percentage_24h, market_cap_change_24h,
                market_cap_change_percentage_24h, circulating_supply, total_supply,
                max_supply, ath, ath_change_percentage, ath_date, atl,
                atl_change_percentage, atl_date, roi, last_updated
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26
            )
            ON CONFLICT(id) DO UPDATE SET
                symbol = excluded.symbol,
                name = excluded.name,
                image = excluded.image,
                current_price = excluded.current_price,
                market_cap = excluded.market_cap,
                market_cap_rank = excluded.market_cap_rank,
                fully_diluted_valuation = excluded.fully_diluted_valuation,
                total_volume = excluded.total_volume,
                high_24h = excluded.high_24h,
                low_24h = excluded.low_24h,
                price_change_24h = excluded.price_change_24h,
                price_change_percentage_24h = excluded.price_change_percentage_24h,
                market_cap_change_24h = excluded.market_cap_change_24h,
                market_cap_change_percentage_24h = excluded.market_cap_change_percentage_24h,
                circulating_supply = excluded.circulating_supply,
                total_supply = excluded.total_supply,
                max_supply = excluded.max_supply,
                ath = excluded.ath,
                ath_change_percentage = excluded.ath_change_percentage,
                ath_date = excluded.ath_date,
                atl = excluded.atl,
                atl_change_percentage = excluded.atl_change_percentage,
                atl_date = excluded.atl_date,
                roi = excluded.roi,
                last_updated = excluded.last_updated
            "#,
            params![
                coin.id,
                coin.symbol,
                coin.name,
                coin.image,
                coin.current_price,
                coin.market_cap,
                coin.market_cap_rank,
                coin.fully_diluted_valuation,
                coin.total_volume,
                coin.high_24h,
                coin.low_24h,
                coin.price_change_24h,
                coin.price_change_percentage_24h,
                coin.market_cap_change_24h,
                coin.market_cap_change_percentage_24h,
                coin.circulating_supply,
                coin.total_supply,
                coin.max_supply,
                coin.ath,
                coin.ath_change_percentage,
                coin.ath_date.to_rfc3339(),
                coin.atl,
                coin.atl_change_percentage,
                coin.atl_date.to_rfc3339(),
                roi_json,
                coin.last_updated.to_rfc3339(),
            ],
        )
        .map_err(|e| CoincacheError::Database {
            message: format!("Failed to upsert coin '{}': {}", coin.id, e),
            source: Some(e),
        })?;

        debug!("Upserted snapshot for '{}'", coin.id);

        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<Option<Coin>> {
        let conn = self.lock_conn()?;

        let row: Option<CoinRow> = conn
            .query_row(
                r#"
                SELECT id, symbol, name, image, current_price, market_cap, market_cap_rank,
                       fully_diluted_valuation, total_volume, high_24h, low_24h,
                       price_change_24h, price_change_percentage_24h, market_cap_change_24h,
                       market_cap_change_percentage_24h, circulating_supply, total_supply,
                       max_supply, ath, ath_change_percentage, ath_date, atl,
                       atl_change_percentage, atl_date, roi, last_updated
                FROM coins
                WHERE LOWER(name) = LOWER(?1)
                LIMIT 1
                "#,
                params![name],
                |row| CoinRow::from_row(row),
            )
            .optional()
            .map_err(|e| CoincacheError::Database {
                message: format!("Failed to query coin '{}': {}", name, e),
                source: Some(e),
            })?;

        match row {
            Some(row) => Ok(Some(row.into_coin()?)),
            None => Ok(None),
        }
    }
}
