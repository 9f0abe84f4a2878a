//! Durable snapshot storage.
//!
//! The coordinator only ever talks to the [`QuoteStore`] trait; the SQLite
//! implementation lives in [`sqlite`]. All operations are synchronous to
//! match rusqlite's API.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::models::Coin;

/// Durable key→snapshot storage consumed by the refresh coordinator.
pub trait QuoteStore: Send + Sync {
    /// Insert or overwrite the snapshot for a coin, keyed by canonical id.
    fn upsert(&self, coin: &Coin) -> Result<()>;

    /// Point lookup by coin name, case-insensitive.
    ///
    /// Returns `None` when nothing is persisted for the name; errors are
    /// reserved for storage failures.
    fn lookup(&self, name: &str) -> Result<Option<Coin>>;
}
