//! Per-key lock registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Grow-only table of per-key exclusive locks.
///
/// Each cache key gets exactly one `tokio::sync::Mutex`, created on first
/// request and kept for the process lifetime. Handles are never removed;
/// removal would race get-or-create, and key cardinality is bounded by the
/// coin universe.
pub struct KeyLocks {
    table: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(HashMap::new()),
        }
    }

    /// Get the lock handle for a key, creating it if absent.
    ///
    /// Only the table guard is held here, never the returned handle, so this
    /// returns immediately even while another task holds the key's lock.
    pub fn lock_for(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut table = self.table.lock().expect("lock table poisoned");
        table
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Number of keys that have been locked at least once.
    pub fn len(&self) -> usize {
        self.table.lock().expect("lock table poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for KeyLocks {
    fn default() -> Self {
        Self::new()
    }
}
