//! Staleness bookkeeping for refreshed keys.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Tracks the instant of the last successful refresh per key.
///
/// A key with no entry is infinitely stale. Entries are written only after a
/// fetch and persist have both succeeded, so a failed refresh leaves the
/// previous timestamp (or absence) in place and the next request retries.
pub struct FreshnessTracker {
    state: Mutex<HashMap<String, Instant>>,
}

impl FreshnessTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Whether the key needs a refresh. Pure query, no side effect.
    pub fn is_stale(&self, key: &str, ttl: Duration, now: Instant) -> bool {
        let state = self.state.lock().expect("freshness state poisoned");
        match state.get(key) {
            Some(&last_refresh) => now.duration_since(last_refresh) > ttl,
            None => true,
        }
    }

    /// Record `now` as the last successful refresh instant for `key`.
    pub fn mark_refreshed(&self, key: &str, now: Instant) {
        let mut state = self.state.lock().expect("freshness state poisoned");
        state.insert(key.to_string(), now);
    }
}

impl Default for FreshnessTracker {
    fn default() -> Self {
        Self::new()
    }
}
