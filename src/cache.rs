//! Time-bounded memoization of fetched subscription bodies.
//!
//! One instance is constructed per generation run and threaded through
//! every decoder call, so the same subscription referenced by several
//! node-list entries is fetched exactly once per TTL window. Supports
//! concurrent `has`/`get`/`set`; races resolve last-writer-wins.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CacheEntry {
    value: String,
    stored_at: Instant,
}

/// TTL-bounded key/value cache. One fixed max-age for all entries.
pub struct ConfigCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ConfigCache {
    pub fn new(ttl: Duration) -> Self {
        ConfigCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the cached value unless it has outlived the TTL. Expired
    /// entries are evicted on access.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                stored_at: Instant::now(),
            },
        );
    }
}
