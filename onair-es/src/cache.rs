//! Short-TTL read-only cache
//!
//! Exactness of cached reads is not safety-critical (like counts, the
//! leaderboard); write-path decisions never consult a cache. Entries expire
//! after the configured TTL and are refreshed by the next read-through.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Map with per-entry expiry. Interior mutability behind a std Mutex; all
/// operations are brief and non-async.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (V, Instant)>>,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Unexpired value for `key`, if any
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let (value, stored_at) = entries.get(key)?;
        if stored_at.elapsed() < self.ttl {
            Some(value.clone())
        } else {
            None
        }
    }

    /// Store a freshly read value
    pub fn put(&self, key: K, value: V) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        // Opportunistic cleanup keeps the map from accumulating dead keys
        let ttl = self.ttl;
        entries.retain(|_, (_, stored_at)| stored_at.elapsed() < ttl);
        entries.insert(key, (value, Instant::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put("k", 42);
        assert_eq!(cache.get(&"k"), Some(42));
    }

    #[test]
    fn test_expired_entry_is_none() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.put("k", 42);
        assert_eq!(cache.get(&"k"), None);
    }

    #[test]
    fn test_missing_key() {
        let cache: TtlCache<&str, i64> = TtlCache::new(Duration::from_secs(60));
        assert_eq!(cache.get(&"absent"), None);
    }
}
