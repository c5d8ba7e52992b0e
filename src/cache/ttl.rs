//! Generic TTL cache substrate (§4.7): `get`/`set`/`delete` over a
//! [`DashMap`], with lazy expiry — a key past its TTL is treated as absent
//! at read time rather than proactively swept.
//!
//! Grounded on `arbitrage/cooldown.rs::RouteCooldown`, whose
//! `is_cooled_down` computes `expires_at` and compares against the current
//! block on every read instead of running a background sweep. Generalized
//! from a single cooldown table to an arbitrary `K -> V` cache and from
//! block-number expiry to wall-clock [`Expiry`].

use crate::types::{CacheEntry, Expiry};
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

/// Thread-safe, lazily-expiring cache. Cheap to clone (shares the backing
/// map via `Arc`).
pub struct TtlCache<K, V> {
    entries: Arc<DashMap<K, CacheEntry<V>>>,
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").finish_non_exhaustive()
    }
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self { entries: self.entries.clone() }
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self { entries: Arc::new(DashMap::new()) }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Returns the value if present and not expired. An expired entry is
    /// removed on the read that discovers it.
    pub fn get(&self, key: &K) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.expiry.is_expired(),
            None => return None,
        };
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn set(&self, key: K, value: V, ttl: Duration) {
        self.entries.insert(key, CacheEntry::new(value, Expiry::after(ttl)));
    }

    /// Inserts a value that never expires until explicitly overwritten or
    /// deleted.
    pub fn set_no_expiry(&self, key: K, value: V) {
        self.entries.insert(key, CacheEntry::new(value, Expiry::Never));
    }

    pub fn delete(&self, key: &K) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let cache: TtlCache<String, u64> = TtlCache::new();
        cache.set("a".to_string(), 42, Duration::from_secs(60));
        assert_eq!(cache.get(&"a".to_string()), Some(42));
    }

    #[test]
    fn expired_entry_reads_as_absent() {
        let cache: TtlCache<String, u64> = TtlCache::new();
        cache.set("a".to_string(), 42, Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get(&"a".to_string()), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn no_expiry_entry_survives() {
        let cache: TtlCache<String, u64> = TtlCache::new();
        cache.set_no_expiry("a".to_string(), 1);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get(&"a".to_string()), Some(1));
    }

    #[test]
    fn delete_removes_entry() {
        let cache: TtlCache<String, u64> = TtlCache::new();
        cache.set("a".to_string(), 1, Duration::from_secs(60));
        cache.delete(&"a".to_string());
        assert_eq!(cache.get(&"a".to_string()), None);
    }

    #[test]
    fn overwrite_replaces_value_and_expiry() {
        let cache: TtlCache<String, u64> = TtlCache::new();
        cache.set("a".to_string(), 1, Duration::from_millis(0));
        cache.set_no_expiry("a".to_string(), 2);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get(&"a".to_string()), Some(2));
    }
}
