//! At-most-one-in-flight primitive (§5's "at-most-one rule"): concurrent
//! callers racing to build the same cache entry collapse into a single
//! execution of the builder; the rest await its result.
//!
//! No new dependency needed — built directly from the teacher's existing
//! `dashmap` + `tokio` pair: a [`DashMap`] of per-key [`tokio::sync::Mutex`]
//! guards. The guard is held only for the duration of the builder; the
//! DashMap entry is retained (not removed after use) so repeat callers on a
//! hot key keep reusing the same lock rather than racing to recreate it.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct SingleFlight<K> {
    locks: Arc<DashMap<K, Arc<Mutex<()>>>>,
}

impl<K> std::fmt::Debug for SingleFlight<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight").finish_non_exhaustive()
    }
}

impl<K> Clone for SingleFlight<K> {
    fn clone(&self) -> Self {
        Self { locks: self.locks.clone() }
    }
}

impl<K> Default for SingleFlight<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> SingleFlight<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self { locks: Arc::new(DashMap::new()) }
    }
}

impl<K> SingleFlight<K>
where
    K: Eq + Hash + Clone,
{
    /// Runs `check` under the per-key lock first — a caller that loses the
    /// race to an already-completed build sees `check` succeed and never
    /// invokes `build` at all. Only on a genuine miss does it run `build`.
    pub async fn run<T, F, Fut, C>(&self, key: K, mut check: C, build: F) -> T
    where
        C: FnMut() -> Option<T>,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let lock = self
            .locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;
        if let Some(cached) = check() {
            return cached;
        }
        build().await
    }
}
