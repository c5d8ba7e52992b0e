//! Pool Registry (§4.1): holds the current snapshot of all pools keyed by
//! pool id, plus a denom→pool-id adjacency index. `replace` publishes a new
//! immutable snapshot atomically — readers holding a prior `Arc<PoolSet>`
//! keep seeing it, new readers see the new one, and nobody ever observes a
//! torn mix.
//!
//! Grounded on the teacher's `pool/state.rs::PoolStateManager` (a
//! thread-safe, `Arc`-cloneable handle over pool data), generalized from
//! per-key `DashMap` mutation to a single-pointer snapshot swap via
//! [`arc_swap::ArcSwap`] — `DashMap`'s per-entry locking cannot give a
//! torn-free view of the *whole* pool set, which §4.1's invariant requires.

use crate::error::NotFoundError;
use crate::pool::math::PoolMath;
use crate::types::{Denom, PoolId};
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// A pool plus its fixed-for-lifetime denom set, shared by reference.
#[derive(Clone)]
pub struct Pool(pub Arc<dyn PoolMath>);

impl Pool {
    pub fn new(math: Arc<dyn PoolMath>) -> Self {
        Self(math)
    }

    pub fn id(&self) -> PoolId {
        self.0.id()
    }

    pub fn denoms(&self) -> Vec<Denom> {
        self.0.denoms()
    }

    pub fn math(&self) -> &Arc<dyn PoolMath> {
        &self.0
    }
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("id", &self.id())
            .field("type", &self.0.pool_type())
            .finish()
    }
}

/// An immutable, fully-built snapshot of the pool set: pools keyed by id,
/// plus the denom adjacency index. Cheap to share via `Arc`; never mutated
/// in place.
#[derive(Debug, Default)]
pub struct PoolSet {
    pools: HashMap<PoolId, Pool>,
    adjacency: HashMap<Denom, Vec<PoolId>>,
}

impl PoolSet {
    pub fn build(pools: Vec<Pool>) -> Self {
        let mut by_id = HashMap::with_capacity(pools.len());
        let mut adjacency: HashMap<Denom, Vec<PoolId>> = HashMap::new();
        for pool in pools {
            let id = pool.id();
            for denom in pool.denoms() {
                adjacency.entry(denom).or_default().push(id);
            }
            by_id.insert(id, pool);
        }
        Self { pools: by_id, adjacency }
    }

    pub fn get(&self, pool_id: PoolId) -> Option<&Pool> {
        self.pools.get(&pool_id)
    }

    pub fn neighbours(&self, denom: &Denom) -> &[PoolId] {
        self.adjacency.get(denom).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn pool_ids(&self) -> impl Iterator<Item = PoolId> + '_ {
        self.pools.keys().copied()
    }
}

/// Thread-safe pool registry. Cheap to clone — internally an `Arc` around
/// the swap cell.
#[derive(Clone)]
pub struct PoolRegistry {
    inner: Arc<ArcSwap<PoolSet>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(PoolSet::default())),
        }
    }

    pub fn with_pools(pools: Vec<Pool>) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(PoolSet::build(pools))),
        }
    }

    /// Returns the current snapshot. Callers should hold this `Arc` for the
    /// duration of a single quote/price computation so that a concurrent
    /// `replace` never produces a torn view within that computation.
    pub fn snapshot(&self) -> Arc<PoolSet> {
        self.inner.load_full()
    }

    pub fn get(&self, pool_id: PoolId) -> Result<Pool, NotFoundError> {
        self.snapshot()
            .get(pool_id)
            .cloned()
            .ok_or(NotFoundError::PoolNotFound(pool_id))
    }

    pub fn neighbours(&self, denom: &Denom) -> Vec<PoolId> {
        self.snapshot().neighbours(denom).to_vec()
    }

    /// Atomically installs a new snapshot. Either the whole snapshot is
    /// installed or none of it is — there is no partial-replace path.
    pub fn replace(&self, pools: Vec<Pool>) {
        let set = PoolSet::build(pools);
        info!(pool_count = set.len(), "replacing pool registry snapshot");
        self.inner.store(Arc::new(set));
    }
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::math::ConstantProductPool;
    use cosmwasm_std::{Decimal256, Uint128};

    fn cp_pool(id: PoolId, a: &str, b: &str) -> Pool {
        Pool::new(Arc::new(ConstantProductPool::new(
            id,
            a.to_string(),
            b.to_string(),
            Uint128::new(1_000_000),
            Uint128::new(1_000_000),
            Decimal256::permille(3),
            Decimal256::from_ratio(1_000_000u128, 1u128),
        )))
    }

    #[test]
    fn get_unknown_pool_is_not_found() {
        let registry = PoolRegistry::new();
        assert!(matches!(registry.get(999), Err(NotFoundError::PoolNotFound(999))));
    }

    #[test]
    fn replace_installs_new_snapshot_atomically() {
        let registry = PoolRegistry::new();
        registry.replace(vec![cp_pool(1, "a", "b")]);
        assert!(registry.get(1).is_ok());

        let held_snapshot = registry.snapshot();
        registry.replace(vec![cp_pool(2, "c", "d")]);

        // the previously-held snapshot still sees pool 1, not pool 2
        assert!(held_snapshot.get(1).is_some());
        assert!(held_snapshot.get(2).is_none());

        // new readers see only pool 2
        assert!(registry.get(1).is_err());
        assert!(registry.get(2).is_ok());
    }

    #[test]
    fn neighbours_indexes_every_supported_denom() {
        let registry = PoolRegistry::new();
        registry.replace(vec![cp_pool(1, "a", "b"), cp_pool(2, "b", "c")]);
        assert_eq!(registry.neighbours(&"a".to_string()), vec![1]);
        let mut b_neighbours = registry.neighbours(&"b".to_string());
        b_neighbours.sort();
        assert_eq!(b_neighbours, vec![1, 2]);
    }
}
