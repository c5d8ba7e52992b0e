//! Taker-Fee Table: ordered-denom-pair → fee, consulted during route
//! scoring independently of whatever default fee a pool's own math reports.
//!
//! Grounded on the teacher's `pool/state.rs::PoolStateManager`, which keeps
//! auxiliary per-pair data in a [`DashMap`] alongside the pool set itself —
//! the same concurrent-map idiom, here keyed by an ordered denom pair
//! instead of a pool address.

use crate::types::Denom;
use cosmwasm_std::Decimal256;
use dashmap::DashMap;

/// Key is always ordered lexicographically so `(a, b)` and `(b, a)` hit the
/// same entry; callers never need to know which side is "base".
fn ordered_pair(a: &Denom, b: &Denom) -> (Denom, Denom) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// Concurrent, replaceable taker-fee table. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct TakerFeeTable {
    fees: std::sync::Arc<DashMap<(Denom, Denom), Decimal256>>,
}

impl TakerFeeTable {
    pub fn new() -> Self {
        Self { fees: std::sync::Arc::new(DashMap::new()) }
    }

    /// Looks up the configured fee for a pair, falling back to `default` if
    /// no entry exists (e.g. a newly-listed denom pair).
    pub fn get_or(&self, a: &Denom, b: &Denom, default: Decimal256) -> Decimal256 {
        self.fees.get(&ordered_pair(a, b)).map(|f| *f).unwrap_or(default)
    }

    pub fn set(&self, a: &Denom, b: &Denom, fee: Decimal256) {
        self.fees.insert(ordered_pair(a, b), fee);
    }

    /// Wholesale replace, used by the ingest collaborator's `set_taker_fees`.
    pub fn replace(&self, entries: impl IntoIterator<Item = (Denom, Denom, Decimal256)>) {
        self.fees.clear();
        for (a, b, fee) in entries {
            self.fees.insert(ordered_pair(&a, &b), fee);
        }
    }

    pub fn len(&self) -> usize {
        self.fees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_order_independent() {
        let table = TakerFeeTable::new();
        table.set(&"a".to_string(), &"b".to_string(), Decimal256::permille(3));
        assert_eq!(
            table.get_or(&"b".to_string(), &"a".to_string(), Decimal256::zero()),
            Decimal256::permille(3)
        );
    }

    #[test]
    fn missing_pair_falls_back_to_default() {
        let table = TakerFeeTable::new();
        assert_eq!(
            table.get_or(&"x".to_string(), &"y".to_string(), Decimal256::percent(1)),
            Decimal256::percent(1)
        );
    }

    #[test]
    fn replace_clears_prior_entries() {
        let table = TakerFeeTable::new();
        table.set(&"a".to_string(), &"b".to_string(), Decimal256::permille(3));
        table.replace(vec![("c".to_string(), "d".to_string(), Decimal256::permille(5))]);
        assert_eq!(table.get_or(&"a".to_string(), &"b".to_string(), Decimal256::zero()), Decimal256::zero());
        assert_eq!(table.get_or(&"c".to_string(), &"d".to_string(), Decimal256::zero()), Decimal256::permille(5));
    }
}
