//! Metrics registry: per-(base,quote) monotonic counters for cache hit/miss,
//! price truncation, spot-price errors, and route-cache hit/miss per tier.
//!
//! Grounded on `pool/state.rs`'s `DashMap`-backed concurrent state, reused
//! here as a counter table rather than a pool table. Exporting these
//! counters to Prometheus/etc. is the metrics-registration collaborator's
//! job (out of scope per §1) — this registry only accumulates them.

use crate::types::Denom;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

type PairKey = (Denom, Denom);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteCacheTier {
    Overwrite,
    Ranked,
    Candidate,
}

#[derive(Debug, Default)]
struct PairCounters {
    price_cache_hits: AtomicU64,
    price_cache_misses: AtomicU64,
    price_truncations: AtomicU64,
    spot_price_errors: AtomicU64,
    route_cache_hits: AtomicU64,
    route_cache_misses: AtomicU64,
}

#[derive(Debug, Clone, Default)]
pub struct Metrics {
    counters: Arc<DashMap<PairKey, PairCounters>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, base: &Denom, quote: &Denom) -> dashmap::mapref::one::RefMut<'_, PairKey, PairCounters> {
        self.counters.entry((base.clone(), quote.clone())).or_default()
    }

    pub fn record_price_cache_hit(&self, base: &Denom, quote: &Denom) {
        self.entry(base, quote).price_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_price_cache_miss(&self, base: &Denom, quote: &Denom) {
        self.entry(base, quote).price_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_price_truncation(&self, base: &Denom, quote: &Denom) {
        self.entry(base, quote).price_truncations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_spot_price_error(&self, base: &Denom, quote: &Denom) {
        self.entry(base, quote).spot_price_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_route_cache_hit(&self, token_in: &Denom, token_out: &Denom, _tier: RouteCacheTier) {
        self.entry(token_in, token_out).route_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_route_cache_miss(&self, token_in: &Denom, token_out: &Denom) {
        self.entry(token_in, token_out).route_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn price_cache_hits(&self, base: &Denom, quote: &Denom) -> u64 {
        self.counters
            .get(&(base.clone(), quote.clone()))
            .map(|c| c.price_cache_hits.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn price_truncations(&self, base: &Denom, quote: &Denom) -> u64 {
        self.counters
            .get(&(base.clone(), quote.clone()))
            .map(|c| c.price_truncations.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn spot_price_errors(&self, base: &Denom, quote: &Denom) -> u64 {
        self.counters
            .get(&(base.clone(), quote.clone()))
            .map(|c| c.spot_price_errors.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn route_cache_hits(&self, token_in: &Denom, token_out: &Denom) -> u64 {
        self.counters
            .get(&(token_in.clone(), token_out.clone()))
            .map(|c| c.route_cache_hits.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn route_cache_misses(&self, token_in: &Denom, token_out: &Denom) -> u64 {
        self.counters
            .get(&(token_in.clone(), token_out.clone()))
            .map(|c| c.route_cache_misses.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}
