//! Route Cache (§4.5): candidate tier, ranked tier, and an optional
//! overwrite tier, all keyed by (token-in denom, token-out denom).
//!
//! Lookup order is overwrite → ranked → candidate → finder; a ranked hit
//! still gets re-evaluated against the current pool snapshot for the actual
//! input (that re-evaluation happens in [`crate::route`], not here — this
//! module only owns the three tiers and the single-flight guard around
//! candidate-route construction).

use crate::cache::singleflight::SingleFlight;
use crate::cache::ttl::TtlCache;
use crate::metrics::{Metrics, RouteCacheTier};
use crate::types::{Denom, Route};
use cosmwasm_std::Decimal256;
use std::time::Duration;

pub type PairKey = (Denom, Denom);

/// A candidate route plus the score it earned at a reference input amount.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRoute {
    pub route: Route,
    pub score: Decimal256,
}

#[derive(Debug, Clone)]
pub enum RouteCacheHit {
    Overwrite(Vec<Route>),
    Ranked(Vec<RankedRoute>),
    Candidate(Vec<Route>),
    Miss,
}

#[derive(Debug, Clone)]
pub struct RouteCache {
    candidate: TtlCache<PairKey, Vec<Route>>,
    ranked: TtlCache<PairKey, Vec<RankedRoute>>,
    overwrite: TtlCache<PairKey, Vec<Route>>,
    pub single_flight: SingleFlight<PairKey>,
    overwrite_enabled: bool,
    candidate_ttl: Duration,
    ranked_ttl: Duration,
    metrics: Metrics,
}

impl RouteCache {
    pub fn new(candidate_ttl: Duration, ranked_ttl: Duration, overwrite_enabled: bool, metrics: Metrics) -> Self {
        Self {
            candidate: TtlCache::new(),
            ranked: TtlCache::new(),
            overwrite: TtlCache::new(),
            single_flight: SingleFlight::new(),
            overwrite_enabled,
            candidate_ttl,
            ranked_ttl,
            metrics,
        }
    }

    fn key(token_in: &Denom, token_out: &Denom) -> PairKey {
        (token_in.clone(), token_out.clone())
    }

    pub fn lookup(&self, token_in: &Denom, token_out: &Denom) -> RouteCacheHit {
        let key = Self::key(token_in, token_out);
        if self.overwrite_enabled {
            if let Some(routes) = self.overwrite.get(&key) {
                self.metrics.record_route_cache_hit(token_in, token_out, RouteCacheTier::Overwrite);
                return RouteCacheHit::Overwrite(routes);
            }
        }
        if let Some(ranked) = self.ranked.get(&key) {
            self.metrics.record_route_cache_hit(token_in, token_out, RouteCacheTier::Ranked);
            return RouteCacheHit::Ranked(ranked);
        }
        if let Some(candidates) = self.candidate.get(&key) {
            self.metrics.record_route_cache_hit(token_in, token_out, RouteCacheTier::Candidate);
            return RouteCacheHit::Candidate(candidates);
        }
        self.metrics.record_route_cache_miss(token_in, token_out);
        RouteCacheHit::Miss
    }

    pub fn set_candidate(&self, token_in: &Denom, token_out: &Denom, routes: Vec<Route>) {
        self.candidate.set(Self::key(token_in, token_out), routes, self.candidate_ttl);
    }

    pub fn set_ranked(&self, token_in: &Denom, token_out: &Denom, ranked: Vec<RankedRoute>) {
        self.ranked.set(Self::key(token_in, token_out), ranked, self.ranked_ttl);
    }

    pub fn set_overwrite(&self, token_in: &Denom, token_out: &Denom, routes: Vec<Route>) {
        self.overwrite.set_no_expiry(Self::key(token_in, token_out), routes);
    }

    pub fn clear_overwrite(&self, token_in: &Denom, token_out: &Denom) {
        self.overwrite.delete(&Self::key(token_in, token_out));
    }

    /// Builds the candidate tier for `(token_in, token_out)` with at-most-one
    /// finder execution in flight, returning whatever any racing caller's
    /// build produced.
    pub async fn get_or_build_candidates<F, Fut>(&self, token_in: &Denom, token_out: &Denom, build: F) -> Vec<Route>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Vec<Route>>,
    {
        let key = Self::key(token_in, token_out);
        let candidate = self.candidate.clone();
        let lookup_key = key.clone();
        self.single_flight
            .run(
                key.clone(),
                move || candidate.get(&lookup_key),
                move || async move {
                    let routes = build().await;
                    self.candidate.set(key, routes.clone(), self.candidate_ttl);
                    routes
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RouteStep;

    fn route(pool_id: u64) -> Route {
        Route {
            token_in_denom: "a".to_string(),
            steps: vec![RouteStep { pool_id, token_out_denom: "b".to_string() }],
            contains_generalised_cw_pool: false,
        }
    }

    #[test]
    fn overwrite_takes_priority_over_ranked_and_candidate() {
        let cache = RouteCache::new(Duration::from_secs(5), Duration::from_secs(30), true, Metrics::new());
        cache.set_candidate(&"a".to_string(), &"b".to_string(), vec![route(1)]);
        cache.set_ranked(&"a".to_string(), &"b".to_string(), vec![RankedRoute { route: route(1), score: Decimal256::one() }]);
        cache.set_overwrite(&"a".to_string(), &"b".to_string(), vec![route(99)]);
        match cache.lookup(&"a".to_string(), &"b".to_string()) {
            RouteCacheHit::Overwrite(routes) => assert_eq!(routes, vec![route(99)]),
            other => panic!("expected overwrite hit, got {other:?}"),
        }
    }

    #[test]
    fn ranked_beats_candidate_when_no_overwrite() {
        let cache = RouteCache::new(Duration::from_secs(5), Duration::from_secs(30), true, Metrics::new());
        cache.set_candidate(&"a".to_string(), &"b".to_string(), vec![route(1)]);
        cache.set_ranked(&"a".to_string(), &"b".to_string(), vec![RankedRoute { route: route(2), score: Decimal256::one() }]);
        match cache.lookup(&"a".to_string(), &"b".to_string()) {
            RouteCacheHit::Ranked(ranked) => assert_eq!(ranked[0].route, route(2)),
            other => panic!("expected ranked hit, got {other:?}"),
        }
    }

    #[test]
    fn miss_when_nothing_cached() {
        let cache = RouteCache::new(Duration::from_secs(5), Duration::from_secs(30), true, Metrics::new());
        assert!(matches!(cache.lookup(&"x".to_string(), &"y".to_string()), RouteCacheHit::Miss));
    }

    #[tokio::test]
    async fn get_or_build_candidates_populates_the_candidate_tier() {
        let cache = RouteCache::new(Duration::from_secs(5), Duration::from_secs(30), false, Metrics::new());
        let routes = cache
            .get_or_build_candidates(&"a".to_string(), &"b".to_string(), || async { vec![route(1)] })
            .await;
        assert_eq!(routes, vec![route(1)]);
        match cache.lookup(&"a".to_string(), &"b".to_string()) {
            RouteCacheHit::Candidate(routes) => assert_eq!(routes, vec![route(1)]),
            other => panic!("expected candidate hit, got {other:?}"),
        }
    }

    #[test]
    fn lookup_records_hit_and_miss_metrics_per_tier() {
        let metrics = Metrics::new();
        let cache = RouteCache::new(Duration::from_secs(5), Duration::from_secs(30), false, metrics.clone());
        let a = "a".to_string();
        let b = "b".to_string();

        cache.lookup(&a, &b);
        assert_eq!(metrics.route_cache_misses(&a, &b), 1);

        cache.set_candidate(&a, &b, vec![route(1)]);
        cache.lookup(&a, &b);
        assert_eq!(metrics.route_cache_hits(&a, &b), 1);
    }
}
