//! Route Usecase: the orchestrator tying the pool registry, candidate
//! finder, route evaluator, split optimiser, and route cache into the two
//! client-facing quote operations named in §6 (optimal quote and the
//! single-pool-path "custom direct quote").
//!
//! Grounded on the teacher's `arbitrage/detector.rs`, which plays the same
//! role of wiring together pool state, calculator, and cooldown into one
//! request-shaped entry point.

use crate::cache::route_cache::{RankedRoute, RouteCache, RouteCacheHit};
use crate::error::{InputError, NotFoundError, RouterError};
use crate::fees::TakerFeeTable;
use crate::metrics::Metrics;
use crate::pool::math::PoolMath;
use crate::pool::registry::PoolRegistry;
use crate::pricing::engine::{QuoteOptions, QuoteSource};
use crate::route::evaluator::evaluate_route;
use crate::route::finder::{find_routes, FinderOptions};
use crate::route::optimizer::optimise as optimise_split;
use crate::types::{Denom, PoolId, Quote, Route, RouteEvaluation, RouteStep, SplitRoute};
use async_trait::async_trait;
use cosmwasm_std::{Coin, Decimal256};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub max_pools_per_route: usize,
    pub max_routes: usize,
    pub max_split_routes: usize,
    pub max_split_iterations: usize,
    pub min_osmo_liquidity: Decimal256,
    pub preferred_pool_ids: Vec<PoolId>,
    /// Master switch for the route cache; when `false`, every lookup skips
    /// straight to the finder and the cache is never read or written.
    pub route_cache_enabled: bool,
}

pub struct RouterUsecase {
    registry: PoolRegistry,
    fees: TakerFeeTable,
    route_cache: RouteCache,
    config: RouterConfig,
    metrics: Metrics,
}

impl RouterUsecase {
    pub fn new(registry: PoolRegistry, fees: TakerFeeTable, route_cache: RouteCache, config: RouterConfig, metrics: Metrics) -> Self {
        Self { registry, fees, route_cache, config, metrics }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn finder_options(&self, opts: &QuoteOptions) -> FinderOptions {
        FinderOptions {
            max_pools_per_route: opts.max_pools_per_route.min(self.config.max_pools_per_route).max(1),
            max_routes: opts.max_routes.min(self.config.max_routes).max(1),
            min_osmo_liquidity: opts.min_osmo_liquidity.max(self.config.min_osmo_liquidity),
            preferred_pool_ids: self.config.preferred_pool_ids.clone(),
        }
    }

    /// Candidate routes for `(token_in, token_out)`, consulting the route
    /// cache (overwrite → ranked → candidate → finder) and re-evaluating
    /// whatever was found against the current snapshot.
    async fn candidate_routes(&self, token_in: &Denom, token_out: &Denom, opts: &QuoteOptions) -> (Vec<Route>, bool) {
        if !self.config.route_cache_enabled {
            let finder_opts = self.finder_options(opts);
            let snapshot = self.registry.snapshot();
            return (find_routes(&snapshot, token_in, token_out, &finder_opts), false);
        }
        match self.route_cache.lookup(token_in, token_out) {
            RouteCacheHit::Overwrite(routes) => (routes, false),
            RouteCacheHit::Ranked(ranked) => (ranked.into_iter().map(|r| r.route).collect(), false),
            RouteCacheHit::Candidate(routes) => (routes, true),
            RouteCacheHit::Miss => {
                let finder_opts = self.finder_options(opts);
                let snapshot = self.registry.snapshot();
                let routes = self
                    .route_cache
                    .get_or_build_candidates(token_in, token_out, || async move { find_routes(&snapshot, token_in, token_out, &finder_opts) })
                    .await;
                (routes, true)
            }
        }
    }

    async fn evaluate_candidates(&self, candidates: &[Route], input: &Coin) -> Vec<RouteEvaluation> {
        let snapshot = self.registry.snapshot();
        let mut evaluations = Vec::with_capacity(candidates.len());
        for route in candidates {
            match evaluate_route(&snapshot, route, input).await {
                Ok(eval) => evaluations.push(eval),
                Err(err) => debug!(?err, "route evaluation disqualified"),
            }
        }
        evaluations
    }

    /// Ranking score for a candidate route's evaluation: its realized
    /// amount-out discounted by the taker fee configured for each hop's
    /// denom pair, consulting the fee table independently of whatever
    /// default each pool's own math already reported (an override the
    /// ingest collaborator may push without republishing the pool set).
    fn route_score(&self, eval: &RouteEvaluation) -> Decimal256 {
        let fee_multiplier = Decimal256::one() - self.route_taker_fee(&eval.route).min(Decimal256::one());
        Decimal256::from_ratio(eval.amount_out.amount, 1u128) * fee_multiplier
    }

    fn route_taker_fee(&self, route: &Route) -> Decimal256 {
        let mut current_denom = route.token_in_denom.clone();
        let mut total = Decimal256::zero();
        for step in &route.steps {
            total += self.fees.get_or(&current_denom, &step.token_out_denom, Decimal256::zero());
            current_denom = step.token_out_denom.clone();
        }
        total
    }

    /// Core quote computation shared by the public `quote` method and the
    /// [`QuoteSource`] impl used by the pricing engine.
    async fn quote_internal(&self, token_in: Coin, token_out_denom: Denom, opts: QuoteOptions) -> Result<(Quote, Vec<RouteEvaluation>), RouterError> {
        if token_in.denom == token_out_denom {
            return Err(RouterError::Input(InputError::SameDenom));
        }

        let (candidates, needs_ranking) = self.candidate_routes(&token_in.denom, &token_out_denom, &opts).await;
        if candidates.is_empty() {
            return Err(RouterError::NotFound(NotFoundError::NoRoute {
                token_in: token_in.denom.clone(),
                token_out: token_out_denom.clone(),
            }));
        }

        let mut evaluations = self.evaluate_candidates(&candidates, &token_in).await;
        if evaluations.is_empty() {
            return Err(RouterError::RoutingFailure { attempted: candidates.len() });
        }
        evaluations.sort_by(|a, b| b.amount_out.amount.cmp(&a.amount_out.amount));

        if needs_ranking {
            let ranked = evaluations.iter().map(|e| RankedRoute { route: e.route.clone(), score: self.route_score(e) }).collect();
            self.route_cache.set_ranked(&token_in.denom, &token_out_denom, ranked);
        }

        let best_single = evaluations[0].clone();

        let final_evaluations = if opts.max_split_routes > 0 {
            let snapshot = self.registry.snapshot();
            let splittable: Vec<Route> = evaluations
                .iter()
                .filter(|e| !e.route.contains_generalised_cw_pool)
                .map(|e| e.route.clone())
                .collect();
            let split = optimise_split(&snapshot, &token_in, &splittable, opts.max_split_routes, self.config.max_split_iterations)
                .await
                .map_err(|err| RouterError::Internal(crate::error::InternalError::InvariantViolated(err.to_string())))?;

            match split {
                Some(split_routes) => {
                    let split_total: u128 = split_routes.iter().map(|s| s.amount_out.amount.u128()).sum();
                    if split_total > best_single.amount_out.amount.u128() {
                        split_routes_to_evaluations(&snapshot, split_routes, &evaluations).await
                    } else {
                        vec![best_single]
                    }
                }
                None => vec![best_single],
            }
        } else {
            vec![best_single]
        };

        let quote = build_quote(&token_in, &final_evaluations);
        Ok((quote, final_evaluations))
    }

    pub async fn quote(&self, token_in: Coin, token_out_denom: Denom, opts: QuoteOptions) -> Result<Quote, RouterError> {
        self.quote_internal(token_in, token_out_denom, opts).await.map(|(q, _)| q)
    }

    pub async fn quote_with_deadline(&self, token_in: Coin, token_out_denom: Denom, opts: QuoteOptions, deadline: std::time::Duration) -> Result<Quote, RouterError> {
        match tokio::time::timeout(deadline, self.quote(token_in, token_out_denom, opts)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(deadline_ms = deadline.as_millis() as u64, "quote computation exceeded deadline");
                Err(RouterError::Timeout(crate::error::TimeoutError::DeadlineExceeded { deadline_ms: deadline.as_millis() as u64 }))
            }
        }
    }

    /// Forces a quote through an explicit pool path, skipping route search
    /// entirely.
    pub async fn custom_direct_quote(&self, token_in: Coin, token_out_denom: Denom, pool_ids: Vec<PoolId>) -> Result<Quote, RouterError> {
        if pool_ids.is_empty() {
            return Err(RouterError::Input(InputError::MalformedAmount("pool path must not be empty".to_string())));
        }
        let snapshot = self.registry.snapshot();
        let mut steps = Vec::with_capacity(pool_ids.len());
        let mut current_denom = token_in.denom.clone();
        for (i, pool_id) in pool_ids.iter().enumerate() {
            let pool = snapshot.get(*pool_id).ok_or(NotFoundError::PoolNotFound(*pool_id))?;
            let is_last = i == pool_ids.len() - 1;
            let next_denom = if is_last {
                token_out_denom.clone()
            } else {
                pool.denoms()
                    .into_iter()
                    .find(|d| *d != current_denom)
                    .ok_or_else(|| InputError::IncompatiblePool(*pool_id))?
            };
            if !pool.denoms().contains(&current_denom) {
                return Err(RouterError::Input(InputError::IncompatiblePool(*pool_id)));
            }
            steps.push(RouteStep { pool_id: *pool_id, token_out_denom: next_denom.clone() });
            current_denom = next_denom;
        }

        let contains_generalised_cw_pool = pool_ids.iter().any(|id| {
            snapshot.get(*id).map(|p| p.math().pool_type().is_generalised_cosmwasm()).unwrap_or(false)
        });
        let route = Route { token_in_denom: token_in.denom.clone(), steps, contains_generalised_cw_pool };

        let eval = evaluate_route(&snapshot, &route, &token_in)
            .await
            .map_err(|err| RouterError::Internal(crate::error::InternalError::InvariantViolated(err.to_string())))?;

        Ok(build_quote(&token_in, &[eval]))
    }

    pub fn fees(&self) -> &TakerFeeTable {
        &self.fees
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }
}

#[async_trait]
impl QuoteSource for RouterUsecase {
    async fn quote(&self, token_in: Coin, token_out_denom: Denom, opts: QuoteOptions) -> Result<(Quote, Vec<RouteEvaluation>), RouterError> {
        self.quote_internal(token_in, token_out_denom, opts).await
    }
}

/// Re-evaluates the optimiser's chosen split so downstream callers get a
/// fully-populated [`RouteEvaluation`] per split leg, not just the stripped
/// [`SplitRoute`] view.
async fn split_routes_to_evaluations(
    snapshot: &crate::pool::registry::PoolSet,
    split_routes: Vec<SplitRoute>,
    fallback: &[RouteEvaluation],
) -> Vec<RouteEvaluation> {
    let mut out = Vec::with_capacity(split_routes.len());
    for split in split_routes {
        match evaluate_route(snapshot, &split.route, &split.amount_in).await {
            Ok(eval) => out.push(eval),
            Err(_) => {
                if let Some(existing) = fallback.iter().find(|e| e.route == split.route) {
                    out.push(existing.clone());
                }
            }
        }
    }
    out
}

fn weighted_mean(items: &[(Decimal256, Decimal256)]) -> Decimal256 {
    let total_weight: Decimal256 = items.iter().map(|(_, w)| *w).fold(Decimal256::zero(), |a, b| a + b);
    if total_weight.is_zero() {
        return Decimal256::zero();
    }
    let weighted_sum: Decimal256 = items.iter().map(|(v, w)| *v * *w).fold(Decimal256::zero(), |a, b| a + b);
    weighted_sum / total_weight
}

fn route_spread_factor(eval: &RouteEvaluation) -> Decimal256 {
    if eval.pre_swap_spot_price.is_zero() || eval.amount_in.amount.is_zero() {
        return Decimal256::zero();
    }
    let effective_price = Decimal256::from_ratio(eval.amount_out.amount, eval.amount_in.amount);
    let ratio = effective_price / eval.pre_swap_spot_price;
    if ratio >= Decimal256::one() {
        Decimal256::zero()
    } else {
        Decimal256::one() - ratio
    }
}

fn build_quote(original_input: &Coin, evaluations: &[RouteEvaluation]) -> Quote {
    let total_in: u128 = evaluations.iter().map(|e| e.amount_in.amount.u128()).sum();
    let total_out: u128 = evaluations.iter().map(|e| e.amount_out.amount.u128()).sum();

    let weights: Vec<(Decimal256, Decimal256)> = evaluations
        .iter()
        .map(|e| (e.pre_swap_spot_price, Decimal256::from_ratio(e.amount_in.amount, 1u128)))
        .collect();
    let aggregate_pre_swap_price = weighted_mean(&weights);

    let spread_weights: Vec<(Decimal256, Decimal256)> = evaluations
        .iter()
        .map(|e| (route_spread_factor(e), Decimal256::from_ratio(e.amount_in.amount, 1u128)))
        .collect();
    let effective_spread_factor = weighted_mean(&spread_weights);

    let price_impact = if total_in == 0 || aggregate_pre_swap_price.is_zero() {
        Decimal256::zero()
    } else {
        let effective_price = Decimal256::from_ratio(cosmwasm_std::Uint128::new(total_out), cosmwasm_std::Uint128::new(total_in));
        let ratio = effective_price / aggregate_pre_swap_price;
        if ratio >= Decimal256::one() {
            Decimal256::zero()
        } else {
            Decimal256::one() - ratio
        }
    };

    let route = evaluations
        .iter()
        .map(|e| SplitRoute {
            route: e.route.clone(),
            amount_in: e.amount_in.clone(),
            amount_out: e.amount_out.clone(),
            result_pools: e.result_pools.clone(),
        })
        .collect();

    Quote {
        amount_in: original_input.clone(),
        amount_out: Coin { denom: evaluations.first().map(|e| e.amount_out.denom.clone()).unwrap_or_default(), amount: cosmwasm_std::Uint128::new(total_out) },
        route,
        effective_spread_factor,
        price_impact,
    }
}
