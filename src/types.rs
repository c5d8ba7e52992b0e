//! Core data model shared by every component: denoms, coins, pools, routes,
//! quotes, and the generic cache entry.
//!
//! Author: AI-Generated
//! Created: 2026-01-27

use cosmwasm_std::{Coin, Decimal256};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Opaque token identifier. Two denoms are the same token iff they compare
/// equal as strings — no normalization is performed by this crate.
pub type Denom = String;

/// 64-bit pool identifier, unique for the lifetime of the pool in the
/// registry.
pub type PoolId = u64;

/// Discriminates the underlying AMM math a pool uses. The last variant is
/// the only one whose `swap`/`spot_price` may suspend on I/O (see
/// [`crate::pool::math::PoolMath`]); the optimiser inspects this tag exactly
/// once to set [`Route::contains_generalised_cw_pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolType {
    ConstantProduct,
    Stable,
    Concentrated,
    Transmuter,
    GeneralisedCosmWasm,
}

impl PoolType {
    pub fn is_generalised_cosmwasm(&self) -> bool {
        matches!(self, PoolType::GeneralisedCosmWasm)
    }
}

impl std::fmt::Display for PoolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PoolType::ConstantProduct => "ConstantProduct",
            PoolType::Stable => "Stable",
            PoolType::Concentrated => "Concentrated",
            PoolType::Transmuter => "Transmuter",
            PoolType::GeneralisedCosmWasm => "GeneralisedCosmWasm",
        };
        write!(f, "{s}")
    }
}

/// One step of a route: swap through `pool_id`, landing on `token_out_denom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStep {
    pub pool_id: PoolId,
    pub token_out_denom: Denom,
}

/// An ordered sequence of pool hops from an input denom to an output denom.
///
/// Invariant: consecutive steps share a denom, the first step consumes the
/// route's input denom, and the last step emits the route's output denom.
/// A pool never appears twice in the same route (cycles are prevented by
/// forbidding pool reuse, not denom reuse).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub token_in_denom: Denom,
    pub steps: Vec<RouteStep>,
    /// True if any pool on this route has [`PoolType::GeneralisedCosmWasm`].
    /// Such routes are excluded from split optimisation (see §4.4).
    pub contains_generalised_cw_pool: bool,
}

impl Route {
    pub fn token_out_denom(&self) -> Option<&Denom> {
        self.steps.last().map(|s| &s.token_out_denom)
    }

    pub fn pool_ids(&self) -> impl Iterator<Item = PoolId> + '_ {
        self.steps.iter().map(|s| s.pool_id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Stripped, client-safe view of a pool visited by a route: no internal
/// pool-math state, just what an external caller needs to see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPool {
    pub pool_id: PoolId,
    pub pool_type: PoolType,
    pub taker_fee: Decimal256,
    pub token_in_denom: Denom,
    pub token_out_denom: Denom,
}

/// A [`Route`] plus the (amount-in, amount-out) share of a larger quote it
/// was allocated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitRoute {
    pub route: Route,
    pub amount_in: Coin,
    pub amount_out: Coin,
    pub result_pools: Vec<ResultPool>,
}

/// The outcome of routing a single input coin to a requested output denom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub amount_in: Coin,
    pub amount_out: Coin,
    pub route: Vec<SplitRoute>,
    /// Liquidity-weighted mean of per-route spread factors.
    pub effective_spread_factor: Decimal256,
    /// `1 - effective_price / pre_swap_price`.
    pub price_impact: Decimal256,
}

/// A route evaluated against a concrete input coin: the full intermediate
/// result the evaluator computes, a superset of what ends up in a
/// [`SplitRoute`] or is consumed by the pricing engine's multiplicative walk.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEvaluation {
    pub route: Route,
    pub amount_in: Coin,
    pub amount_out: Coin,
    /// Product of per-step pre-swap spot prices.
    pub pre_swap_spot_price: Decimal256,
    /// Product of per-step effective spot prices (`amount_in / amount_out`
    /// per step, rescaled).
    pub effective_spot_price: Decimal256,
    pub result_pools: Vec<ResultPool>,
    /// Per-step pre-swap spot price, in step order. Used by the pricing
    /// engine's multiplicative path, which needs each factor individually
    /// rather than just the product.
    pub per_step_pre_swap_spot_prices: Vec<Decimal256>,
}

/// Expiry policy for a [`CacheEntry`]. `Never` entries are retained until
/// explicitly overwritten or evicted (used for the default quote denom's
/// price cache entries, and for the route cache's overwrite tier).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    At(Instant),
    Never,
}

impl Expiry {
    pub fn after(ttl: std::time::Duration) -> Self {
        Expiry::At(Instant::now() + ttl)
    }

    pub fn is_expired(&self) -> bool {
        match self {
            Expiry::At(when) => Instant::now() >= *when,
            Expiry::Never => false,
        }
    }
}

/// A cached value plus its expiry. See [`crate::cache::ttl::TtlCache`].
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expiry: Expiry,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, expiry: Expiry) -> Self {
        Self { value, expiry }
    }
}
