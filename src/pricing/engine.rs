//! Pricing Engine (§4.6): turns a quote into a unit price between two
//! denoms by routing a scaled probe amount and multiplying per-pool spot
//! prices, with a fallback to realized amount-out ÷ amount-in when any
//! per-pool spot price is nil or zero.
//!
//! Grounded on `pool/calculator.rs::PriceCalculator::best_price_for_pair`'s
//! probe-and-compare shape, and on `V3PoolState::price_from_tick`'s
//! validate-before-trust discipline (never hand back an unchecked price —
//! fall back explicitly when a step can't produce one).

use crate::error::{NotFoundError, RouterError};
use crate::metrics::Metrics;
use crate::pricing::scaling::ScalingFactorTable;
use crate::cache::ttl::TtlCache;
use crate::types::{Denom, Quote, RouteEvaluation};
use async_trait::async_trait;
use cosmwasm_std::{Coin, Decimal256, Uint128};
use dashmap::DashSet;
use std::sync::Arc;
use std::time::Duration;

/// Amount-out multiplier applied to a probe trade so its output magnitude is
/// large enough to filter out pools too thin to trust.
const TOKEN_IN_MULTIPLIER: u128 = 10;

#[derive(Debug, Clone)]
pub struct QuoteOptions {
    pub max_routes: usize,
    pub max_pools_per_route: usize,
    pub min_osmo_liquidity: Decimal256,
    /// 0 disables splitting. The pricing engine always passes 0.
    pub max_split_routes: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PriceOptions {
    pub min_liquidity: Decimal256,
    pub recompute_prices: bool,
}

/// What the pricing engine depends on to actually route a probe coin.
/// Implemented by [`crate::usecase::RouterUsecase`]; kept as a trait so this
/// module never depends on the usecase wiring directly.
///
/// Returns the quote alongside the per-route [`RouteEvaluation`]s that
/// produced it (one per `quote.route` entry, same order) — the pricing
/// walk needs each step's pre-swap spot price individually, which a
/// client-facing [`Quote`] does not carry.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn quote(
        &self,
        token_in: Coin,
        token_out_denom: Denom,
        opts: QuoteOptions,
    ) -> Result<(Quote, Vec<RouteEvaluation>), RouterError>;
}

#[derive(Debug, Clone)]
pub struct PricingEngine {
    cache: TtlCache<(Denom, Denom), Decimal256>,
    scaling: ScalingFactorTable,
    default_quote_denom: Denom,
    cache_ttl: Duration,
    max_routes: usize,
    max_pools_per_route: usize,
    metrics: Metrics,
    /// Bases priced against the default quote denom, so a block-update
    /// refresh knows which cache entries to drop without scanning the
    /// whole table.
    default_quote_bases: Arc<DashSet<Denom>>,
}

impl PricingEngine {
    pub fn new(
        scaling: ScalingFactorTable,
        default_quote_denom: Denom,
        cache_ttl: Duration,
        max_routes: usize,
        max_pools_per_route: usize,
        metrics: Metrics,
    ) -> Self {
        Self {
            cache: TtlCache::new(),
            scaling,
            default_quote_denom,
            cache_ttl,
            max_routes,
            max_pools_per_route,
            metrics,
            default_quote_bases: Arc::new(DashSet::new()),
        }
    }

    pub async fn price(
        &self,
        quote_source: &dyn QuoteSource,
        base: &Denom,
        quote: &Denom,
        opts: PriceOptions,
    ) -> Result<Decimal256, RouterError> {
        if base == quote {
            return Ok(Decimal256::one());
        }

        let key = (base.clone(), quote.clone());
        if !opts.recompute_prices {
            if let Some(cached) = self.cache.get(&key) {
                self.metrics.record_price_cache_hit(base, quote);
                return Ok(cached);
            }
        }
        self.metrics.record_price_cache_miss(base, quote);

        let s_base = self.scaling.get(base)?;
        let s_quote = self.scaling.get(quote)?;

        let probe_amount = (Decimal256::from_ratio(TOKEN_IN_MULTIPLIER, 1u128) * s_quote).to_uint_floor();
        let probe_amount = Uint128::try_from(probe_amount).unwrap_or(Uint128::zero());
        let probe_coin = Coin { denom: quote.clone(), amount: probe_amount };

        let (router_quote, evaluations) = quote_source
            .quote(
                probe_coin.clone(),
                base.clone(),
                QuoteOptions {
                    max_routes: self.max_routes,
                    max_pools_per_route: self.max_pools_per_route,
                    min_osmo_liquidity: opts.min_liquidity,
                    max_split_routes: 0,
                },
            )
            .await?;

        let Some(eval) = evaluations.first() else {
            return Err(RouterError::NotFound(NotFoundError::NoRoute {
                token_in: quote.clone(),
                token_out: base.clone(),
            }));
        };

        let has_zero_step = eval.per_step_pre_swap_spot_prices.iter().any(|p| p.is_zero());
        let raw_price = if has_zero_step || eval.pre_swap_spot_price.is_zero() {
            self.metrics.record_spot_price_error(base, quote);
            if router_quote.amount_out.amount.is_zero() {
                Decimal256::zero()
            } else {
                Decimal256::from_ratio(probe_amount, router_quote.amount_out.amount)
            }
        } else {
            // The probe route runs quote -> base, so `pre_swap_spot_price` is
            // base-per-quote; the quote-per-base value this function returns
            // is its reciprocal (matches the fallback branch above, which is
            // already quote-per-base by construction).
            Decimal256::one() / eval.pre_swap_spot_price
        };

        let scaling_factor = if probe_amount.is_zero() {
            Decimal256::zero()
        } else {
            (Decimal256::from_ratio(TOKEN_IN_MULTIPLIER, 1u128) * s_base) / Decimal256::from_ratio(probe_amount, 1u128)
        };
        let final_price = raw_price * scaling_factor;

        if final_price.is_zero() {
            self.metrics.record_price_truncation(base, quote);
        }

        if *quote == self.default_quote_denom {
            self.default_quote_bases.insert(base.clone());
            self.cache.set_no_expiry(key, final_price);
        } else {
            self.cache.set(key, final_price, self.cache_ttl);
        }

        Ok(final_price)
    }

    /// Invalidates every default-quote-denom cache entry so the next
    /// `price()` call recomputes it. Called by the background refresher on
    /// relevant block updates; never touches non-default-quote entries.
    pub fn notify_block_update(&self) {
        for base in self.default_quote_bases.iter() {
            self.cache.delete(&(base.clone(), self.default_quote_denom.clone()));
        }
        self.default_quote_bases.clear();
    }
}
