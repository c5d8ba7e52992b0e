//! Route Evaluator (§4.3): simulates a route pool-by-pool against a concrete
//! input coin and produces the stripped client-facing result alongside the
//! full internal [`RouteEvaluation`].
//!
//! Grounded on `pool/calculator.rs::PriceCalculator`, generalized from a
//! single hard-coded pool-pair calculation into a walk over an arbitrary
//! [`Route`]'s steps, dispatched through [`PoolMath`] rather than a
//! concrete pool type.

use crate::error::RouteEvaluationError;
use crate::pool::registry::PoolSet;
use crate::pool::math::PoolMath;
use crate::types::{ResultPool, Route, RouteEvaluation};
use cosmwasm_std::{Coin, Decimal256};

/// Runs `route` forward from `input`, returning the full evaluation.
///
/// Per-step effective spot price and amounts are compared in the pool's own
/// base-unit precision; cross-denom decimal rescaling is the pricing
/// engine's concern (see [`crate::pricing::scaling`]), applied once on the
/// aggregated result rather than per hop.
pub async fn evaluate_route(
    snapshot: &PoolSet,
    route: &Route,
    input: &Coin,
) -> Result<RouteEvaluation, RouteEvaluationError> {
    let mut current = input.clone();
    let mut pre_swap_spot_price = Decimal256::one();
    let mut effective_spot_price = Decimal256::one();
    let mut per_step_pre_swap_spot_prices = Vec::with_capacity(route.steps.len());
    let mut result_pools = Vec::with_capacity(route.steps.len());

    for step in &route.steps {
        let pool = snapshot
            .get(step.pool_id)
            .ok_or(RouteEvaluationError::PoolMissing { pool_id: step.pool_id })?;

        let step_spot_price = pool
            .math()
            .spot_price(&current.denom, &step.token_out_denom)
            .await?;
        let taker_fee = pool.math().taker_fee(&current.denom, &step.token_out_denom);

        let output = pool.math().swap(&current, &step.token_out_denom).await?;

        let step_effective_price = Decimal256::from_ratio(current.amount, output.amount);

        result_pools.push(ResultPool {
            pool_id: step.pool_id,
            pool_type: pool.math().pool_type(),
            taker_fee,
            token_in_denom: current.denom.clone(),
            token_out_denom: step.token_out_denom.clone(),
        });

        pre_swap_spot_price = pre_swap_spot_price * step_spot_price;
        effective_spot_price = effective_spot_price * step_effective_price;
        per_step_pre_swap_spot_prices.push(step_spot_price);

        current = output;
    }

    Ok(RouteEvaluation {
        route: route.clone(),
        amount_in: input.clone(),
        amount_out: current,
        pre_swap_spot_price,
        effective_spot_price,
        result_pools,
        per_step_pre_swap_spot_prices,
    })
}
