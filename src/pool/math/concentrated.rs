//! Concentrated-liquidity pool, modeled as a constant-product AMM over the
//! *virtual* reserves implied by the current tick and in-range liquidity.
//!
//! Grounded on the teacher's `V3PoolState` (`tick`, `liquidity`,
//! `price_from_tick` — "Price = 1.0001^tick", chosen deliberately over the
//! sqrtPriceX96 route because of the teacher's own documented f64 precision
//! concerns). Within a single active tick range, a CL pool's reserves behave
//! exactly like a constant-product pool over the virtual reserves
//! `L / sqrt(price)` and `L * sqrt(price)` — this implementation assumes the
//! swap stays within the current range (no tick-crossing), which is recorded
//! as a simplification in DESIGN.md.

use crate::error::PoolMathError;
use crate::pool::math::PoolMath;
use crate::types::{Denom, PoolId, PoolType};
use async_trait::async_trait;
use cosmwasm_std::{Coin, Decimal256, Uint128};

#[derive(Debug, Clone)]
pub struct ConcentratedPool {
    pub id: PoolId,
    pub denom_base: Denom,
    pub denom_quote: Denom,
    /// Current tick; price = 1.0001^tick (quote per base).
    pub tick: i32,
    /// In-range liquidity.
    pub liquidity: Uint128,
    pub fee: Decimal256,
    pub liquidity_osmo_equivalent: Decimal256,
}

impl ConcentratedPool {
    pub fn new(
        id: PoolId,
        denom_base: Denom,
        denom_quote: Denom,
        tick: i32,
        liquidity: Uint128,
        fee: Decimal256,
        liquidity_osmo_equivalent: Decimal256,
    ) -> Self {
        Self {
            id,
            denom_base,
            denom_quote,
            tick,
            liquidity,
            fee,
            liquidity_osmo_equivalent,
        }
    }

    /// `1.0001^tick` via exponentiation-by-squaring over `Decimal256`,
    /// avoiding `f64` entirely (per spec §9: "final division happens
    /// exactly once to avoid compounding rounding").
    fn price_from_tick(tick: i32) -> Decimal256 {
        let base = Decimal256::from_ratio(10_001u128, 10_000u128);
        let mut exp = tick.unsigned_abs();
        let mut result = Decimal256::one();
        let mut b = base;
        while exp > 0 {
            if exp & 1 == 1 {
                result = result * b;
            }
            b = b * b;
            exp >>= 1;
        }
        if tick < 0 {
            Decimal256::one() / result
        } else {
            result
        }
    }

    fn price(&self) -> Decimal256 {
        Self::price_from_tick(self.tick)
    }

    /// Virtual reserves implied by the current price and in-range liquidity:
    /// `(reserve_base, reserve_quote) = (L / sqrt(price), L * sqrt(price))`.
    fn virtual_reserves(&self) -> (Decimal256, Decimal256) {
        let sqrt_price = self.price().sqrt();
        let l = Decimal256::from_ratio(self.liquidity, 1u128);
        if sqrt_price.is_zero() {
            return (Decimal256::zero(), Decimal256::zero());
        }
        (l / sqrt_price, l * sqrt_price)
    }

    fn amount_out_decimal(&self, amount_in: Decimal256, reserve_in: Decimal256, reserve_out: Decimal256) -> Decimal256 {
        if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
            return Decimal256::zero();
        }
        let fee_multiplier = Decimal256::one() - self.fee.min(Decimal256::one());
        let amount_in_with_fee = amount_in * fee_multiplier;
        let denominator = reserve_in + amount_in_with_fee;
        if denominator.is_zero() {
            return Decimal256::zero();
        }
        (amount_in_with_fee * reserve_out) / denominator
    }
}

#[async_trait]
impl PoolMath for ConcentratedPool {
    fn id(&self) -> PoolId {
        self.id
    }

    fn pool_type(&self) -> PoolType {
        PoolType::Concentrated
    }

    fn denoms(&self) -> Vec<Denom> {
        vec![self.denom_base.clone(), self.denom_quote.clone()]
    }

    fn liquidity_osmo_equivalent(&self) -> Decimal256 {
        self.liquidity_osmo_equivalent
    }

    fn taker_fee(&self, _token_in_denom: &Denom, _token_out_denom: &Denom) -> Decimal256 {
        self.fee
    }

    async fn swap(
        &self,
        token_in: &Coin,
        token_out_denom: &Denom,
    ) -> Result<Coin, PoolMathError> {
        let (reserve_base, reserve_quote) = self.virtual_reserves();
        let (reserve_in, reserve_out) = if token_in.denom == self.denom_base && *token_out_denom == self.denom_quote {
            (reserve_base, reserve_quote)
        } else if token_in.denom == self.denom_quote && *token_out_denom == self.denom_base {
            (reserve_quote, reserve_base)
        } else {
            return Err(PoolMathError::DenomNotInPool {
                pool_id: self.id,
                denom: token_in.denom.clone(),
            });
        };

        let amount_in_dec = Decimal256::from_ratio(token_in.amount, 1u128);
        let amount_out_dec = self.amount_out_decimal(amount_in_dec, reserve_in, reserve_out);
        let amount_out = Uint128::try_from(amount_out_dec.to_uint_floor()).unwrap_or(Uint128::zero());
        if amount_out.is_zero() {
            return Err(PoolMathError::ZeroOutput { pool_id: self.id });
        }

        Ok(Coin {
            denom: token_out_denom.clone(),
            amount: amount_out,
        })
    }

    async fn spot_price(
        &self,
        base: &Denom,
        quote: &Denom,
    ) -> Result<Decimal256, PoolMathError> {
        if *base == self.denom_base && *quote == self.denom_quote {
            Ok(self.price())
        } else if *base == self.denom_quote && *quote == self.denom_base {
            let p = self.price();
            if p.is_zero() {
                Err(PoolMathError::NonFiniteSpotPrice { pool_id: self.id })
            } else {
                Ok(Decimal256::one() / p)
            }
        } else {
            Err(PoolMathError::DenomNotInPool {
                pool_id: self.id,
                denom: base.clone(),
            })
        }
    }
}
