//! Two-asset constant-product AMM (`x * y = k`), the uniform-fee pool type.
//!
//! Grounded on the teacher's `pool/calculator.rs::PriceCalculator` and
//! `types.rs::PoolState::get_amount_out`, generalized from a hard-coded
//! 997/1000 Uniswap-V2 fee to an arbitrary per-pool [`Decimal256`] fee and
//! from `U256` EVM reserves to [`Uint128`] Cosmos-style `Coin` amounts.

use crate::error::PoolMathError;
use crate::pool::math::PoolMath;
use crate::types::{Denom, PoolId, PoolType};
use async_trait::async_trait;
use cosmwasm_std::{Coin, Decimal256, Uint128};

#[derive(Debug, Clone)]
pub struct ConstantProductPool {
    pub id: PoolId,
    pub denom_a: Denom,
    pub denom_b: Denom,
    pub reserve_a: Uint128,
    pub reserve_b: Uint128,
    /// Swap fee, e.g. `Decimal256::permille(3)` for the classic 0.3%.
    pub fee: Decimal256,
    pub liquidity_osmo_equivalent: Decimal256,
}

impl ConstantProductPool {
    pub fn new(
        id: PoolId,
        denom_a: Denom,
        denom_b: Denom,
        reserve_a: Uint128,
        reserve_b: Uint128,
        fee: Decimal256,
        liquidity_osmo_equivalent: Decimal256,
    ) -> Self {
        Self {
            id,
            denom_a,
            denom_b,
            reserve_a,
            reserve_b,
            fee,
            liquidity_osmo_equivalent,
        }
    }

    fn reserves_for(&self, token_in_denom: &Denom) -> Option<(Uint128, Uint128)> {
        if *token_in_denom == self.denom_a {
            Some((self.reserve_a, self.reserve_b))
        } else if *token_in_denom == self.denom_b {
            Some((self.reserve_b, self.reserve_a))
        } else {
            None
        }
    }

    /// `amount_out = (amount_in * (1 - fee) * reserve_out) / (reserve_in + amount_in * (1 - fee))`
    fn amount_out(&self, amount_in: Uint128, reserve_in: Uint128, reserve_out: Uint128) -> Uint128 {
        if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
            return Uint128::zero();
        }

        let amount_in_dec = Decimal256::from_ratio(amount_in, 1u128);
        let reserve_in_dec = Decimal256::from_ratio(reserve_in, 1u128);
        let reserve_out_dec = Decimal256::from_ratio(reserve_out, 1u128);

        let fee_multiplier = Decimal256::one() - self.fee.min(Decimal256::one());
        let amount_in_with_fee = amount_in_dec * fee_multiplier;

        let denominator = reserve_in_dec + amount_in_with_fee;
        if denominator.is_zero() {
            return Uint128::zero();
        }

        let numerator = amount_in_with_fee * reserve_out_dec;
        let amount_out_dec = numerator / denominator;

        Uint128::try_from(amount_out_dec.to_uint_floor()).unwrap_or(reserve_out)
    }
}

#[async_trait]
impl PoolMath for ConstantProductPool {
    fn id(&self) -> PoolId {
        self.id
    }

    fn pool_type(&self) -> PoolType {
        PoolType::ConstantProduct
    }

    fn denoms(&self) -> Vec<Denom> {
        vec![self.denom_a.clone(), self.denom_b.clone()]
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
        let (reserve_in, reserve_out) = self.reserves_for(&token_in.denom).ok_or_else(|| {
            PoolMathError::DenomNotInPool {
                pool_id: self.id,
                denom: token_in.denom.clone(),
            }
        })?;
        if self.reserves_for(token_out_denom).is_none() {
            return Err(PoolMathError::DenomNotInPool {
                pool_id: self.id,
                denom: token_out_denom.clone(),
            });
        }

        let amount_out = self.amount_out(token_in.amount, reserve_in, reserve_out);
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
        let (reserve_base, reserve_quote) = self.reserves_for(base).ok_or_else(|| {
            PoolMathError::DenomNotInPool {
                pool_id: self.id,
                denom: base.clone(),
            }
        })?;
        if self.reserves_for(quote).is_none() {
            return Err(PoolMathError::DenomNotInPool {
                pool_id: self.id,
                denom: quote.clone(),
            });
        }
        if reserve_base.is_zero() {
            return Err(PoolMathError::NonFiniteSpotPrice { pool_id: self.id });
        }
        Ok(Decimal256::from_ratio(reserve_quote, reserve_base))
    }
}
