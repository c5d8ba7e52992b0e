//! Transmuter pool: any denom in its set swaps 1:1 for any other, zero
//! price impact, bounded only by the pool's per-denom balance.
//!
//! No teacher/pack file implements a transmuter directly (it's an
//! Osmosis-specific pool type with no constant-product analogue); grounded
//! instead on the general "pool with a fixed denom set and simple balance
//! bookkeeping" shape every pool variant in this module shares.

use crate::error::PoolMathError;
use crate::pool::math::PoolMath;
use crate::types::{Denom, PoolId, PoolType};
use async_trait::async_trait;
use cosmwasm_std::{Coin, Decimal256, Uint128};

#[derive(Debug, Clone)]
pub struct TransmuterPool {
    pub id: PoolId,
    pub denoms: Vec<Denom>,
    pub balances: Vec<Uint128>,
    pub liquidity_osmo_equivalent: Decimal256,
}

impl TransmuterPool {
    pub fn new(
        id: PoolId,
        denoms: Vec<Denom>,
        balances: Vec<Uint128>,
        liquidity_osmo_equivalent: Decimal256,
    ) -> Self {
        assert_eq!(denoms.len(), balances.len(), "transmuter denoms/balances length mismatch");
        Self {
            id,
            denoms,
            balances,
            liquidity_osmo_equivalent,
        }
    }

    fn index_of(&self, denom: &Denom) -> Option<usize> {
        self.denoms.iter().position(|d| d == denom)
    }
}

#[async_trait]
impl PoolMath for TransmuterPool {
    fn id(&self) -> PoolId {
        self.id
    }

    fn pool_type(&self) -> PoolType {
        PoolType::Transmuter
    }

    fn denoms(&self) -> Vec<Denom> {
        self.denoms.clone()
    }

    fn liquidity_osmo_equivalent(&self) -> Decimal256 {
        self.liquidity_osmo_equivalent
    }

    fn taker_fee(&self, _token_in_denom: &Denom, _token_out_denom: &Denom) -> Decimal256 {
        Decimal256::zero()
    }

    async fn swap(
        &self,
        token_in: &Coin,
        token_out_denom: &Denom,
    ) -> Result<Coin, PoolMathError> {
        self.index_of(&token_in.denom).ok_or_else(|| PoolMathError::DenomNotInPool {
            pool_id: self.id,
            denom: token_in.denom.clone(),
        })?;
        let j = self.index_of(token_out_denom).ok_or_else(|| PoolMathError::DenomNotInPool {
            pool_id: self.id,
            denom: token_out_denom.clone(),
        })?;

        if token_in.amount > self.balances[j] {
            return Err(PoolMathError::ZeroOutput { pool_id: self.id });
        }
        if token_in.amount.is_zero() {
            return Err(PoolMathError::ZeroOutput { pool_id: self.id });
        }

        Ok(Coin {
            denom: token_out_denom.clone(),
            amount: token_in.amount,
        })
    }

    async fn spot_price(
        &self,
        base: &Denom,
        quote: &Denom,
    ) -> Result<Decimal256, PoolMathError> {
        self.index_of(base).ok_or_else(|| PoolMathError::DenomNotInPool {
            pool_id: self.id,
            denom: base.clone(),
        })?;
        self.index_of(quote).ok_or_else(|| PoolMathError::DenomNotInPool {
            pool_id: self.id,
            denom: quote.clone(),
        })?;
        Ok(Decimal256::one())
    }
}
