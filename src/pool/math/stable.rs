//! N-asset StableSwap pool (Curve-style invariant), for low-slippage swaps
//! between correlated assets (e.g. stablecoins, liquid-staked derivatives).
//!
//! Grounded on the amplification-coefficient and iterative-invariant idiom
//! shown in the retrieval pack's `wynddex`/`astroport` stable-pair utils
//! (`compute_current_amp`, `calc_y`), reimplemented here as a standalone,
//! dependency-free Newton's-method solver operating on `u128` reserves. Per
//! spec §9's Design Notes ("final division happens exactly once"), only the
//! very last step converts the invariant-space integer back into a `Coin`.
//!
//! Simplification (recorded in DESIGN.md): all assets are treated as having
//! equal precision — a production stable pool additionally carries a
//! per-asset scaling factor which this pool omits.

use crate::error::PoolMathError;
use crate::pool::math::PoolMath;
use crate::types::{Denom, PoolId, PoolType};
use async_trait::async_trait;
use cosmwasm_std::{Coin, Decimal256, Uint128};

/// Newton's-method iteration cap; the invariant converges in a handful of
/// iterations for any realistic reserve ratio.
const MAX_ITERATIONS: u32 = 255;

#[derive(Debug, Clone)]
pub struct StablePool {
    pub id: PoolId,
    pub denoms: Vec<Denom>,
    pub reserves: Vec<Uint128>,
    pub amplification: u64,
    pub fee: Decimal256,
    pub liquidity_osmo_equivalent: Decimal256,
}

impl StablePool {
    pub fn new(
        id: PoolId,
        denoms: Vec<Denom>,
        reserves: Vec<Uint128>,
        amplification: u64,
        fee: Decimal256,
        liquidity_osmo_equivalent: Decimal256,
    ) -> Self {
        assert_eq!(denoms.len(), reserves.len(), "stable pool denoms/reserves length mismatch");
        Self {
            id,
            denoms,
            reserves,
            amplification,
            fee,
            liquidity_osmo_equivalent,
        }
    }

    fn index_of(&self, denom: &Denom) -> Option<usize> {
        self.denoms.iter().position(|d| d == denom)
    }

    fn reserves_u128(&self) -> Vec<u128> {
        self.reserves.iter().map(|r| r.u128()).collect()
    }

    /// Solves for `D` such that the StableSwap invariant holds over `xp`.
    fn compute_d(xp: &[u128], amp: u64) -> Option<u128> {
        let n = xp.len() as u128;
        let sum: u128 = xp.iter().try_fold(0u128, |acc, x| acc.checked_add(*x))?;
        if sum == 0 {
            return Some(0);
        }
        let ann = (amp as u128).checked_mul(n)?;
        let mut d = sum;
        for _ in 0..MAX_ITERATIONS {
            let mut d_p = d;
            for &x in xp {
                d_p = d_p.checked_mul(d)?.checked_div(x.checked_mul(n)?)?;
            }
            let d_prev = d;
            let numerator = ann.checked_mul(sum)?.checked_add(d_p.checked_mul(n)?)?;
            let denominator = ann
                .checked_sub(1)?
                .checked_mul(d)?
                .checked_add((n.checked_add(1)?).checked_mul(d_p)?)?;
            if denominator == 0 {
                return None;
            }
            d = numerator.checked_mul(d)?.checked_div(denominator)?;
            let diff = if d > d_prev { d - d_prev } else { d_prev - d };
            if diff <= 1 {
                return Some(d);
            }
        }
        Some(d)
    }

    /// Solves for the new balance of asset `j` given asset `i`'s new balance
    /// `x`, holding the invariant `D` constant.
    fn compute_y(i: usize, j: usize, x: u128, xp: &[u128], amp: u64) -> Option<u128> {
        let n = xp.len() as u128;
        let d = Self::compute_d(xp, amp)?;
        let ann = (amp as u128).checked_mul(n)?;

        let mut c = d;
        let mut s = 0u128;
        for (k, &xk) in xp.iter().enumerate() {
            if k == i {
                continue;
            }
            let xk = if k == j { x } else { xk };
            if xk == 0 {
                return None;
            }
            s = s.checked_add(xk)?;
            c = c.checked_mul(d)?.checked_div(xk.checked_mul(n)?)?;
        }
        c = c.checked_mul(d)?.checked_div(ann.checked_mul(n)?)?;
        let b = s.checked_add(d.checked_div(ann)?)?;

        let mut y = d;
        for _ in 0..MAX_ITERATIONS {
            let y_prev = y;
            let numerator = y.checked_mul(y)?.checked_add(c)?;
            let denominator = (y.checked_mul(2)?.checked_add(b)?).checked_sub(d)?;
            if denominator == 0 {
                return None;
            }
            y = numerator.checked_div(denominator)?;
            let diff = if y > y_prev { y - y_prev } else { y_prev - y };
            if diff <= 1 {
                return Some(y);
            }
        }
        Some(y)
    }
}

#[async_trait]
impl PoolMath for StablePool {
    fn id(&self) -> PoolId {
        self.id
    }

    fn pool_type(&self) -> PoolType {
        PoolType::Stable
    }

    fn denoms(&self) -> Vec<Denom> {
        self.denoms.clone()
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
        let i = self.index_of(&token_in.denom).ok_or_else(|| PoolMathError::DenomNotInPool {
            pool_id: self.id,
            denom: token_in.denom.clone(),
        })?;
        let j = self.index_of(token_out_denom).ok_or_else(|| PoolMathError::DenomNotInPool {
            pool_id: self.id,
            denom: token_out_denom.clone(),
        })?;

        let xp = self.reserves_u128();
        let new_x_i = xp[i]
            .checked_add(token_in.amount.u128())
            .ok_or_else(|| PoolMathError::RemoteCallFailed {
                pool_id: self.id,
                reason: "reserve overflow".to_string(),
            })?;

        let new_y = Self::compute_y(i, j, new_x_i, &xp, self.amplification)
            .ok_or_else(|| PoolMathError::NonFiniteSpotPrice { pool_id: self.id })?;

        if new_y >= xp[j] {
            return Err(PoolMathError::ZeroOutput { pool_id: self.id });
        }
        let raw_out = xp[j] - new_y;

        let out_dec = Decimal256::from_ratio(raw_out, 1u128) * (Decimal256::one() - self.fee.min(Decimal256::one()));
        let amount_out = Uint128::try_from(out_dec.to_uint_floor()).unwrap_or(Uint128::zero());
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
        let i = self.index_of(base).ok_or_else(|| PoolMathError::DenomNotInPool {
            pool_id: self.id,
            denom: base.clone(),
        })?;
        let j = self.index_of(quote).ok_or_else(|| PoolMathError::DenomNotInPool {
            pool_id: self.id,
            denom: quote.clone(),
        })?;

        // Approximate the instantaneous price via a small probe trade (1 unit
        // of precision relative to the pool's scale) rather than a closed-form
        // derivative of the invariant.
        let probe = self.reserves[i].u128() / 1_000_000.max(1) + 1;
        let xp = self.reserves_u128();
        let new_y = Self::compute_y(i, j, xp[i] + probe, &xp, self.amplification)
            .ok_or_else(|| PoolMathError::NonFiniteSpotPrice { pool_id: self.id })?;
        if new_y >= xp[j] {
            return Err(PoolMathError::NonFiniteSpotPrice { pool_id: self.id });
        }
        let out = xp[j] - new_y;
        Ok(Decimal256::from_ratio(out, probe))
    }
}
