//! Abstract pool-math interface and concrete AMM implementations.
//!
//! The router core never hard-codes an AMM formula against [`super::registry::Pool`] —
//! it only ever calls through [`PoolMath`]. This mirrors the teacher's own
//! `PriceCalculator`, generalized from a single constant-product formula
//! hard-coded against `PoolState` into a trait dispatched per pool.
//!
//! Author: AI-Generated
//! Created: 2026-01-27

pub mod concentrated;
pub mod constant_product;
pub mod generalised_cosmwasm;
pub mod stable;
pub mod transmuter;

pub use concentrated::ConcentratedPool;
pub use constant_product::ConstantProductPool;
pub use generalised_cosmwasm::GeneralisedCosmWasmPool;
pub use stable::StablePool;
pub use transmuter::TransmuterPool;

use crate::error::PoolMathError;
use crate::types::{Denom, PoolId, PoolType};
use async_trait::async_trait;
use cosmwasm_std::{Coin, Decimal256};

/// Capability set every pool variant implements: denoms, liquidity, id,
/// type, swap, spot price, and taker fee.
///
/// Only [`GeneralisedCosmWasmPool`]'s `swap`/`spot_price` may suspend on
/// I/O; every other variant is pure CPU. The trait is `async` uniformly so
/// the route evaluator and candidate finder do not need to special-case the
/// CosmWasm variant — they simply `.await` it like any other.
#[async_trait]
pub trait PoolMath: Send + Sync + std::fmt::Debug {
    fn id(&self) -> PoolId;

    fn pool_type(&self) -> PoolType;

    /// Denoms this pool supports. Fixed for the pool's lifetime.
    fn denoms(&self) -> Vec<Denom>;

    /// Total liquidity expressed in the OSMO-equivalent accounting denom,
    /// used by the candidate finder's min-liquidity admission filter.
    fn liquidity_osmo_equivalent(&self) -> Decimal256;

    /// Taker fee for swapping `token_in_denom` into `token_out_denom`.
    fn taker_fee(&self, token_in_denom: &Denom, token_out_denom: &Denom) -> Decimal256;

    /// Deterministically computes `token_out = swap(token_in)`.
    async fn swap(
        &self,
        token_in: &Coin,
        token_out_denom: &Denom,
    ) -> Result<Coin, PoolMathError>;

    /// Instantaneous exchange rate of `base` in terms of `quote`, independent
    /// of trade size.
    async fn spot_price(
        &self,
        base: &Denom,
        quote: &Denom,
    ) -> Result<Decimal256, PoolMathError>;

    fn contains_denom(&self, denom: &Denom) -> bool {
        self.denoms().iter().any(|d| d == denom)
    }
}
