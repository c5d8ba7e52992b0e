//! Generalised CosmWasm pool: the one pool variant whose math lives in an
//! actual on-chain contract, reached here through an injectable async
//! backend. Per spec §9, this is the only variant whose `swap`/`spot_price`
//! may suspend on real I/O, and the optimiser inspects
//! [`crate::types::PoolType::GeneralisedCosmWasm`] exactly once to exclude
//! it from split search (see `route/optimizer.rs`).
//!
//! The backend trait stands in for the "opaque pool-math object" the spec
//! treats as an external collaborator (§1): this crate supplies the shape
//! and the concurrency contract (simulated round-trip latency, timeout
//! propagation) but not a real CosmWasm querier.

use crate::error::PoolMathError;
use crate::pool::math::PoolMath;
use crate::types::{Denom, PoolId, PoolType};
use async_trait::async_trait;
use cosmwasm_std::{Coin, Decimal256};
use std::sync::Arc;
use std::time::Duration;

/// What a real implementation would back with a `QuerierWrapper` contract
/// query. Kept minimal and async so it can be driven by a mock in tests.
#[async_trait]
pub trait CosmWasmPoolBackend: Send + Sync + std::fmt::Debug {
    async fn query_swap(&self, token_in: &Coin, token_out_denom: &Denom) -> Result<Coin, PoolMathError>;
    async fn query_spot_price(&self, base: &Denom, quote: &Denom) -> Result<Decimal256, PoolMathError>;
}

#[derive(Debug, Clone)]
pub struct GeneralisedCosmWasmPool {
    pub id: PoolId,
    pub denoms: Vec<Denom>,
    pub fee: Decimal256,
    pub liquidity_osmo_equivalent: Decimal256,
    pub backend: Arc<dyn CosmWasmPoolBackend>,
    /// Simulated network round-trip latency applied before each backend call.
    pub simulated_latency: Duration,
}

impl GeneralisedCosmWasmPool {
    pub fn new(
        id: PoolId,
        denoms: Vec<Denom>,
        fee: Decimal256,
        liquidity_osmo_equivalent: Decimal256,
        backend: Arc<dyn CosmWasmPoolBackend>,
        simulated_latency: Duration,
    ) -> Self {
        Self {
            id,
            denoms,
            fee,
            liquidity_osmo_equivalent,
            backend,
            simulated_latency,
        }
    }
}

#[async_trait]
impl PoolMath for GeneralisedCosmWasmPool {
    fn id(&self) -> PoolId {
        self.id
    }

    fn pool_type(&self) -> PoolType {
        PoolType::GeneralisedCosmWasm
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
        if !self.simulated_latency.is_zero() {
            tokio::time::sleep(self.simulated_latency).await;
        }
        self.backend.query_swap(token_in, token_out_denom).await
    }

    async fn spot_price(
        &self,
        base: &Denom,
        quote: &Denom,
    ) -> Result<Decimal256, PoolMathError> {
        if !self.simulated_latency.is_zero() {
            tokio::time::sleep(self.simulated_latency).await;
        }
        self.backend.query_spot_price(base, quote).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use cosmwasm_std::Uint128;

    /// 1:1 backend for tests, optionally forced to fail.
    #[derive(Debug)]
    pub struct FixedRateBackend {
        pub rate_out_per_in: Decimal256,
        pub fail: bool,
    }

    #[async_trait]
    impl CosmWasmPoolBackend for FixedRateBackend {
        async fn query_swap(&self, token_in: &Coin, token_out_denom: &Denom) -> Result<Coin, PoolMathError> {
            if self.fail {
                return Err(PoolMathError::RemoteCallFailed {
                    pool_id: 0,
                    reason: "mock failure".to_string(),
                });
            }
            let amount_in_dec = Decimal256::from_ratio(token_in.amount, 1u128);
            let amount_out_dec = amount_in_dec * self.rate_out_per_in;
            let amount_out = Uint128::try_from(amount_out_dec.to_uint_floor()).unwrap_or(Uint128::zero());
            Ok(Coin {
                denom: token_out_denom.clone(),
                amount: amount_out,
            })
        }

        async fn query_spot_price(&self, _base: &Denom, _quote: &Denom) -> Result<Decimal256, PoolMathError> {
            if self.fail {
                return Err(PoolMathError::RemoteCallFailed {
                    pool_id: 0,
                    reason: "mock failure".to_string(),
                });
            }
            Ok(self.rate_out_per_in)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::FixedRateBackend;
    use super::*;
    use cosmwasm_std::Uint128;

    #[tokio::test]
    async fn delegates_to_backend() {
        let pool = GeneralisedCosmWasmPool::new(
            40,
            vec!["a".to_string(), "b".to_string()],
            Decimal256::permille(2),
            Decimal256::from_ratio(1_000_000u128, 1u128),
            Arc::new(FixedRateBackend { rate_out_per_in: Decimal256::percent(98), fail: false }),
            Duration::from_millis(0),
        );
        let out = pool
            .swap(&Coin { denom: "a".to_string(), amount: Uint128::new(1_000) }, &"b".to_string())
            .await
            .unwrap();
        assert_eq!(out.amount, Uint128::new(980));
    }

    #[tokio::test]
    async fn backend_failure_propagates() {
        let pool = GeneralisedCosmWasmPool::new(
            41,
            vec!["a".to_string(), "b".to_string()],
            Decimal256::zero(),
            Decimal256::zero(),
            Arc::new(FixedRateBackend { rate_out_per_in: Decimal256::one(), fail: true }),
            Duration::from_millis(0),
        );
        let err = pool
            .swap(&Coin { denom: "a".to_string(), amount: Uint128::new(1) }, &"b".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, PoolMathError::RemoteCallFailed { .. }));
    }

    #[test]
    fn pool_type_is_generalised_cosmwasm() {
        let pool = GeneralisedCosmWasmPool::new(
            42,
            vec!["a".to_string()],
            Decimal256::zero(),
            Decimal256::zero(),
            Arc::new(FixedRateBackend { rate_out_per_in: Decimal256::one(), fail: false }),
            Duration::from_millis(0),
        );
        assert!(pool.pool_type().is_generalised_cosmwasm());
    }
}
