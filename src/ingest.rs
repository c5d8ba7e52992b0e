//! Ingest interface (consumed, not implemented): `PoolIngest` is what a
//! chain-streaming producer pushes pool snapshots and fee updates through.
//! The core only depends on this trait; a real streaming ingest pipeline is
//! out of scope.

use crate::fees::TakerFeeTable;
use crate::pool::registry::{Pool, PoolRegistry};
use crate::types::Denom;
use async_trait::async_trait;
use cosmwasm_std::Decimal256;

#[async_trait]
pub trait PoolIngest: Send + Sync {
    /// Installs a wholesale-replaced pool set. Implementations should call
    /// through to [`PoolRegistry::replace`] so the swap is atomic.
    async fn replace_pools(&self, pools: Vec<Pool>);

    /// Replaces the taker-fee table wholesale.
    async fn set_taker_fees(&self, entries: Vec<(Denom, Denom, Decimal256)>);

    /// Per-block notification consumed by the background price refresher to
    /// decide which default-quote-denom cache entries to rewrite.
    async fn notify_block(&self, height: u64);
}

/// Minimal in-memory ingest adapter wiring a [`PoolRegistry`] and
/// [`TakerFeeTable`] directly to the trait, plus a callback for block
/// notifications. Suitable for tests and the example wiring binary; a real
/// chain-streaming producer would instead decode on-chain events.
pub struct InMemoryIngest<F> {
    registry: PoolRegistry,
    fees: TakerFeeTable,
    on_block: F,
}

impl<F> InMemoryIngest<F>
where
    F: Fn(u64) + Send + Sync,
{
    pub fn new(registry: PoolRegistry, fees: TakerFeeTable, on_block: F) -> Self {
        Self { registry, fees, on_block }
    }
}

#[async_trait]
impl<F> PoolIngest for InMemoryIngest<F>
where
    F: Fn(u64) + Send + Sync,
{
    async fn replace_pools(&self, pools: Vec<Pool>) {
        self.registry.replace(pools);
    }

    async fn set_taker_fees(&self, entries: Vec<(Denom, Denom, Decimal256)>) {
        self.fees.replace(entries);
    }

    async fn notify_block(&self, height: u64) {
        (self.on_block)(height);
    }
}
