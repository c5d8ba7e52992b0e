//! Decimal scaling-factor lookup: denoms are often expressed in different
//! base-unit precisions (e.g. 6 decimals vs 18), so a raw pool-math ratio
//! needs rescaling before it represents a human comparable unit price.
//!
//! Grounded on the same `DashMap`-backed lookup-table idiom as
//! [`crate::fees::TakerFeeTable`].

use crate::error::NotFoundError;
use crate::types::Denom;
use cosmwasm_std::Decimal256;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ScalingFactorTable {
    factors: Arc<DashMap<Denom, Decimal256>>,
}

impl ScalingFactorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, denom: &Denom, factor: Decimal256) {
        self.factors.insert(denom.clone(), factor);
    }

    pub fn get(&self, denom: &Denom) -> Result<Decimal256, NotFoundError> {
        self.factors
            .get(denom)
            .map(|f| *f)
            .ok_or_else(|| NotFoundError::ScalingFactorNotFound(denom.clone()))
    }

    pub fn replace(&self, entries: impl IntoIterator<Item = (Denom, Decimal256)>) {
        self.factors.clear();
        for (denom, factor) in entries {
            self.factors.insert(denom, factor);
        }
    }
}
