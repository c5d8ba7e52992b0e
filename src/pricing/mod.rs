//! Pricing Engine: turns routed quotes into unit prices between denoms.

pub mod engine;
pub mod scaling;

pub use engine::{PriceOptions, PricingEngine, QuoteOptions, QuoteSource};
pub use scaling::ScalingFactorTable;
