//! Quote router and pricing engine sidecar core.
//!
//! Discovers candidate swap routes across a churning pool set, ranks and
//! optionally splits them for the best execution, and serves unit prices
//! derived from the same routing machinery — all behind multi-tier TTL
//! caches with an at-most-one-in-flight guarantee per key.
//!
//! Author: AI-Generated
//! Created: 2026-01-28

pub mod cache;
pub mod config;
pub mod error;
pub mod fees;
pub mod ingest;
pub mod metrics;
pub mod pool;
pub mod pricing;
pub mod route;
pub mod types;
pub mod usecase;

pub use config::{load_config, RouterConfig as SidecarConfig};
pub use error::{InputError, InternalError, NotFoundError, PoolMathError, RouteEvaluationError, RouterError, TimeoutError};
pub use fees::TakerFeeTable;
pub use ingest::{InMemoryIngest, PoolIngest};
pub use metrics::Metrics;
pub use pool::{Pool, PoolMath, PoolRegistry, PoolSet};
pub use pricing::{PriceOptions, PricingEngine, QuoteOptions, QuoteSource};
pub use route::{evaluate_route, find_routes, optimise_split, FinderOptions};
pub use types::{Denom, PoolId, PoolType, Quote, ResultPool, Route, RouteEvaluation, RouteStep, SplitRoute};
pub use usecase::{RouterConfig, RouterUsecase};
