//! Quote router sidecar binary.
//!
//! This wires the core library into a runnable process: load config, build
//! the shared registries, construct the usecase and pricing engine, and run
//! a background loop that stands in for a real chain-streaming ingest
//! pipeline (out of scope for this crate — see [`osmo_router_core::ingest`]).

use osmo_router_core::cache::RouteCache;
use osmo_router_core::pricing::ScalingFactorTable;
use osmo_router_core::{load_config, Metrics, PoolRegistry, PricingEngine, RouterConfig, RouterUsecase, SidecarConfig, TakerFeeTable};
use std::time::Duration;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config: SidecarConfig = load_config();

    tracing_subscriber::fmt()
        .with_max_level(parse_log_level(&config.log_level))
        .with_target(false)
        .init();

    info!(
        max_routes = config.max_routes,
        max_split_routes = config.max_split_routes,
        default_quote_denom = %config.default_quote_human_denom,
        "router sidecar starting"
    );

    let registry = PoolRegistry::new();
    let fees = TakerFeeTable::new();
    let metrics = Metrics::new();
    let route_cache = RouteCache::new(
        config.candidate_route_cache_ttl(),
        config.ranked_route_cache_ttl(),
        config.enable_overwrite_routes_cache,
        metrics.clone(),
    );
    let scaling = ScalingFactorTable::new();

    let usecase_config = RouterConfig {
        max_pools_per_route: config.max_pools_per_route,
        max_routes: config.max_routes,
        max_split_routes: config.max_split_routes,
        max_split_iterations: config.max_split_iterations,
        min_osmo_liquidity: config.min_osmo_liquidity,
        preferred_pool_ids: config.preferred_pool_ids.clone(),
        route_cache_enabled: config.route_cache_enabled,
    };
    let usecase = RouterUsecase::new(registry.clone(), fees, route_cache, usecase_config, metrics.clone());

    let pricing_engine = PricingEngine::new(
        scaling,
        config.default_quote_human_denom.clone(),
        config.price_cache_ttl(),
        config.pricing_max_routes(),
        config.pricing_max_pools_per_route(),
        metrics,
    );

    info!("router sidecar ready, awaiting pool ingest");

    // A real deployment wires a chain-streaming producer through
    // `PoolIngest::replace_pools`/`set_taker_fees`/`notify_block`, and an
    // RPC surface through `RouterUsecase::quote`/`custom_direct_quote` and
    // `PricingEngine::price`. Without either, this loop exists only to
    // demonstrate the block-update hook that keeps default-quote-denom
    // prices from growing unbounded under the "never expire, invalidate on
    // block" policy.
    let mut ticks = tokio::time::interval(Duration::from_secs(5));
    loop {
        ticks.tick().await;
        pricing_engine.notify_block_update();
        info!(pool_count = registry.snapshot().len(), "tick");
    }
}

fn parse_log_level(level: &str) -> Level {
    level.parse().unwrap_or(Level::INFO)
}
