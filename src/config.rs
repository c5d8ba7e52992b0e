//! Configuration management: CLI flags with environment-variable fallback,
//! covering every knob named in §6.
//!
//! Grounded on the teacher's env-driven `load_config`, generalized from
//! `std::env::var` parsing into a `clap` derive struct so the same binary
//! accepts flags, env vars, or both (env vars win only when a flag is
//! absent, matching `clap`'s documented precedence).

use clap::Parser;
use cosmwasm_std::Decimal256;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Route-discovery and split-optimisation parameters.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "router-sidecar", about = "Quote router and pricing engine sidecar")]
pub struct RouterConfig {
    /// L: max pools chained in a single candidate route.
    #[arg(long, env = "MAX_POOLS_PER_ROUTE", default_value_t = 4)]
    pub max_pools_per_route: usize,

    /// N: max candidate routes returned by the finder.
    #[arg(long, env = "MAX_ROUTES", default_value_t = 10)]
    pub max_routes: usize,

    /// K: max routes the split optimiser may divide an input across. 0
    /// disables splitting.
    #[arg(long, env = "MAX_SPLIT_ROUTES", default_value_t = 3)]
    pub max_split_routes: usize,

    /// I: discretisation steps the split optimiser allocates per selection.
    #[arg(long, env = "MAX_SPLIT_ITERATIONS", default_value_t = 16)]
    pub max_split_iterations: usize,

    /// M: minimum OSMO-equivalent liquidity for an admissible pool.
    #[arg(long, env = "MIN_OSMO_LIQUIDITY", default_value = "0", value_parser = parse_decimal256)]
    pub min_osmo_liquidity: Decimal256,

    /// P: ordered list of pool ids biased towards during candidate search.
    #[arg(long, env = "PREFERRED_POOL_IDS", value_delimiter = ',')]
    pub preferred_pool_ids: Vec<u64>,

    /// Master switch for the route cache; when false every lookup falls
    /// through to the finder.
    #[arg(long, env = "ROUTE_CACHE_ENABLED", default_value_t = true)]
    pub route_cache_enabled: bool,

    #[arg(long, env = "CANDIDATE_ROUTE_CACHE_EXPIRY_SECONDS", default_value_t = 60)]
    pub candidate_route_cache_expiry_seconds: u64,

    #[arg(long, env = "RANKED_ROUTE_CACHE_EXPIRY_SECONDS", default_value_t = 600)]
    pub ranked_route_cache_expiry_seconds: u64,

    /// Operator-curated route overrides, held with no expiry until cleared.
    #[arg(long, env = "ENABLE_OVERWRITE_ROUTES_CACHE", default_value_t = false)]
    pub enable_overwrite_routes_cache: bool,

    /// TTL for non-default-quote-denom price cache entries.
    #[arg(long, env = "CACHE_EXPIRY_MS", default_value_t = 2000)]
    pub cache_expiry_ms: u64,

    /// The denom every other denom's price is expressed against by default
    /// (e.g. a USD stable). Prices against this denom are cached with no
    /// expiry and invalidated only by a block-update notification.
    #[arg(long, env = "DEFAULT_QUOTE_HUMAN_DENOM")]
    pub default_quote_human_denom: String,

    /// Pricing-specific override of `max_pools_per_route`; falls back to the
    /// routing value when unset.
    #[arg(long, env = "PRICING_MAX_POOLS_PER_ROUTE")]
    pub pricing_max_pools_per_route: Option<usize>,

    /// Pricing-specific override of `max_routes`.
    #[arg(long, env = "PRICING_MAX_ROUTES")]
    pub pricing_max_routes: Option<usize>,

    /// Pricing-specific override of `min_osmo_liquidity`.
    #[arg(long, env = "PRICING_MIN_OSMO_LIQUIDITY", value_parser = parse_decimal256)]
    pub pricing_min_osmo_liquidity: Option<Decimal256>,

    /// Deadline applied to a single quote computation.
    #[arg(long, env = "QUOTE_DEADLINE_MS", default_value_t = 2000)]
    pub quote_deadline_ms: u64,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl RouterConfig {
    pub fn pricing_max_pools_per_route(&self) -> usize {
        self.pricing_max_pools_per_route.unwrap_or(self.max_pools_per_route)
    }

    pub fn pricing_max_routes(&self) -> usize {
        self.pricing_max_routes.unwrap_or(self.max_routes)
    }

    pub fn pricing_min_osmo_liquidity(&self) -> Decimal256 {
        self.pricing_min_osmo_liquidity.unwrap_or(self.min_osmo_liquidity)
    }

    pub fn candidate_route_cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.candidate_route_cache_expiry_seconds)
    }

    pub fn ranked_route_cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ranked_route_cache_expiry_seconds)
    }

    pub fn price_cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.cache_expiry_ms)
    }

    pub fn quote_deadline(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.quote_deadline_ms)
    }
}

fn parse_decimal256(raw: &str) -> Result<Decimal256, String> {
    Decimal256::from_str(raw).map_err(|err| format!("invalid decimal '{raw}': {err}"))
}

/// Parses config from CLI args and environment, reading `.env` first the way
/// the teacher's binary does for local development.
pub fn load_config() -> RouterConfig {
    dotenvy_fallback();
    RouterConfig::parse()
}

/// Best-effort `.env` loading; a missing file is not an error, since
/// production deployments rely on real environment variables or flags.
fn dotenvy_fallback() {
    if let Ok(contents) = std::fs::read_to_string(".env") {
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value.trim());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_required_args() {
        let config = RouterConfig::parse_from([
            "router-sidecar",
            "--default-quote-human-denom",
            "uusdc",
        ]);
        assert_eq!(config.default_quote_human_denom, "uusdc");
        assert_eq!(config.max_pools_per_route, 4);
        assert_eq!(config.max_split_routes, 3);
        assert!(config.route_cache_enabled);
    }

    #[test]
    fn pricing_overrides_fall_back_to_routing_values_when_unset() {
        let config = RouterConfig::parse_from([
            "router-sidecar",
            "--default-quote-human-denom",
            "uusdc",
            "--max-pools-per-route",
            "6",
        ]);
        assert_eq!(config.pricing_max_pools_per_route(), 6);
    }

    #[test]
    fn pricing_overrides_win_when_set() {
        let config = RouterConfig::parse_from([
            "router-sidecar",
            "--default-quote-human-denom",
            "uusdc",
            "--max-routes",
            "10",
            "--pricing-max-routes",
            "3",
        ]);
        assert_eq!(config.pricing_max_routes(), 3);
    }

    #[test]
    fn preferred_pool_ids_parses_comma_list() {
        let config = RouterConfig::parse_from([
            "router-sidecar",
            "--default-quote-human-denom",
            "uusdc",
            "--preferred-pool-ids",
            "1,2,3",
        ]);
        assert_eq!(config.preferred_pool_ids, vec![1, 2, 3]);
    }
}
