//! Candidate Route Finder (§4.2): bounded-depth search over the pool
//! registry's denom adjacency index.
//!
//! Grounded on the retrieval pack's pathfinder shape (depth-bounded DFS over
//! a token graph, explored pool-first per hop) generalized to Osmosis'
//! many-denom pools (a single stable/transmuter pool step can branch into
//! several candidate next-denoms, not just two).

use crate::pool::registry::PoolSet;
use crate::pool::math::PoolMath;
use crate::types::{Denom, PoolId, Route, RouteStep};
use cosmwasm_std::Decimal256;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct FinderOptions {
    /// L: max pools per route.
    pub max_pools_per_route: usize,
    /// N: max candidate routes returned.
    pub max_routes: usize,
    /// M: minimum OSMO-equivalent liquidity for an admissible pool.
    pub min_osmo_liquidity: Decimal256,
    /// P: ordered preferred-pool bias.
    pub preferred_pool_ids: Vec<PoolId>,
}

impl Default for FinderOptions {
    fn default() -> Self {
        Self {
            max_pools_per_route: 4,
            max_routes: 10,
            min_osmo_liquidity: Decimal256::zero(),
            preferred_pool_ids: Vec::new(),
        }
    }
}

/// Hard cap on routes explored internally before sorting and truncating to
/// `max_routes`, bounding search cost on densely-connected denom graphs
/// while still honouring the "stop once N are emitted" intent.
fn explore_cap(max_routes: usize) -> usize {
    (max_routes * 4).max(32)
}

pub fn find_routes(snapshot: &PoolSet, token_in: &Denom, token_out: &Denom, opts: &FinderOptions) -> Vec<Route> {
    if token_in == token_out || opts.max_pools_per_route == 0 {
        return Vec::new();
    }

    let preferred_rank: HashMap<PoolId, usize> = opts
        .preferred_pool_ids
        .iter()
        .enumerate()
        .map(|(rank, id)| (*id, rank))
        .collect();

    let mut found = Vec::new();
    let mut path_pool_ids: Vec<PoolId> = Vec::new();
    let mut path_steps: Vec<RouteStep> = Vec::new();
    let cap = explore_cap(opts.max_routes);

    dfs(
        snapshot,
        token_in,
        token_in,
        token_out,
        opts,
        &preferred_rank,
        &mut path_pool_ids,
        &mut path_steps,
        &mut found,
        cap,
    );

    found.sort_by(|a, b| route_order_key(a, &preferred_rank, snapshot).cmp(&route_order_key(b, &preferred_rank, snapshot)));
    found.truncate(opts.max_routes);
    found
}

#[allow(clippy::too_many_arguments)]
fn dfs(
    snapshot: &PoolSet,
    token_in: &Denom,
    current_denom: &Denom,
    token_out: &Denom,
    opts: &FinderOptions,
    preferred_rank: &HashMap<PoolId, usize>,
    path_pool_ids: &mut Vec<PoolId>,
    path_steps: &mut Vec<RouteStep>,
    found: &mut Vec<Route>,
    cap: usize,
) {
    if found.len() >= cap {
        return;
    }
    if current_denom == token_out && !path_steps.is_empty() {
        found.push(build_route(token_in, path_steps, snapshot));
    }
    if path_steps.len() >= opts.max_pools_per_route {
        return;
    }

    let mut next_pools: Vec<PoolId> = snapshot
        .neighbours(current_denom)
        .iter()
        .copied()
        .filter(|id| !path_pool_ids.contains(id))
        .collect();
    next_pools.sort_by_key(|id| (preferred_rank.get(id).copied().unwrap_or(usize::MAX), *id));

    for pool_id in next_pools {
        if found.len() >= cap {
            return;
        }
        let Some(pool) = snapshot.get(pool_id) else { continue };
        if pool.math().liquidity_osmo_equivalent() < opts.min_osmo_liquidity {
            continue;
        }
        for next_denom in pool.denoms() {
            if next_denom == *current_denom {
                continue;
            }
            path_pool_ids.push(pool_id);
            path_steps.push(RouteStep { pool_id, token_out_denom: next_denom.clone() });

            dfs(snapshot, token_in, &next_denom, token_out, opts, preferred_rank, path_pool_ids, path_steps, found, cap);

            path_steps.pop();
            path_pool_ids.pop();
        }
    }
}

fn build_route(token_in: &Denom, steps: &[RouteStep], snapshot: &PoolSet) -> Route {
    let contains_generalised_cw_pool = steps.iter().any(|s| {
        snapshot
            .get(s.pool_id)
            .map(|p| p.math().pool_type().is_generalised_cosmwasm())
            .unwrap_or(false)
    });
    Route {
        token_in_denom: token_in.clone(),
        steps: steps.to_vec(),
        contains_generalised_cw_pool,
    }
}

/// Ascending sort key implementing "preferred-pool-count desc, liquidity sum
/// desc, pool-id ascending lexicographic" via negation/inversion so a plain
/// ascending sort produces the right order. Route depth is the primary key,
/// shorter routes first.
fn route_order_key(
    route: &Route,
    preferred_rank: &HashMap<PoolId, usize>,
    snapshot: &PoolSet,
) -> (usize, std::cmp::Reverse<usize>, std::cmp::Reverse<Decimal256>, Vec<PoolId>) {
    let preferred_count = route.pool_ids().filter(|id| preferred_rank.contains_key(id)).count();
    let liquidity_sum = route
        .pool_ids()
        .filter_map(|id| snapshot.get(id).map(|p| p.math().liquidity_osmo_equivalent()))
        .fold(Decimal256::zero(), |acc, l| acc + l);
    (route.len(), std::cmp::Reverse(preferred_count), std::cmp::Reverse(liquidity_sum), route.pool_ids().collect())
}
