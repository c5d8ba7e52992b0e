//! Split Optimiser (§4.4): distributes a single input across up to K
//! candidate routes in fixed-fraction increments to maximise total output.
//!
//! Grounded on `arbitrage/multicall_quoter.rs::MulticallQuoter`'s pattern of
//! batching many pool-math evaluations and picking the allocation with the
//! best aggregate result, generalized from a two-way price comparison into
//! an incremental-allocation search over up to `K` routes with `I`
//! discretisation steps. The greedy per-increment allocation (assign each
//! increment to whichever route has the largest marginal output right now)
//! is correct here because AMM output is concave in input size, so a local
//! best choice per increment cannot be beaten by deferring it.

use crate::error::RouteEvaluationError;
use crate::pool::registry::PoolSet;
use crate::route::evaluator::evaluate_route;
use crate::types::{Route, SplitRoute};
use cosmwasm_std::{Coin, Uint128};

/// `k`-combinations of `0..n`, used to enumerate every unordered selection
/// of up to `max_k` candidate routes.
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k == 0 || k > n {
        return Vec::new();
    }
    let mut result = Vec::new();
    let mut current = Vec::with_capacity(k);
    fn go(start: usize, n: usize, k: usize, current: &mut Vec<usize>, result: &mut Vec<Vec<usize>>) {
        if current.len() == k {
            result.push(current.clone());
            return;
        }
        for i in start..n {
            current.push(i);
            go(i + 1, n, k, current, result);
            current.pop();
        }
    }
    go(0, n, k, &mut current, &mut result);
    result
}

fn increment_sizes(total: u128, increments: usize) -> Vec<u128> {
    if increments == 0 || total == 0 {
        return Vec::new();
    }
    let base = total / increments as u128;
    let mut remainder = total - base * increments as u128;
    (0..increments)
        .map(|_| {
            let mut size = base;
            if remainder > 0 {
                size += 1;
                remainder -= 1;
            }
            size
        })
        .filter(|s| *s > 0)
        .collect()
}

/// Greedily allocates `input` across the routes at `indices` and evaluates
/// the resulting split. Returns `None` if every route fails at every
/// allocation step (e.g. all pools in the selection are exhausted).
async fn evaluate_selection(
    snapshot: &PoolSet,
    input: &Coin,
    candidates: &[Route],
    indices: &[usize],
    increments: usize,
) -> Option<(Vec<SplitRoute>, u128)> {
    let sizes = increment_sizes(input.amount.u128(), increments.max(1));
    let mut cumulative = vec![0u128; indices.len()];
    let mut cumulative_out = vec![0u128; indices.len()];

    for inc in sizes {
        let mut best: Option<(usize, u128)> = None;
        for (j, &idx) in indices.iter().enumerate() {
            let route = &candidates[idx];
            let trial_amount = cumulative[j] + inc;
            let coin_in = Coin { denom: input.denom.clone(), amount: Uint128::new(trial_amount) };
            if let Ok(eval) = evaluate_route(snapshot, route, &coin_in).await {
                let marginal = eval.amount_out.amount.u128().saturating_sub(cumulative_out[j]);
                if best.map(|(_, m)| marginal > m).unwrap_or(true) {
                    best = Some((j, marginal));
                }
            }
        }
        if let Some((j, _)) = best {
            cumulative[j] += inc;
            let coin_in = Coin { denom: input.denom.clone(), amount: Uint128::new(cumulative[j]) };
            if let Ok(eval) = evaluate_route(snapshot, &candidates[indices[j]], &coin_in).await {
                cumulative_out[j] = eval.amount_out.amount.u128();
            }
        }
    }

    let mut result = Vec::new();
    let mut total_out = 0u128;
    for (j, &idx) in indices.iter().enumerate() {
        if cumulative[j] == 0 {
            continue;
        }
        let route = candidates[idx].clone();
        let coin_in = Coin { denom: input.denom.clone(), amount: Uint128::new(cumulative[j]) };
        if let Ok(eval) = evaluate_route(snapshot, &route, &coin_in).await {
            total_out += eval.amount_out.amount.u128();
            result.push(SplitRoute {
                route,
                amount_in: coin_in,
                amount_out: eval.amount_out,
                result_pools: eval.result_pools,
            });
        }
    }

    if result.is_empty() {
        None
    } else {
        Some((result, total_out))
    }
}

/// Finds the best allocation of `input` across `candidates` (already
/// filtered to exclude generalised-CosmWasm routes by the caller).
///
/// `max_split_routes == 0` short-circuits to the best single full-amount
/// route, matching §4.4's disabled-splitting behaviour.
pub async fn optimise(
    snapshot: &PoolSet,
    input: &Coin,
    candidates: &[Route],
    max_split_routes: usize,
    max_split_iterations: usize,
) -> Result<Option<Vec<SplitRoute>>, RouteEvaluationError> {
    if candidates.is_empty() {
        return Ok(None);
    }
    let k_max = if max_split_routes == 0 { 1 } else { max_split_routes.min(candidates.len()) };
    let increments = max_split_iterations.max(1);

    let mut best: Option<(Vec<SplitRoute>, u128, usize, usize)> = None;
    for k in 1..=k_max {
        for indices in combinations(candidates.len(), k) {
            if let Some((split, total_out)) = evaluate_selection(snapshot, input, candidates, &indices, increments).await {
                let index_sum: usize = indices.iter().sum();
                let is_better = match &best {
                    None => true,
                    Some((_, best_out, best_k, best_sum)) => {
                        (total_out, std::cmp::Reverse(k), std::cmp::Reverse(index_sum))
                            > (*best_out, std::cmp::Reverse(*best_k), std::cmp::Reverse(*best_sum))
                    }
                };
                if is_better {
                    best = Some((split, total_out, k, index_sum));
                }
            }
        }
    }

    Ok(best.map(|(split, _, _, _)| split))
}
