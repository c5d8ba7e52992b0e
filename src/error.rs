//! Error taxonomy for the quote router and pricing engine.
//!
//! Route-level failures ([`PoolMathError`]) are recovered locally by the
//! evaluator/optimiser and never surface as a [`RouterError`] unless every
//! candidate route fails. Everything else surfaces verbatim to the caller.

use crate::types::PoolId;
use thiserror::Error;

/// Top-level error returned by the router and pricing use cases.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("input error: {0}")]
    Input(#[from] InputError),

    #[error("not found: {0}")]
    NotFound(#[from] NotFoundError),

    #[error("routing failure: all {attempted} candidate route(s) failed evaluation")]
    RoutingFailure { attempted: usize },

    #[error("timeout: {0}")]
    Timeout(#[from] TimeoutError),

    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("unknown denom: {0}")]
    UnknownDenom(String),

    #[error("malformed amount: {0}")]
    MalformedAmount(String),

    #[error("pool {0} is not part of this quote")]
    IncompatiblePool(PoolId),

    #[error("token-in and token-out denom must differ for a routed quote")]
    SameDenom,
}

#[derive(Debug, Error)]
pub enum NotFoundError {
    #[error("no route found from {token_in} to {token_out}")]
    NoRoute { token_in: String, token_out: String },

    #[error("pool {0} not found")]
    PoolNotFound(PoolId),

    #[error("no scaling factor registered for denom {0}")]
    ScalingFactorNotFound(String),
}

/// A single pool evaluation failing. Disqualifies the route it occurred in;
/// never escapes to a caller directly — see [`RouterError::RoutingFailure`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PoolMathError {
    #[error("pool {pool_id} returned zero output for a non-zero input")]
    ZeroOutput { pool_id: PoolId },

    #[error("pool {pool_id} produced a non-finite spot price")]
    NonFiniteSpotPrice { pool_id: PoolId },

    #[error("pool {pool_id} remote call failed: {reason}")]
    RemoteCallFailed { pool_id: PoolId, reason: String },

    #[error("pool {pool_id} does not contain denom {denom}")]
    DenomNotInPool { pool_id: PoolId, denom: String },
}

/// Failure evaluating a single route end-to-end: either a pool-math failure
/// partway through, or a route referencing a pool the current snapshot no
/// longer contains (routes are cached and may outlive the pools they name).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouteEvaluationError {
    #[error("pool math failure: {0}")]
    PoolMath(#[from] PoolMathError),

    #[error("pool {pool_id} referenced by a cached route no longer exists")]
    PoolMissing { pool_id: PoolId },
}

#[derive(Debug, Error)]
pub enum TimeoutError {
    #[error("operation exceeded deadline of {deadline_ms}ms")]
    DeadlineExceeded { deadline_ms: u64 },
}

#[derive(Debug, Error)]
pub enum InternalError {
    #[error("cache entry type mismatch for key {key}")]
    CacheTypeMismatch { key: String },

    #[error("invariant violated: {0}")]
    InvariantViolated(String),
}
