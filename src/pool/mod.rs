//! Pool management: the abstract per-variant math interface plus the
//! concurrent registry that holds the currently-known pool set.
//!
//! Author: AI-Generated
//! Created: 2026-01-27

pub mod math;
pub mod registry;

pub use math::PoolMath;
pub use registry::{Pool, PoolRegistry, PoolSet};
