//! Generic TTL cache substrate plus the single-flight primitive built on top
//! of it, and the two-tier route cache assembled from both.

pub mod route_cache;
pub mod singleflight;
pub mod ttl;

pub use route_cache::{RouteCache, RouteCacheHit};
pub use singleflight::SingleFlight;
pub use ttl::TtlCache;
