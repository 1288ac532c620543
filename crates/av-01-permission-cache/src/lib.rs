//! # AV-01 Permission Cache
//!
//! TTL cache from principal to per-resource grants, in front of a slow and
//! rate-limited authorization provider.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): `AccessLevel`, `ResourceGrant`,
//!   `PermissionCacheConfig`, `CacheStats`, `LoadProgress`
//! - **Ports Layer** (`ports/`): `PermissionSource`, `LoadProgressSink`,
//!   `TimeSource`
//! - **Service Layer** (`service/`): `PermissionCache` and the background
//!   sweeper
//!
//! ## Behaviour
//!
//! - An entry is usable while younger than the TTL (6 hours by default),
//!   otherwise it is treated as absent and evicted.
//! - `get_or_load` fetches at most once per key at a time. Concurrent
//!   callers wait on the in-flight fetch, bounded by `coalesce_wait`.
//! - Upstream failures cache an empty grant list. Cache operations never
//!   return errors.
//!
//! ```ignore
//! let cache = Arc::new(PermissionCache::new(PermissionCacheConfig::default())?);
//! let sweeper = spawn_sweeper(Arc::clone(&cache), cache.config().sweep_interval);
//!
//! let grants = cache.get_or_load("alice", &github).await;
//!
//! sweeper.stop().await;
//! ```

pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::{AccessLevel, CacheStats, LoadProgress, PermissionCacheConfig, ResourceGrant};
pub use error::{CacheError, SourceError};
pub use metrics::{CacheMetrics, CacheMetricsSnapshot};
pub use ports::{LoadProgressSink, PermissionSource, SystemTimeSource, TimeSource};
pub use service::{spawn_sweeper, LoadReporter, PermissionCache, SweeperHandle};
