//! Domain Layer
//!
//! Grants, access levels, configuration and observable state. No I/O.

pub mod config;
pub mod grant;
pub mod state;

pub use config::PermissionCacheConfig;
pub use grant::{dedupe_grants, merge_grants, AccessLevel, ResourceGrant};
pub use state::{CacheStats, LoadProgress};
