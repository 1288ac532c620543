//! Permission cache configuration

use std::time::Duration;

use crate::error::CacheError;

/// Entry lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(6 * 60 * 60);
/// Background sweep period
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);
/// Upper bound on one upstream fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound on waiting for another caller's fetch
pub const DEFAULT_COALESCE_WAIT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCacheConfig {
    /// Entries are fresh while younger than this. Whole seconds.
    pub ttl: Duration,
    pub sweep_interval: Duration,
    pub fetch_timeout: Duration,
    pub coalesce_wait: Duration,
}

impl Default for PermissionCacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            coalesce_wait: DEFAULT_COALESCE_WAIT,
        }
    }
}

impl PermissionCacheConfig {
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.ttl.as_secs() == 0 {
            return Err(CacheError::InvalidConfig(
                "ttl must be at least one second".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep_interval cannot be zero".to_string(),
            ));
        }
        if self.fetch_timeout.is_zero() {
            return Err(CacheError::InvalidConfig(
                "fetch_timeout cannot be zero".to_string(),
            ));
        }
        if self.coalesce_wait.is_zero() {
            return Err(CacheError::InvalidConfig(
                "coalesce_wait cannot be zero".to_string(),
            ));
        }
        Ok(())
    }
}
