//! # Runtime Configuration
//!
//! Configuration for both guard components, read from the environment.
//! Absent or unparsable variables keep their defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use av_01_permission_cache::PermissionCacheConfig;
use av_02_name_filters::{HashScheme, RegistryConfig};
use tracing::warn;

/// Complete guard configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Permission cache configuration.
    pub permissions: PermissionCacheConfig,
    /// Tenant filter registry configuration.
    pub filters: RegistryConfig,
    /// Directory for durable filter rows; in-memory when unset.
    pub data_dir: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AV_PERMISSION_TTL_SECS`: Permission entry TTL (default: 21600)
    /// - `AV_SWEEP_INTERVAL_SECS`: Expiry sweep period (default: 3600)
    /// - `AV_FETCH_TIMEOUT_SECS`: Upstream permission fetch timeout (default: 30)
    /// - `AV_COALESCE_WAIT_MS`: Wait for another caller's fetch (default: 10000)
    /// - `AV_FILTER_EXPECTED_ITEMS`: Names per tenant filter (default: 100000)
    /// - `AV_FILTER_FPR`: Target false positive rate (default: 0.01)
    /// - `AV_FILTER_HASH_SCHEME`: `double_murmur` or `polynomial` (default: double_murmur)
    /// - `AV_DATA_DIR`: Directory for durable filter rows (default: unset)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(secs) = parse_var::<u64>(&lookup, "AV_PERMISSION_TTL_SECS") {
            config.permissions.ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "AV_SWEEP_INTERVAL_SECS") {
            config.permissions.sweep_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "AV_FETCH_TIMEOUT_SECS") {
            config.permissions.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "AV_COALESCE_WAIT_MS") {
            config.permissions.coalesce_wait = Duration::from_millis(ms);
        }
        if let Some(items) = parse_var::<usize>(&lookup, "AV_FILTER_EXPECTED_ITEMS") {
            config.filters.expected_items = items;
        }
        if let Some(fpr) = parse_var::<f64>(&lookup, "AV_FILTER_FPR") {
            config.filters.false_positive_rate = fpr;
        }
        if let Some(scheme) = parse_var::<HashScheme>(&lookup, "AV_FILTER_HASH_SCHEME") {
            config.filters.hash_scheme = scheme;
        }

        config.data_dir = lookup("AV_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        config
    }

    /// Validate both component configurations.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.permissions.validate()?;
        self.filters.validate()?;
        Ok(())
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = key, value = %raw, "Ignoring unparsable environment variable");
            None
        }
    }
}
