//! Error types for the permission cache

use std::time::Duration;
use thiserror::Error;

/// Failures reported by the upstream permission source
///
/// The cache never propagates these; a failed fetch caches an empty grant
/// list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Cache construction errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
