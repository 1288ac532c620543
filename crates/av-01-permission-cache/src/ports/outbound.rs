//! Outbound Ports (Driven Ports)
//!
//! Dependencies the permission cache needs from the outside world.

use async_trait::async_trait;

use crate::domain::ResourceGrant;
use crate::error::SourceError;

/// Receives partial results while a fetch is still running
pub trait LoadProgressSink: Send + Sync {
    /// Grants discovered so far; merged into the entry by resource id
    fn report_batch(&self, grants: Vec<ResourceGrant>);

    /// Advisory progress for UI feedback
    fn report_progress(&self, current: u64, total: u64, status: &str);
}

/// Upstream authorization provider
///
/// Slow, rate-limited and fallible. The cache applies its own timeout around
/// every call.
#[async_trait]
pub trait PermissionSource: Send + Sync {
    /// Every grant held by `principal`
    async fn fetch_permissions(
        &self,
        principal: &str,
        progress: &dyn LoadProgressSink,
    ) -> Result<Vec<ResourceGrant>, SourceError>;
}

/// Time source for entry timestamps
pub trait TimeSource: Send + Sync {
    /// Seconds since the Unix epoch
    fn now(&self) -> u64;
}

/// System time implementation
#[derive(Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
