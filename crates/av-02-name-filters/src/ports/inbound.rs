//! Inbound Ports (Driving Ports)
//!
//! The API request handlers use to consult per-tenant name filters.

use async_trait::async_trait;

use crate::error::RegistryError;

/// Per-tenant name filter API (Driving Port)
///
/// Cache operations never fail from the caller's point of view: store and
/// source failures degrade to slower, still-correct answers.
#[async_trait]
pub trait NameFilterApi: Send + Sync {
    /// `false` means the name is definitely unused in `tenant`; `true` means
    /// "maybe" and must be confirmed against the source of truth.
    async fn might_contain(&self, tenant: &str, name: &str) -> bool;

    /// Record a newly created name. Persistence is best-effort and deferred.
    async fn add_name(&self, tenant: &str, name: &str);

    /// Authoritative uniqueness check, short-circuited by the filter
    async fn name_exists(&self, tenant: &str, name: &str) -> Result<bool, RegistryError>;

    /// Drop every in-memory filter; persisted rows are untouched
    fn clear_cache(&self);
}
