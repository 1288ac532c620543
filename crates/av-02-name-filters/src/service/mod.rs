//! Service Layer
//!
//! Orchestrates the per-tenant filters against the name source and the
//! filter store.

pub mod tenant_registry;

pub use tenant_registry::{
    FilterInfo, PersistCommand, PersistenceWorker, SharedFilter, TenantFilterRegistry,
};
