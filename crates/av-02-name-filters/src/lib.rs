//! # AV-02 Name Filters
//!
//! Per-tenant Bloom filters over entity names, used to answer "has this
//! name ever been used here?" without touching the primary database.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `BloomFilter`: Bit array, probing, snapshot import/export
//!   - `HashScheme`: Probe derivation, recorded alongside every filter
//!   - `RegistryConfig`: Sizing and persistence settings
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `NameFilterApi`: Driving port
//!   - `NameSource`: Authoritative names per tenant
//!   - `FilterStore`: One persisted row per tenant
//!
//! - **Service Layer** (`service/`)
//!   - `TenantFilterRegistry`: Lazy load, backfill, best-effort persistence
//!   - `PersistenceWorker`: Drains the save queue
//!
//! - **Adapters Layer** (`adapters/`)
//!   - `InMemoryFilterStore`
//!   - `RocksDbFilterStore` (feature `rocksdb`)
//!
//! ## Invariants
//!
//! - A name inserted into a tenant's filter is always reported as possibly
//!   present. A negative answer is definite.
//! - Names are matched after `trim` and lowercasing.
//! - A filter that cannot be built answers "possibly present".
//!
//! ## Usage Example
//!
//! ```ignore
//! use av_02_name_filters::{InMemoryFilterStore, RegistryConfig, TenantFilterRegistry};
//! use std::sync::Arc;
//!
//! let (registry, worker) = TenantFilterRegistry::new(
//!     Arc::new(my_name_source),
//!     Arc::new(InMemoryFilterStore::new()),
//!     RegistryConfig::default(),
//! )?;
//! tokio::spawn(worker.run());
//!
//! if !registry.might_contain("org/docs", "logo.png").await {
//!     // definitely unused
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::InMemoryFilterStore;
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConfig, RocksDbFilterStore};
pub use domain::{
    calculate_optimal_parameters, normalize_key, BloomFilter, BloomFilterParams, FilterSnapshot,
    HashScheme, RegistryConfig, RegistryConfigBuilder,
};
pub use error::{FilterError, RegistryError, SourceError, StoreError};
pub use metrics::{RegistryMetrics, RegistryMetricsSnapshot};
pub use ports::{FilterStore, NameFilterApi, NameSource, PersistedFilter, SystemTimeSource, TimeSource};
pub use service::{
    FilterInfo, PersistCommand, PersistenceWorker, SharedFilter, TenantFilterRegistry,
};
