//! # AV Runtime
//!
//! Wires the permission cache and the tenant filter registry into one
//! container and owns their background tasks.
//!
//! ```rust,ignore
//! use av_runtime::{init_telemetry, FilterStoreBackend, GuardContainer, RuntimeConfig, TelemetryConfig};
//!
//! let _telemetry = init_telemetry(&TelemetryConfig::from_env())?;
//! let config = RuntimeConfig::from_env();
//! let store = Arc::new(FilterStoreBackend::from_config(&config)?);
//! let guards = GuardContainer::new(config, github, Arc::new(assets_db), store)?;
//! let handle = guards.start()?;
//!
//! // serve requests with `guards.authorize(..)` and `guards.name_filters()`
//!
//! handle.shutdown().await;
//! ```

pub mod adapters;
pub mod container;

pub use adapters::FilterStoreBackend;
pub use av_telemetry::{init_telemetry, TelemetryConfig, TelemetryError, TelemetryGuard};
pub use container::{GuardContainer, RuntimeConfig, RuntimeHandle};
