//! # AV Telemetry
//!
//! Structured logging for the guard services through `tracing`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use av_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AV_SERVICE_NAME` | `asset-vault` | Service name on the startup event |
//! | `AV_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `AV_JSON_LOGS` | `false` (`true` in containers) | JSON output |
//! | `AV_CONSOLE_OUTPUT` | `true` | Write to stdout |

mod config;
mod logging;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialised,
}

/// Install the global subscriber described by `config`.
///
/// Returns a guard to hold for the lifetime of the application. A second
/// call fails with `TelemetryError::AlreadyInitialised`.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
    })
}

/// Guard that marks telemetry as active.
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
