//! # Guard Container
//!
//! Configuration and dependency injection for the guard components.

pub mod config;
pub mod guards;

pub use config::RuntimeConfig;
pub use guards::{GuardContainer, RuntimeHandle};
