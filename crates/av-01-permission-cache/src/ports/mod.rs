//! Ports Layer
//!
//! Driven ports only: the cache is called directly by request handlers.

pub mod outbound;

pub use outbound::{LoadProgressSink, PermissionSource, SystemTimeSource, TimeSource};
