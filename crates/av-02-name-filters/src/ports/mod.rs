//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for request handlers
//! - Driven Ports (outbound) - Name source, filter store, clock

pub mod inbound;
pub mod outbound;

pub use inbound::NameFilterApi;
pub use outbound::{FilterStore, NameSource, PersistedFilter, SystemTimeSource, TimeSource};
