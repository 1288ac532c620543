//! Error types for the name filter subsystem

use thiserror::Error;

/// Errors raised by the filter itself and its configuration
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid false positive rate: {fpr} (must be strictly between 0 and 1)")]
    InvalidFPR { fpr: f64 },

    #[error("Invalid filter parameters: {0}")]
    InvalidParameters(String),

    #[error("Inconsistent filter state: {bytes} bytes for {size_bits} bits (expected {expected})")]
    InconsistentState {
        bytes: usize,
        size_bits: usize,
        expected: usize,
    },

    #[error("Cannot merge filters: {0}")]
    Incompatible(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Errors from the durable filter store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    IOError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the name source of truth
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Timeout")]
    Timeout,
}

/// Errors surfaced by the registry's authoritative lookup path
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Name source error: {0}")]
    Source(#[from] SourceError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),
}
