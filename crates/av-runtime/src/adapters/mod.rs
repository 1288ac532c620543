//! Runtime-level adapters.

pub mod store;

pub use store::FilterStoreBackend;
