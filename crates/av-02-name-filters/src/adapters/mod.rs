//! Adapters Layer
//!
//! Concrete `FilterStore` implementations:
//! - `InMemoryFilterStore`: process-local rows
//! - `RocksDbFilterStore`: durable rows (feature `rocksdb`)

pub mod memory_store;
#[cfg(feature = "rocksdb")]
pub mod rocksdb_store;

pub use memory_store::InMemoryFilterStore;
#[cfg(feature = "rocksdb")]
pub use rocksdb_store::{RocksDbConfig, RocksDbFilterStore};
