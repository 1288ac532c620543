//! Domain Layer - Pure business logic
//!
//! This layer contains:
//! - Core Bloom filter implementation
//! - Hash functions and key normalization
//! - Parameter calculations
//! - Registry configuration
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod bloom_filter;
pub mod config;
pub mod hash_functions;
pub mod parameters;

pub use bloom_filter::{BloomFilter, FilterSnapshot};
pub use config::{RegistryConfig, RegistryConfigBuilder};
pub use hash_functions::{normalize_key, HashScheme};
pub use parameters::{calculate_optimal_parameters, BloomFilterParams};
