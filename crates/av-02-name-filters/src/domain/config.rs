//! Registry configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use av_02_name_filters::domain::RegistryConfigBuilder;
//!
//! let config = RegistryConfigBuilder::new()
//!     .expected_items(10_000)
//!     .false_positive_rate(0.01)
//!     .build()
//!     .expect("Valid config");
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::hash_functions::HashScheme;
use crate::error::FilterError;

/// Expected names per tenant for a freshly built filter.
pub const DEFAULT_EXPECTED_ITEMS: usize = 100_000;

/// Target false positive rate for a freshly built filter.
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

/// Tenant filter registry configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Expected names per tenant (n)
    pub expected_items: usize,
    /// Target false positive rate (p)
    pub false_positive_rate: f64,
    /// Probe scheme for freshly built filters
    pub hash_scheme: HashScheme,
    /// Bound on queued persistence requests
    pub persist_queue_capacity: usize,
    /// Save attempts after the first failure
    pub persist_retries: u32,
    /// Delay between save attempts, multiplied by the attempt number
    pub persist_retry_backoff: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            expected_items: DEFAULT_EXPECTED_ITEMS,
            false_positive_rate: DEFAULT_FALSE_POSITIVE_RATE,
            hash_scheme: HashScheme::default(),
            persist_queue_capacity: 1024,
            persist_retries: 3,
            persist_retry_backoff: Duration::from_millis(200),
        }
    }
}

impl RegistryConfig {
    /// Validate sizing and queue parameters
    pub fn validate(&self) -> Result<(), FilterError> {
        if !(self.false_positive_rate > 0.0 && self.false_positive_rate < 1.0) {
            return Err(FilterError::InvalidFPR {
                fpr: self.false_positive_rate,
            });
        }

        if self.expected_items == 0 {
            return Err(FilterError::InvalidParameters(
                "expected_items cannot be 0".to_string(),
            ));
        }

        if self.persist_queue_capacity == 0 {
            return Err(FilterError::InvalidParameters(
                "persist_queue_capacity cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for RegistryConfig with validation
#[derive(Default)]
pub struct RegistryConfigBuilder {
    expected_items: Option<usize>,
    false_positive_rate: Option<f64>,
    hash_scheme: Option<HashScheme>,
    persist_queue_capacity: Option<usize>,
    persist_retries: Option<u32>,
    persist_retry_backoff: Option<Duration>,
}

impl RegistryConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set expected names per tenant
    pub fn expected_items(mut self, items: usize) -> Self {
        self.expected_items = Some(items);
        self
    }

    /// Set target false positive rate
    pub fn false_positive_rate(mut self, fpr: f64) -> Self {
        self.false_positive_rate = Some(fpr);
        self
    }

    /// Set the probe scheme for new filters
    pub fn hash_scheme(mut self, scheme: HashScheme) -> Self {
        self.hash_scheme = Some(scheme);
        self
    }

    /// Set the persistence queue bound
    pub fn persist_queue_capacity(mut self, capacity: usize) -> Self {
        self.persist_queue_capacity = Some(capacity);
        self
    }

    /// Set the number of save retries
    pub fn persist_retries(mut self, retries: u32) -> Self {
        self.persist_retries = Some(retries);
        self
    }

    /// Set the retry backoff step
    pub fn persist_retry_backoff(mut self, backoff: Duration) -> Self {
        self.persist_retry_backoff = Some(backoff);
        self
    }

    /// Build the RegistryConfig, validating all parameters
    pub fn build(self) -> Result<RegistryConfig, FilterError> {
        let defaults = RegistryConfig::default();

        let config = RegistryConfig {
            expected_items: self.expected_items.unwrap_or(defaults.expected_items),
            false_positive_rate: self
                .false_positive_rate
                .unwrap_or(defaults.false_positive_rate),
            hash_scheme: self.hash_scheme.unwrap_or(defaults.hash_scheme),
            persist_queue_capacity: self
                .persist_queue_capacity
                .unwrap_or(defaults.persist_queue_capacity),
            persist_retries: self.persist_retries.unwrap_or(defaults.persist_retries),
            persist_retry_backoff: self
                .persist_retry_backoff
                .unwrap_or(defaults.persist_retry_backoff),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RegistryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.expected_items, 100_000);
        assert_eq!(config.false_positive_rate, 0.01);
    }

    #[test]
    fn test_config_validation_rejects_out_of_range_fpr() {
        for fpr in [0.0, 1.0, -0.5, f64::NAN] {
            let config = RegistryConfig {
                false_positive_rate: fpr,
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(FilterError::InvalidFPR { .. })),
                "fpr {} should be rejected",
                fpr
            );
        }
    }

    #[test]
    fn test_config_validation_rejects_zero_items() {
        let config = RegistryConfig {
            expected_items: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FilterError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_builder_creates_valid_config() {
        let config = RegistryConfigBuilder::new()
            .expected_items(500)
            .false_positive_rate(0.05)
            .hash_scheme(HashScheme::Polynomial)
            .persist_queue_capacity(8)
            .persist_retries(0)
            .build()
            .expect("Should create valid config");

        assert_eq!(config.expected_items, 500);
        assert_eq!(config.false_positive_rate, 0.05);
        assert_eq!(config.hash_scheme, HashScheme::Polynomial);
        assert_eq!(config.persist_queue_capacity, 8);
        assert_eq!(config.persist_retries, 0);
    }

    #[test]
    fn test_builder_uses_defaults() {
        let config = RegistryConfigBuilder::new()
            .expected_items(10)
            .build()
            .expect("Should use defaults for other fields");

        let defaults = RegistryConfig::default();
        assert_eq!(config.false_positive_rate, defaults.false_positive_rate);
        assert_eq!(config.persist_retries, defaults.persist_retries);
    }

    #[test]
    fn test_builder_rejects_zero_capacity() {
        let result = RegistryConfigBuilder::new().persist_queue_capacity(0).build();
        assert!(matches!(result, Err(FilterError::InvalidParameters(_))));
    }
}
