//! Bloom filter sizing
//!
//! Formulas:
//! - m = ceil(-n*ln(p) / (ln(2)^2))  -- bits
//! - k = ceil((m/n) * ln(2))         -- hash probes
//! - FPR(n) = (1 - e^(-kn/m))^k

use std::f64::consts::LN_2;

/// Bloom filter parameters
#[derive(Clone, Debug, PartialEq)]
pub struct BloomFilterParams {
    /// Number of bits in the filter (m)
    pub size_bits: usize,
    /// Number of hash probes (k)
    pub hash_count: usize,
    /// False positive rate once `n` items have been added
    pub expected_fpr: f64,
}

/// Calculate Bloom filter parameters for `num_elements` items at `target_fpr`.
///
/// A zero element count yields the smallest usable filter (one bit, one probe).
pub fn calculate_optimal_parameters(num_elements: usize, target_fpr: f64) -> BloomFilterParams {
    if num_elements == 0 {
        return BloomFilterParams {
            size_bits: 1,
            hash_count: 1,
            expected_fpr: 1.0,
        };
    }

    let n = num_elements as f64;
    let m = minimum_bits(num_elements, target_fpr).max(1);
    let k = (((m as f64 / n) * LN_2).ceil() as usize).max(1);

    BloomFilterParams {
        size_bits: m,
        hash_count: k,
        expected_fpr: calculate_fpr(m, num_elements, k),
    }
}

/// Calculate the false positive rate for given parameters
///
/// Formula: FPR = (1 - e^(-kn/m))^k
pub fn calculate_fpr(m: usize, n: usize, k: usize) -> f64 {
    if m == 0 {
        return 1.0;
    }
    let exponent = -(k as f64) * (n as f64) / (m as f64);
    (1.0 - exponent.exp()).powi(k as i32)
}

/// Calculate minimum m for given n and target FPR
pub fn minimum_bits(n: usize, target_fpr: f64) -> usize {
    let ln2_squared = LN_2 * LN_2;
    (-(n as f64) * target_fpr.ln() / ln2_squared).ceil() as usize
}
