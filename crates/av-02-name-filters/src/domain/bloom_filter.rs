//! Core Bloom filter for asset names
//!
//! INVARIANTS:
//! - No false negatives: once `insert(x)` returns, `contains(x)` is true until `clear()`.
//! - `size_bits` and `hash_count` never change after construction.
//! - The raw bit buffer is always `ceil(size_bits / 8)` bytes, LSB-first within a byte.

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use super::hash_functions::{normalize_key, HashScheme};
use super::parameters::{calculate_fpr, calculate_optimal_parameters};
use crate::error::FilterError;

/// Bloom filter for probabilistic name membership
///
/// Keys are normalized (trimmed, lower-cased) before hashing, so membership
/// is case- and padding-insensitive.
#[derive(Clone, Debug)]
pub struct BloomFilter {
    /// Bit array storing the filter state
    bits: BitVec<u8, Lsb0>,
    /// Number of hash probes (k)
    k: usize,
    /// Size in bits (m)
    m: usize,
    /// Items added since construction or the last clear (advisory)
    n: usize,
    /// Probe scheme
    scheme: HashScheme,
}

/// Exported filter state, the unit of persistence
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSnapshot {
    /// Raw bit buffer, `ceil(size_bits / 8)` bytes
    pub bits: Vec<u8>,
    /// Size in bits (m)
    pub size_bits: usize,
    /// Number of hash probes (k)
    pub hash_count: usize,
    /// Advisory count of items added
    pub items_count: usize,
    /// Probe scheme the bits were written with
    pub scheme: HashScheme,
}

impl BloomFilter {
    /// Create a filter with explicit size and probe count
    pub fn new(m: usize, k: usize, scheme: HashScheme) -> Result<Self, FilterError> {
        if m == 0 || k == 0 {
            return Err(FilterError::InvalidParameters(format!(
                "size_bits ({m}) and hash_count ({k}) must be non-zero"
            )));
        }
        Ok(Self {
            bits: bitvec![u8, Lsb0; 0; m],
            k,
            m,
            n: 0,
            scheme,
        })
    }

    /// Create a filter sized for `expected_elements` at `target_fpr`
    pub fn new_with_fpr(expected_elements: usize, target_fpr: f64, scheme: HashScheme) -> Self {
        let params = calculate_optimal_parameters(expected_elements, target_fpr);
        Self {
            bits: bitvec![u8, Lsb0; 0; params.size_bits],
            k: params.hash_count,
            m: params.size_bits,
            n: 0,
            scheme,
        }
    }

    /// Add an item. Idempotent with respect to the bit array.
    pub fn insert(&mut self, item: &str) {
        let key = normalize_key(item);
        for pos in self.scheme.positions(&key, self.k, self.m) {
            self.bits.set(pos, true);
        }
        self.n += 1;
    }

    /// Test if an item might be in the filter
    ///
    /// Returns:
    /// - `true` if the item might be in the set (could be false positive)
    /// - `false` if the item is definitely NOT in the set (never false negative)
    pub fn contains(&self, item: &str) -> bool {
        let key = normalize_key(item);
        self.scheme
            .positions(&key, self.k, self.m)
            .into_iter()
            .all(|pos| self.bits[pos])
    }

    /// Estimated false positive rate after `items_added` insertions
    ///
    /// Formula: FPR = (1 - e^(-kn/m))^k. Advisory only.
    pub fn false_positive_estimate(&self, items_added: usize) -> f64 {
        calculate_fpr(self.m, items_added, self.k)
    }

    /// Estimated false positive rate at the current item count
    pub fn false_positive_rate(&self) -> f64 {
        self.false_positive_estimate(self.n)
    }

    /// Merge another filter into this one (OR operation)
    ///
    /// Both filters must share size, probe count and scheme.
    pub fn merge(&mut self, other: &BloomFilter) -> Result<(), FilterError> {
        if self.m != other.m || self.k != other.k || self.scheme != other.scheme {
            return Err(FilterError::Incompatible(format!(
                "(m={}, k={}, {}) vs (m={}, k={}, {})",
                self.m, self.k, self.scheme, other.m, other.k, other.scheme
            )));
        }

        let self_raw = self.bits.as_raw_mut_slice();
        let other_raw = other.bits.as_raw_slice();
        for (s, o) in self_raw.iter_mut().zip(other_raw.iter()) {
            *s |= *o;
        }
        self.n += other.n;
        Ok(())
    }

    /// Get the number of bits set in the filter
    pub fn bits_set(&self) -> usize {
        self.bits.count_ones()
    }

    /// Get the filter size in bits
    pub fn size_bits(&self) -> usize {
        self.m
    }

    /// Get the number of hash probes
    pub fn hash_count(&self) -> usize {
        self.k
    }

    /// Get the advisory item count
    pub fn items_count(&self) -> usize {
        self.n
    }

    /// Get the probe scheme
    pub fn scheme(&self) -> HashScheme {
        self.scheme
    }

    /// Clear the filter (reset all bits to 0)
    pub fn clear(&mut self) {
        self.bits.fill(false);
        self.n = 0;
    }

    /// Export the filter state
    pub fn export(&self) -> FilterSnapshot {
        FilterSnapshot {
            bits: self.bits.as_raw_slice().to_vec(),
            size_bits: self.m,
            hash_count: self.k,
            items_count: self.n,
            scheme: self.scheme,
        }
    }

    /// Rebuild a filter from exported state
    ///
    /// Rejects buffers whose length disagrees with `size_bits`, and zero sizes.
    pub fn import(snapshot: FilterSnapshot) -> Result<Self, FilterError> {
        let FilterSnapshot {
            bits,
            size_bits,
            hash_count,
            items_count,
            scheme,
        } = snapshot;

        if size_bits == 0 || hash_count == 0 {
            return Err(FilterError::InvalidParameters(format!(
                "size_bits ({size_bits}) and hash_count ({hash_count}) must be non-zero"
            )));
        }

        let expected = size_bits.div_ceil(8);
        if bits.len() != expected {
            return Err(FilterError::InconsistentState {
                bytes: bits.len(),
                size_bits,
                expected,
            });
        }

        let mut bits = BitVec::<u8, Lsb0>::from_vec(bits);
        bits.truncate(size_bits);

        Ok(Self {
            bits,
            k: hash_count,
            m: size_bits,
            n: items_count,
            scheme,
        })
    }

    /// Serialize the filter to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, FilterError> {
        bincode::serialize(&self.export()).map_err(|e| FilterError::SerializationError(e.to_string()))
    }

    /// Deserialize a filter from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FilterError> {
        let snapshot: FilterSnapshot = bincode::deserialize(bytes)
            .map_err(|e| FilterError::SerializationError(e.to_string()))?;
        Self::import(snapshot)
    }
}
