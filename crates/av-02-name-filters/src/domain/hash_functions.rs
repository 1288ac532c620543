//! Hash functions for the name filter
//!
//! Two probe schemes are supported. Both map `(key, seed)` to a bit position
//! in `[0, m)` and a filter always probes with seeds `0..k`.
//!
//! - `Polynomial`: the rolling `hash * 31 + unit` accumulator over UTF-16 code
//!   units, seeded with the probe index and truncated to a signed 32-bit
//!   integer. Bit-compatible with filter rows written by earlier deployments.
//! - `DoubleMurmur`: MurmurHash3 x64-128 double hashing, `h1 + i * h2`.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Probe scheme used to map a key onto bit positions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashScheme {
    /// MurmurHash3 double hashing
    #[default]
    DoubleMurmur,
    /// Legacy rolling polynomial hash
    Polynomial,
}

impl HashScheme {
    /// Bit position for probe `seed` of an already-normalized key.
    pub fn probe(&self, key: &str, seed: u32, m: usize) -> usize {
        match self {
            HashScheme::Polynomial => polynomial_position(key, seed, m),
            HashScheme::DoubleMurmur => {
                let (h1, h2) = murmur_pair(key.as_bytes());
                double_hash_position(h1, h2, seed as u64, m)
            }
        }
    }

    /// All `k` bit positions of an already-normalized key.
    pub fn positions(&self, key: &str, k: usize, m: usize) -> Vec<usize> {
        match self {
            HashScheme::Polynomial => (0..k)
                .map(|i| polynomial_position(key, i as u32, m))
                .collect(),
            HashScheme::DoubleMurmur => {
                let (h1, h2) = murmur_pair(key.as_bytes());
                (0..k)
                    .map(|i| double_hash_position(h1, h2, i as u64, m))
                    .collect()
            }
        }
    }
}

impl fmt::Display for HashScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashScheme::DoubleMurmur => write!(f, "double_murmur"),
            HashScheme::Polynomial => write!(f, "polynomial"),
        }
    }
}

impl FromStr for HashScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "double_murmur" | "murmur" => Ok(HashScheme::DoubleMurmur),
            "polynomial" | "legacy" => Ok(HashScheme::Polynomial),
            other => Err(format!("unknown hash scheme: {other}")),
        }
    }
}

/// Canonical form of a name: surrounding whitespace trimmed, lower-cased.
///
/// Every add and every query goes through this, so `"Logo.png"` and
/// `"  logo.png "` land on the same bits.
pub fn normalize_key(item: &str) -> String {
    item.trim().to_lowercase()
}

/// Rolling polynomial hash of `key`, starting from `seed`.
///
/// Arithmetic wraps at 32 bits exactly like the signed accumulator it must
/// stay compatible with.
pub fn polynomial_hash(key: &str, seed: u32) -> i32 {
    let mut hash = seed as i32;
    for unit in key.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(unit as i32);
    }
    hash
}

fn polynomial_position(key: &str, seed: u32, m: usize) -> usize {
    (polynomial_hash(key, seed).unsigned_abs() as u64 % m as u64) as usize
}

/// Hash an element with MurmurHash3 using a seed
pub fn murmur_hash(element: &[u8], seed: u32) -> u64 {
    let mut cursor = Cursor::new(element);

    // Use murmur3 128-bit hash and take the lower 64 bits
    let hash = murmur3::murmur3_x64_128(&mut cursor, seed).unwrap_or(0);
    hash as u64
}

fn murmur_pair(element: &[u8]) -> (u64, u64) {
    (murmur_hash(element, 0), murmur_hash(element, 1))
}

fn double_hash_position(h1: u64, h2: u64, i: u64, m: usize) -> usize {
    let hash = h1.wrapping_add(i.wrapping_mul(h2));
    (hash % m as u64) as usize
}
