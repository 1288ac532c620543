//! Outbound Ports (Driven Ports)
//!
//! Dependencies the registry needs from the rest of the system: the
//! authoritative name source and the durable row store for filter state.

use async_trait::async_trait;
use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::domain::{BloomFilter, FilterSnapshot, HashScheme};
use crate::error::{FilterError, SourceError, StoreError};

/// Persisted filter row, one per tenant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedFilter {
    /// Tenant (workspace) identifier, the row key
    pub workspace: String,
    /// Raw bit buffer
    pub bit_array: Vec<u8>,
    /// Size in bits (m)
    pub size: usize,
    /// Number of hash probes (k)
    pub hash_count: usize,
    /// Advisory count of items added
    pub items_count: usize,
    /// Last write, seconds since the Unix epoch
    pub updated_at: u64,
    /// Probe scheme; rows written before schemes existed are polynomial
    #[serde(default = "legacy_scheme")]
    pub hash_scheme: HashScheme,
}

fn legacy_scheme() -> HashScheme {
    HashScheme::Polynomial
}

/// Row layout written before the probe scheme was recorded
#[derive(Deserialize)]
struct LegacyRow {
    workspace: String,
    bit_array: Vec<u8>,
    size: usize,
    hash_count: usize,
    items_count: usize,
    updated_at: u64,
}

impl From<LegacyRow> for PersistedFilter {
    fn from(row: LegacyRow) -> Self {
        Self {
            workspace: row.workspace,
            bit_array: row.bit_array,
            size: row.size,
            hash_count: row.hash_count,
            items_count: row.items_count,
            updated_at: row.updated_at,
            hash_scheme: legacy_scheme(),
        }
    }
}

impl PersistedFilter {
    /// Build a row from exported filter state
    pub fn from_snapshot(workspace: &str, snapshot: FilterSnapshot, updated_at: u64) -> Self {
        Self {
            workspace: workspace.to_string(),
            bit_array: snapshot.bits,
            size: snapshot.size_bits,
            hash_count: snapshot.hash_count,
            items_count: snapshot.items_count,
            updated_at,
            hash_scheme: snapshot.scheme,
        }
    }

    /// Reconstruct the filter this row describes
    pub fn into_filter(self) -> Result<BloomFilter, FilterError> {
        BloomFilter::import(FilterSnapshot {
            bits: self.bit_array,
            size_bits: self.size,
            hash_count: self.hash_count,
            items_count: self.items_count,
            scheme: self.hash_scheme,
        })
    }

    /// Encode the row for key-value stores
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        bincode::serialize(self).map_err(|e| StoreError::SerializationError(e.to_string()))
    }

    /// Decode a row written by `to_bytes`
    ///
    /// Rows in the legacy layout, without a trailing scheme, decode as
    /// `Polynomial`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let strict = || {
            bincode::DefaultOptions::new()
                .with_fixint_encoding()
                .reject_trailing_bytes()
        };
        match strict().deserialize::<Self>(bytes) {
            Ok(row) => Ok(row),
            Err(current) => strict()
                .deserialize::<LegacyRow>(bytes)
                .map(Self::from)
                .map_err(|_| StoreError::SerializationError(current.to_string())),
        }
    }
}

/// Authoritative source of asset names (Driven Port)
#[async_trait]
pub trait NameSource: Send + Sync {
    /// Every name currently known for `tenant`, used for cold-start backfill
    async fn list_names(&self, tenant: &str) -> Result<Vec<String>, SourceError>;

    /// Authoritative uniqueness check
    async fn exists_by_name_and_tenant(&self, name: &str, tenant: &str)
        -> Result<bool, SourceError>;
}

/// Durable row store for filter state (Driven Port)
#[async_trait]
pub trait FilterStore: Send + Sync {
    /// Load the row for `tenant`, `Ok(None)` when absent
    async fn load(&self, tenant: &str) -> Result<Option<PersistedFilter>, StoreError>;

    /// Upsert the row keyed by `row.workspace`
    async fn save(&self, row: &PersistedFilter) -> Result<(), StoreError>;
}

/// Time source for row timestamps
pub trait TimeSource: Send + Sync {
    /// Seconds since the Unix epoch
    fn now(&self) -> u64;
}

/// System time implementation
#[derive(Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_round_trip_preserves_answers() {
        let mut filter = BloomFilter::new_with_fpr(100, 0.01, HashScheme::Polynomial);
        filter.insert("readme.md");

        let row = PersistedFilter::from_snapshot("org/docs", filter.export(), 1_700_000_000);
        let decoded = PersistedFilter::from_bytes(&row.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, row);

        let restored = decoded.into_filter().unwrap();
        assert!(restored.contains("README.md"));
        assert_eq!(restored.items_count(), 1);
    }

    #[derive(Serialize)]
    struct SchemelessRow {
        workspace: String,
        bit_array: Vec<u8>,
        size: usize,
        hash_count: usize,
        items_count: usize,
        updated_at: u64,
    }

    #[test]
    fn test_schemeless_row_decodes_as_polynomial() {
        let mut filter = BloomFilter::new_with_fpr(100, 0.01, HashScheme::Polynomial);
        filter.insert("Banner.svg");
        let snapshot = filter.export();

        let bytes = bincode::serialize(&SchemelessRow {
            workspace: "org/docs".to_string(),
            bit_array: snapshot.bits,
            size: snapshot.size_bits,
            hash_count: snapshot.hash_count,
            items_count: snapshot.items_count,
            updated_at: 42,
        })
        .unwrap();

        let row = PersistedFilter::from_bytes(&bytes).unwrap();
        assert_eq!(row.hash_scheme, HashScheme::Polynomial);
        assert_eq!(row.updated_at, 42);

        let restored = row.into_filter().unwrap();
        assert!(restored.contains("banner.svg"));
        assert_eq!(restored.export(), filter.export());
    }

    #[test]
    fn test_current_row_keeps_its_scheme() {
        let filter = BloomFilter::new_with_fpr(100, 0.01, HashScheme::DoubleMurmur);
        let row = PersistedFilter::from_snapshot("org/docs", filter.export(), 7);

        let decoded = PersistedFilter::from_bytes(&row.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.hash_scheme, HashScheme::DoubleMurmur);

        let mut padded = row.to_bytes().unwrap();
        padded.push(0);
        assert!(PersistedFilter::from_bytes(&padded).is_err());
    }

    #[test]
    fn test_malformed_row_fails_to_import() {
        let filter = BloomFilter::new_with_fpr(100, 0.01, HashScheme::DoubleMurmur);
        let mut row = PersistedFilter::from_snapshot("org/docs", filter.export(), 0);
        row.bit_array.truncate(3);

        assert!(row.into_filter().is_err());
        assert!(PersistedFilter::from_bytes(b"garbage").is_err());
    }
}
