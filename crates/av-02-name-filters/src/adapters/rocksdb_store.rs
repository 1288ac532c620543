//! # RocksDB Filter Store
//!
//! Durable `FilterStore`: one key per tenant in the `name_filters` column
//! family, value = bincode-encoded `PersistedFilter`.
//!
//! Enabled with the `rocksdb` cargo feature. RocksDB calls block, so every
//! operation runs on the blocking pool.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, Options, WriteOptions, DB};

use crate::error::StoreError;
use crate::ports::{FilterStore, PersistedFilter};

/// Column family holding filter rows
pub const CF_NAME_FILTERS: &str = "name_filters";

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: String,
    /// Enable fsync after each write
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/name-filters".to_string(),
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Create config for testing (no sync)
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sync_writes: false,
        }
    }
}

/// RocksDB-backed filter store
pub struct RocksDbFilterStore {
    db: Arc<DB>,
    config: RocksDbConfig,
}

impl RocksDbFilterStore {
    /// Open or create the database
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut cf_opts = Options::default();
        cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
        let cf = ColumnFamilyDescriptor::new(CF_NAME_FILTERS, cf_opts);

        let db = DB::open_cf_descriptors(&opts, &config.path, vec![cf])
            .map_err(|e| StoreError::IOError(format!("Failed to open RocksDB: {}", e)))?;

        Ok(Self {
            db: Arc::new(db),
            config,
        })
    }

    /// Open with default settings at `path`
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open(RocksDbConfig {
            path: path.as_ref().to_string_lossy().to_string(),
            ..Default::default()
        })
    }

    pub fn config(&self) -> &RocksDbConfig {
        &self.config
    }
}

fn missing_cf() -> StoreError {
    StoreError::Unavailable(format!("column family {} missing", CF_NAME_FILTERS))
}

#[async_trait]
impl FilterStore for RocksDbFilterStore {
    async fn load(&self, tenant: &str) -> Result<Option<PersistedFilter>, StoreError> {
        let db = Arc::clone(&self.db);
        let key = tenant.as_bytes().to_vec();

        let bytes = tokio::task::spawn_blocking(move || {
            let cf = db.cf_handle(CF_NAME_FILTERS).ok_or_else(missing_cf)?;
            db.get_cf(cf, key)
                .map_err(|e| StoreError::IOError(e.to_string()))
        })
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))??;

        bytes.as_deref().map(PersistedFilter::from_bytes).transpose()
    }

    async fn save(&self, row: &PersistedFilter) -> Result<(), StoreError> {
        let db = Arc::clone(&self.db);
        let key = row.workspace.as_bytes().to_vec();
        let value = row.to_bytes()?;
        let sync = self.config.sync_writes;

        tokio::task::spawn_blocking(move || {
            let cf = db.cf_handle(CF_NAME_FILTERS).ok_or_else(missing_cf)?;
            let mut write_opts = WriteOptions::default();
            write_opts.set_sync(sync);
            db.put_cf_opt(cf, key, value, &write_opts)
                .map_err(|e| StoreError::IOError(e.to_string()))
        })
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BloomFilter, HashScheme};

    #[tokio::test]
    async fn test_rows_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_string_lossy().to_string();

        let mut filter = BloomFilter::new_with_fpr(100, 0.01, HashScheme::DoubleMurmur);
        filter.insert("deck.pdf");
        let row = PersistedFilter::from_snapshot("org/slides", filter.export(), 42);

        {
            let store = RocksDbFilterStore::open(RocksDbConfig::for_testing(path.clone())).unwrap();
            store.save(&row).await.unwrap();
        }

        let store = RocksDbFilterStore::open(RocksDbConfig::for_testing(path)).unwrap();
        let loaded = store.load("org/slides").await.unwrap().unwrap();
        assert_eq!(loaded, row);
        assert!(loaded.into_filter().unwrap().contains("Deck.pdf"));
        assert!(store.load("org/other").await.unwrap().is_none());
    }
}
