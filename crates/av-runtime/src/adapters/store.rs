//! Filter store selected at startup
//!
//! In memory unless a data directory is configured and the crate is built
//! with the `rocksdb` feature.

#[cfg(feature = "rocksdb")]
use anyhow::Context;
use async_trait::async_trait;
use av_02_name_filters::{FilterStore, InMemoryFilterStore, PersistedFilter, StoreError};
#[cfg(feature = "rocksdb")]
use av_02_name_filters::{RocksDbConfig, RocksDbFilterStore};
use tracing::info;
#[cfg(not(feature = "rocksdb"))]
use tracing::warn;

use crate::container::RuntimeConfig;

/// Directory under `data_dir` holding the filter database
pub const FILTER_DB_DIR: &str = "name-filters";

pub enum FilterStoreBackend {
    Memory(InMemoryFilterStore),
    #[cfg(feature = "rocksdb")]
    RocksDb(RocksDbFilterStore),
}

impl FilterStoreBackend {
    pub fn from_config(config: &RuntimeConfig) -> anyhow::Result<Self> {
        match &config.data_dir {
            None => {
                info!("Name filters kept in memory only");
                Ok(Self::Memory(InMemoryFilterStore::new()))
            }
            #[cfg(feature = "rocksdb")]
            Some(dir) => {
                let path = dir.join(FILTER_DB_DIR);
                let store = RocksDbFilterStore::open(RocksDbConfig {
                    path: path.to_string_lossy().to_string(),
                    sync_writes: true,
                })
                .with_context(|| format!("opening filter store at {}", path.display()))?;
                info!(path = %path.display(), "Name filters persisted to RocksDB");
                Ok(Self::RocksDb(store))
            }
            #[cfg(not(feature = "rocksdb"))]
            Some(dir) => {
                warn!(
                    data_dir = %dir.display(),
                    "Built without the rocksdb feature, name filters kept in memory only"
                );
                Ok(Self::Memory(InMemoryFilterStore::new()))
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            #[cfg(feature = "rocksdb")]
            Self::RocksDb(_) => "rocksdb",
        }
    }
}

#[async_trait]
impl FilterStore for FilterStoreBackend {
    async fn load(&self, tenant: &str) -> Result<Option<PersistedFilter>, StoreError> {
        match self {
            Self::Memory(store) => store.load(tenant).await,
            #[cfg(feature = "rocksdb")]
            Self::RocksDb(store) => store.load(tenant).await,
        }
    }

    async fn save(&self, row: &PersistedFilter) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.save(row).await,
            #[cfg(feature = "rocksdb")]
            Self::RocksDb(store) => store.save(row).await,
        }
    }
}
