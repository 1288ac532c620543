//! In-memory filter store
//!
//! Process-local `FilterStore`, used when no durable backend is configured
//! and throughout the tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::ports::{FilterStore, PersistedFilter};

/// `FilterStore` backed by a map of rows
#[derive(Default)]
pub struct InMemoryFilterStore {
    rows: RwLock<HashMap<String, PersistedFilter>>,
}

impl InMemoryFilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current row for `tenant`, if any
    pub fn row(&self, tenant: &str) -> Option<PersistedFilter> {
        self.rows.read().get(tenant).cloned()
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl FilterStore for InMemoryFilterStore {
    async fn load(&self, tenant: &str) -> Result<Option<PersistedFilter>, StoreError> {
        Ok(self.row(tenant))
    }

    async fn save(&self, row: &PersistedFilter) -> Result<(), StoreError> {
        self.rows
            .write()
            .insert(row.workspace.clone(), row.clone());
        Ok(())
    }
}
