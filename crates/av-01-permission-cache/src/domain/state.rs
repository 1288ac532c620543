//! Observable cache state

use serde::{Deserialize, Serialize};

/// Advisory progress of a long upstream fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadProgress {
    pub current: u64,
    pub total: u64,
    pub status: String,
}

/// Point-in-time cache occupancy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Principals with a resident entry
    pub total_principals: usize,
    /// Grants held across all resident entries
    pub total_grants: usize,
    /// Entries with a fetch in flight
    pub loading: usize,
}
