//! Service Layer

pub mod permission_cache;
pub mod sweeper;

pub use permission_cache::{LoadReporter, PermissionCache};
pub use sweeper::{spawn_sweeper, SweeperHandle};
