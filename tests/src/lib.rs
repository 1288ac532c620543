//! # Asset-Vault Guard Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs          # In-memory collaborators
//!     ├── asset_names.rs       # Filter registry against a name source and store
//!     └── permission_flows.rs  # Permission cache behind the guard container
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p av-tests
//! cargo bench -p av-tests
//! ```

pub mod integration;
