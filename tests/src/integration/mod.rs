//! Cross-crate flows.

pub mod fixtures;

mod asset_names;
mod permission_flows;
