//! Access levels and per-resource grants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Permission level on a single resource, ordered from weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Read,
    Triage,
    Write,
    Maintain,
    Admin,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Read => "read",
            AccessLevel::Triage => "triage",
            AccessLevel::Write => "write",
            AccessLevel::Maintain => "maintain",
            AccessLevel::Admin => "admin",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" | "pull" => Ok(AccessLevel::Read),
            "triage" => Ok(AccessLevel::Triage),
            "write" | "push" => Ok(AccessLevel::Write),
            "maintain" => Ok(AccessLevel::Maintain),
            "admin" => Ok(AccessLevel::Admin),
            other => Err(format!("unknown access level: {}", other)),
        }
    }
}

/// One `{resource_id, level}` pair held for a principal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceGrant {
    pub resource_id: String,
    pub level: AccessLevel,
}

impl ResourceGrant {
    pub fn new(resource_id: impl Into<String>, level: AccessLevel) -> Self {
        Self {
            resource_id: resource_id.into(),
            level,
        }
    }

    /// Whether this grant satisfies `required`
    pub fn allows(&self, required: AccessLevel) -> bool {
        self.level >= required
    }
}

/// Merge `incoming` into `existing` by resource id; incoming grants win
pub fn merge_grants(existing: &mut Vec<ResourceGrant>, incoming: Vec<ResourceGrant>) {
    for grant in incoming {
        match existing
            .iter_mut()
            .find(|g| g.resource_id == grant.resource_id)
        {
            Some(slot) => *slot = grant,
            None => existing.push(grant),
        }
    }
}

/// Collapse duplicate resource ids, keeping the last occurrence
pub fn dedupe_grants(grants: Vec<ResourceGrant>) -> Vec<ResourceGrant> {
    let mut unique = Vec::with_capacity(grants.len());
    merge_grants(&mut unique, grants);
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(AccessLevel::Read < AccessLevel::Triage);
        assert!(AccessLevel::Triage < AccessLevel::Write);
        assert!(AccessLevel::Write < AccessLevel::Maintain);
        assert!(AccessLevel::Maintain < AccessLevel::Admin);
    }

    #[test]
    fn test_allows() {
        let grant = ResourceGrant::new("org/docs", AccessLevel::Write);
        assert!(grant.allows(AccessLevel::Read));
        assert!(grant.allows(AccessLevel::Write));
        assert!(!grant.allows(AccessLevel::Admin));
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("Admin".parse::<AccessLevel>(), Ok(AccessLevel::Admin));
        assert_eq!(" push ".parse::<AccessLevel>(), Ok(AccessLevel::Write));
        assert!("owner".parse::<AccessLevel>().is_err());
        assert_eq!(AccessLevel::Maintain.to_string(), "maintain");
    }

    #[test]
    fn test_serde_lowercase() {
        let grant = ResourceGrant::new("r1", AccessLevel::Triage);
        let json = serde_json::to_string(&grant).unwrap();
        assert_eq!(json, r#"{"resource_id":"r1","level":"triage"}"#);
        let back: ResourceGrant = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grant);
    }

    #[test]
    fn test_merge_overwrites_by_id() {
        let mut grants = vec![ResourceGrant::new("r1", AccessLevel::Admin)];
        merge_grants(
            &mut grants,
            vec![
                ResourceGrant::new("r1", AccessLevel::Write),
                ResourceGrant::new("r2", AccessLevel::Read),
            ],
        );
        assert_eq!(
            grants,
            vec![
                ResourceGrant::new("r1", AccessLevel::Write),
                ResourceGrant::new("r2", AccessLevel::Read),
            ]
        );
    }

    #[test]
    fn test_dedupe_keeps_last() {
        let grants = dedupe_grants(vec![
            ResourceGrant::new("r1", AccessLevel::Read),
            ResourceGrant::new("r2", AccessLevel::Read),
            ResourceGrant::new("r1", AccessLevel::Maintain),
        ]);
        assert_eq!(grants.len(), 2);
        assert_eq!(grants[0], ResourceGrant::new("r1", AccessLevel::Maintain));
    }
}
