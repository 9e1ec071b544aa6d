//! Snapshot of a collected graph
//!
//! This is what `JobState` persists between runs and what the `ingest`
//! command writes out.

use crate::graph::{Entity, Relationship};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything a job collected
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    /// Values steps hand to each other, by data key
    #[serde(default)]
    pub data: BTreeMap<String, JsonValue>,
}

impl GraphSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities and relationships per `_type`
    pub fn type_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        let types = self
            .entities
            .iter()
            .map(|e| &e.entity_type)
            .chain(self.relationships.iter().map(|r| &r.relationship_type));
        for t in types {
            *counts.entry(t.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty() && self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{direct_relationship, RelationshipClass};

    #[test]
    fn test_snapshot_default() {
        let snapshot = GraphSnapshot::new();
        assert!(snapshot.is_empty());
        assert!(snapshot.type_counts().is_empty());
    }

    #[test]
    fn test_type_counts() {
        let account = Entity::new("acct", "auth0_account", "Account");
        let a = Entity::new("a", "auth0_user", "User");
        let b = Entity::new("b", "auth0_user", "User");

        let snapshot = GraphSnapshot {
            relationships: vec![
                direct_relationship(RelationshipClass::Has, &account, &a),
                direct_relationship(RelationshipClass::Has, &account, &b),
            ],
            entities: vec![account, a, b],
            data: BTreeMap::new(),
        };

        let counts = snapshot.type_counts();
        assert_eq!(counts["auth0_account"], 1);
        assert_eq!(counts["auth0_user"], 2);
        assert_eq!(counts["auth0_account_has_user"], 2);
    }

    #[test]
    fn test_snapshot_serialization() {
        let mut snapshot = GraphSnapshot::new();
        snapshot.entities.push(Entity::new("k", "auth0_user", "User"));
        snapshot
            .data
            .insert("ACCOUNT_ENTITY".to_string(), serde_json::json!({"_key": "k"}));

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: GraphSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, snapshot);
    }
}
