//! Job state implementation
//!
//! Collects entities and relationships for one run and persists them as a
//! JSON snapshot with atomic writes.

use super::types::GraphSnapshot;
use crate::error::{Error, Result};
use crate::graph::{Entity, Relationship};
use crate::types::JsonValue;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct Inner {
    snapshot: GraphSnapshot,
    entity_keys: HashSet<String>,
    relationship_keys: HashSet<String>,
}

impl Inner {
    fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self> {
        let mut inner = Self::default();
        for entity in snapshot.entities {
            inner.insert_entity(entity)?;
        }
        for relationship in snapshot.relationships {
            inner.insert_relationship(relationship)?;
        }
        inner.snapshot.data = snapshot.data;
        Ok(inner)
    }

    fn insert_entity(&mut self, entity: Entity) -> Result<()> {
        if !self.entity_keys.insert(entity.key.clone()) {
            return Err(Error::DuplicateKey {
                kind: "entity",
                key: entity.key,
            });
        }
        self.snapshot.entities.push(entity);
        Ok(())
    }

    fn insert_relationship(&mut self, relationship: Relationship) -> Result<()> {
        if !self.relationship_keys.insert(relationship.key.clone()) {
            return Err(Error::DuplicateKey {
                kind: "relationship",
                key: relationship.key,
            });
        }
        self.snapshot.relationships.push(relationship);
        Ok(())
    }
}

/// Entity and relationship sink shared by every step of a job.
///
/// Clones share the same underlying state. Keys are unique per kind: adding
/// a second entity (or relationship) with an existing `_key` fails with
/// [`Error::DuplicateKey`].
#[derive(Debug, Clone, Default)]
pub struct JobState {
    inner: Arc<RwLock<Inner>>,
}

impl JobState {
    /// Create an empty job state
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a job state from a snapshot
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(RwLock::new(Inner::from_snapshot(snapshot)?)),
        })
    }

    /// Load a snapshot written by [`JobState::save_to_file`]
    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::state(format!("Failed to read state file: {e}"))
            }
        })?;

        let snapshot: GraphSnapshot = serde_json::from_str(&contents)
            .map_err(|e| Error::state(format!("Failed to parse state file: {e}")))?;

        Self::from_snapshot(snapshot)
    }

    /// Add an entity
    pub async fn add_entity(&self, entity: Entity) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.insert_entity(entity)
    }

    /// Add entities in order, stopping at the first duplicate
    pub async fn add_entities(&self, entities: impl IntoIterator<Item = Entity>) -> Result<()> {
        let mut inner = self.inner.write().await;
        for entity in entities {
            inner.insert_entity(entity)?;
        }
        Ok(())
    }

    /// Add a relationship
    pub async fn add_relationship(&self, relationship: Relationship) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.insert_relationship(relationship)
    }

    /// Whether an entity with this key was added
    pub async fn has_key(&self, key: &str) -> bool {
        self.inner.read().await.entity_keys.contains(key)
    }

    /// Store a value for later steps
    pub async fn set_data<V: Serialize>(&self, key: &str, value: V) -> Result<()> {
        let value = serde_json::to_value(value)?;
        let mut inner = self.inner.write().await;
        inner.snapshot.data.insert(key.to_string(), value);
        Ok(())
    }

    /// Value stored under `key`
    pub async fn get_data(&self, key: &str) -> Option<JsonValue> {
        self.inner.read().await.snapshot.data.get(key).cloned()
    }

    /// Value stored under `key`, deserialized. `None` if nothing was stored.
    pub async fn get_data_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_data(key).await {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn entities(&self) -> Vec<Entity> {
        self.inner.read().await.snapshot.entities.clone()
    }

    pub async fn relationships(&self) -> Vec<Relationship> {
        self.inner.read().await.snapshot.relationships.clone()
    }

    pub async fn entity_count(&self) -> usize {
        self.inner.read().await.snapshot.entities.len()
    }

    pub async fn relationship_count(&self) -> usize {
        self.inner.read().await.snapshot.relationships.len()
    }

    /// Number of entities and relationships per `_type`
    pub async fn type_counts(&self) -> BTreeMap<String, usize> {
        self.inner.read().await.snapshot.type_counts()
    }

    /// Copy of everything collected so far
    pub async fn snapshot(&self) -> GraphSnapshot {
        self.inner.read().await.snapshot.clone()
    }

    /// Export as pretty-printed JSON
    pub async fn to_json_pretty(&self) -> Result<String> {
        let inner = self.inner.read().await;
        serde_json::to_string_pretty(&inner.snapshot)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))
    }

    /// Write the snapshot to `path`
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = self.to_json_pretty().await?;

        // Write to temp file first, then rename for atomicity
        let path = path.as_ref();
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;

        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        debug!(path = %path.display(), bytes = contents.len(), "Saved job state");
        Ok(())
    }
}
