//! Entity and relationship types
//!
//! Serialized with the underscore-prefixed metadata keys the graph
//! ingestion pipeline expects (`_key`, `_type`, `_class`, ...). Mapped
//! properties sit next to them at the top level.

use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Entity
// ============================================================================

/// Source record an entity was built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawData {
    pub name: String,
    pub raw_data: JsonValue,
}

impl RawData {
    pub fn default_source(raw_data: JsonValue) -> Self {
        Self {
            name: "default".to_string(),
            raw_data,
        }
    }
}

/// A node in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub entity_type: String,
    #[serde(rename = "_class")]
    pub class: Vec<String>,
    #[serde(flatten)]
    pub properties: JsonObject,
    #[serde(rename = "_rawData", default, skip_serializing_if = "Vec::is_empty")]
    pub raw_data: Vec<RawData>,
}

impl Entity {
    pub fn new(
        key: impl Into<String>,
        entity_type: impl Into<String>,
        class: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            entity_type: entity_type.into(),
            class: vec![class.into()],
            properties: JsonObject::new(),
            raw_data: Vec::new(),
        }
    }

    /// Set a property. `None` and JSON `null` leave the property unset.
    #[must_use]
    pub fn with_property<V: Serialize>(mut self, name: &str, value: V) -> Self {
        self.set_property(name, value);
        self
    }

    pub fn set_property<V: Serialize>(&mut self, name: &str, value: V) {
        match serde_json::to_value(value) {
            Ok(JsonValue::Null) | Err(_) => {
                self.properties.remove(name);
            }
            Ok(value) => {
                self.properties.insert(name.to_string(), value);
            }
        }
    }

    #[must_use]
    pub fn with_raw_data(mut self, raw: JsonValue) -> Self {
        self.raw_data.push(RawData::default_source(raw));
        self
    }

    pub fn property(&self, name: &str) -> Option<&JsonValue> {
        self.properties.get(name)
    }

    /// The `webLink` property, when present
    pub fn web_link(&self) -> Option<&str> {
        self.property("webLink").and_then(JsonValue::as_str)
    }
}

// ============================================================================
// Relationship
// ============================================================================

/// Verb of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RelationshipClass {
    Has,
    Contains,
    Uses,
}

impl RelationshipClass {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipClass::Has => "HAS",
            RelationshipClass::Contains => "CONTAINS",
            RelationshipClass::Uses => "USES",
        }
    }
}

impl fmt::Display for RelationshipClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An edge between two entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub relationship_type: String,
    #[serde(rename = "_class")]
    pub class: RelationshipClass,
    #[serde(rename = "_fromEntityKey")]
    pub from_entity_key: String,
    #[serde(rename = "_toEntityKey")]
    pub to_entity_key: String,
    #[serde(flatten)]
    pub properties: JsonObject,
}

/// Relationship between two existing entities.
///
/// Key is `<from>|<verb>|<to>`. Type is `<fromType>_<verb>_<toType>`, with
/// the provider prefix the two types share dropped from the target
/// (`auth0_account` + `auth0_user` gives `auth0_account_has_user`).
pub fn direct_relationship(class: RelationshipClass, from: &Entity, to: &Entity) -> Relationship {
    let verb = class.as_str().to_lowercase();
    Relationship {
        key: format!("{}|{verb}|{}", from.key, to.key),
        relationship_type: relationship_type(&from.entity_type, &verb, &to.entity_type),
        class,
        from_entity_key: from.key.clone(),
        to_entity_key: to.key.clone(),
        properties: JsonObject::new(),
    }
}

fn relationship_type(from_type: &str, verb: &str, to_type: &str) -> String {
    let target = match from_type.split_once('_') {
        Some((prefix, _)) => to_type
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('_'))
            .unwrap_or(to_type),
        None => to_type,
    };
    format!("{from_type}_{verb}_{target}")
}
