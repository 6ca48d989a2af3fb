//! Content versions and the entities they reference.

use super::translation::TranslationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned, numeric version identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(pub i64);

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    Public,
    Draft,
}

/// Reference to a content entity: its type tag plus its id within that type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub entity_type: String,
    pub id: String,
}

impl EntityRef {
    pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.entity_type, self.id)
    }
}

/// A loaded content entity
///
/// `default_view` names the template the entity renders with; `fields` holds
/// the entity's own data as a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub entity_type: String,
    pub id: String,
    pub default_view: String,
    #[serde(default)]
    pub fields: serde_json::Value,
}

impl Entity {
    pub fn new(
        entity_type: impl Into<String>,
        id: impl Into<String>,
        default_view: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
            default_view: default_view.into(),
            fields: serde_json::json!({}),
        }
    }

    pub fn with_fields(mut self, fields: serde_json::Value) -> Self {
        self.fields = fields;
        self
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.entity_type.clone(), self.id.clone())
    }
}

/// One stored revision of a translation's content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: VersionId,
    pub node_translation_id: TranslationId,
    pub version_type: VersionType,
    pub entity: EntityRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for storing a new version
#[derive(Debug, Clone, PartialEq)]
pub struct NewVersion {
    pub node_translation_id: TranslationId,
    pub version_type: VersionType,
    pub entity: EntityRef,
    pub created_at: DateTime<Utc>,
}

impl Version {
    pub fn from_draft(id: VersionId, draft: NewVersion) -> Self {
        Self {
            id,
            node_translation_id: draft.node_translation_id,
            version_type: draft.version_type,
            entity: draft.entity,
            created_at: draft.created_at,
            updated_at: draft.created_at,
        }
    }
}
