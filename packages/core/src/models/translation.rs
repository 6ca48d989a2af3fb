//! Node translations: the per-language publishing record of a node.

use super::node::{NodeId, ValidationError};
use super::version::VersionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned translation identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationId(pub i64);

impl fmt::Display for TranslationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Language-specific publishing record, exclusively owned by one node.
///
/// `public_version_id` is the slot the render pipeline reads to find the
/// entity currently live for this language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTranslation {
    pub id: TranslationId,

    /// Owning node (back-reference only)
    pub node_id: NodeId,

    pub lang: String,

    /// Whether the translation is publicly resolvable
    pub online: bool,

    pub title: String,

    /// URL segment for this language
    pub slug: Option<String>,

    pub public_version_id: Option<VersionId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl NodeTranslation {
    pub fn from_draft(id: TranslationId, node_id: NodeId, draft: NewTranslation) -> Self {
        let now = Utc::now();
        Self {
            id,
            node_id,
            lang: draft.lang,
            online: draft.online,
            title: draft.title,
            slug: draft.slug,
            public_version_id: draft.public_version_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Parameters for adding a translation to a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTranslation {
    pub lang: String,
    pub title: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub public_version_id: Option<VersionId>,
}

impl NewTranslation {
    /// Offline translation for `lang` with the given title
    pub fn new(lang: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            title: title.into(),
            slug: None,
            online: false,
            public_version_id: None,
        }
    }

    pub fn online(mut self, online: bool) -> Self {
        self.online = online;
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_public_version(mut self, version_id: VersionId) -> Self {
        self.public_version_id = Some(version_id);
        self
    }

    /// Language codes must be non-empty and free of whitespace
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.lang.is_empty() || self.lang.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidLanguage(self.lang.clone()));
        }
        Ok(())
    }
}
