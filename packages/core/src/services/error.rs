//! Service Layer Error Types
//!
//! This module defines error types for service-layer operations. Store
//! failures are carried through unchanged (`Store` is transparent); every
//! other variant is either a not-found outcome or an invariant violation
//! rejected before anything is written.

use crate::config::ConfigError;
use crate::models::{NodeId, TranslationId, ValidationError, VersionId};
use thiserror::Error;

/// Node, translation and version service errors
#[derive(Error, Debug)]
pub enum NodeServiceError {
    /// Node missing, or soft-deleted and not explicitly requested
    #[error("Node not found: {id}")]
    NodeNotFound { id: NodeId },

    #[error("Node translation not found: {id}")]
    TranslationNotFound { id: TranslationId },

    #[error("Version not found: {id}")]
    VersionNotFound { id: VersionId },

    /// Validation failed for a draft or node
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Parent missing or soft-deleted
    #[error("Invalid parent node: {parent_id}")]
    InvalidParent { parent_id: NodeId },

    /// Move would make a node its own ancestor
    #[error("Circular reference detected: {context}")]
    CircularReference { context: String },

    /// Sibling ordering or other tree constraint violated
    #[error("Hierarchy constraint violated: {0}")]
    HierarchyViolation(String),

    #[error("Node {node_id} already has a translation for language '{lang}'")]
    DuplicateTranslation { node_id: NodeId, lang: String },

    /// Entity bindings are one-way
    #[error("Node {node_id} is already bound to entity type '{bound}', cannot rebind to '{requested}'")]
    EntityAlreadyBound {
        node_id: NodeId,
        bound: String,
        requested: String,
    },

    /// Configuration value unusable at the point of use
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Store-level failure, propagated unchanged
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl NodeServiceError {
    pub fn node_not_found(id: NodeId) -> Self {
        Self::NodeNotFound { id }
    }

    pub fn translation_not_found(id: TranslationId) -> Self {
        Self::TranslationNotFound { id }
    }

    pub fn version_not_found(id: VersionId) -> Self {
        Self::VersionNotFound { id }
    }

    pub fn invalid_parent(parent_id: NodeId) -> Self {
        Self::InvalidParent { parent_id }
    }

    pub fn circular_reference(context: impl Into<String>) -> Self {
        Self::CircularReference {
            context: context.into(),
        }
    }

    pub fn hierarchy_violation(msg: impl Into<String>) -> Self {
        Self::HierarchyViolation(msg.into())
    }

    /// True for the not-found family of outcomes
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NodeNotFound { .. } | Self::TranslationNotFound { .. } | Self::VersionNotFound { .. }
        )
    }
}

/// Render resolution errors
///
/// Skip conditions are not errors; see `RenderOutcome::Skipped`.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Neither the request nor a preview version supplied an entity to render
    #[error("No entity to render for node translation {translation_id}")]
    MissingEntity { translation_id: TranslationId },

    /// Context value could not be converted to JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoreError;

    #[test]
    fn test_not_found_family() {
        assert!(NodeServiceError::node_not_found(NodeId(1)).is_not_found());
        assert!(NodeServiceError::version_not_found(VersionId(1)).is_not_found());
        assert!(!NodeServiceError::hierarchy_violation("dup").is_not_found());
    }

    #[test]
    fn test_store_errors_pass_through_unchanged() {
        let err: NodeServiceError = anyhow::Error::from(StoreError::unavailable("get_node")).into();
        assert_eq!(err.to_string(), "Store unavailable: get_node");
        match err {
            NodeServiceError::Store(inner) => {
                assert!(inner.downcast_ref::<StoreError>().is_some())
            }
            other => panic!("Expected Store, got {:?}", other),
        }
    }
}
