//! Node Data Structures
//!
//! This module defines the `Node` struct, the language-independent position of
//! a piece of content in the tree, together with the `NewNode` draft used
//! before a node is persisted.
//!
//! # Lifecycle
//!
//! - **Draft**: `NewNode::new()` creates an empty draft (no parent, not hidden)
//! - **Attach**: `NewNode::attach_to()` sets the parent
//! - **Pre-commit**: `NodeService::assign_sequence_number()` fills the sibling position
//! - **Persist**: `NodeService::insert_node()` hands the draft to the store, which assigns the id
//!
//! Deletion is always logical (`deleted = true`); nodes are never physically removed.
//!
//! # Examples
//!
//! ```rust
//! use nodetree_core::models::NewNode;
//!
//! let draft = NewNode::new()
//!     .with_entity_type("page")
//!     .with_internal_name("homepage");
//!
//! assert!(draft.parent_id.is_none());
//! assert!(draft.sequence_number.is_none());
//! assert!(draft.validate().is_ok());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Validation errors for Node and translation drafts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid sequence number: {0}")]
    InvalidSequenceNumber(i64),

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),

    #[error("Invalid language code: {0:?}")]
    InvalidLanguage(String),
}

/// Store-assigned node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted position in the content hierarchy.
///
/// # Fields
///
/// - `id`: Store-assigned identifier
/// - `parent_id`: Owning side of the parent/child relationship (`None` for roots)
/// - `sequence_number`: 1-based position among live siblings
/// - `deleted`: Soft-delete flag, excluded from live traversals
/// - `hidden_from_nav`: Navigation-only flag, no effect on resolution
/// - `ref_entity_type`: Type tag of the bound content entity (set once)
/// - `internal_name`: Optional human label
///
/// Children are not stored on the node. They are derived by querying the
/// store for nodes whose `parent_id` points here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,

    pub parent_id: Option<NodeId>,

    pub sequence_number: i64,

    pub deleted: bool,

    pub hidden_from_nav: bool,

    /// Bound content-entity type; `None` until `bind_entity` runs
    pub ref_entity_type: Option<String>,

    pub internal_name: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Materialize a draft with the id handed out by the store.
    ///
    /// Fails if the draft never went through sequence-number assignment.
    pub fn from_draft(id: NodeId, draft: NewNode) -> Result<Self, ValidationError> {
        draft.validate()?;
        let sequence_number = draft
            .sequence_number
            .ok_or_else(|| ValidationError::MissingField("sequence_number".to_string()))?;
        let now = Utc::now();

        Ok(Self {
            id,
            parent_id: draft.parent_id,
            sequence_number,
            deleted: false,
            hidden_from_nav: draft.hidden_from_nav,
            ref_entity_type: draft.ref_entity_type,
            internal_name: draft.internal_name,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Validate structural fields of a persisted node
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sequence_number < 1 {
            return Err(ValidationError::InvalidSequenceNumber(self.sequence_number));
        }

        if self.parent_id == Some(self.id) {
            return Err(ValidationError::InvalidParent(format!(
                "node {} references itself as parent",
                self.id
            )));
        }

        if matches!(&self.ref_entity_type, Some(t) if t.trim().is_empty()) {
            return Err(ValidationError::MissingField("ref_entity_type".to_string()));
        }

        Ok(())
    }

    /// Bump `updated_at` after a mutation
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "node {}, refEntityType: {}",
            self.id,
            self.ref_entity_type.as_deref().unwrap_or("-")
        )
    }
}

/// A node that has not been persisted yet.
///
/// `sequence_number` stays `None` until the explicit pre-commit step
/// (`NodeService::assign_sequence_number`) fills it in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNode {
    pub parent_id: Option<NodeId>,
    pub sequence_number: Option<i64>,
    pub hidden_from_nav: bool,
    pub ref_entity_type: Option<String>,
    pub internal_name: Option<String>,
}

impl NewNode {
    /// Create an empty draft: no parent, not hidden, no entity binding
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the draft under `parent`
    ///
    /// Only records the parent reference. The parent's children are derived
    /// by query, so the change becomes visible once the draft is persisted.
    pub fn attach_to(mut self, parent: &Node) -> Self {
        self.parent_id = Some(parent.id);
        self
    }

    /// Bind the node to an entity type at creation
    ///
    /// Once persisted the binding follows `NodeService::bind_entity` rules and
    /// cannot be changed.
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.ref_entity_type = Some(entity_type.into());
        self
    }

    pub fn with_internal_name(mut self, internal_name: impl Into<String>) -> Self {
        self.internal_name = Some(internal_name.into());
        self
    }

    pub fn with_sequence_number(mut self, sequence_number: i64) -> Self {
        self.sequence_number = Some(sequence_number);
        self
    }

    pub fn hidden_from_nav(mut self, hidden: bool) -> Self {
        self.hidden_from_nav = hidden;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(n) = self.sequence_number {
            if n < 1 {
                return Err(ValidationError::InvalidSequenceNumber(n));
            }
        }

        if matches!(&self.ref_entity_type, Some(t) if t.trim().is_empty()) {
            return Err(ValidationError::MissingField("ref_entity_type".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persisted(id: i64, parent: Option<i64>, seq: i64) -> Node {
        let mut draft = NewNode::new().with_sequence_number(seq);
        draft.parent_id = parent.map(NodeId);
        Node::from_draft(NodeId(id), draft).unwrap()
    }

    #[test]
    fn test_new_node_defaults() {
        let draft = NewNode::new();
        assert_eq!(draft.parent_id, None);
        assert_eq!(draft.sequence_number, None);
        assert!(!draft.hidden_from_nav);
        assert_eq!(draft.ref_entity_type, None);
    }

    #[test]
    fn test_attach_to_sets_parent_only() {
        let parent = persisted(7, None, 1);
        let draft = NewNode::new().attach_to(&parent);
        assert_eq!(draft.parent_id, Some(NodeId(7)));
        assert_eq!(draft.sequence_number, None);
    }

    #[test]
    fn test_from_draft_requires_sequence_number() {
        let err = Node::from_draft(NodeId(1), NewNode::new()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField("sequence_number".to_string())
        );
    }

    #[test]
    fn test_from_draft_starts_live() {
        let node = persisted(3, Some(1), 2);
        assert!(!node.deleted);
        assert!(!node.is_root());
        assert_eq!(node.sequence_number, 2);
        assert!(node.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_self_parent() {
        let node = persisted(4, Some(4), 1);
        assert!(matches!(
            node.validate(),
            Err(ValidationError::InvalidParent(_))
        ));
    }

    #[test]
    fn test_draft_rejects_blank_entity_type() {
        let draft = NewNode::new().with_entity_type("  ");
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_display() {
        let node = persisted(5, None, 1);
        assert_eq!(node.to_string(), "node 5, refEntityType: -");
    }

    #[test]
    fn test_serializes_camel_case() {
        let node = persisted(9, Some(2), 1);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["parentId"], 2);
        assert_eq!(json["sequenceNumber"], 1);
        assert_eq!(json["hiddenFromNav"], false);
    }
}
