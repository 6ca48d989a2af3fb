//! Domain Events for the Node Tree
//!
//! Emitted by `NodeService` after a mutation has been committed to the store,
//! using tokio's broadcast channel so any number of observers (cache
//! invalidation, search indexing, menu rebuilding) can follow tree changes
//! without coupling to the service.

use crate::models::{Node, NodeId};
use serde::{Deserialize, Serialize};

/// A node changed position in the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMove {
    pub node_id: NodeId,
    pub old_parent_id: Option<NodeId>,
    pub new_parent_id: Option<NodeId>,
    pub sequence_number: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    /// A new node was persisted
    NodeCreated(Node),

    /// Node attributes changed (entity binding, navigation flag, label)
    NodeUpdated(Node),

    /// A node was soft-deleted
    NodeDeleted { id: NodeId },

    /// A node was reparented or repositioned
    NodeMoved(NodeMove),

    /// A sibling set was renumbered; ids listed in their new order
    SiblingsReordered {
        parent_id: Option<NodeId>,
        ordered_ids: Vec<NodeId>,
    },
}

impl DomainEvent {
    pub fn event_type(&self) -> &str {
        match self {
            DomainEvent::NodeCreated(_) => "node:created",
            DomainEvent::NodeUpdated(_) => "node:updated",
            DomainEvent::NodeDeleted { .. } => "node:deleted",
            DomainEvent::NodeMoved(_) => "node:moved",
            DomainEvent::SiblingsReordered { .. } => "siblings:reordered",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_types() {
        assert_eq!(
            DomainEvent::NodeDeleted { id: NodeId(1) }.event_type(),
            "node:deleted"
        );
        assert_eq!(
            DomainEvent::SiblingsReordered {
                parent_id: None,
                ordered_ids: vec![]
            }
            .event_type(),
            "siblings:reordered"
        );
    }

    #[test]
    fn test_node_move_serialization_contract() {
        let moved = NodeMove {
            node_id: NodeId(4),
            old_parent_id: Some(NodeId(1)),
            new_parent_id: None,
            sequence_number: 3,
        };

        let json = serde_json::to_value(&moved).unwrap();
        assert_eq!(json["nodeId"], 4);
        assert_eq!(json["oldParentId"], 1);
        assert!(json["newParentId"].is_null());
        assert_eq!(json["sequenceNumber"], 3);
    }
}
