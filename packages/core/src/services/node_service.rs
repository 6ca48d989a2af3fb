//! Node Service - Tree Operations
//!
//! This module provides the business logic layer for the node tree:
//!
//! - Creation with explicit sequence-number assignment (pre-commit step)
//! - Traversal (live children, roots, ancestors)
//! - Soft deletion, with an explicit opt-in cascade
//! - One-way entity binding
//! - Move and reorder, keeping every live sibling set numbered 1..N
//!
//! # Sibling Numbering
//!
//! Sequence numbers are 1-based positions among live siblings; roots form a
//! sibling set of their own. Every operation that changes a sibling set
//! (insert, move, reorder, soft delete) computes the full renumbering up front
//! and hands it to `NodeStore::commit_nodes` as one batch, so readers never see
//! duplicates or gaps mid-operation.
//!
//! # Not-Found Semantics
//!
//! Operations on a missing or soft-deleted node return
//! `NodeServiceError::NodeNotFound` unless the caller passes
//! `include_deleted = true`.

use crate::db::{DomainEvent, NodeMove, NodeStore};
use crate::models::{NewNode, Node, NodeId, ValidationError};
use crate::services::error::NodeServiceError;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast channel capacity for domain events.
const DOMAIN_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Renumber `siblings` to 1..N in their current order.
///
/// Nodes whose number actually changes are pushed onto `changed`.
fn renumber(siblings: Vec<Node>, changed: &mut Vec<Node>) {
    for (index, mut sibling) in siblings.into_iter().enumerate() {
        let position = index as i64 + 1;
        if sibling.sequence_number != position {
            sibling.sequence_number = position;
            sibling.touch();
            changed.push(sibling);
        }
    }
}

/// Core service for node hierarchy operations
///
/// # Examples
///
/// ```no_run
/// use nodetree_core::db::InMemoryStore;
/// use nodetree_core::models::NewNode;
/// use nodetree_core::services::NodeService;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let service = NodeService::new(Arc::new(InMemoryStore::new()));
///
///     let root = service.create_node(NewNode::new().with_entity_type("page")).await?;
///     let child = service.create_node(NewNode::new().attach_to(&root)).await?;
///
///     assert_eq!(child.sequence_number, 1);
///     assert_eq!(service.ancestors(child.id).await?[0].id, root.id);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct NodeService {
    store: Arc<dyn NodeStore>,

    /// Broadcast channel for domain events
    event_tx: broadcast::Sender<DomainEvent>,
}

impl NodeService {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        let (event_tx, _) = broadcast::channel(DOMAIN_EVENT_CHANNEL_CAPACITY);
        Self { store, event_tx }
    }

    /// Subscribe to domain events emitted after committed mutations
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    fn emit_event(&self, event: DomainEvent) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }

    //
    // CREATION
    //

    /// Fill in the draft's sequence number if it has none.
    ///
    /// Idempotent: a draft that already carries a number keeps it. Otherwise
    /// the number is `count(live siblings) + 1`, where the siblings are the
    /// parent's live children, or the live roots for a parentless draft.
    ///
    /// This is the explicit pre-commit step; call it before `insert_node`.
    pub async fn assign_sequence_number(
        &self,
        draft: &mut NewNode,
    ) -> Result<i64, NodeServiceError> {
        if let Some(existing) = draft.sequence_number {
            return Ok(existing);
        }

        if let Some(parent_id) = draft.parent_id {
            self.require_live_parent(parent_id).await?;
        }

        let live_siblings = self.store.get_children(draft.parent_id, false).await?;
        let sequence_number = live_siblings.len() as i64 + 1;
        draft.sequence_number = Some(sequence_number);

        tracing::debug!(
            "Assigned sequence number {} under parent {:?}",
            sequence_number,
            draft.parent_id
        );
        Ok(sequence_number)
    }

    /// Persist a draft whose sequence number has already been assigned
    ///
    /// # Errors
    ///
    /// - `HierarchyViolation` if the draft has no sequence number, or one that
    ///   is taken by a live sibling or beyond `count(live siblings) + 1`
    /// - `InvalidParent` if the parent is missing or soft-deleted
    /// - `ValidationFailed` for malformed drafts
    pub async fn insert_node(&self, draft: NewNode) -> Result<Node, NodeServiceError> {
        draft.validate()?;

        let sequence_number = draft.sequence_number.ok_or_else(|| {
            NodeServiceError::hierarchy_violation(
                "sequence number must be assigned before the node is inserted",
            )
        })?;

        if let Some(parent_id) = draft.parent_id {
            self.require_live_parent(parent_id).await?;
        }

        let live_siblings = self.store.get_children(draft.parent_id, false).await?;
        if sequence_number > live_siblings.len() as i64 + 1 {
            return Err(NodeServiceError::hierarchy_violation(format!(
                "sequence number {} leaves a gap after {} live siblings",
                sequence_number,
                live_siblings.len()
            )));
        }
        if live_siblings
            .iter()
            .any(|n| n.sequence_number == sequence_number)
        {
            return Err(NodeServiceError::hierarchy_violation(format!(
                "sequence number {} is already taken under parent {:?}",
                sequence_number, draft.parent_id
            )));
        }

        let node = self.store.create_node(draft).await?;
        tracing::info!(
            "Created node {} (parent {:?}, sequence {})",
            node.id,
            node.parent_id,
            node.sequence_number
        );

        self.emit_event(DomainEvent::NodeCreated(node.clone()));
        Ok(node)
    }

    /// Assign the sequence number and insert in one call
    pub async fn create_node(&self, mut draft: NewNode) -> Result<Node, NodeServiceError> {
        self.assign_sequence_number(&mut draft).await?;
        self.insert_node(draft).await
    }

    //
    // READS
    //

    /// Get a node by id
    ///
    /// Soft-deleted nodes are reported as not found unless `include_deleted`.
    pub async fn get_node(
        &self,
        id: NodeId,
        include_deleted: bool,
    ) -> Result<Node, NodeServiceError> {
        match self.store.get_node(id).await? {
            Some(node) if include_deleted || !node.deleted => Ok(node),
            _ => Err(NodeServiceError::node_not_found(id)),
        }
    }

    /// Children of a node, ascending by sequence number
    ///
    /// With `include_deleted = false` (the normal case) the parent must be
    /// live and soft-deleted children are filtered out.
    pub async fn live_children(
        &self,
        id: NodeId,
        include_deleted: bool,
    ) -> Result<Vec<Node>, NodeServiceError> {
        self.get_node(id, include_deleted).await?;
        let children = self.store.get_children(Some(id), include_deleted).await?;
        tracing::debug!("Node {} has {} children", id, children.len());
        Ok(children)
    }

    /// Root nodes, ascending by sequence number
    pub async fn root_nodes(&self, include_deleted: bool) -> Result<Vec<Node>, NodeServiceError> {
        Ok(self.store.get_children(None, include_deleted).await?)
    }

    /// Ancestor chain of a node, root first and immediate parent last
    ///
    /// Ancestors are returned even if soft-deleted: the chain is structural.
    pub async fn ancestors(&self, id: NodeId) -> Result<Vec<Node>, NodeServiceError> {
        let node = self.get_node(id, false).await?;

        let mut seen = HashSet::from([node.id]);
        let mut chain = Vec::new();
        let mut next = node.parent_id;

        while let Some(parent_id) = next {
            if !seen.insert(parent_id) {
                return Err(NodeServiceError::circular_reference(format!(
                    "ancestor chain of node {} revisits node {}",
                    id, parent_id
                )));
            }
            let parent = self.get_node(parent_id, true).await?;
            next = parent.parent_id;
            chain.push(parent);
        }

        chain.reverse();
        Ok(chain)
    }

    //
    // MUTATIONS
    //

    /// Soft-delete a single node
    ///
    /// Does not cascade: descendants keep `deleted = false` (use
    /// `soft_delete_subtree` to cascade). The remaining live siblings are
    /// renumbered 1..N in the same batch.
    pub async fn soft_delete(&self, id: NodeId) -> Result<Node, NodeServiceError> {
        let mut node = self.get_node(id, false).await?;
        node.deleted = true;
        node.touch();

        let siblings = self.live_siblings_without(node.parent_id, id).await?;
        let mut batch = vec![node.clone()];
        renumber(siblings, &mut batch);
        let renumbered = batch.len() > 1;

        self.store.commit_nodes(batch).await?;
        tracing::info!("Soft-deleted node {}", id);

        self.emit_event(DomainEvent::NodeDeleted { id });
        if renumbered {
            self.emit_sibling_order(node.parent_id).await?;
        }
        Ok(node)
    }

    /// Soft-delete a node and all of its live descendants in one batch
    ///
    /// Descendants under an already soft-deleted node are included. Returns
    /// the ids that were newly deleted, the given node first.
    pub async fn soft_delete_subtree(&self, id: NodeId) -> Result<Vec<NodeId>, NodeServiceError> {
        let root = self.get_node(id, false).await?;
        let parent_id = root.parent_id;

        // Walk through already-deleted nodes too: their live descendants
        // still belong to the subtree.
        let mut batch = Vec::new();
        let mut queue = vec![root];
        while let Some(mut node) = queue.pop() {
            queue.extend(self.store.get_children(Some(node.id), true).await?);
            if !node.deleted {
                node.deleted = true;
                node.touch();
                batch.push(node);
            }
        }
        let deleted: Vec<NodeId> = batch.iter().map(|n| n.id).collect();

        let siblings = self.live_siblings_without(parent_id, id).await?;
        renumber(siblings, &mut batch);

        self.store.commit_nodes(batch).await?;
        tracing::info!("Soft-deleted subtree of node {} ({} nodes)", id, deleted.len());

        for node_id in &deleted {
            self.emit_event(DomainEvent::NodeDeleted { id: *node_id });
        }
        self.emit_sibling_order(parent_id).await?;
        Ok(deleted)
    }

    /// Bind the node to a content-entity type
    ///
    /// One-way: binding the same type again is a no-op, binding a different
    /// type fails with `EntityAlreadyBound`.
    pub async fn bind_entity(
        &self,
        id: NodeId,
        entity_type: &str,
    ) -> Result<Node, NodeServiceError> {
        if entity_type.trim().is_empty() {
            return Err(ValidationError::MissingField("entity_type".to_string()).into());
        }

        let mut node = self.get_node(id, false).await?;
        match node.ref_entity_type.as_deref() {
            Some(bound) if bound == entity_type => return Ok(node),
            Some(bound) => {
                return Err(NodeServiceError::EntityAlreadyBound {
                    node_id: id,
                    bound: bound.to_string(),
                    requested: entity_type.to_string(),
                })
            }
            None => {}
        }

        node.ref_entity_type = Some(entity_type.to_string());
        self.update(node).await
    }

    pub async fn set_hidden_from_nav(
        &self,
        id: NodeId,
        hidden: bool,
    ) -> Result<Node, NodeServiceError> {
        let mut node = self.get_node(id, false).await?;
        if node.hidden_from_nav == hidden {
            return Ok(node);
        }
        node.hidden_from_nav = hidden;
        self.update(node).await
    }

    pub async fn set_internal_name(
        &self,
        id: NodeId,
        internal_name: Option<String>,
    ) -> Result<Node, NodeServiceError> {
        let mut node = self.get_node(id, false).await?;
        node.internal_name = internal_name;
        self.update(node).await
    }

    /// Move a node under a new parent (or to the roots) at `position`
    ///
    /// `position` is the 0-based index among the destination's live children;
    /// `None` or an out-of-range index appends. Moving within the same parent
    /// repositions the node. Both the old and the new sibling sets are
    /// renumbered 1..N in one store batch.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if the node is missing or deleted
    /// - `InvalidParent` if the new parent is missing or deleted
    /// - `CircularReference` if the new parent is the node or one of its descendants
    pub async fn move_node(
        &self,
        id: NodeId,
        new_parent_id: Option<NodeId>,
        position: Option<usize>,
    ) -> Result<Node, NodeServiceError> {
        let mut node = self.get_node(id, false).await?;

        if let Some(parent_id) = new_parent_id {
            self.require_live_parent(parent_id).await?;

            if parent_id == id || self.is_descendant(parent_id, id).await? {
                return Err(NodeServiceError::circular_reference(format!(
                    "cannot move node {} under its descendant {}",
                    id, parent_id
                )));
            }
        }

        let old_parent_id = node.parent_id;
        let mut batch = Vec::new();

        if old_parent_id != new_parent_id {
            let old_siblings = self.live_siblings_without(old_parent_id, id).await?;
            renumber(old_siblings, &mut batch);
        }

        let mut new_siblings = self.live_siblings_without(new_parent_id, id).await?;
        let index = position
            .unwrap_or(new_siblings.len())
            .min(new_siblings.len());

        node.parent_id = new_parent_id;
        node.sequence_number = 0;
        new_siblings.insert(index, node);
        renumber(new_siblings, &mut batch);

        let moved = batch
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| NodeServiceError::hierarchy_violation("moved node missing from batch"))?;

        self.store.commit_nodes(batch).await?;
        tracing::info!(
            "Moved node {} from parent {:?} to parent {:?} at sequence {}",
            id,
            old_parent_id,
            new_parent_id,
            moved.sequence_number
        );

        self.emit_event(DomainEvent::NodeMoved(NodeMove {
            node_id: id,
            old_parent_id,
            new_parent_id,
            sequence_number: moved.sequence_number,
        }));
        Ok(moved)
    }

    /// Reorder the live children of `parent_id` (roots when `None`)
    ///
    /// `ordered_ids` must be exactly the current live children, each once.
    /// Anything else is rejected before any write.
    pub async fn reorder_children(
        &self,
        parent_id: Option<NodeId>,
        ordered_ids: &[NodeId],
    ) -> Result<Vec<Node>, NodeServiceError> {
        if let Some(parent_id) = parent_id {
            self.get_node(parent_id, false).await?;
        }

        let mut current = self.store.get_children(parent_id, false).await?;

        let unique: HashSet<NodeId> = ordered_ids.iter().copied().collect();
        if unique.len() != ordered_ids.len() {
            return Err(NodeServiceError::hierarchy_violation(
                "reorder lists a node more than once",
            ));
        }
        if ordered_ids.len() != current.len() || current.iter().any(|n| !unique.contains(&n.id)) {
            return Err(NodeServiceError::hierarchy_violation(format!(
                "reorder must list exactly the {} live children of {:?}",
                current.len(),
                parent_id
            )));
        }

        let mut ordered = Vec::with_capacity(current.len());
        for id in ordered_ids {
            if let Some(index) = current.iter().position(|n| n.id == *id) {
                ordered.push(current.swap_remove(index));
            }
        }

        let mut batch = Vec::new();
        renumber(ordered.clone(), &mut batch);
        if !batch.is_empty() {
            self.store.commit_nodes(batch).await?;
            tracing::info!("Reordered {} children of {:?}", ordered.len(), parent_id);
        }

        self.emit_event(DomainEvent::SiblingsReordered {
            parent_id,
            ordered_ids: ordered_ids.to_vec(),
        });
        Ok(self.store.get_children(parent_id, false).await?)
    }

    //
    // HELPERS
    //

    async fn update(&self, mut node: Node) -> Result<Node, NodeServiceError> {
        node.touch();
        self.store.commit_nodes(vec![node.clone()]).await?;
        tracing::info!("Updated node {}", node.id);
        self.emit_event(DomainEvent::NodeUpdated(node.clone()));
        Ok(node)
    }

    async fn require_live_parent(&self, parent_id: NodeId) -> Result<Node, NodeServiceError> {
        self.get_node(parent_id, false).await.map_err(|e| match e {
            NodeServiceError::NodeNotFound { .. } => NodeServiceError::invalid_parent(parent_id),
            other => other,
        })
    }

    async fn live_siblings_without(
        &self,
        parent_id: Option<NodeId>,
        exclude: NodeId,
    ) -> Result<Vec<Node>, NodeServiceError> {
        let mut siblings = self.store.get_children(parent_id, false).await?;
        siblings.retain(|n| n.id != exclude);
        Ok(siblings)
    }

    /// Whether `candidate` sits somewhere below `ancestor`
    async fn is_descendant(
        &self,
        candidate: NodeId,
        ancestor: NodeId,
    ) -> Result<bool, NodeServiceError> {
        let mut seen = HashSet::new();
        let mut next = Some(candidate);

        while let Some(current) = next {
            if current == ancestor {
                return Ok(true);
            }
            if !seen.insert(current) {
                return Err(NodeServiceError::circular_reference(format!(
                    "existing cycle through node {}",
                    current
                )));
            }
            next = match self.store.get_node(current).await? {
                Some(node) => node.parent_id,
                None => None,
            };
        }
        Ok(false)
    }

    async fn emit_sibling_order(&self, parent_id: Option<NodeId>) -> Result<(), NodeServiceError> {
        let ordered_ids = self
            .store
            .get_children(parent_id, false)
            .await?
            .into_iter()
            .map(|n| n.id)
            .collect();
        self.emit_event(DomainEvent::SiblingsReordered {
            parent_id,
            ordered_ids,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "node_service_test.rs"]
mod node_service_test;
