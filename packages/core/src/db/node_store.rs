//! Store Traits - Persistence Abstraction Layer
//!
//! This module defines the collaborator interfaces the content tree consumes:
//!
//! - `NodeStore` - nodes and their translations
//! - `VersionStore` - stored content versions
//! - `EntityStore` - content entities referenced by versions
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All queries are async so embedded and networked backends fit
//! 2. **Ownership Semantics**: Methods take ownership of values they persist
//! 3. **Error Handling**: `anyhow::Result` so backends keep their own error context
//! 4. **Atomic Batches**: `commit_nodes` writes a whole sibling renumbering at once;
//!    readers must never observe a partially applied batch
//!
//! # Examples
//!
//! ```rust,no_run
//! use nodetree_core::db::{InMemoryStore, NodeStore};
//! use nodetree_core::models::NewNode;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn NodeStore> = Arc::new(InMemoryStore::new());
//!
//!     let root = store
//!         .create_node(NewNode::new().with_sequence_number(1))
//!         .await?;
//!     let children = store.get_children(Some(root.id), false).await?;
//!     assert!(children.is_empty());
//!     Ok(())
//! }
//! ```

use crate::models::{
    Entity, EntityRef, NewNode, NewTranslation, NewVersion, Node, NodeId, NodeTranslation,
    TranslationId, Version, VersionId,
};
use anyhow::Result;
use async_trait::async_trait;

/// Persistence for nodes and node translations
///
/// Implementations must be `Send + Sync` so services can share them across tasks.
#[async_trait]
pub trait NodeStore: Send + Sync {
    //
    // NODES
    //

    /// Persist a draft and return it with its assigned id
    ///
    /// The draft must already carry a sequence number.
    async fn create_node(&self, node: NewNode) -> Result<Node>;

    /// Get node by id, including soft-deleted nodes
    ///
    /// - `Ok(Some(node))` if the node exists
    /// - `Ok(None)` if it doesn't (not an error)
    async fn get_node(&self, id: NodeId) -> Result<Option<Node>>;

    /// Children of `parent_id` (roots when `None`), ascending by sequence number
    ///
    /// Soft-deleted children are only returned when `include_deleted` is set.
    async fn get_children(
        &self,
        parent_id: Option<NodeId>,
        include_deleted: bool,
    ) -> Result<Vec<Node>>;

    /// Overwrite a batch of existing nodes atomically
    ///
    /// Either every node in the batch is written or none is. Fails if any
    /// node does not exist.
    async fn commit_nodes(&self, nodes: Vec<Node>) -> Result<()>;

    //
    // TRANSLATIONS
    //

    /// Attach a new translation to `node_id`
    async fn create_translation(
        &self,
        node_id: NodeId,
        translation: NewTranslation,
    ) -> Result<NodeTranslation>;

    async fn get_translation(&self, id: TranslationId) -> Result<Option<NodeTranslation>>;

    /// All translations of a node, online or not, in insertion order
    async fn get_translations(&self, node_id: NodeId) -> Result<Vec<NodeTranslation>>;

    async fn update_translation(&self, translation: NodeTranslation) -> Result<()>;
}

/// Durable store of content-entity versions
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Look up a version by id; `Ok(None)` when it doesn't exist
    async fn find_version(&self, id: VersionId) -> Result<Option<Version>>;

    /// Load the live entity a version points at
    async fn referenced_entity(&self, version: &Version) -> Result<Option<Entity>>;

    async fn create_version(&self, version: NewVersion) -> Result<Version>;

    async fn update_version(&self, version: Version) -> Result<()>;

    /// Versions of one translation, oldest first
    async fn versions_for_translation(&self, translation_id: TranslationId)
        -> Result<Vec<Version>>;
}

/// Store of content entities
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn load(&self, entity: &EntityRef) -> Result<Option<Entity>>;

    /// Template identifier the entity renders with
    fn default_view(&self, entity: &Entity) -> String {
        entity.default_view.clone()
    }
}

/// Versions plus the entities they reference, as consumed by render resolution
pub trait ContentStore: VersionStore + EntityStore {}

impl<T: VersionStore + EntityStore> ContentStore for T {}
