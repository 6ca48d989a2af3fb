//! In-memory store backing all three store traits
//!
//! Used by tests, benches and the dev binary. All state sits behind a single
//! `tokio::sync::RwLock`, which gives `commit_nodes` its atomicity: a batch is
//! validated and applied under one write guard, so concurrent readers see the
//! sibling set either before or after the batch.

use super::error::StoreError;
use super::node_store::{EntityStore, NodeStore, VersionStore};
use crate::models::{
    Entity, EntityRef, NewNode, NewTranslation, NewVersion, Node, NodeId, NodeTranslation,
    TranslationId, Version, VersionId,
};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    nodes: BTreeMap<NodeId, Node>,
    // Ids are handed out monotonically, so BTreeMap order is insertion order.
    translations: BTreeMap<TranslationId, NodeTranslation>,
    versions: BTreeMap<VersionId, Version>,
    entities: HashMap<EntityRef, Entity>,
    next_node_id: i64,
    next_translation_id: i64,
    next_version_id: i64,
}

#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a content entity
    pub async fn insert_entity(&self, entity: Entity) {
        let mut state = self.state.write().await;
        state.entities.insert(entity.entity_ref(), entity);
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self, operation: &str) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable(operation).into());
        }
        Ok(())
    }
}

#[async_trait]
impl NodeStore for InMemoryStore {
    async fn create_node(&self, node: NewNode) -> Result<Node> {
        self.check_available("create_node")?;
        let mut state = self.state.write().await;

        if let Some(parent_id) = node.parent_id {
            if !state.nodes.contains_key(&parent_id) {
                return Err(StoreError::UnknownNode(parent_id).into());
            }
        }

        state.next_node_id += 1;
        let id = NodeId(state.next_node_id);
        let created = Node::from_draft(id, node)?;
        state.nodes.insert(id, created.clone());
        Ok(created)
    }

    async fn get_node(&self, id: NodeId) -> Result<Option<Node>> {
        self.check_available("get_node")?;
        let state = self.state.read().await;
        Ok(state.nodes.get(&id).cloned())
    }

    async fn get_children(
        &self,
        parent_id: Option<NodeId>,
        include_deleted: bool,
    ) -> Result<Vec<Node>> {
        self.check_available("get_children")?;
        let state = self.state.read().await;

        let mut children: Vec<Node> = state
            .nodes
            .values()
            .filter(|n| n.parent_id == parent_id && (include_deleted || !n.deleted))
            .cloned()
            .collect();
        children.sort_by_key(|n| (n.sequence_number, n.id));
        Ok(children)
    }

    async fn commit_nodes(&self, nodes: Vec<Node>) -> Result<()> {
        self.check_available("commit_nodes")?;
        let mut state = self.state.write().await;

        for node in &nodes {
            if !state.nodes.contains_key(&node.id) {
                return Err(StoreError::UnknownNode(node.id).into());
            }
            node.validate()?;
        }

        for node in nodes {
            state.nodes.insert(node.id, node);
        }
        Ok(())
    }

    async fn create_translation(
        &self,
        node_id: NodeId,
        translation: NewTranslation,
    ) -> Result<NodeTranslation> {
        self.check_available("create_translation")?;
        let mut state = self.state.write().await;

        if !state.nodes.contains_key(&node_id) {
            return Err(StoreError::UnknownNode(node_id).into());
        }

        state.next_translation_id += 1;
        let id = TranslationId(state.next_translation_id);
        let created = NodeTranslation::from_draft(id, node_id, translation);
        state.translations.insert(id, created.clone());
        Ok(created)
    }

    async fn get_translation(&self, id: TranslationId) -> Result<Option<NodeTranslation>> {
        self.check_available("get_translation")?;
        let state = self.state.read().await;
        Ok(state.translations.get(&id).cloned())
    }

    async fn get_translations(&self, node_id: NodeId) -> Result<Vec<NodeTranslation>> {
        self.check_available("get_translations")?;
        let state = self.state.read().await;
        Ok(state
            .translations
            .values()
            .filter(|t| t.node_id == node_id)
            .cloned()
            .collect())
    }

    async fn update_translation(&self, translation: NodeTranslation) -> Result<()> {
        self.check_available("update_translation")?;
        let mut state = self.state.write().await;

        match state.translations.get_mut(&translation.id) {
            Some(existing) => {
                *existing = translation;
                Ok(())
            }
            None => Err(StoreError::UnknownTranslation(translation.id).into()),
        }
    }
}

#[async_trait]
impl VersionStore for InMemoryStore {
    async fn find_version(&self, id: VersionId) -> Result<Option<Version>> {
        self.check_available("find_version")?;
        let state = self.state.read().await;
        Ok(state.versions.get(&id).cloned())
    }

    async fn referenced_entity(&self, version: &Version) -> Result<Option<Entity>> {
        self.check_available("referenced_entity")?;
        let state = self.state.read().await;
        Ok(state.entities.get(&version.entity).cloned())
    }

    async fn create_version(&self, version: NewVersion) -> Result<Version> {
        self.check_available("create_version")?;
        let mut state = self.state.write().await;

        if !state
            .translations
            .contains_key(&version.node_translation_id)
        {
            return Err(StoreError::UnknownTranslation(version.node_translation_id).into());
        }

        state.next_version_id += 1;
        let id = VersionId(state.next_version_id);
        let created = Version::from_draft(id, version);
        state.versions.insert(id, created.clone());
        Ok(created)
    }

    async fn update_version(&self, version: Version) -> Result<()> {
        self.check_available("update_version")?;
        let mut state = self.state.write().await;

        match state.versions.get_mut(&version.id) {
            Some(existing) => {
                *existing = version;
                Ok(())
            }
            None => Err(StoreError::UnknownVersion(version.id).into()),
        }
    }

    async fn versions_for_translation(
        &self,
        translation_id: TranslationId,
    ) -> Result<Vec<Version>> {
        self.check_available("versions_for_translation")?;
        let state = self.state.read().await;
        Ok(state
            .versions
            .values()
            .filter(|v| v.node_translation_id == translation_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn load(&self, entity: &EntityRef) -> Result<Option<Entity>> {
        self.check_available("load")?;
        let state = self.state.read().await;
        Ok(state.entities.get(entity).cloned())
    }
}
