//! Translation Service
//!
//! Manages the translation set of a node: one publishing record per language.
//! Lookups scan the node's translations in insertion order; a node carries a
//! handful of languages, so no index is kept.

use crate::config::NodeTreeConfig;
use crate::db::NodeStore;
use crate::models::{NewTranslation, NodeId, NodeTranslation, TranslationId, VersionId};
use crate::services::error::NodeServiceError;
use std::sync::Arc;

#[derive(Clone)]
pub struct TranslationService {
    store: Arc<dyn NodeStore>,
    config: NodeTreeConfig,
}

impl TranslationService {
    pub fn new(store: Arc<dyn NodeStore>, config: NodeTreeConfig) -> Self {
        Self { store, config }
    }

    /// Attach a translation to a live node
    ///
    /// When `enforce_unique_translation_lang` is on (the default), a second
    /// translation for a language the node already has (online or not) is
    /// rejected with `DuplicateTranslation`.
    pub async fn add_translation(
        &self,
        node_id: NodeId,
        translation: NewTranslation,
    ) -> Result<NodeTranslation, NodeServiceError> {
        translation.validate()?;
        self.require_node(node_id, false).await?;

        if self.config.enforce_unique_translation_lang {
            let existing = self.store.get_translations(node_id).await?;
            if existing.iter().any(|t| t.lang == translation.lang) {
                return Err(NodeServiceError::DuplicateTranslation {
                    node_id,
                    lang: translation.lang,
                });
            }
        }

        let created = self.store.create_translation(node_id, translation).await?;
        tracing::info!(
            "Added translation {} ({}) to node {}",
            created.id,
            created.lang,
            node_id
        );
        Ok(created)
    }

    /// First translation of the node matching `lang` exactly
    ///
    /// Offline translations are skipped unless `include_offline`. A missing or
    /// soft-deleted node is `NodeNotFound`.
    pub async fn translation(
        &self,
        node_id: NodeId,
        lang: &str,
        include_offline: bool,
    ) -> Result<Option<NodeTranslation>, NodeServiceError> {
        Ok(self
            .live_translations(node_id, include_offline)
            .await?
            .into_iter()
            .find(|t| t.lang == lang))
    }

    /// Translations of a live node in insertion order
    ///
    /// A missing or soft-deleted node is `NodeNotFound`.
    pub async fn live_translations(
        &self,
        node_id: NodeId,
        include_offline: bool,
    ) -> Result<Vec<NodeTranslation>, NodeServiceError> {
        let mut translations = self.all_translations(node_id, false).await?;
        if !include_offline {
            translations.retain(|t| t.online);
        }
        Ok(translations)
    }

    /// Every translation of the node, online or not, in insertion order
    ///
    /// Translations of a soft-deleted node are only returned with
    /// `include_deleted`.
    pub async fn all_translations(
        &self,
        node_id: NodeId,
        include_deleted: bool,
    ) -> Result<Vec<NodeTranslation>, NodeServiceError> {
        self.require_node(node_id, include_deleted).await?;
        Ok(self.store.get_translations(node_id).await?)
    }

    pub async fn get_translation(
        &self,
        id: TranslationId,
    ) -> Result<NodeTranslation, NodeServiceError> {
        self.store
            .get_translation(id)
            .await?
            .ok_or_else(|| NodeServiceError::translation_not_found(id))
    }

    pub async fn set_online(
        &self,
        id: TranslationId,
        online: bool,
    ) -> Result<NodeTranslation, NodeServiceError> {
        let mut translation = self.get_translation(id).await?;
        if translation.online == online {
            return Ok(translation);
        }

        translation.online = online;
        translation.touch();
        self.store.update_translation(translation.clone()).await?;
        tracing::info!("Translation {} is now {}", id, if online { "online" } else { "offline" });
        Ok(translation)
    }

    /// Point the translation's public slot at `version_id`
    ///
    /// The version's ownership is checked by the caller (`VersionService::publish`).
    pub async fn set_public_version(
        &self,
        id: TranslationId,
        version_id: VersionId,
    ) -> Result<NodeTranslation, NodeServiceError> {
        let mut translation = self.get_translation(id).await?;
        translation.public_version_id = Some(version_id);
        translation.touch();
        self.store.update_translation(translation.clone()).await?;
        tracing::info!("Translation {} now publishes version {}", id, version_id);
        Ok(translation)
    }

    async fn require_node(
        &self,
        node_id: NodeId,
        include_deleted: bool,
    ) -> Result<(), NodeServiceError> {
        match self.store.get_node(node_id).await? {
            Some(node) if include_deleted || !node.deleted => Ok(()),
            _ => Err(NodeServiceError::node_not_found(node_id)),
        }
    }
}
