//! Version Service
//!
//! Keeps the version history of node translations. Successive edits inside
//! the configured version timeout are folded into the latest draft; an edit
//! after a quiet period starts a new draft so earlier states stay available
//! for preview.

use crate::config::{ConfigError, NodeTreeConfig};
use crate::db::VersionStore;
use crate::models::{
    EntityRef, NewVersion, NodeTranslation, TranslationId, Version, VersionId, VersionType,
};
use crate::services::error::NodeServiceError;
use crate::services::translation_service::TranslationService;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct VersionService {
    versions: Arc<dyn VersionStore>,
    translations: TranslationService,
    config: NodeTreeConfig,
}

impl VersionService {
    pub fn new(
        versions: Arc<dyn VersionStore>,
        translations: TranslationService,
        config: NodeTreeConfig,
    ) -> Self {
        Self {
            versions,
            translations,
            config,
        }
    }

    /// Record that `translation_id` now renders `entity`
    ///
    /// Updates the latest draft in place when it was last touched less than
    /// `version_timeout` before `now`; otherwise stores a new draft.
    pub async fn record_edit(
        &self,
        translation_id: TranslationId,
        entity: EntityRef,
        now: DateTime<Utc>,
    ) -> Result<Version, NodeServiceError> {
        self.translations.get_translation(translation_id).await?;

        let timeout = Duration::from_std(self.config.version_timeout()).map_err(|_| {
            ConfigError::Invalid(format!(
                "version timeout of {}s is out of range",
                self.config.version_timeout_secs
            ))
        })?;
        let latest_draft = self
            .versions
            .versions_for_translation(translation_id)
            .await?
            .into_iter()
            .filter(|v| v.version_type == VersionType::Draft)
            .max_by_key(|v| v.id);

        match latest_draft {
            Some(mut draft) if now.signed_duration_since(draft.updated_at) < timeout => {
                draft.entity = entity;
                draft.updated_at = now;
                self.versions.update_version(draft.clone()).await?;
                tracing::debug!(
                    "Folded edit into draft version {} of translation {}",
                    draft.id,
                    translation_id
                );
                Ok(draft)
            }
            _ => {
                let created = self
                    .versions
                    .create_version(NewVersion {
                        node_translation_id: translation_id,
                        version_type: VersionType::Draft,
                        entity,
                        created_at: now,
                    })
                    .await?;
                tracing::info!(
                    "Created draft version {} for translation {}",
                    created.id,
                    translation_id
                );
                Ok(created)
            }
        }
    }

    /// Publish a version of the translation
    ///
    /// Marks the version public and points the translation's public slot at it.
    pub async fn publish(
        &self,
        translation_id: TranslationId,
        version_id: VersionId,
    ) -> Result<NodeTranslation, NodeServiceError> {
        let mut version = self
            .versions
            .find_version(version_id)
            .await?
            .filter(|v| v.node_translation_id == translation_id)
            .ok_or_else(|| NodeServiceError::version_not_found(version_id))?;

        if version.version_type != VersionType::Public {
            version.version_type = VersionType::Public;
            self.versions.update_version(version).await?;
        }

        self.translations
            .set_public_version(translation_id, version_id)
            .await
    }

    /// Versions of the translation, newest first
    pub async fn history(
        &self,
        translation_id: TranslationId,
    ) -> Result<Vec<Version>, NodeServiceError> {
        let mut versions = self.versions.versions_for_translation(translation_id).await?;
        versions.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(versions)
    }
}
