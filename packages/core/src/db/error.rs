//! Store Error Types
//!
//! Errors raised by the bundled store implementations. Store traits return
//! `anyhow::Result`, so callers see these wrapped in `anyhow::Error` and can
//! recover the typed value with `downcast_ref::<StoreError>()`.

use crate::models::{NodeId, TranslationId, VersionId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Referenced node does not exist
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// Referenced translation does not exist
    #[error("Unknown node translation: {0}")]
    UnknownTranslation(TranslationId),

    /// Referenced version does not exist
    #[error("Unknown version: {0}")]
    UnknownVersion(VersionId),

    /// Backend refused the operation (connectivity, maintenance, test injection)
    #[error("Store unavailable: {context}")]
    Unavailable { context: String },
}

impl StoreError {
    pub fn unavailable(context: impl Into<String>) -> Self {
        Self::Unavailable {
            context: context.into(),
        }
    }
}
