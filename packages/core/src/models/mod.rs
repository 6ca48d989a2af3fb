//! Data Models
//!
//! This module contains the core data structures of the content tree:
//!
//! - `Node` / `NewNode` - Language-independent tree positions
//! - `NodeTranslation` / `NewTranslation` - Per-language publishing records
//! - `Version` / `Entity` - Stored content revisions and the entities they point at

mod node;
mod translation;
mod version;

pub use node::{NewNode, Node, NodeId, ValidationError};
pub use translation::{NewTranslation, NodeTranslation, TranslationId};
pub use version::{Entity, EntityRef, NewVersion, Version, VersionId, VersionType};
