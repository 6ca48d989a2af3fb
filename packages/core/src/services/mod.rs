//! Business Services
//!
//! This module contains the core business logic services:
//!
//! - `NodeService` - Tree operations: numbering, traversal, soft delete, move, reorder
//! - `TranslationService` - Per-language translation sets of a node
//! - `VersionService` - Draft history and publishing of translations
//! - `RenderResolver` - Per-request template and context resolution
//!
//! Services coordinate between the store layer and callers, enforcing tree
//! invariants before anything is written.

pub mod error;
pub mod node_service;
pub mod render_resolver;
pub mod translation_service;
pub mod version_service;

pub use error::{NodeServiceError, ResolveError};
pub use node_service::NodeService;
pub use render_resolver::{
    ControllerResult, RenderOutcome, RenderRequest, RenderResolver, ResolvedRender, SkipReason,
    TemplateRef,
};
pub use translation_service::TranslationService;
pub use version_service::VersionService;
