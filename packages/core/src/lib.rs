//! NodeTree Core Content Tree Layer
//!
//! This crate provides the language-independent content tree of a CMS, the
//! per-language translations attached to each node, and the per-request
//! resolution of which template and entity a translation renders with.
//!
//! # Architecture
//!
//! - **Async stores**: Persistence sits behind the `NodeStore`, `VersionStore`
//!   and `EntityStore` traits; an in-memory implementation ships with the crate
//! - **Explicit filters**: Soft-deleted nodes and offline translations are only
//!   returned when the caller asks for them
//! - **Atomic renumbering**: Sibling order changes are written as one batch
//! - **Pure resolution**: The render resolver returns its result instead of
//!   mutating shared request state
//!
//! # Modules
//!
//! - [`models`] - Data structures (Node, NodeTranslation, Version, Entity)
//! - [`services`] - Business services (NodeService, RenderResolver, etc.)
//! - [`db`] - Store traits and the in-memory store
//! - [`config`] - Runtime configuration
//! - [`logging`] - Tracing subscriber setup

pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::{ConfigError, NodeTreeConfig};
pub use models::*;
pub use services::*;
