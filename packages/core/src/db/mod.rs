//! Store Layer
//!
//! This module defines the persistence collaborators of the content tree:
//!
//! - `NodeStore`, `VersionStore`, `EntityStore` traits
//! - `InMemoryStore`, a reference implementation of all three
//! - Domain events broadcast after tree mutations
//!
//! Query execution, schemas and table layout belong to the store
//! implementations; services only rely on the trait contracts.

mod error;
pub mod events;
mod memory_store;
mod node_store;

pub use error::StoreError;
pub use events::{DomainEvent, NodeMove};
pub use memory_store::InMemoryStore;
pub use node_store::{ContentStore, EntityStore, NodeStore, VersionStore};
