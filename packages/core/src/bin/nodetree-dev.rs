//! Development Binary
//!
//! Seeds an in-memory content tree and prints how sample requests resolve.
//! Useful for checking tree operations and render resolution without a host
//! application.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin nodetree-dev
//!
//! # Preview a specific version
//! cargo run --bin nodetree-dev -- 2
//!
//! # More logging
//! RUST_LOG=debug cargo run --bin nodetree-dev
//! ```
//!
//! # Environment Variables
//!
//! - `NODETREE_VERSION_TIMEOUT`: Draft folding window in seconds (default: 3600)
//! - `NODETREE_UNIQUE_TRANSLATION_LANG`: Reject duplicate languages (default: true)
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use std::env;
use std::sync::Arc;

use chrono::Utc;
use nodetree_core::db::InMemoryStore;
use nodetree_core::logging::init_tracing;
use nodetree_core::models::{Entity, EntityRef, NewNode, NewTranslation, Node};
use nodetree_core::services::{
    NodeService, RenderOutcome, RenderRequest, RenderResolver, TranslationService, VersionService,
};
use nodetree_core::NodeTreeConfig;
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = NodeTreeConfig::from_env()?;
    tracing::info!("NodeTree dev: {:?}", config);

    let store = Arc::new(InMemoryStore::new());
    let nodes = NodeService::new(store.clone());
    let translations = TranslationService::new(store.clone(), config.clone());
    let versions = VersionService::new(store.clone(), translations.clone(), config);
    let resolver = RenderResolver::new(store.clone());

    // Tree: home -> (about, contact, legacy[deleted])
    let home = nodes
        .create_node(
            NewNode::new()
                .with_entity_type("page")
                .with_internal_name("home"),
        )
        .await?;
    for name in ["about", "contact", "legacy"] {
        nodes
            .create_node(
                NewNode::new()
                    .attach_to(&home)
                    .with_entity_type("page")
                    .with_internal_name(name),
            )
            .await?;
    }
    let children = nodes.live_children(home.id, false).await?;
    if let Some(legacy) = children.last() {
        nodes.soft_delete(legacy.id).await?;
    }
    print_tree(&nodes, &home).await?;

    // Content: live page plus a later draft
    let live = Entity::new("page", "home-v1", "page/default")
        .with_fields(json!({"title": "Welcome"}));
    let draft = Entity::new("page", "home-v2", "page/landing")
        .with_fields(json!({"title": "Welcome back"}));
    store.insert_entity(live.clone()).await;
    store.insert_entity(draft).await;

    let translation = translations
        .add_translation(
            home.id,
            NewTranslation::new("en", "Home").online(true).with_slug("home"),
        )
        .await?;

    let published = versions
        .record_edit(translation.id, live.entity_ref(), Utc::now())
        .await?;
    let translation = versions.publish(translation.id, published.id).await?;
    let preview = versions
        .record_edit(
            translation.id,
            EntityRef::new("page", "home-v2"),
            Utc::now(),
        )
        .await?;

    let requested = env::args()
        .nth(1)
        .unwrap_or_else(|| preview.id.to_string());

    let requests = [
        (
            "live",
            RenderRequest::for_translation("App:Page:service", translation.clone(), live.clone())
                .with_url("/en/home"),
        ),
        (
            "preview",
            RenderRequest::for_translation("App:Page:service", translation.clone(), live.clone())
                .with_url("/en/home")
                .with_preview(Some(&requested)),
        ),
    ];

    for (label, request) in requests {
        match resolver.resolve(request).await? {
            RenderOutcome::Resolved(render) => {
                let output = json!({
                    "request": label,
                    "template": render.template,
                    "previewVersion": render.preview_version,
                    "context": render.context,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            RenderOutcome::Skipped(reason) => {
                tracing::info!("Request '{}' skipped: {:?}", label, reason);
            }
        }
    }

    Ok(())
}

async fn print_tree(nodes: &NodeService, root: &Node) -> anyhow::Result<()> {
    println!("{}", root);
    for child in nodes.live_children(root.id, true).await? {
        println!(
            "  #{} {}{}",
            child.sequence_number,
            child.internal_name.as_deref().unwrap_or("-"),
            if child.deleted { " (deleted)" } else { "" }
        );
    }
    Ok(())
}
