//! Tests for RenderResolver
//!
//! Covers skip conditions, preview-version substitution and its fallbacks,
//! context merge precedence and template attribution.

use super::*;
use crate::config::NodeTreeConfig;
use crate::db::{InMemoryStore, VersionStore};
use crate::models::{EntityRef, NewNode, NewTranslation, NewVersion, VersionType};
use crate::services::{NodeService, TranslationService};
use chrono::Utc;
use serde_json::json;

const CONTROLLER: &str = "App:Page:service";

struct Fixture {
    store: Arc<InMemoryStore>,
    resolver: RenderResolver,
    translation: NodeTranslation,
    live: Entity,
}

/// Node with an online "en" translation rendering a live page entity
async fn setup() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let nodes = NodeService::new(store.clone());
    let translations = TranslationService::new(store.clone(), NodeTreeConfig::default());

    let node = nodes
        .create_node(NewNode::new().with_entity_type("page"))
        .await
        .unwrap();
    let translation = translations
        .add_translation(
            node.id,
            NewTranslation::new("en", "Home").online(true).with_slug("home"),
        )
        .await
        .unwrap();

    let live = Entity::new("page", "1", "page/default").with_fields(json!({"title": "Live"}));
    store.insert_entity(live.clone()).await;

    Fixture {
        resolver: RenderResolver::new(store.clone()),
        store,
        translation,
        live,
    }
}

/// Store a draft version of the fixture translation pointing at `entity`
async fn add_version(fixture: &Fixture, entity: EntityRef) -> VersionId {
    fixture
        .store
        .create_version(NewVersion {
            node_translation_id: fixture.translation.id,
            version_type: VersionType::Draft,
            entity,
            created_at: Utc::now(),
        })
        .await
        .unwrap()
        .id
}

fn request(fixture: &Fixture) -> RenderRequest {
    RenderRequest::for_translation(CONTROLLER, fixture.translation.clone(), fixture.live.clone())
}

async fn resolve(fixture: &Fixture, request: RenderRequest) -> ResolvedRender {
    match fixture.resolver.resolve(request).await.unwrap() {
        RenderOutcome::Resolved(render) => render,
        other => panic!("Expected Resolved, got {:?}", other),
    }
}

#[test]
fn test_parse_version_id() {
    assert_eq!(parse_version_id("42"), Some(VersionId(42)));
    assert_eq!(parse_version_id("007"), Some(VersionId(7)));
    assert_eq!(parse_version_id("abc"), None);
    assert_eq!(parse_version_id(""), None);
    assert_eq!(parse_version_id("-1"), None);
    assert_eq!(parse_version_id(" 4"), None);
    assert_eq!(parse_version_id("4.0"), None);
    // Out of i64 range
    assert_eq!(parse_version_id("99999999999999999999"), None);
}

#[test]
fn test_split_controller() {
    assert_eq!(
        split_controller("App:Page:service"),
        ("App:Page".to_string(), "service".to_string())
    );
    assert_eq!(
        split_controller("Page:show"),
        ("Page".to_string(), "show".to_string())
    );
    assert_eq!(split_controller("show"), (String::new(), "show".to_string()));
}

#[tokio::test]
async fn test_template_already_set_skips() {
    let fixture = setup().await;
    let mut req = request(&fixture).with_preview(Some("1"));
    req.template_already_set = true;

    let outcome = fixture.resolver.resolve(req).await.unwrap();
    assert_eq!(outcome, RenderOutcome::Skipped(SkipReason::TemplateAlreadySet));
    assert!(outcome.resolved().is_none());
}

#[tokio::test]
async fn test_final_response_skips() {
    let fixture = setup().await;
    let req = request(&fixture).with_controller_result(ControllerResult::Response);

    let outcome = fixture.resolver.resolve(req).await.unwrap();
    assert_eq!(outcome, RenderOutcome::Skipped(SkipReason::FinalResponse));
}

#[tokio::test]
async fn test_final_response_checked_before_template() {
    let fixture = setup().await;
    let mut req = request(&fixture).with_controller_result(ControllerResult::Response);
    req.template_already_set = true;

    let outcome = fixture.resolver.resolve(req).await.unwrap();
    assert_eq!(outcome, RenderOutcome::Skipped(SkipReason::FinalResponse));
}

#[tokio::test]
async fn test_missing_translation_skips() {
    let fixture = setup().await;
    let req = RenderRequest {
        controller: CONTROLLER.to_string(),
        entity: Some(fixture.live.clone()),
        ..Default::default()
    };

    let outcome = fixture.resolver.resolve(req).await.unwrap();
    assert_eq!(outcome, RenderOutcome::Skipped(SkipReason::NoNodeTranslation));
}

#[tokio::test]
async fn test_resolves_live_entity() {
    let fixture = setup().await;
    let render = resolve(&fixture, request(&fixture).with_url("/en/home")).await;

    let live = serde_json::to_value(&fixture.live).unwrap();
    assert_eq!(render.context["page"], live);
    assert_eq!(render.context["resource"], live);
    assert_eq!(render.context["slug"], json!("/en/home"));
    assert_eq!(render.context["nodemenu"], Value::Null);
    assert_eq!(
        render.context["nodetranslation"]["lang"],
        json!(fixture.translation.lang)
    );
    assert_eq!(render.template.template, "page/default");
    assert_eq!(render.template.owner, "App:Page");
    assert_eq!(render.template.action, "service");
    assert_eq!(render.entity, fixture.live);
    assert_eq!(render.preview_version, None);
}

#[tokio::test]
async fn test_preview_version_replaces_entity() {
    let fixture = setup().await;
    let draft = Entity::new("page", "2", "page/draft").with_fields(json!({"title": "Draft"}));
    fixture.store.insert_entity(draft.clone()).await;
    let version_id = add_version(&fixture, draft.entity_ref()).await;

    let raw = version_id.to_string();
    let render = resolve(&fixture, request(&fixture).with_preview(Some(&raw))).await;

    let expected = serde_json::to_value(&draft).unwrap();
    assert_eq!(render.context["page"], expected);
    assert_eq!(render.context["resource"], expected);
    assert_eq!(render.entity, draft);
    assert_eq!(render.preview_version, Some(version_id));
    // Template follows the entity that is actually rendered
    assert_eq!(render.template.template, "page/draft");
}

#[tokio::test]
async fn test_version_ignored_without_preview() {
    let fixture = setup().await;
    let draft = Entity::new("page", "2", "page/draft");
    fixture.store.insert_entity(draft.clone()).await;
    let version_id = add_version(&fixture, draft.entity_ref()).await;

    let mut req = request(&fixture);
    req.requested_version = Some(version_id.to_string());
    let render = resolve(&fixture, req).await;

    assert_eq!(render.entity, fixture.live);
    assert_eq!(render.preview_version, None);
}

#[tokio::test]
async fn test_unknown_preview_version_falls_back_to_live() {
    let fixture = setup().await;
    let render = resolve(&fixture, request(&fixture).with_preview(Some("42"))).await;

    assert_eq!(render.entity, fixture.live);
    assert_eq!(
        render.context["page"],
        serde_json::to_value(&fixture.live).unwrap()
    );
    assert_eq!(render.preview_version, None);
}

#[tokio::test]
async fn test_version_with_missing_entity_falls_back_to_live() {
    let fixture = setup().await;
    let version_id = add_version(&fixture, EntityRef::new("page", "gone")).await;

    let raw = version_id.to_string();
    let render = resolve(&fixture, request(&fixture).with_preview(Some(&raw))).await;

    assert_eq!(render.entity, fixture.live);
    assert_eq!(render.preview_version, None);
}

#[tokio::test]
async fn test_malformed_version_id_matches_no_version() {
    let fixture = setup().await;
    let baseline = resolve(&fixture, request(&fixture).with_preview(None)).await;

    for raw in ["abc", "", "1a", "-3"] {
        let render = resolve(&fixture, request(&fixture).with_preview(Some(raw))).await;
        assert_eq!(render, baseline, "version id {:?}", raw);
    }
}

#[tokio::test]
async fn test_missing_entity_is_an_error() {
    let fixture = setup().await;
    let mut req = request(&fixture);
    req.entity = None;

    let err = fixture.resolver.resolve(req).await.unwrap_err();
    match err {
        ResolveError::MissingEntity { translation_id } => {
            assert_eq!(translation_id, fixture.translation.id)
        }
        other => panic!("Expected MissingEntity, got {:?}", other),
    }
}

#[tokio::test]
async fn test_preview_supplies_entity_when_request_has_none() {
    let fixture = setup().await;
    let version_id = add_version(&fixture, fixture.live.entity_ref()).await;

    let raw = version_id.to_string();
    let mut req = request(&fixture).with_preview(Some(&raw));
    req.entity = None;
    let render = resolve(&fixture, req).await;

    assert_eq!(render.entity, fixture.live);
}

#[tokio::test]
async fn test_context_merge_precedence() {
    let fixture = setup().await;

    let mut extra = Map::new();
    extra.insert("slug".to_string(), json!("from-extra"));
    extra.insert("nodemenu".to_string(), json!("from-extra"));
    extra.insert("sidebar".to_string(), json!(true));

    let mut raw = Map::new();
    raw.insert("nodemenu".to_string(), json!("from-controller"));
    raw.insert("items".to_string(), json!([1, 2, 3]));

    let req = request(&fixture)
        .with_url("/en/home")
        .with_node_menu(json!(["home"]))
        .with_extra_parameters(extra)
        .with_controller_result(ControllerResult::Raw(Some(raw)));
    let render = resolve(&fixture, req).await;

    // Extra parameters override base keys, controller data overrides both
    assert_eq!(render.context["slug"], json!("from-extra"));
    assert_eq!(render.context["nodemenu"], json!("from-controller"));
    assert_eq!(render.context["sidebar"], json!(true));
    assert_eq!(render.context["items"], json!([1, 2, 3]));
    assert!(render.context.contains_key("page"));
}

#[tokio::test]
async fn test_resolution_is_repeatable() {
    let fixture = setup().await;
    let first = resolve(&fixture, request(&fixture)).await;
    let second = resolve(&fixture, request(&fixture)).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let fixture = setup().await;
    fixture.store.set_unavailable(true);

    let err = fixture
        .resolver
        .resolve(request(&fixture).with_preview(Some("1")))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Store(_)));

    // Without a preview lookup the store is never touched
    let render = fixture.resolver.resolve(request(&fixture)).await;
    assert!(render.is_ok());
}

#[test]
fn test_resolves_on_current_thread_executor() {
    let fixture = tokio_test::block_on(setup());
    let outcome = tokio_test::block_on(fixture.resolver.resolve(request(&fixture)));
    let outcome = tokio_test::assert_ok!(outcome);
    assert!(outcome.resolved().is_some());
}
