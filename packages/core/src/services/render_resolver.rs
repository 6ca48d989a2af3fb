//! Render Resolver
//!
//! Turns a request that is bound to a node translation into the template and
//! context the view pipeline renders. Runs once per request, after the
//! controller and before the view layer.
//!
//! # Resolution Steps
//!
//! 1. A final response from the controller is left alone
//! 2. A request that already has a template is left alone
//! 3. A request without a node translation is left alone
//! 4. In preview mode with a numeric version id, the version's entity replaces
//!    the live entity (an unknown version keeps the live entity)
//! 5. The context is built from the base keys, then extra parameters, then the
//!    controller's raw map, later sources overriding earlier ones
//! 6. The template is the entity's default view; owner and action come from
//!    the controller identifier
//!
//! Resolution has no side effects: the outcome is returned to the caller.

use crate::db::ContentStore;
use crate::models::{Entity, NodeTranslation, VersionId};
use crate::services::error::ResolveError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, OnceLock};

// Version ids in preview requests are plain non-negative integers
const VERSION_ID_PATTERN: &str = r"^[0-9]+$";

/// Parse a preview version id; anything malformed means "no override"
///
/// # Examples
///
/// ```
/// # use nodetree_core::services::render_resolver::parse_version_id;
/// # use nodetree_core::models::VersionId;
/// assert_eq!(parse_version_id("42"), Some(VersionId(42)));
/// assert_eq!(parse_version_id("abc"), None);
/// assert_eq!(parse_version_id(""), None);
/// ```
pub fn parse_version_id(raw: &str) -> Option<VersionId> {
    static VERSION_ID_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = VERSION_ID_REGEX.get_or_init(|| {
        Regex::new(VERSION_ID_PATTERN).expect("version id pattern is a valid regex")
    });

    if !regex.is_match(raw) {
        return None;
    }
    raw.parse().ok().map(VersionId)
}

/// Split `Namespace:Controller:action` into `("Namespace:Controller", "action")`
///
/// An identifier without `:` has an empty owner.
pub fn split_controller(controller: &str) -> (String, String) {
    match controller.rsplit_once(':') {
        Some((owner, action)) => (owner.to_string(), action.to_string()),
        None => (String::new(), controller.to_string()),
    }
}

/// What the controller returned
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerResult {
    /// A finished response; resolution never touches it
    Response,
    /// Raw data awaiting a template. A map is merged over the render context;
    /// `None` stands for any non-map value.
    Raw(Option<Map<String, Value>>),
}

impl Default for ControllerResult {
    fn default() -> Self {
        Self::Raw(None)
    }
}

/// Request state supplied by the routing layer
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    pub controller_result: ControllerResult,

    /// A template was already attributed to this request
    pub template_already_set: bool,

    /// Controller identifier, e.g. `App:Page:service`
    pub controller: String,

    pub node_translation: Option<NodeTranslation>,

    /// Entity currently live for the translation
    pub entity: Option<Entity>,

    pub url: Option<String>,

    pub node_menu: Option<Value>,

    pub extra_parameters: Option<Map<String, Value>>,

    pub preview: bool,

    /// Raw `version` request parameter; only read in preview mode
    pub requested_version: Option<String>,
}

impl RenderRequest {
    /// A raw-result request bound to `translation`, rendering `entity`
    pub fn for_translation(
        controller: impl Into<String>,
        translation: NodeTranslation,
        entity: Entity,
    ) -> Self {
        Self {
            controller: controller.into(),
            node_translation: Some(translation),
            entity: Some(entity),
            ..Default::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_node_menu(mut self, node_menu: Value) -> Self {
        self.node_menu = Some(node_menu);
        self
    }

    pub fn with_extra_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.extra_parameters = Some(parameters);
        self
    }

    pub fn with_controller_result(mut self, result: ControllerResult) -> Self {
        self.controller_result = result;
        self
    }

    /// Enable preview mode, optionally asking for a specific version
    pub fn with_preview(mut self, version: Option<&str>) -> Self {
        self.preview = true;
        self.requested_version = version.map(str::to_string);
        self
    }
}

/// Template attribution handed to the view pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRef {
    /// Entity's default view
    pub template: String,
    /// Controller namespace path
    pub owner: String,
    /// Trailing controller segment
    pub action: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRender {
    pub template: TemplateRef,
    pub context: Map<String, Value>,
    /// Entity that ended up in `page` / `resource`
    pub entity: Entity,
    /// Set when a preview version replaced the live entity
    pub preview_version: Option<VersionId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    FinalResponse,
    TemplateAlreadySet,
    NoNodeTranslation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// The request is not ours to resolve; pass it through untouched
    Skipped(SkipReason),
    Resolved(ResolvedRender),
}

impl RenderOutcome {
    pub fn resolved(&self) -> Option<&ResolvedRender> {
        match self {
            RenderOutcome::Resolved(render) => Some(render),
            RenderOutcome::Skipped(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct RenderResolver {
    store: Arc<dyn ContentStore>,
}

impl RenderResolver {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Resolve the template and context for one request
    ///
    /// # Errors
    ///
    /// - `MissingEntity` if no entity is left to render after preview handling
    /// - `Store` if a version or entity lookup fails
    pub async fn resolve(&self, request: RenderRequest) -> Result<RenderOutcome, ResolveError> {
        if request.controller_result == ControllerResult::Response {
            tracing::debug!("Controller produced a response, skipping render resolution");
            return Ok(RenderOutcome::Skipped(SkipReason::FinalResponse));
        }

        if request.template_already_set {
            tracing::debug!("Template already set, skipping render resolution");
            return Ok(RenderOutcome::Skipped(SkipReason::TemplateAlreadySet));
        }

        let translation = match request.node_translation {
            Some(translation) => translation,
            None => return Ok(RenderOutcome::Skipped(SkipReason::NoNodeTranslation)),
        };

        let mut entity = request.entity;
        let mut preview_version = None;

        if request.preview {
            if let Some(version_id) = request.requested_version.as_deref().and_then(parse_version_id)
            {
                if let Some(previewed) = self.preview_entity(version_id).await? {
                    entity = Some(previewed);
                    preview_version = Some(version_id);
                }
            }
        }

        let entity = entity.ok_or(ResolveError::MissingEntity {
            translation_id: translation.id,
        })?;

        let entity_value = serde_json::to_value(&entity)?;
        let mut context = Map::new();
        context.insert(
            "nodetranslation".to_string(),
            serde_json::to_value(&translation)?,
        );
        context.insert(
            "slug".to_string(),
            request.url.map(Value::String).unwrap_or(Value::Null),
        );
        context.insert("page".to_string(), entity_value.clone());
        context.insert("resource".to_string(), entity_value);
        context.insert(
            "nodemenu".to_string(),
            request.node_menu.unwrap_or(Value::Null),
        );

        if let Some(extra) = request.extra_parameters {
            context.extend(extra);
        }
        if let ControllerResult::Raw(Some(raw)) = request.controller_result {
            context.extend(raw);
        }

        let (owner, action) = split_controller(&request.controller);
        let template = TemplateRef {
            template: self.store.default_view(&entity),
            owner,
            action,
        };

        tracing::debug!(
            "Resolved translation {} ({}) to template '{}'",
            translation.id,
            translation.lang,
            template.template
        );

        Ok(RenderOutcome::Resolved(ResolvedRender {
            template,
            context,
            entity,
            preview_version,
        }))
    }

    /// Entity referenced by a preview version, if both exist
    async fn preview_entity(&self, version_id: VersionId) -> Result<Option<Entity>, ResolveError> {
        let version = match self.store.find_version(version_id).await? {
            Some(version) => version,
            None => {
                tracing::warn!(
                    "Preview version {} not found, rendering live entity",
                    version_id
                );
                return Ok(None);
            }
        };

        let entity = self.store.referenced_entity(&version).await?;
        if entity.is_none() {
            tracing::warn!(
                "Entity {} of preview version {} not found, rendering live entity",
                version.entity,
                version_id
            );
        }
        Ok(entity)
    }
}

#[cfg(test)]
#[path = "render_resolver_test.rs"]
mod render_resolver_test;
