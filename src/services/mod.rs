//! Request-level operations
//!
//! Every call builds a fresh [`SchemaBuilder`] from the registry, resolves
//! temporary component uids, applies the request in memory and ends with a
//! single [`SchemaBuilder::write_files`].

mod api_generator;
mod categories;
mod components;
mod content_types;

pub use api_generator::{ApiDescriptor, ApiGenerator, NoopApiGenerator};

use crate::config::BuilderConfig;
use crate::constants::CONTENT_TYPE_TARGET;
use crate::error::{SchemaBuilderError, SchemaResult};
use crate::schema::registry::ModelRegistry;
use crate::schema::temporary_uids::{replace_relation_target, replace_temporary_uids, UidMap};
use crate::schema::types::{ComponentInput, HasAttributes, ModelType};
use crate::schema::SchemaBuilder;

pub struct SchemaService<G: ApiGenerator = NoopApiGenerator> {
    config: BuilderConfig,
    api: G,
}

impl SchemaService<NoopApiGenerator> {
    /// Service that leaves API scaffolding to the host
    pub fn without_api(config: BuilderConfig) -> Self {
        Self::new(config, NoopApiGenerator)
    }
}

impl<G: ApiGenerator> SchemaService<G> {
    pub fn new(config: BuilderConfig, api: G) -> Self {
        Self { config, api }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn api(&self) -> &G {
        &self.api
    }

    fn builder(&self, registry: &dyn ModelRegistry) -> SchemaBuilder {
        SchemaBuilder::new(self.config.clone(), registry)
    }
}

/// Fail with `NotFound` unless the registry knows `uid` as a content type
fn require_content_type(registry: &dyn ModelRegistry, uid: &str) -> SchemaResult<()> {
    match registry.get(uid) {
        Some(document) if document.model_type == ModelType::ContentType => Ok(()),
        _ => Err(SchemaBuilderError::NotFound(uid.to_string())),
    }
}

/// Copy of `input` with temporary component uids resolved
fn with_resolved_uids<T: HasAttributes + Clone>(input: &T, uid_map: &UidMap) -> T {
    let mut resolved = input.clone();
    replace_temporary_uids(uid_map, resolved.attributes_mut());
    resolved
}

/// Create or edit the components nested in a request.
///
/// `content_type_uid` replaces `__contentType__` relation targets when the
/// request created a content type.
fn apply_nested_components(
    builder: &mut SchemaBuilder,
    components: &[ComponentInput],
    uid_map: &UidMap,
    content_type_uid: Option<&str>,
) -> SchemaResult<()> {
    for component in components {
        let mut component = with_resolved_uids(component, uid_map);
        if let Some(uid) = content_type_uid {
            replace_relation_target(&mut component.attributes, CONTENT_TYPE_TARGET, uid);
        }

        if component.uid.is_some() {
            builder.edit_component(&component)?;
        } else {
            builder.create_component(&component)?;
        }
    }
    Ok(())
}
