//! Session-scoped schema builder
//!
//! A [`SchemaBuilder`] snapshots every component and content type of the
//! registry into [`SchemaHandler`]s, applies component and content type
//! operations in memory and finally flushes every touched document with
//! [`SchemaBuilder::write_files`]. Operations are split by concern:
//!
//! - `component.rs`: create, edit and delete components
//! - `content_type.rs`: create, edit and delete content types and keep relation mirrors in sync
//! - `category.rs`: rename and delete component categories

mod category;
mod component;
mod content_type;

use super::handler::{FlushOutcome, SchemaHandler};
use super::naming;
use super::registry::ModelRegistry;
use super::temporary_uids::UidMap;
use super::types::{Attribute, Attributes, ComponentInput, ModelType};
use crate::config::BuilderConfig;
use crate::error::{SchemaBuilderError, SchemaResult};
use futures::future::join_all;
use log::{debug, error, info};
use std::collections::BTreeMap;

pub struct SchemaBuilder {
    config: BuilderConfig,
    components: BTreeMap<String, SchemaHandler>,
    content_types: BTreeMap<String, SchemaHandler>,
}

impl SchemaBuilder {
    /// Load every document known to `registry`
    pub fn new(config: BuilderConfig, registry: &dyn ModelRegistry) -> Self {
        let mut components = BTreeMap::new();
        let mut content_types = BTreeMap::new();

        for document in registry.list() {
            let read_only = config.is_read_only_plugin(document.plugin.as_deref());
            let handler = SchemaHandler::load(document.clone(), read_only, config.json_indent);
            match document.model_type {
                ModelType::Component => components.insert(document.uid.clone(), handler),
                ModelType::ContentType => content_types.insert(document.uid.clone(), handler),
            };
        }

        debug!(
            "Schema builder loaded {} components and {} content types",
            components.len(),
            content_types.len()
        );

        Self {
            config,
            components,
            content_types,
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn component(&self, uid: &str) -> Option<&SchemaHandler> {
        self.components.get(uid)
    }

    pub fn content_type(&self, uid: &str) -> Option<&SchemaHandler> {
        self.content_types.get(uid)
    }

    /// Components ordered by uid, including those marked for deletion
    pub fn components(&self) -> impl Iterator<Item = &SchemaHandler> {
        self.components.values()
    }

    /// Content types ordered by uid, including those marked for deletion
    pub fn content_types(&self) -> impl Iterator<Item = &SchemaHandler> {
        self.content_types.values()
    }

    /// Categories that still hold at least one component
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .components
            .values()
            .filter(|handler| !handler.is_deleted())
            .filter_map(|handler| handler.category().map(str::to_string))
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    fn handlers(&self) -> impl Iterator<Item = &SchemaHandler> {
        self.components.values().chain(self.content_types.values())
    }

    fn handlers_mut(&mut self) -> impl Iterator<Item = &mut SchemaHandler> {
        self.components
            .values_mut()
            .chain(self.content_types.values_mut())
    }

    /// Convert attributes from the admin panel shape into the stored shape.
    ///
    /// Relations lose `targetAttribute`/`dominant` and get `inversedBy` or
    /// `mappedBy` instead; their target must be a loaded content type.
    pub fn convert_attributes(&self, attributes: &Attributes) -> SchemaResult<Attributes> {
        let mut converted = Attributes::with_capacity(attributes.len());

        for (key, attribute) in attributes {
            let mut attribute = attribute.clone();
            attribute.normalize_base_properties();

            if let Attribute::Relation(relation) = &mut attribute {
                if let Some(target) = relation.target.as_deref() {
                    if !self.has_content_type(target) {
                        return Err(SchemaBuilderError::application(format!(
                            "target: {} does not exist",
                            target
                        )));
                    }
                }

                let dominant = relation.dominant.take();
                if let Some(target_attribute) = relation.target_attribute.take() {
                    if let Some(side) = relation.relation.stored_side(dominant) {
                        relation.set_side(side, target_attribute);
                    }
                }
            }

            converted.insert(key.clone(), attribute);
        }

        Ok(converted)
    }

    /// Assign permanent uids to nested components that only carry a `tmpUID`
    pub fn create_new_component_uid_map(&self, components: &[ComponentInput]) -> UidMap {
        components
            .iter()
            .filter(|component| component.uid.is_none())
            .filter_map(|component| {
                let tmp_uid = component.tmp_uid.clone()?;
                Some((
                    tmp_uid,
                    naming::component_uid(&component.category, &component.display_name),
                ))
            })
            .collect()
    }

    /// Flush every handler concurrently, rolling all of them back on failure.
    ///
    /// Returns the flush error once the rollback succeeded, or
    /// [`SchemaBuilderError::InvalidSchemaEdition`] when the rollback failed too.
    pub async fn write_files(&self) -> SchemaResult<()> {
        let results = join_all(self.handlers().map(|handler| handler.flush())).await;

        let mut written = 0;
        let mut failure = None;
        for result in results {
            match result {
                Ok(FlushOutcome::Skipped) => {}
                Ok(_) => written += 1,
                Err(e) => {
                    if failure.is_none() {
                        failure = Some(e);
                    }
                }
            }
        }

        let Some(failure) = failure else {
            info!("Schema files written ({} documents touched)", written);
            return Ok(());
        };

        error!("Failed to write schema files: {}", failure);
        if let Err(rollback_error) = self.rollback().await {
            error!(
                "Rollback after a failed schema edition failed as well: {}. \
                 Schema files may need to be repaired manually",
                rollback_error
            );
            return Err(SchemaBuilderError::InvalidSchemaEdition);
        }

        Err(failure)
    }

    /// Restore every handler to the state it had on disk when loaded
    pub async fn rollback(&self) -> SchemaResult<()> {
        let results = join_all(self.handlers().map(|handler| handler.rollback())).await;
        results.into_iter().collect::<SchemaResult<Vec<()>>>()?;
        debug!("Schema files rolled back");
        Ok(())
    }

    fn has_content_type(&self, uid: &str) -> bool {
        self.content_types
            .get(uid)
            .is_some_and(|handler| !handler.is_deleted())
    }

    /// Handler of an existing document that may be edited or deleted
    fn editable<'a>(
        handlers: &'a BTreeMap<String, SchemaHandler>,
        uid: &str,
    ) -> SchemaResult<&'a SchemaHandler> {
        match handlers.get(uid) {
            Some(handler) if handler.is_deleted() => Err(SchemaBuilderError::NotFound(uid.to_string())),
            Some(handler) if handler.is_read_only() => Err(SchemaBuilderError::application(format!(
                "{} is managed by its plugin and cannot be modified",
                uid
            ))),
            Some(handler) => Ok(handler),
            None => Err(SchemaBuilderError::NotFound(uid.to_string())),
        }
    }

    /// Move a component handler to a new key after its uid changed
    fn rekey_component(&mut self, old_uid: &str, new_uid: &str) {
        if let Some(handler) = self.components.remove(old_uid) {
            self.components.insert(new_uid.to_string(), handler);
        }
    }

    /// Rewrite references to a moved component in every document
    fn update_component_references(&mut self, old_uid: &str, new_uid: &str) -> SchemaResult<()> {
        for handler in self.handlers_mut() {
            handler.update_component(old_uid, new_uid)?;
        }
        Ok(())
    }
}

fn handler_mut<'a>(
    handlers: &'a mut BTreeMap<String, SchemaHandler>,
    uid: &str,
) -> SchemaResult<&'a mut SchemaHandler> {
    handlers
        .get_mut(uid)
        .ok_or_else(|| SchemaBuilderError::NotFound(uid.to_string()))
}

/// Incoming attributes minus the keys locked on `handler`
fn without_locked(handler: &SchemaHandler, attributes: &Attributes) -> Attributes {
    attributes
        .iter()
        .filter(|(key, _)| handler.is_configurable(key))
        .map(|(key, attribute)| (key.clone(), attribute.clone()))
        .collect()
}
