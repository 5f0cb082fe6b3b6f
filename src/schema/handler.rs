//! Mutation ledger for a single schema document
//!
//! A handler keeps the document exactly as it was loaded (`initial`) next to
//! the working copy (`state`). All edits happen on the working copy; `flush`
//! writes it out and `rollback` restores the loaded version on disk.

use super::file_operations::SchemaFileOperations;
use super::types::{Attribute, Attributes, ContentKind, ModelType, SchemaDocument};
use crate::error::SchemaResult;
use log::debug;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Top-level keys written first, in this order
const SCHEMA_KEY_ORDER: [&str; 7] = [
    "kind",
    "collectionName",
    "info",
    "options",
    "pluginOptions",
    "attributes",
    "config",
];

/// Modification state of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentStatus {
    #[default]
    Unchanged,
    Modified,
    Deleted,
}

/// What a flush did on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    Skipped,
    Written,
    Removed,
}

#[derive(Debug, Clone)]
pub struct SchemaHandler {
    /// Document as loaded from the registry, `None` for documents created in this session
    initial: Option<SchemaDocument>,
    state: SchemaDocument,
    status: DocumentStatus,
    read_only: bool,
    indent: usize,
}

impl SchemaHandler {
    /// Wrap a document loaded from the registry
    pub fn load(document: SchemaDocument, read_only: bool, indent: usize) -> Self {
        Self {
            initial: Some(document.clone()),
            state: document,
            status: DocumentStatus::Unchanged,
            read_only,
            indent,
        }
    }

    /// Start a document that has no file on disk yet
    pub fn create(
        model_type: ModelType,
        uid: impl Into<String>,
        model_name: impl Into<String>,
        dir: PathBuf,
        filename: impl Into<String>,
        indent: usize,
    ) -> Self {
        Self {
            initial: None,
            state: SchemaDocument {
                model_type,
                uid: uid.into(),
                model_name: model_name.into(),
                plugin: None,
                category: None,
                dir,
                filename: filename.into(),
                schema: Map::new(),
            },
            status: DocumentStatus::Modified,
            read_only: false,
            indent,
        }
    }

    pub fn uid(&self) -> &str {
        &self.state.uid
    }

    pub fn model_name(&self) -> &str {
        &self.state.model_name
    }

    pub fn plugin(&self) -> Option<&str> {
        self.state.plugin.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.state.category.as_deref()
    }

    pub fn dir(&self) -> &Path {
        &self.state.dir
    }

    pub fn file_path(&self) -> PathBuf {
        self.state.file_path()
    }

    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    pub fn is_new(&self) -> bool {
        self.initial.is_none()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_deleted(&self) -> bool {
        self.status == DocumentStatus::Deleted
    }

    /// Content type kind, `collectionType` unless the schema says otherwise
    pub fn kind(&self) -> ContentKind {
        self.state
            .schema
            .get("kind")
            .and_then(|kind| serde_json::from_value(kind.clone()).ok())
            .unwrap_or_default()
    }

    /// Snapshot of the working document
    pub fn document(&self) -> &SchemaDocument {
        &self.state
    }

    pub fn schema(&self) -> &Map<String, Value> {
        &self.state.schema
    }

    fn touch(&mut self) {
        if self.status != DocumentStatus::Deleted {
            self.status = DocumentStatus::Modified;
        }
    }

    pub fn set_uid(&mut self, uid: impl Into<String>) -> &mut Self {
        self.touch();
        self.state.uid = uid.into();
        self
    }

    pub fn set_dir(&mut self, dir: PathBuf) -> &mut Self {
        self.touch();
        self.state.dir = dir;
        self
    }

    pub fn set_category(&mut self, category: impl Into<String>) -> &mut Self {
        self.touch();
        self.state.category = Some(category.into());
        self
    }

    /// Read the value at `path` inside the schema tree
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.state.schema.get(*first)?, |value, key| value.get(*key))
    }

    /// Set the value at `path`, creating intermediate objects.
    ///
    /// A `None` or `null` value keeps whatever is already stored there.
    pub fn set(&mut self, path: &[&str], value: impl Into<Option<Value>>) -> &mut Self {
        self.touch();

        let value = match value.into() {
            Some(Value::Null) | None => match self.get(path) {
                Some(existing) => existing.clone(),
                None => return self,
            },
            Some(value) => value,
        };

        insert_at(&mut self.state.schema, path, value);
        self
    }

    /// Remove the value at `path`, preserving the order of its siblings
    pub fn unset(&mut self, path: &[&str]) -> &mut Self {
        self.touch();

        remove_at(&mut self.state.schema, path);
        self
    }

    /// Mark the document for removal on the next flush
    pub fn delete(&mut self) -> &mut Self {
        self.status = DocumentStatus::Deleted;
        self
    }

    /// Attribute names in display order
    pub fn attribute_names(&self) -> Vec<String> {
        match self.get(&["attributes"]) {
            Some(Value::Object(attributes)) => attributes.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    pub fn get_attribute(&self, key: &str) -> SchemaResult<Option<Attribute>> {
        match self.get(&["attributes", key]) {
            Some(value) => Ok(Some(Attribute::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// All attributes, typed, in display order
    pub fn attributes(&self) -> SchemaResult<Attributes> {
        let mut attributes = Attributes::new();
        for key in self.attribute_names() {
            if let Some(attribute) = self.get_attribute(&key)? {
                attributes.insert(key, attribute);
            }
        }
        Ok(attributes)
    }

    pub fn set_attribute(&mut self, key: &str, attribute: &Attribute) -> SchemaResult<&mut Self> {
        let value = attribute.to_value()?;
        Ok(self.set(&["attributes", key], value))
    }

    pub fn delete_attribute(&mut self, key: &str) -> &mut Self {
        self.unset(&["attributes", key])
    }

    /// Whether the stored attribute `key` may be replaced by an edit
    pub fn is_configurable(&self, key: &str) -> bool {
        !matches!(
            self.get(&["attributes", key, "configurable"]),
            Some(Value::Bool(false))
        )
    }

    /// Replace every configurable attribute with `attributes`.
    ///
    /// Attributes stored with `configurable: false` are left untouched.
    pub fn set_attributes(&mut self, attributes: &Attributes) -> SchemaResult<&mut Self> {
        for key in self.attribute_names() {
            if self.is_configurable(&key) {
                self.delete_attribute(&key);
            }
        }

        if self.get(&["attributes"]).is_none() {
            self.set(&["attributes"], Value::Object(Map::new()));
        }

        for (key, attribute) in attributes {
            if !self.is_configurable(key) {
                continue;
            }
            self.set_attribute(key, attribute)?;
        }
        Ok(self)
    }

    /// Drop every attribute whose relation target is `target_uid`
    pub fn remove_content_type(&mut self, target_uid: &str) -> SchemaResult<&mut Self> {
        for key in self.attribute_names() {
            let target = self.get(&["attributes", &key, "target"]);
            if target.and_then(Value::as_str) == Some(target_uid) {
                self.delete_attribute(&key);
            }
        }
        Ok(self)
    }

    /// Drop component attributes of `component_uid` and strip it from dynamic zones
    pub fn remove_component(&mut self, component_uid: &str) -> SchemaResult<&mut Self> {
        for key in self.attribute_names() {
            match self.get_attribute(&key)? {
                Some(Attribute::Component(attribute)) if attribute.component == component_uid => {
                    self.delete_attribute(&key);
                }
                Some(Attribute::DynamicZone(attribute))
                    if attribute.components.iter().any(|c| c == component_uid) =>
                {
                    let remaining: Vec<Value> = attribute
                        .components
                        .into_iter()
                        .filter(|c| c != component_uid)
                        .map(Value::String)
                        .collect();
                    self.set(&["attributes", &key, "components"], Value::Array(remaining));
                }
                _ => {}
            }
        }
        Ok(self)
    }

    /// Rewrite references to `old_uid` into `new_uid`
    pub fn update_component(&mut self, old_uid: &str, new_uid: &str) -> SchemaResult<&mut Self> {
        for key in self.attribute_names() {
            match self.get_attribute(&key)? {
                Some(Attribute::Component(attribute)) if attribute.component == old_uid => {
                    self.set(
                        &["attributes", &key, "component"],
                        Value::String(new_uid.to_string()),
                    );
                }
                Some(Attribute::DynamicZone(attribute))
                    if attribute.components.iter().any(|c| c == old_uid) =>
                {
                    let renamed: Vec<Value> = attribute
                        .components
                        .into_iter()
                        .map(|c| if c == old_uid { new_uid.to_string() } else { c })
                        .map(Value::String)
                        .collect();
                    self.set(&["attributes", &key, "components"], Value::Array(renamed));
                }
                _ => {}
            }
        }
        Ok(self)
    }

    /// Schema tree with the fixed top-level key order
    fn ordered_schema(schema: &Map<String, Value>) -> Map<String, Value> {
        let mut ordered = Map::new();
        for key in SCHEMA_KEY_ORDER {
            if let Some(value) = schema.get(key) {
                ordered.insert(key.to_string(), value.clone());
            }
        }
        for (key, value) in schema {
            if !ordered.contains_key(key) {
                ordered.insert(key.clone(), value.clone());
            }
        }
        ordered
    }

    /// Persist the working document
    pub async fn flush(&self) -> SchemaResult<FlushOutcome> {
        if self.read_only {
            return Ok(FlushOutcome::Skipped);
        }

        let file_path = self.state.file_path();
        let initial_path = self.initial.as_ref().map(SchemaDocument::file_path);

        match self.status {
            DocumentStatus::Unchanged => Ok(FlushOutcome::Skipped),
            DocumentStatus::Deleted => {
                let path = initial_path.unwrap_or(file_path);
                SchemaFileOperations::remove_file_and_prune(&path).await?;
                debug!("Schema '{}' removed from {}", self.state.uid, path.display());
                Ok(FlushOutcome::Removed)
            }
            DocumentStatus::Modified => {
                let schema = Self::ordered_schema(&self.state.schema);
                SchemaFileOperations::write_schema_file(&file_path, &schema, self.indent).await?;
                debug!("Schema '{}' written to {}", self.state.uid, file_path.display());

                if let Some(initial_path) = initial_path {
                    if initial_path != file_path {
                        SchemaFileOperations::remove_file_and_prune(&initial_path).await?;
                    }
                }
                Ok(FlushOutcome::Written)
            }
        }
    }

    /// Restore the on-disk state the document had when it was loaded
    pub async fn rollback(&self) -> SchemaResult<()> {
        if self.read_only {
            return Ok(());
        }

        let file_path = self.state.file_path();

        let Some(initial) = &self.initial else {
            // Created in this session: whatever was written must go
            return SchemaFileOperations::remove_file_and_prune(&file_path).await;
        };

        if self.status == DocumentStatus::Unchanged {
            return Ok(());
        }

        let initial_path = initial.file_path();
        SchemaFileOperations::write_schema_file(&initial_path, &initial.schema, self.indent).await?;

        if initial_path != file_path {
            SchemaFileOperations::remove_file_and_prune(&file_path).await?;
        }
        debug!("Schema '{}' rolled back to {}", initial.uid, initial_path.display());
        Ok(())
    }
}

fn insert_at(schema: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = schema;
    for key in parents {
        let entry = current
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = match entry {
            Value::Object(map) => map,
            _ => return,
        };
    }
    current.insert(last.to_string(), value);
}

fn remove_at(schema: &mut Map<String, Value>, path: &[&str]) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = schema;
    for key in parents {
        current = match current.get_mut(*key) {
            Some(Value::Object(map)) => map,
            _ => return,
        };
    }
    current.shift_remove(*last);
}
