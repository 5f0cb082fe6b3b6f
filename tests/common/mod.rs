//! Common test utilities for schema builder integration tests
//!
//! Provides a temporary application directory with helpers to seed and read
//! schema files, plus input builders shared by the test files.

#![allow(dead_code)]

use schema_builder::schema::types::{
    Attribute, Attributes, ComponentInput, ContentTypeInput, RelationAttribute, RelationKind,
};
use schema_builder::schema::SchemaFileOperations;
use schema_builder::{BuilderConfig, InMemoryRegistry, SchemaDiscovery};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tempfile::TempDir;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Temporary application with the default directory layout
pub struct TestApp {
    pub config: BuilderConfig,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        init_logging();
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        Self {
            config: BuilderConfig::new(dir.path()),
            _dir: dir,
        }
    }

    pub fn content_type_path(&self, name: &str) -> PathBuf {
        self.config
            .api_dir()
            .join(name)
            .join("content-types")
            .join(name)
            .join("schema.json")
    }

    pub fn component_path(&self, category: &str, name: &str) -> PathBuf {
        self.config
            .components_dir()
            .join(category)
            .join(format!("{}.json", name))
    }

    /// Seed a collection type named `name` with the given attributes
    pub async fn write_content_type(&self, name: &str, attributes: Value) {
        let schema = serde_json::json!({
            "kind": "collectionType",
            "collectionName": format!("{}s", name),
            "info": { "singularName": name, "pluralName": format!("{}s", name), "displayName": name },
            "options": { "draftAndPublish": false },
            "attributes": attributes
        });
        SchemaFileOperations::write_schema_file(&self.content_type_path(name), &schema, 2)
            .await
            .expect("Failed to seed content type");
    }

    /// Seed a component `<category>.<name>` with the given attributes
    pub async fn write_component(&self, category: &str, name: &str, attributes: Value) {
        let schema = serde_json::json!({
            "collectionName": format!("components_{}_{}s", category, name),
            "info": { "displayName": name, "icon": "cube" },
            "attributes": attributes
        });
        SchemaFileOperations::write_schema_file(&self.component_path(category, name), &schema, 2)
            .await
            .expect("Failed to seed component");
    }

    pub async fn read(&self, path: PathBuf) -> Map<String, Value> {
        SchemaFileOperations::read_schema_file(&path)
            .await
            .expect("Failed to read schema file")
    }

    pub async fn registry(&self) -> InMemoryRegistry {
        SchemaDiscovery::discover(&self.config)
            .await
            .expect("Failed to discover schemas")
    }
}

pub fn content_type_input(name: &str, attributes: Attributes) -> ContentTypeInput {
    ContentTypeInput {
        singular_name: name.to_string(),
        plural_name: format!("{}s", name),
        display_name: name.to_string(),
        attributes,
        ..Default::default()
    }
}

pub fn component_input(category: &str, display_name: &str, attributes: Attributes) -> ComponentInput {
    ComponentInput {
        category: category.to_string(),
        display_name: display_name.to_string(),
        attributes,
        ..Default::default()
    }
}

pub fn relation(kind: RelationKind, target: &str, target_attribute: &str) -> Attribute {
    RelationAttribute::new(kind, target)
        .with_target_attribute(target_attribute)
        .into()
}

pub fn attributes<const N: usize>(entries: [(&str, Attribute); N]) -> Attributes {
    entries
        .into_iter()
        .map(|(key, attribute)| (key.to_string(), attribute))
        .collect()
}
