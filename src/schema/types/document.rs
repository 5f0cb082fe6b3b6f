use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Whether a document describes a content type or a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelType {
    ContentType,
    Component,
}

/// Kind of a content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    #[default]
    CollectionType,
    SingleType,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::CollectionType => "collectionType",
            ContentKind::SingleType => "singleType",
        }
    }
}

/// One content type or component definition as known to the model registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    pub model_type: ModelType,
    pub uid: String,
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub dir: PathBuf,
    pub filename: String,
    /// Schema tree (`kind`, `collectionName`, `info`, `options`, `attributes`, ...)
    pub schema: Map<String, Value>,
}

impl SchemaDocument {
    pub fn file_path(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }

    pub fn is_component(&self) -> bool {
        self.model_type == ModelType::Component
    }

    /// Attribute objects keyed by name, empty when the schema has none
    pub fn attributes(&self) -> Map<String, Value> {
        match self.schema.get("attributes") {
            Some(Value::Object(attributes)) => attributes.clone(),
            _ => Map::new(),
        }
    }
}
