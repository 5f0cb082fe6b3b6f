//! Request payloads as received from the admin panel.
//!
//! Shapes are validated upstream; the builder only relies on the fields below.

use super::attribute::Attributes;
use super::document::ContentKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeInput {
    /// Set when editing an existing content type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub singular_name: String,
    pub plural_name: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContentKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_and_publish: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_options: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInput {
    /// Set when editing an existing component
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Client side identifier of a component created in the same request
    #[serde(default, rename = "tmpUID", skip_serializing_if = "Option::is_none")]
    pub tmp_uid: Option<String>,
    pub category: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_options: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeRequest {
    pub content_type: ContentTypeInput,
    #[serde(default)]
    pub components: Vec<ComponentInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRequest {
    pub component: ComponentInput,
    #[serde(default)]
    pub components: Vec<ComponentInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
}

/// Attribute-bearing payloads that may reference temporary component uids
pub trait HasAttributes {
    fn attributes_mut(&mut self) -> &mut Attributes;
}

impl HasAttributes for ContentTypeInput {
    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }
}

impl HasAttributes for ComponentInput {
    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }
}
