//! Attribute definitions
//!
//! An attribute is a JSON object tagged by its `type` field. The variants the
//! builder reasons about (relations, components, dynamic zones and uid fields)
//! are typed; every other type is a [`ScalarAttribute`]. Properties the builder
//! does not know are kept in a flattened map so nothing is lost when a schema
//! is read and written back.

use super::relation::{RelationKind, RelationSide};
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Attributes of a schema, in display order
pub type Attributes = IndexMap<String, Attribute>;

/// Properties that are never carried over from a previous relation definition
const NON_REUSABLE_PROPERTIES: [&str; 7] = [
    "configurable",
    "required",
    "private",
    "unique",
    "pluginOptions",
    "inversedBy",
    "mappedBy",
];

/// A single attribute definition
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Relation(RelationAttribute),
    Component(ComponentAttribute),
    DynamicZone(DynamicZoneAttribute),
    Uid(UidAttribute),
    Scalar(ScalarAttribute),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationAttribute {
    pub relation: RelationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Name of the mirrored attribute on the target (wire shape only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_attribute: Option<String>,
    /// Whether this side owns the join (wire shape only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inversed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_populate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_options: Option<Value>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentAttribute {
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeatable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurable: Option<bool>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicZoneAttribute {
    pub components: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurable: Option<bool>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UidAttribute {
    /// Sibling attribute the slug is derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurable: Option<bool>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

/// Any attribute type without builder-specific semantics (`string`, `integer`, `media`, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarAttribute {
    #[serde(skip)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurable: Option<bool>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl RelationAttribute {
    pub fn new(relation: RelationKind, target: impl Into<String>) -> Self {
        Self {
            relation,
            target: Some(target.into()),
            target_attribute: None,
            dominant: None,
            inversed_by: None,
            mapped_by: None,
            auto_populate: None,
            private: None,
            configurable: None,
            plugin_options: None,
            properties: Map::new(),
        }
    }

    pub fn with_target_attribute(mut self, name: impl Into<String>) -> Self {
        self.target_attribute = Some(name.into());
        self
    }

    /// Name of the opposite attribute recorded on the stored form
    pub fn opposite_attribute(&self) -> Option<&str> {
        self.inversed_by.as_deref().or(self.mapped_by.as_deref())
    }

    /// Record the opposite attribute on `side`, clearing the other side
    pub fn set_side(&mut self, side: RelationSide, name: impl Into<String>) {
        match side {
            RelationSide::InversedBy => {
                self.inversed_by = Some(name.into());
                self.mapped_by = None;
            }
            RelationSide::MappedBy => {
                self.mapped_by = Some(name.into());
                self.inversed_by = None;
            }
        }
    }
}

impl ScalarAttribute {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            required: None,
            unique: None,
            private: None,
            configurable: None,
            properties: Map::new(),
        }
    }
}

impl ComponentAttribute {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            repeatable: None,
            min: None,
            max: None,
            private: None,
            configurable: None,
            properties: Map::new(),
        }
    }
}

impl DynamicZoneAttribute {
    pub fn new(components: Vec<String>) -> Self {
        Self {
            components,
            private: None,
            configurable: None,
            properties: Map::new(),
        }
    }
}

impl Attribute {
    /// Value of the `type` field
    pub fn type_name(&self) -> &str {
        match self {
            Attribute::Relation(_) => "relation",
            Attribute::Component(_) => "component",
            Attribute::DynamicZone(_) => "dynamiczone",
            Attribute::Uid(_) => "uid",
            Attribute::Scalar(scalar) => &scalar.kind,
        }
    }

    pub fn scalar(kind: impl Into<String>) -> Self {
        Attribute::Scalar(ScalarAttribute::new(kind))
    }

    pub fn is_relation(&self) -> bool {
        matches!(self, Attribute::Relation(_))
    }

    pub fn as_relation(&self) -> Option<&RelationAttribute> {
        match self {
            Attribute::Relation(relation) => Some(relation),
            _ => None,
        }
    }

    pub fn as_relation_mut(&mut self) -> Option<&mut RelationAttribute> {
        match self {
            Attribute::Relation(relation) => Some(relation),
            _ => None,
        }
    }

    /// Relation target uid, if this is a relation with a target
    pub fn target(&self) -> Option<&str> {
        self.as_relation().and_then(|r| r.target.as_deref())
    }

    fn configurable_flag(&self) -> Option<bool> {
        match self {
            Attribute::Relation(a) => a.configurable,
            Attribute::Component(a) => a.configurable,
            Attribute::DynamicZone(a) => a.configurable,
            Attribute::Uid(a) => a.configurable,
            Attribute::Scalar(a) => a.configurable,
        }
    }

    fn private_flag(&self) -> Option<bool> {
        match self {
            Attribute::Relation(a) => a.private,
            Attribute::Component(a) => a.private,
            Attribute::DynamicZone(a) => a.private,
            Attribute::Uid(a) => a.private,
            Attribute::Scalar(a) => a.private,
        }
    }

    /// Attributes are configurable unless explicitly marked `configurable: false`
    pub fn is_configurable(&self) -> bool {
        self.configurable_flag() != Some(false)
    }

    pub fn is_private(&self) -> bool {
        self.private_flag() == Some(true)
    }

    /// Normalize `private`/`configurable` to the stored form.
    ///
    /// Only `private: true` and `configurable: false` are kept.
    pub fn normalize_base_properties(&mut self) {
        let private = if self.is_private() { Some(true) } else { None };
        let configurable = if self.is_configurable() {
            None
        } else {
            Some(false)
        };

        match self {
            Attribute::Relation(a) => {
                a.private = private;
                a.configurable = configurable;
            }
            Attribute::Component(a) => {
                a.private = private;
                a.configurable = configurable;
            }
            Attribute::DynamicZone(a) => {
                a.private = private;
                a.configurable = configurable;
            }
            Attribute::Uid(a) => {
                a.private = private;
                a.configurable = configurable;
            }
            Attribute::Scalar(a) => {
                a.private = private;
                a.configurable = configurable;
            }
        }
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Fill properties missing from `self` with those of `previous`.
    ///
    /// Used when a relation changes during an edit so manually tuned options
    /// survive. `configurable`, `required`, `private`, `unique`,
    /// `pluginOptions`, `inversedBy` and `mappedBy` are never carried over.
    pub fn with_previous_properties(&self, previous: &Attribute) -> serde_json::Result<Attribute> {
        let mut current = match self.to_value()? {
            Value::Object(map) => map,
            _ => return Ok(self.clone()),
        };

        if let Value::Object(previous) = previous.to_value()? {
            for (key, value) in previous {
                if NON_REUSABLE_PROPERTIES.contains(&key.as_str()) {
                    continue;
                }
                current.entry(key).or_insert(value);
            }
        }

        Attribute::from_value(Value::Object(current))
    }
}

impl From<RelationAttribute> for Attribute {
    fn from(attribute: RelationAttribute) -> Self {
        Attribute::Relation(attribute)
    }
}

impl From<ComponentAttribute> for Attribute {
    fn from(attribute: ComponentAttribute) -> Self {
        Attribute::Component(attribute)
    }
}

impl From<DynamicZoneAttribute> for Attribute {
    fn from(attribute: DynamicZoneAttribute) -> Self {
        Attribute::DynamicZone(attribute)
    }
}

impl From<ScalarAttribute> for Attribute {
    fn from(attribute: ScalarAttribute) -> Self {
        Attribute::Scalar(attribute)
    }
}

impl Serialize for Attribute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match self {
            Attribute::Relation(a) => serde_json::to_value(a),
            Attribute::Component(a) => serde_json::to_value(a),
            Attribute::DynamicZone(a) => serde_json::to_value(a),
            Attribute::Uid(a) => serde_json::to_value(a),
            Attribute::Scalar(a) => serde_json::to_value(a),
        }
        .map_err(S::Error::custom)?;

        // `type` always comes first in written files
        let mut map = Map::new();
        map.insert("type".to_string(), Value::String(self.type_name().to_string()));
        if let Value::Object(fields) = body {
            map.extend(fields);
        }
        map.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Attribute {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = Map::<String, Value>::deserialize(deserializer)?;
        let kind = match map.remove("type") {
            Some(Value::String(kind)) => kind,
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "attribute type must be a string, got {}",
                    other
                )))
            }
            None => return Err(D::Error::missing_field("type")),
        };
        let body = Value::Object(map);

        let attribute = match kind.as_str() {
            "relation" => Attribute::Relation(serde_json::from_value(body).map_err(D::Error::custom)?),
            "component" => {
                Attribute::Component(serde_json::from_value(body).map_err(D::Error::custom)?)
            }
            "dynamiczone" => {
                Attribute::DynamicZone(serde_json::from_value(body).map_err(D::Error::custom)?)
            }
            "uid" => Attribute::Uid(serde_json::from_value(body).map_err(D::Error::custom)?),
            _ => {
                let mut scalar: ScalarAttribute =
                    serde_json::from_value(body).map_err(D::Error::custom)?;
                scalar.kind = kind;
                Attribute::Scalar(scalar)
            }
        };
        Ok(attribute)
    }
}
