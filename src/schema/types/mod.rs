pub mod attribute;
pub mod document;
pub mod input;
pub mod relation;

pub use attribute::{
    Attribute, Attributes, ComponentAttribute, DynamicZoneAttribute, RelationAttribute,
    ScalarAttribute, UidAttribute,
};
pub use document::{ContentKind, ModelType, SchemaDocument};
pub use input::{
    CategoryInput, ComponentInput, ComponentRequest, ContentTypeInput, ContentTypeRequest,
    HasAttributes,
};
pub use relation::{RelationKind, RelationSide};
