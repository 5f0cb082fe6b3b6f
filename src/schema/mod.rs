pub mod builder;
pub mod discovery;
pub mod file_operations;
pub mod handler;
pub mod naming;
pub mod registry;
pub mod temporary_uids;
pub mod types;

pub use builder::SchemaBuilder;
pub use discovery::SchemaDiscovery;
pub use file_operations::SchemaFileOperations;
pub use handler::{DocumentStatus, FlushOutcome, SchemaHandler};
pub use registry::{InMemoryRegistry, ModelRegistry};
pub use temporary_uids::{replace_temporary_uids, UidMap};

// Re-export all types at the schema module level
pub use types::{
    Attribute, Attributes, CategoryInput, ComponentAttribute, ComponentInput, ComponentRequest,
    ContentKind, ContentTypeInput, ContentTypeRequest, DynamicZoneAttribute, ModelType,
    RelationAttribute, RelationKind, RelationSide, ScalarAttribute, SchemaDocument, UidAttribute,
};
