//! # Schema Builder Library
//!
//! This library maintains the content type and component schema files of a
//! headless CMS application. It loads every schema document, applies
//! structural edits in memory and writes the touched files back to disk with
//! an all-or-nothing rollback.
//!
//! ## Core Components
//!
//! * `config` - Builder configuration loaded from TOML
//! * `error` - Error types and handling
//! * `schema` - Schema documents, per-document handlers and the session builder
//! * `services` - Request-level operations with nested components and API scaffolding
//!
//! ## Architecture
//!
//! Every request builds a [`SchemaBuilder`] from a [`ModelRegistry`]. Edits only
//! touch in-memory [`SchemaHandler`]s; relations are mirrored on their target
//! content type so both ends always reference each other. The single
//! [`SchemaBuilder::write_files`] call at the end of a request flushes every
//! modified document concurrently and restores the previous files if any
//! write fails.

pub mod config;
pub mod constants;
pub mod error;
pub mod schema;
pub mod services;

// Re-export main types for convenience
pub use config::{BuilderConfig, ConfigError};
pub use error::{SchemaBuilderError, SchemaResult};
pub use schema::{
    DocumentStatus, FlushOutcome, InMemoryRegistry, ModelRegistry, SchemaBuilder,
    SchemaDiscovery, SchemaDocument, SchemaHandler,
};
pub use services::{ApiDescriptor, ApiGenerator, NoopApiGenerator, SchemaService};
