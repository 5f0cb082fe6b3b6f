//! Error types for schema building operations
//!
//! Mutation-phase errors (`AlreadyExists`, `NotFound`, `Application`) are raised
//! before any disk I/O happens. I/O errors only come out of the flush and
//! rollback phase.

use crate::config::ConfigError;
use std::io;
use std::path::{Path, PathBuf};

/// Unified error type for the schema builder.
#[derive(Debug, thiserror::Error)]
pub enum SchemaBuilderError {
    /// A create operation targets a uid that is already present
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// An edit or delete operation targets a uid that is not loaded
    #[error("{0} not found")]
    NotFound(String),

    /// Validation-adjacent failure with a user facing message
    #[error("{0}")]
    Application(String),

    /// Both the flush and the rollback of a batch failed
    #[error("Invalid schema edition")]
    InvalidSchemaEdition,

    /// File system failure, tagged with the path involved
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation failure
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The API skeleton generator reported a failure
    #[error("API generator error: {0}")]
    ApiGenerator(String),
}

impl SchemaBuilderError {
    /// Create an application error with context
    pub fn application<S: Into<String>>(msg: S) -> Self {
        Self::Application(msg.into())
    }

    /// Wrap an io error with the path it happened on
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the error is caused by the request rather than the environment.
    ///
    /// Transports map these to a 4xx-equivalent response.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::AlreadyExists(_) | Self::NotFound(_) | Self::Application(_)
        )
    }
}

/// Result alias used throughout the crate
pub type SchemaResult<T> = Result<T, SchemaBuilderError>;
