//! Configuration error types

/// Errors raised while loading or validating a [`BuilderConfig`](super::BuilderConfig)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO-related errors (file access, permissions, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Configuration validation errors
    #[error("Configuration validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    /// Create a validation error with context
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
