//! Builder configuration
//!
//! Describes where the application keeps its schema files and how they are
//! written. Loaded from TOML; every field except `app_dir` has a default.

mod error;

pub use error::{ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_SCHEMA_FILENAME: &str = "schema.json";
const DEFAULT_JSON_INDENT: usize = 2;

/// Location and formatting settings for schema documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Root directory of the application
    pub app_dir: PathBuf,
    /// Directory holding `<api>/content-types/<name>/schema.json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_dir: Option<PathBuf>,
    /// Directory holding `<category>/<name>.json` components
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components_dir: Option<PathBuf>,
    /// Directory holding plugin content type overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_dir: Option<PathBuf>,
    /// File name of content type schema documents
    pub schema_filename: String,
    /// Plugins whose documents are never written back to disk
    pub read_only_plugins: Vec<String>,
    /// Indentation width of written JSON files
    pub json_indent: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            app_dir: PathBuf::from("."),
            api_dir: None,
            components_dir: None,
            extensions_dir: None,
            schema_filename: DEFAULT_SCHEMA_FILENAME.to_string(),
            read_only_plugins: vec!["admin".to_string()],
            json_indent: DEFAULT_JSON_INDENT,
        }
    }
}

impl BuilderConfig {
    /// Create a configuration rooted at `app_dir` with default layout
    pub fn new<P: AsRef<Path>>(app_dir: P) -> Self {
        Self {
            app_dir: app_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Parse and validate a TOML configuration
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: BuilderConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file
    pub async fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_toml_str(&content)
    }

    /// Serialize the configuration and write it atomically
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        self.validate()?;
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;

        let temp_path = path.with_extension("toml.tmp");
        tokio::fs::write(&temp_path, content).await?;
        tokio::fs::rename(&temp_path, path).await?;
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.schema_filename.is_empty() || !self.schema_filename.ends_with(".json") {
            return Err(ConfigError::validation(format!(
                "schema_filename must be a .json file name, got '{}'",
                self.schema_filename
            )));
        }
        if !(1..=8).contains(&self.json_indent) {
            return Err(ConfigError::validation(format!(
                "json_indent must be between 1 and 8, got {}",
                self.json_indent
            )));
        }
        Ok(())
    }

    pub fn api_dir(&self) -> PathBuf {
        self.api_dir
            .clone()
            .unwrap_or_else(|| self.app_dir.join("src").join("api"))
    }

    pub fn components_dir(&self) -> PathBuf {
        self.components_dir
            .clone()
            .unwrap_or_else(|| self.app_dir.join("src").join("components"))
    }

    pub fn extensions_dir(&self) -> PathBuf {
        self.extensions_dir
            .clone()
            .unwrap_or_else(|| self.app_dir.join("src").join("extensions"))
    }

    /// Whether documents owned by `plugin` must never be flushed
    pub fn is_read_only_plugin(&self, plugin: Option<&str>) -> bool {
        plugin
            .map(|p| self.read_only_plugins.iter().any(|ro| ro == p))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_derive_layout_from_app_dir() {
        let config = BuilderConfig::new("/srv/app");
        assert_eq!(config.api_dir(), PathBuf::from("/srv/app/src/api"));
        assert_eq!(
            config.components_dir(),
            PathBuf::from("/srv/app/src/components")
        );
        assert_eq!(config.schema_filename, "schema.json");
        assert!(config.is_read_only_plugin(Some("admin")));
        assert!(!config.is_read_only_plugin(Some("i18n")));
        assert!(!config.is_read_only_plugin(None));
    }

    #[test]
    fn test_from_toml_with_overrides() {
        let config = BuilderConfig::from_toml_str(
            r#"
            app_dir = "/srv/app"
            components_dir = "/srv/shared/components"
            json_indent = 4
            read_only_plugins = ["admin", "users-permissions"]
            "#,
        )
        .unwrap();

        assert_eq!(
            config.components_dir(),
            PathBuf::from("/srv/shared/components")
        );
        assert_eq!(config.api_dir(), PathBuf::from("/srv/app/src/api"));
        assert_eq!(config.json_indent, 4);
        assert!(config.is_read_only_plugin(Some("users-permissions")));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let err = BuilderConfig::from_toml_str("schema_filename = \"schema.yaml\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = BuilderConfig::from_toml_str("json_indent = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("builder.toml");

        let config = BuilderConfig::new(dir.path());
        config.save(&path).await.unwrap();

        let loaded = BuilderConfig::load(&path).await.unwrap();
        assert_eq!(loaded, config);
    }
}
