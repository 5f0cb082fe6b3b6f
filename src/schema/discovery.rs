//! Loads the schema documents of an application from its file layout
//!
//! - `<api>/<name>/content-types/<model>/schema.json` -> `api::<name>.<model>`
//! - `<extensions>/<plugin>/content-types/<model>/schema.json` -> `plugin::<plugin>.<model>`
//! - `<components>/<category>/<model>.json` -> `<category>.<model>`

use super::file_operations::SchemaFileOperations;
use super::naming::API_UID_PREFIX;
use super::registry::InMemoryRegistry;
use super::types::{ModelType, SchemaDocument};
use crate::config::BuilderConfig;
use crate::error::{SchemaBuilderError, SchemaResult};
use log::{debug, info};
use std::fs::FileType;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct SchemaDiscovery;

impl SchemaDiscovery {
    /// Scan the configured directories and build a registry
    pub async fn discover(config: &BuilderConfig) -> SchemaResult<InMemoryRegistry> {
        let mut registry = InMemoryRegistry::new();

        let api_dir = config.api_dir();
        info!("Discovering content types from {}", api_dir.display());
        for (api_name, api_path) in Self::subdirectories(&api_dir).await? {
            for document in
                Self::discover_content_types(config, &api_path, &api_name, API_UID_PREFIX, None)
                    .await?
            {
                registry.insert(document);
            }
        }

        let extensions_dir = config.extensions_dir();
        for (plugin, plugin_path) in Self::subdirectories(&extensions_dir).await? {
            let prefix = "plugin::";
            for document in
                Self::discover_content_types(config, &plugin_path, &plugin, prefix, Some(&plugin))
                    .await?
            {
                registry.insert(document);
            }
        }

        let components_dir = config.components_dir();
        info!("Discovering components from {}", components_dir.display());
        for (category, category_path) in Self::subdirectories(&components_dir).await? {
            for document in Self::discover_components(&category, &category_path).await? {
                registry.insert(document);
            }
        }

        info!("Discovered {} schema documents", registry.len());
        Ok(registry)
    }

    async fn discover_content_types(
        config: &BuilderConfig,
        owner_path: &Path,
        owner: &str,
        prefix: &str,
        plugin: Option<&str>,
    ) -> SchemaResult<Vec<SchemaDocument>> {
        let mut documents = Vec::new();
        let content_types_dir = owner_path.join("content-types");

        for (model_name, dir) in Self::subdirectories(&content_types_dir).await? {
            let file_path = dir.join(&config.schema_filename);
            if !tokio::fs::try_exists(&file_path)
                .await
                .map_err(|e| SchemaBuilderError::io(&file_path, e))?
            {
                continue;
            }

            let schema = SchemaFileOperations::read_schema_file(&file_path).await?;
            let uid = format!("{}{}.{}", prefix, owner, model_name);
            debug!("Discovered content type '{}' at {}", uid, file_path.display());

            documents.push(SchemaDocument {
                model_type: ModelType::ContentType,
                uid,
                model_name,
                plugin: plugin.map(str::to_string),
                category: None,
                dir,
                filename: config.schema_filename.clone(),
                schema,
            });
        }
        Ok(documents)
    }

    async fn discover_components(
        category: &str,
        category_path: &Path,
    ) -> SchemaResult<Vec<SchemaDocument>> {
        let mut documents = Vec::new();

        for (filename, path) in Self::files(category_path).await? {
            let Some(model_name) = filename.strip_suffix(".json") else {
                continue;
            };

            let schema = SchemaFileOperations::read_schema_file(&path).await?;
            let uid = format!("{}.{}", category, model_name);
            debug!("Discovered component '{}' at {}", uid, path.display());

            documents.push(SchemaDocument {
                model_type: ModelType::Component,
                uid,
                model_name: model_name.to_string(),
                plugin: None,
                category: Some(category.to_string()),
                dir: category_path.to_path_buf(),
                filename,
                schema,
            });
        }
        Ok(documents)
    }

    async fn subdirectories(dir: &Path) -> SchemaResult<Vec<(String, PathBuf)>> {
        Ok(Self::entries(dir)
            .await?
            .into_iter()
            .filter(|(_, _, file_type)| file_type.is_dir())
            .map(|(name, path, _)| (name, path))
            .collect())
    }

    async fn files(dir: &Path) -> SchemaResult<Vec<(String, PathBuf)>> {
        Ok(Self::entries(dir)
            .await?
            .into_iter()
            .filter(|(_, _, file_type)| file_type.is_file())
            .map(|(name, path, _)| (name, path))
            .collect())
    }

    /// Directory entries sorted by name, empty when `dir` does not exist.
    ///
    /// Symlinks are reported with the type of what they point to.
    async fn entries(dir: &Path) -> SchemaResult<Vec<(String, PathBuf, FileType)>> {
        let mut reader = match tokio::fs::read_dir(dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SchemaBuilderError::io(dir, e)),
        };

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| SchemaBuilderError::io(dir, e))?
        {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let path = entry.path();
            let mut file_type = entry
                .file_type()
                .await
                .map_err(|e| SchemaBuilderError::io(&path, e))?;
            if file_type.is_symlink() {
                file_type = match tokio::fs::metadata(&path).await {
                    Ok(metadata) => metadata.file_type(),
                    // Dangling link
                    Err(e) if e.kind() == ErrorKind::NotFound => continue,
                    Err(e) => return Err(SchemaBuilderError::io(&path, e)),
                };
            }
            entries.push((name, path, file_type));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}
