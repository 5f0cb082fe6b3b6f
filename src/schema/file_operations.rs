use crate::error::{SchemaBuilderError, SchemaResult};
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::Path;

/// Handles file-based operations for schema documents.
///
/// Removal of a missing path is a no-op so flush and rollback can be replayed.
pub struct SchemaFileOperations;

impl SchemaFileOperations {
    /// Serialize `value` as indented JSON
    pub fn to_pretty_json<T: Serialize>(value: &T, indent: usize) -> SchemaResult<Vec<u8>> {
        let indent = vec![b' '; indent];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
        let mut buffer = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        value.serialize(&mut serializer)?;
        buffer.push(b'\n');
        Ok(buffer)
    }

    /// Write a schema file, creating parent directories as needed.
    ///
    /// The content goes to a sibling temp file first and is renamed into place.
    pub async fn write_schema_file<T: Serialize>(
        path: &Path,
        value: &T,
        indent: usize,
    ) -> SchemaResult<()> {
        let content = Self::to_pretty_json(value, indent)?;
        let temp_path = path.with_extension("json.tmp");

        // A concurrent prune of an emptied sibling may remove the directory
        // between its creation and the write, so that case gets one more try
        let mut attempts = 0;
        loop {
            attempts += 1;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| SchemaBuilderError::io(parent, e))?;
            }

            match tokio::fs::write(&temp_path, &content).await {
                Ok(()) => break,
                Err(e) if e.kind() == ErrorKind::NotFound && attempts < 2 => continue,
                Err(e) => return Err(SchemaBuilderError::io(&temp_path, e)),
            }
        }

        if let Err(e) = tokio::fs::rename(&temp_path, path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(SchemaBuilderError::io(path, e));
        }

        debug!("Schema file written to {}", path.display());
        Ok(())
    }

    /// Read and parse a schema file into its top-level object
    pub async fn read_schema_file(path: &Path) -> SchemaResult<Map<String, Value>> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SchemaBuilderError::io(path, e))?;

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(SchemaBuilderError::application(format!(
                "Schema file {} does not contain a JSON object",
                path.display()
            ))),
        }
    }

    /// Remove a file or directory tree, ignoring missing paths
    pub async fn remove_path(path: &Path) -> SchemaResult<()> {
        let metadata = match tokio::fs::symlink_metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if Self::is_missing(&e) => return Ok(()),
            Err(e) => return Err(SchemaBuilderError::io(path, e)),
        };

        let result = if metadata.is_dir() {
            tokio::fs::remove_dir_all(path).await
        } else {
            tokio::fs::remove_file(path).await
        };

        match result {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SchemaBuilderError::io(path, e)),
        }
    }

    /// Remove `dir` if it exists and is empty
    pub async fn prune_empty_dir(dir: &Path) -> SchemaResult<()> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if Self::is_missing(&e) => return Ok(()),
            Err(e) => return Err(SchemaBuilderError::io(dir, e)),
        };

        let is_empty = entries
            .next_entry()
            .await
            .map_err(|e| SchemaBuilderError::io(dir, e))?
            .is_none();

        if !is_empty {
            return Ok(());
        }

        match tokio::fs::remove_dir(dir).await {
            Ok(()) => {
                debug!("Pruned empty directory {}", dir.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                // Something was written into it since it was listed
                if Self::has_entries(dir).await {
                    Ok(())
                } else {
                    Err(SchemaBuilderError::io(dir, e))
                }
            }
        }
    }

    /// Whether `e` means the path does not exist, including paths below a regular file
    fn is_missing(e: &std::io::Error) -> bool {
        matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
    }

    async fn has_entries(dir: &Path) -> bool {
        match tokio::fs::read_dir(dir).await {
            Ok(mut entries) => matches!(entries.next_entry().await, Ok(Some(_))),
            Err(_) => false,
        }
    }

    /// Remove a file and prune its directory when nothing else is left in it
    pub async fn remove_file_and_prune(path: &Path) -> SchemaResult<()> {
        Self::remove_path(path).await?;
        if let Some(dir) = path.parent() {
            Self::prune_empty_dir(dir).await?;
        }
        Ok(())
    }
}
