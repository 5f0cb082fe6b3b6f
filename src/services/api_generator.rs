use crate::error::SchemaResult;
use crate::schema::handler::SchemaHandler;
use crate::schema::types::ContentKind;
use async_trait::async_trait;
use log::debug;
use serde_json::Value;

/// What the generator needs to know to scaffold a content type API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiDescriptor {
    pub uid: String,
    pub display_name: String,
    pub singular_name: String,
    pub plural_name: String,
    pub kind: ContentKind,
}

impl ApiDescriptor {
    /// Describe the content type held by `handler`
    pub fn from_handler(handler: &SchemaHandler) -> Self {
        let info = |key: &str| {
            handler
                .get(&["info", key])
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            uid: handler.uid().to_string(),
            display_name: info("displayName"),
            singular_name: info("singularName"),
            plural_name: info("pluralName"),
            kind: handler.kind(),
        }
    }
}

/// Generates the controllers, routes and services that surround a content type.
///
/// The builder only drives it; failures are reported as
/// [`SchemaBuilderError::ApiGenerator`](crate::SchemaBuilderError::ApiGenerator).
#[async_trait]
pub trait ApiGenerator: Send + Sync {
    /// Scaffold the API of a content type
    async fn generate(&self, api: &ApiDescriptor) -> SchemaResult<()>;

    /// Save the current API files of `uid` so they can be restored
    async fn backup(&self, uid: &str) -> SchemaResult<()>;

    /// Remove the API files of `uid`
    async fn clear(&self, uid: &str) -> SchemaResult<()>;

    /// Restore the files saved by the last backup of `uid`
    async fn rollback(&self, uid: &str) -> SchemaResult<()>;
}

/// Generator for hosts that scaffold their APIs elsewhere
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopApiGenerator;

#[async_trait]
impl ApiGenerator for NoopApiGenerator {
    async fn generate(&self, api: &ApiDescriptor) -> SchemaResult<()> {
        debug!("Skipping API generation for '{}'", api.uid);
        Ok(())
    }

    async fn backup(&self, _uid: &str) -> SchemaResult<()> {
        Ok(())
    }

    async fn clear(&self, _uid: &str) -> SchemaResult<()> {
        Ok(())
    }

    async fn rollback(&self, _uid: &str) -> SchemaResult<()> {
        Ok(())
    }
}
