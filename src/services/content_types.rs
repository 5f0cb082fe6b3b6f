use super::{
    apply_nested_components, require_content_type, with_resolved_uids, ApiDescriptor, ApiGenerator,
    SchemaService,
};
use crate::error::{SchemaBuilderError, SchemaResult};
use crate::schema::registry::ModelRegistry;
use crate::schema::types::{ContentTypeRequest, SchemaDocument};
use crate::schema::SchemaBuilder;
use log::{error, info};

impl<G: ApiGenerator> SchemaService<G> {
    /// Create a content type with its nested components and scaffold its API
    pub async fn create_content_type(
        &self,
        registry: &dyn ModelRegistry,
        request: &ContentTypeRequest,
    ) -> SchemaResult<SchemaDocument> {
        let mut builder = self.builder(registry);
        let uid_map = builder.create_new_component_uid_map(&request.components);

        let content_type = with_resolved_uids(&request.content_type, &uid_map);
        let uid = builder.create_content_type(&content_type)?.uid().to_string();
        apply_nested_components(&mut builder, &request.components, &uid_map, Some(&uid))?;

        let api = Self::describe(&builder, &uid)?;
        self.api.generate(&api).await?;
        builder.write_files().await?;

        info!("Content type '{}' saved", uid);
        Self::document(&builder, &uid)
    }

    /// Edit a content type and its nested components.
    ///
    /// A kind change regenerates the API; the previous API is restored when
    /// regeneration or the file flush fails.
    pub async fn edit_content_type(
        &self,
        registry: &dyn ModelRegistry,
        uid: &str,
        request: &ContentTypeRequest,
    ) -> SchemaResult<SchemaDocument> {
        require_content_type(registry, uid)?;
        let mut builder = self.builder(registry);
        let previous_kind = builder
            .content_type(uid)
            .filter(|handler| !handler.is_deleted())
            .map(|handler| handler.kind())
            .ok_or_else(|| SchemaBuilderError::NotFound(uid.to_string()))?;

        let uid_map = builder.create_new_component_uid_map(&request.components);
        let mut content_type = with_resolved_uids(&request.content_type, &uid_map);
        content_type.uid = Some(uid.to_string());

        let new_kind = builder.edit_content_type(&content_type)?.kind();
        apply_nested_components(&mut builder, &request.components, &uid_map, None)?;

        if new_kind != previous_kind {
            info!(
                "Content type '{}' changes kind from {} to {}",
                uid,
                previous_kind.as_str(),
                new_kind.as_str()
            );
            let api = Self::describe(&builder, uid)?;
            self.api.backup(uid).await?;

            let regenerated = async {
                self.api.clear(uid).await?;
                self.api.generate(&api).await?;
                builder.write_files().await
            }
            .await;

            if let Err(e) = regenerated {
                error!("Failed to regenerate the API of '{}': {}", uid, e);
                self.api.rollback(uid).await?;
                return Err(e);
            }
        } else {
            builder.write_files().await?;
        }

        info!("Content type '{}' saved", uid);
        Self::document(&builder, uid)
    }

    /// Delete a content type, its relations from other documents and its API
    pub async fn delete_content_type(
        &self,
        registry: &dyn ModelRegistry,
        uid: &str,
    ) -> SchemaResult<SchemaDocument> {
        require_content_type(registry, uid)?;
        let mut builder = self.builder(registry);
        builder.delete_content_type(uid)?;

        self.api.backup(uid).await?;
        let removed = async {
            builder.write_files().await?;
            self.api.clear(uid).await
        }
        .await;

        if let Err(e) = removed {
            error!("Failed to delete content type '{}': {}", uid, e);
            self.api.rollback(uid).await?;
            return Err(e);
        }

        info!("Content type '{}' deleted", uid);
        Self::document(&builder, uid)
    }

    fn describe(builder: &SchemaBuilder, uid: &str) -> SchemaResult<ApiDescriptor> {
        builder
            .content_type(uid)
            .map(ApiDescriptor::from_handler)
            .ok_or_else(|| SchemaBuilderError::NotFound(uid.to_string()))
    }

    fn document(builder: &SchemaBuilder, uid: &str) -> SchemaResult<SchemaDocument> {
        builder
            .content_type(uid)
            .map(|handler| handler.document().clone())
            .ok_or_else(|| SchemaBuilderError::NotFound(uid.to_string()))
    }
}
