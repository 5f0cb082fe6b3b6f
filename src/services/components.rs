use super::{apply_nested_components, with_resolved_uids, ApiGenerator, SchemaService};
use crate::error::{SchemaBuilderError, SchemaResult};
use crate::schema::registry::ModelRegistry;
use crate::schema::types::{ComponentRequest, SchemaDocument};
use crate::schema::SchemaBuilder;
use log::info;

impl<G: ApiGenerator> SchemaService<G> {
    /// Create a component along with the components nested in the request
    pub async fn create_component(
        &self,
        registry: &dyn ModelRegistry,
        request: &ComponentRequest,
    ) -> SchemaResult<SchemaDocument> {
        let mut builder = self.builder(registry);
        let uid_map = builder.create_new_component_uid_map(&request.components);

        let component = with_resolved_uids(&request.component, &uid_map);
        let uid = builder.create_component(&component)?.uid().to_string();
        apply_nested_components(&mut builder, &request.components, &uid_map, None)?;

        builder.write_files().await?;
        info!("Component '{}' saved", uid);
        Self::component_document(&builder, &uid)
    }

    /// Edit a component; a category change moves it to a new uid
    pub async fn edit_component(
        &self,
        registry: &dyn ModelRegistry,
        uid: &str,
        request: &ComponentRequest,
    ) -> SchemaResult<SchemaDocument> {
        let mut builder = self.builder(registry);
        let uid_map = builder.create_new_component_uid_map(&request.components);

        let mut component = with_resolved_uids(&request.component, &uid_map);
        component.uid = Some(uid.to_string());
        let new_uid = builder.edit_component(&component)?.uid().to_string();
        apply_nested_components(&mut builder, &request.components, &uid_map, None)?;

        builder.write_files().await?;
        info!("Component '{}' saved", new_uid);
        Self::component_document(&builder, &new_uid)
    }

    /// Delete a component and every reference to it
    pub async fn delete_component(
        &self,
        registry: &dyn ModelRegistry,
        uid: &str,
    ) -> SchemaResult<SchemaDocument> {
        let mut builder = self.builder(registry);
        builder.delete_component(uid)?;

        builder.write_files().await?;
        info!("Component '{}' deleted", uid);
        Self::component_document(&builder, uid)
    }

    fn component_document(builder: &SchemaBuilder, uid: &str) -> SchemaResult<SchemaDocument> {
        builder
            .component(uid)
            .map(|handler| handler.document().clone())
            .ok_or_else(|| SchemaBuilderError::NotFound(uid.to_string()))
    }
}
