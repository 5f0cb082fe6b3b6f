use super::{ApiGenerator, SchemaService};
use crate::error::SchemaResult;
use crate::schema::naming;
use crate::schema::registry::ModelRegistry;
use crate::schema::types::CategoryInput;
use log::info;

impl<G: ApiGenerator> SchemaService<G> {
    /// Rename a component category, returning its new name
    pub async fn edit_category(
        &self,
        registry: &dyn ModelRegistry,
        name: &str,
        input: &CategoryInput,
    ) -> SchemaResult<String> {
        if naming::name_to_slug(&input.name) == name {
            return Ok(name.to_string());
        }

        let mut builder = self.builder(registry);
        let new_name = builder.rename_category(name, &input.name)?;
        builder.write_files().await?;

        info!("Category '{}' saved as '{}'", name, new_name);
        Ok(new_name)
    }

    /// Delete a category with all of its components
    pub async fn delete_category(&self, registry: &dyn ModelRegistry, name: &str) -> SchemaResult<()> {
        let mut builder = self.builder(registry);
        builder.delete_category(name)?;
        builder.write_files().await
    }
}
