use super::{handler_mut, SchemaBuilder};
use crate::error::{SchemaBuilderError, SchemaResult};
use crate::schema::naming;
use log::info;

impl SchemaBuilder {
    fn category_component_uids(&self, category: &str) -> Vec<String> {
        self.components
            .values()
            .filter(|handler| !handler.is_deleted() && handler.category() == Some(category))
            .map(|handler| handler.uid().to_string())
            .collect()
    }

    /// Move every component of `name` into the category `new_name`.
    ///
    /// Returns the slug of the new category. Uids and directories follow the
    /// category and every reference to a moved component is rewritten.
    pub fn rename_category(&mut self, name: &str, new_name: &str) -> SchemaResult<String> {
        let new_category = naming::name_to_slug(new_name);
        if new_category == name {
            return Ok(new_category);
        }
        if !naming::is_valid_category_name(&new_category) {
            return Err(SchemaBuilderError::application(format!(
                "Invalid category name: {}",
                new_name
            )));
        }

        let categories = self.categories();
        if !categories.iter().any(|category| category == name) {
            return Err(SchemaBuilderError::NotFound(format!("category {}", name)));
        }
        if categories.contains(&new_category) {
            return Err(SchemaBuilderError::application("Name already taken"));
        }

        let dir = self.config.components_dir().join(&new_category);
        for old_uid in self.category_component_uids(name) {
            let handler = handler_mut(&mut self.components, &old_uid)?;
            let new_uid = format!("{}.{}", new_category, handler.model_name());
            handler
                .set_uid(&new_uid)
                .set_dir(dir.clone())
                .set_category(&new_category);

            self.rekey_component(&old_uid, &new_uid);
            self.update_component_references(&old_uid, &new_uid)?;
        }

        info!("Category '{}' renamed to '{}'", name, new_category);
        Ok(new_category)
    }

    /// Delete every component of a category
    pub fn delete_category(&mut self, name: &str) -> SchemaResult<()> {
        let uids = self.category_component_uids(name);
        if uids.is_empty() {
            return Err(SchemaBuilderError::NotFound(format!("category {}", name)));
        }

        for uid in uids {
            self.delete_component(&uid)?;
        }

        info!("Category '{}' deleted", name);
        Ok(())
    }
}
