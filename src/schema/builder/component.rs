use super::{handler_mut, without_locked, SchemaBuilder};
use crate::error::{SchemaBuilderError, SchemaResult};
use crate::schema::handler::SchemaHandler;
use crate::schema::naming;
use crate::schema::types::{ComponentInput, ModelType};
use log::info;
use serde_json::Value;

impl SchemaBuilder {
    /// Create a component under `<components>/<category>/<name>.json`
    pub fn create_component(&mut self, input: &ComponentInput) -> SchemaResult<&SchemaHandler> {
        let category = naming::name_to_slug(&input.category);
        let model_name = naming::name_to_slug(&input.display_name);
        let uid = naming::component_uid(&input.category, &input.display_name);

        if self.components.contains_key(&uid) {
            return Err(SchemaBuilderError::AlreadyExists(uid));
        }

        let collection_name = naming::component_collection_name(&input.category, &input.display_name);
        let collection_taken = self.components.values().any(|handler| {
            !handler.is_deleted()
                && handler.get(&["collectionName"]).and_then(Value::as_str)
                    == Some(collection_name.as_str())
        });
        if collection_taken {
            return Err(SchemaBuilderError::AlreadyExists(uid));
        }

        let attributes = self.convert_attributes(&input.attributes)?;

        let mut handler = SchemaHandler::create(
            ModelType::Component,
            &uid,
            &model_name,
            self.config.components_dir().join(&category),
            format!("{}.json", model_name),
            self.config.json_indent,
        );
        handler
            .set_category(&category)
            .set(&["collectionName"], Value::String(collection_name))
            .set(&["info", "displayName"], Value::String(input.display_name.clone()))
            .set(&["info", "icon"], input.icon.clone().map(Value::String))
            .set(&["info", "description"], input.description.clone().map(Value::String))
            .set(&["pluginOptions"], input.plugin_options.clone())
            .set(&["config"], input.config.clone())
            .set_attributes(&attributes)?;

        info!("Component '{}' created", uid);
        Ok(&*self.components.entry(uid).or_insert(handler))
    }

    /// Edit a component, moving it when its category changes.
    ///
    /// The uid keeps its model name; only the category part follows the input.
    pub fn edit_component(&mut self, input: &ComponentInput) -> SchemaResult<&SchemaHandler> {
        let uid = input
            .uid
            .clone()
            .ok_or_else(|| SchemaBuilderError::application("component uid is required"))?;
        let handler = Self::editable(&self.components, &uid)?;

        let model_name = naming::split_component_uid(&uid)
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|| handler.model_name().to_string());
        let category = naming::name_to_slug(&input.category);
        let new_uid = format!("{}.{}", category, model_name);

        if new_uid != uid && self.components.contains_key(&new_uid) {
            return Err(SchemaBuilderError::AlreadyExists(new_uid));
        }

        let new_attributes = without_locked(handler, &input.attributes);
        let attributes = self.convert_attributes(&new_attributes)?;
        let dir = self.config.components_dir().join(&category);

        handler_mut(&mut self.components, &uid)?
            .set_uid(&new_uid)
            .set_dir(dir)
            .set_category(&category)
            .set(&["info", "icon"], input.icon.clone().map(Value::String))
            .set(&["info", "displayName"], Value::String(input.display_name.clone()))
            .set(&["info", "description"], input.description.clone().map(Value::String))
            .set(&["pluginOptions"], input.plugin_options.clone())
            .set_attributes(&attributes)?;

        if new_uid != uid {
            self.rekey_component(&uid, &new_uid);
            self.update_component_references(&uid, &new_uid)?;
            info!("Component '{}' moved to '{}'", uid, new_uid);
        } else {
            info!("Component '{}' edited", uid);
        }

        handler_mut(&mut self.components, &new_uid).map(|handler| &*handler)
    }

    /// Mark a component deleted after scrubbing every reference to it
    pub fn delete_component(&mut self, uid: &str) -> SchemaResult<()> {
        Self::editable(&self.components, uid)?;

        for handler in self.handlers_mut() {
            handler.remove_component(uid)?;
        }
        handler_mut(&mut self.components, uid)?.delete();

        info!("Component '{}' deleted", uid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{builder, component_document, content_type_document};
    use crate::schema::handler::DocumentStatus;
    use crate::schema::types::{Attribute, Attributes, ComponentInput};
    use crate::SchemaBuilderError;
    use serde_json::json;
    use std::path::Path;

    fn hero_input() -> ComponentInput {
        let mut attributes = Attributes::new();
        attributes.insert("title".into(), Attribute::scalar("string"));
        ComponentInput {
            category: "layout".into(),
            display_name: "Hero".into(),
            icon: Some("star".into()),
            attributes,
            ..Default::default()
        }
    }

    #[test]
    fn test_create_component() {
        let mut builder = builder(vec![]);
        let handler = builder.create_component(&hero_input()).unwrap();

        assert_eq!(handler.uid(), "layout.hero");
        assert_eq!(handler.category(), Some("layout"));
        assert!(handler.file_path().ends_with("src/components/layout/hero.json"));
        assert_eq!(handler.get(&["collectionName"]), Some(&json!("components_layout_heros")));
        assert_eq!(handler.get(&["info", "icon"]), Some(&json!("star")));
        assert_eq!(handler.get(&["attributes", "title"]), Some(&json!({ "type": "string" })));
        assert_eq!(handler.status(), DocumentStatus::Modified);
    }

    #[test]
    fn test_create_existing_component_fails() {
        let app = Path::new("/app");
        let mut builder = builder(vec![component_document(app, "layout", "hero", json!({}))]);

        let err = builder.create_component(&hero_input()).unwrap_err();
        assert!(matches!(err, SchemaBuilderError::AlreadyExists(uid) if uid == "layout.hero"));
    }

    #[test]
    fn test_edit_display_name_keeps_attributes() {
        let mut builder = builder(vec![]);
        builder.create_component(&hero_input()).unwrap();

        let edit = ComponentInput {
            uid: Some("layout.hero".into()),
            display_name: "Hero Banner".into(),
            ..hero_input()
        };
        let handler = builder.edit_component(&edit).unwrap();

        assert_eq!(handler.uid(), "layout.hero");
        assert_eq!(handler.get(&["info", "displayName"]), Some(&json!("Hero Banner")));
        assert_eq!(handler.attribute_names(), vec!["title"]);
    }

    #[test]
    fn test_edit_category_moves_component_and_references() {
        let app = Path::new("/app");
        let mut builder = builder(vec![
            component_document(app, "layout", "hero", json!({ "title": { "type": "string" } })),
            content_type_document(
                app,
                "page",
                json!({ "hero": { "type": "component", "component": "layout.hero" } }),
            ),
        ]);

        let mut attributes = Attributes::new();
        attributes.insert("title".into(), Attribute::scalar("string"));
        let edit = ComponentInput {
            uid: Some("layout.hero".into()),
            category: "Sections".into(),
            display_name: "hero".into(),
            attributes,
            ..Default::default()
        };
        builder.edit_component(&edit).unwrap();

        assert!(builder.component("layout.hero").is_none());
        let moved = builder.component("sections.hero").unwrap();
        assert!(moved.file_path().ends_with("src/components/sections/hero.json"));
        assert_eq!(
            builder
                .content_type("api::page.page")
                .unwrap()
                .get(&["attributes", "hero", "component"]),
            Some(&json!("sections.hero"))
        );
    }

    #[test]
    fn test_edit_keeps_locked_attributes() {
        let app = Path::new("/app");
        let mut builder = builder(vec![component_document(
            app,
            "layout",
            "hero",
            json!({ "code": { "type": "string", "configurable": false } }),
        )]);

        let mut attributes = Attributes::new();
        attributes.insert("code".into(), Attribute::scalar("integer"));
        let edit = ComponentInput {
            uid: Some("layout.hero".into()),
            category: "layout".into(),
            display_name: "hero".into(),
            attributes,
            ..Default::default()
        };
        builder.edit_component(&edit).unwrap();

        assert_eq!(
            builder.component("layout.hero").unwrap().get(&["attributes", "code"]),
            Some(&json!({ "type": "string", "configurable": false }))
        );
    }

    #[test]
    fn test_edit_missing_component_fails() {
        let mut builder = builder(vec![]);
        let edit = ComponentInput {
            uid: Some("layout.hero".into()),
            ..hero_input()
        };
        assert!(matches!(
            builder.edit_component(&edit),
            Err(SchemaBuilderError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_component_scrubs_references() {
        let app = Path::new("/app");
        let mut builder = builder(vec![
            component_document(app, "layout", "hero", json!({})),
            component_document(
                app,
                "layout",
                "page-section",
                json!({ "hero": { "type": "component", "component": "layout.hero" } }),
            ),
            content_type_document(
                app,
                "page",
                json!({ "blocks": { "type": "dynamiczone", "components": ["layout.hero", "layout.page-section"] } }),
            ),
        ]);

        builder.delete_component("layout.hero").unwrap();

        assert!(builder.component("layout.hero").unwrap().is_deleted());
        assert!(builder
            .component("layout.page-section")
            .unwrap()
            .get(&["attributes", "hero"])
            .is_none());
        assert_eq!(
            builder
                .content_type("api::page.page")
                .unwrap()
                .get(&["attributes", "blocks", "components"]),
            Some(&json!(["layout.page-section"]))
        );

        assert!(matches!(
            builder.delete_component("layout.hero"),
            Err(SchemaBuilderError::NotFound(_))
        ));
    }
}
