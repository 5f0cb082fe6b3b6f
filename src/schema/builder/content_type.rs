use super::{handler_mut, without_locked, SchemaBuilder};
use crate::constants::SELF_TARGET;
use crate::error::{SchemaBuilderError, SchemaResult};
use crate::schema::handler::SchemaHandler;
use crate::schema::naming;
use crate::schema::temporary_uids::replace_relation_target;
use crate::schema::types::{Attribute, Attributes, ContentTypeInput, ModelType, RelationAttribute};
use log::{debug, info};
use serde_json::{Map, Value};

impl SchemaBuilder {
    /// Create a content type at `<api>/<name>/content-types/<name>/`.
    ///
    /// Relations may target `__self__` to point at the new content type.
    pub fn create_content_type(&mut self, input: &ContentTypeInput) -> SchemaResult<&SchemaHandler> {
        let uid = naming::content_type_uid(&input.singular_name);
        if self.content_types.contains_key(&uid) {
            return Err(SchemaBuilderError::AlreadyExists(uid));
        }

        let mut attributes = input.attributes.clone();
        replace_relation_target(&mut attributes, SELF_TARGET, &uid);

        let dir = self
            .config
            .api_dir()
            .join(&input.singular_name)
            .join("content-types")
            .join(&input.singular_name);
        let collection_name = input
            .collection_name
            .clone()
            .unwrap_or_else(|| naming::name_to_collection_name(&input.plural_name));
        let options = options_value(input.options.as_ref(), input.draft_and_publish)
            .unwrap_or_else(|| Value::Object(Map::new()));

        let mut handler = SchemaHandler::create(
            ModelType::ContentType,
            &uid,
            &input.singular_name,
            dir,
            self.config.schema_filename.clone(),
            self.config.json_indent,
        );
        handler
            .set(&["kind"], Value::from(input.kind.unwrap_or_default().as_str()))
            .set(&["collectionName"], Value::String(collection_name))
            .set(&["info", "singularName"], Value::String(input.singular_name.clone()))
            .set(&["info", "pluralName"], Value::String(input.plural_name.clone()))
            .set(&["info", "displayName"], Value::String(input.display_name.clone()))
            .set(&["info", "description"], input.description.clone().map(Value::String))
            .set(&["options"], options)
            .set(&["pluginOptions"], input.plugin_options.clone())
            .set(&["config"], input.config.clone());

        // Registered first so self-referencing relations pass target validation
        self.content_types.insert(uid.clone(), handler);
        let converted = match self.convert_attributes(&attributes) {
            Ok(converted) => converted,
            Err(e) => {
                self.content_types.remove(&uid);
                return Err(e);
            }
        };
        handler_mut(&mut self.content_types, &uid)?.set_attributes(&converted)?;

        let keys: Vec<String> = attributes.keys().cloned().collect();
        for key in keys {
            assign_dominance(&uid, &mut attributes, &key);
            if let Some(relation) = attributes.get(&key).and_then(Attribute::as_relation) {
                self.set_relation(&key, &uid, relation)?;
            }
        }

        info!("Content type '{}' created", uid);
        handler_mut(&mut self.content_types, &uid).map(|handler| &*handler)
    }

    /// Edit a content type and bring relation mirrors in line with the new attributes
    pub fn edit_content_type(&mut self, input: &ContentTypeInput) -> SchemaResult<&SchemaHandler> {
        let uid = input
            .uid
            .clone()
            .ok_or_else(|| SchemaBuilderError::application("content type uid is required"))?;
        let handler = Self::editable(&self.content_types, &uid)?;

        let old_attributes = handler.attributes()?;
        let current_kind = handler.kind();
        let mut new_attributes = without_locked(handler, &input.attributes);
        replace_relation_target(&mut new_attributes, SELF_TARGET, &uid);

        for (key, old) in &old_attributes {
            if new_attributes.contains_key(key) || !old.is_configurable() {
                continue;
            }
            if let Some(relation) = old.as_relation() {
                if relation.opposite_attribute().is_some() {
                    self.unset_relation(relation);
                }
            }
        }

        // Mirrors landing on this content type are written after its attributes are replaced
        let mut own_mirrors: Vec<(String, RelationAttribute)> = Vec::new();

        let remaining: Vec<String> = new_attributes
            .keys()
            .filter(|key| old_attributes.contains_key(*key))
            .cloned()
            .collect();
        for key in remaining {
            let old = &old_attributes[&key];
            let new = new_attributes[&key].clone();

            match (old.as_relation(), new.as_relation()) {
                (None, Some(relation)) => {
                    self.set_or_defer_relation(&key, &uid, relation, &mut own_mirrors)?
                }
                (Some(old_relation), None) => self.unset_relation(old_relation),
                (Some(old_relation), Some(new_relation)) => {
                    let unchanged = old_relation.relation == new_relation.relation
                        && old_relation.target == new_relation.target
                        && old_relation.opposite_attribute() == new_relation.target_attribute.as_deref();
                    if !unchanged {
                        self.unset_relation(old_relation);
                    }

                    let mut merged = new.with_previous_properties(old)?;
                    if let Some(relation) = merged.as_relation_mut() {
                        if old_relation.inversed_by.is_some() {
                            relation.dominant = Some(true);
                        } else if old_relation.mapped_by.is_some() {
                            relation.dominant = Some(false);
                        }
                    }
                    if let Some(relation) = merged.as_relation() {
                        self.set_or_defer_relation(&key, &uid, relation, &mut own_mirrors)?;
                    }
                    new_attributes.insert(key, merged);
                }
                (None, None) => {}
            }
        }

        let added: Vec<String> = new_attributes
            .keys()
            .filter(|key| !old_attributes.contains_key(*key))
            .cloned()
            .collect();
        for key in added {
            assign_dominance(&uid, &mut new_attributes, &key);
            if let Some(relation) = new_attributes.get(&key).and_then(Attribute::as_relation) {
                self.set_or_defer_relation(&key, &uid, relation, &mut own_mirrors)?;
            }
        }

        let converted = self.convert_attributes(&new_attributes)?;
        let kind = input.kind.unwrap_or(current_kind);

        handler_mut(&mut self.content_types, &uid)?
            .set(&["kind"], Value::from(kind.as_str()))
            .set(&["collectionName"], input.collection_name.clone().map(Value::String))
            .set(&["info", "displayName"], Value::String(input.display_name.clone()))
            .set(&["info", "description"], input.description.clone().map(Value::String))
            .set(&["options"], options_value(input.options.as_ref(), input.draft_and_publish))
            .set(&["pluginOptions"], input.plugin_options.clone())
            .set_attributes(&converted)?;

        for (key, relation) in &own_mirrors {
            self.set_relation(key, &uid, relation)?;
        }

        info!("Content type '{}' edited", uid);
        handler_mut(&mut self.content_types, &uid).map(|handler| &*handler)
    }

    /// Mark a content type deleted after removing every relation that targets it
    pub fn delete_content_type(&mut self, uid: &str) -> SchemaResult<()> {
        Self::editable(&self.content_types, uid)?;

        for handler in self.components.values_mut() {
            handler.remove_content_type(uid)?;
        }
        for (key, handler) in self.content_types.iter_mut() {
            if key != uid {
                handler.remove_content_type(uid)?;
            }
        }
        handler_mut(&mut self.content_types, uid)?.delete();

        info!("Content type '{}' deleted", uid);
        Ok(())
    }

    fn set_or_defer_relation(
        &mut self,
        key: &str,
        uid: &str,
        relation: &RelationAttribute,
        deferred: &mut Vec<(String, RelationAttribute)>,
    ) -> SchemaResult<()> {
        if relation.target.as_deref() == Some(uid) {
            deferred.push((key.to_string(), relation.clone()));
            return Ok(());
        }
        self.set_relation(key, uid, relation)
    }

    /// Write the mirror of relation `key` of `uid` onto its target.
    ///
    /// Relations without `target` or `targetAttribute` have no mirror.
    pub fn set_relation(
        &mut self,
        key: &str,
        uid: &str,
        attribute: &RelationAttribute,
    ) -> SchemaResult<()> {
        let (Some(target), Some(target_attribute)) = (
            attribute.target.as_deref(),
            attribute.target_attribute.as_deref(),
        ) else {
            return Ok(());
        };

        let Some((kind, side)) = attribute.relation.mirror(attribute.dominant.unwrap_or(false))
        else {
            debug!("Relation '{}' of '{}' is {}, no mirror", key, uid, attribute.relation);
            return Ok(());
        };

        let target_handler = match self.content_types.get_mut(target) {
            Some(handler) if !handler.is_deleted() => handler,
            _ => {
                return Err(SchemaBuilderError::application(format!(
                    "target: {} does not exist",
                    target
                )))
            }
        };
        if target_handler.is_read_only() {
            debug!("Skipping mirror of '{}.{}' on read-only '{}'", uid, key, target);
            return Ok(());
        }

        let mut mirror = RelationAttribute::new(kind, uid);
        mirror.set_side(side, key);

        // Flags tuned by hand on an existing mirror survive
        if let Some(existing) = target_handler.get_attribute(target_attribute)? {
            if existing.is_private() {
                mirror.private = Some(true);
            }
            if !existing.is_configurable() {
                mirror.configurable = Some(false);
            }
            if let Some(previous) = existing.as_relation() {
                mirror.auto_populate = previous.auto_populate;
                mirror.plugin_options = previous.plugin_options.clone();
            }
        }

        target_handler.set_attribute(target_attribute, &Attribute::Relation(mirror))?;
        debug!("Mirror '{}.{}' set for '{}.{}'", target, target_attribute, uid, key);
        Ok(())
    }

    /// Remove the mirror of a stored relation from its target
    pub fn unset_relation(&mut self, attribute: &RelationAttribute) {
        let (Some(target), Some(name)) = (attribute.target.as_deref(), attribute.opposite_attribute())
        else {
            return;
        };
        let Some(handler) = self.content_types.get_mut(target) else {
            return;
        };
        if handler.get(&["attributes", name]).is_none() {
            return;
        }

        handler.delete_attribute(name);
        debug!("Mirror '{}.{}' removed", target, name);
    }
}

/// Pick the owning side of a new symmetric relation.
///
/// Self-referencing pairs let the first attribute of the pair own the join.
fn assign_dominance(uid: &str, attributes: &mut Attributes, key: &str) {
    let dominant = match attributes.get(key).and_then(Attribute::as_relation) {
        Some(relation) if relation.relation.is_symmetric() => {
            match relation.target_attribute.as_deref() {
                Some(other) if relation.target.as_deref() == Some(uid) => attributes
                    .get(other)
                    .and_then(Attribute::as_relation)
                    .and_then(|other| other.dominant)
                    .is_none(),
                _ => true,
            }
        }
        _ => return,
    };

    if let Some(relation) = attributes.get_mut(key).and_then(Attribute::as_relation_mut) {
        relation.dominant = Some(dominant);
    }
}

/// `options` merged with `draftAndPublish`, `None` when neither is given
fn options_value(options: Option<&Map<String, Value>>, draft_and_publish: Option<bool>) -> Option<Value> {
    if options.is_none() && draft_and_publish.is_none() {
        return None;
    }

    let mut merged = options.cloned().unwrap_or_default();
    if let Some(draft_and_publish) = draft_and_publish {
        merged.insert("draftAndPublish".to_string(), Value::Bool(draft_and_publish));
    }
    Some(Value::Object(merged))
}
