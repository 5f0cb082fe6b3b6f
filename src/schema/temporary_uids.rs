//! Resolution of client side component identifiers
//!
//! Components created in the same request as the schema that uses them only
//! carry a `tmpUID`. Once permanent uids are assigned, every `component` and
//! `dynamiczone` reference is rewritten through the resulting map.

use super::types::{Attribute, Attributes};
use std::collections::HashMap;

/// `tmpUID` -> permanent uid, valid for a single request
pub type UidMap = HashMap<String, String>;

/// Rewrite component references found in `uid_map`; unknown ones are left as is
pub fn replace_temporary_uids(uid_map: &UidMap, attributes: &mut Attributes) {
    if uid_map.is_empty() {
        return;
    }

    for attribute in attributes.values_mut() {
        match attribute {
            Attribute::Component(component) => {
                if let Some(uid) = uid_map.get(&component.component) {
                    component.component = uid.clone();
                }
            }
            Attribute::DynamicZone(zone) => {
                for component in zone.components.iter_mut() {
                    if let Some(uid) = uid_map.get(component.as_str()) {
                        *component = uid.clone();
                    }
                }
            }
            _ => {}
        }
    }
}

/// Point relations targeting `placeholder` at `uid`
pub fn replace_relation_target(attributes: &mut Attributes, placeholder: &str, uid: &str) {
    for attribute in attributes.values_mut() {
        if let Some(relation) = attribute.as_relation_mut() {
            if relation.target.as_deref() == Some(placeholder) {
                relation.target = Some(uid.to_string());
            }
        }
    }
}
