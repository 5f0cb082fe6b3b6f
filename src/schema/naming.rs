//! Name derivation for uids, directories and collection names

use once_cell::sync::Lazy;
use regex::Regex;

static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid camel case regex"));
static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid separator regex"));
static CATEGORY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9\-_]+$").expect("valid category regex"));

/// Prefix of every application content type uid
pub const API_UID_PREFIX: &str = "api::";

/// Non-ASCII letters are transliterated first, so `"Héro"` becomes `"hero"`
fn slugify(name: &str, separator: &str) -> String {
    let ascii = deunicode::deunicode(name.trim());
    let decamelized = CAMEL_BOUNDARY.replace_all(&ascii, "${1} ${2}");
    let lowered = decamelized.to_lowercase();
    NON_ALPHANUMERIC
        .replace_all(&lowered, separator)
        .trim_matches(|c: char| separator.contains(c))
        .to_string()
}

/// `"Hero Banner"` -> `"hero-banner"`
pub fn name_to_slug(name: &str) -> String {
    slugify(name, "-")
}

/// `"Hero Banners"` -> `"hero_banners"`
pub fn name_to_collection_name(name: &str) -> String {
    slugify(name, "_")
}

/// Pluralize the last word of `name`
pub fn pluralize(name: &str) -> String {
    let lower = name.to_lowercase();
    if lower.ends_with('y')
        && !["ay", "ey", "iy", "oy", "uy"]
            .iter()
            .any(|suffix| lower.ends_with(suffix))
    {
        return format!("{}ies", &name[..name.len() - 1]);
    }
    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        return format!("{}es", name);
    }
    format!("{}s", name)
}

pub fn content_type_uid(singular_name: &str) -> String {
    format!("{}{}.{}", API_UID_PREFIX, singular_name, singular_name)
}

pub fn component_uid(category: &str, display_name: &str) -> String {
    format!("{}.{}", name_to_slug(category), name_to_slug(display_name))
}

pub fn component_collection_name(category: &str, display_name: &str) -> String {
    format!(
        "components_{}_{}",
        name_to_collection_name(category),
        name_to_collection_name(&pluralize(display_name))
    )
}

/// Split a component uid into `(category, model name)`
pub fn split_component_uid(uid: &str) -> Option<(&str, &str)> {
    uid.split_once('.')
        .filter(|(category, name)| !category.is_empty() && !name.is_empty())
}

pub fn is_valid_category_name(name: &str) -> bool {
    CATEGORY_NAME.is_match(name)
}
