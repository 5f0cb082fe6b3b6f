/// Placeholders recognized in relation targets.
///
/// `__self__` points a content type at itself while it is being created.
/// `__contentType__` lets components created in the same request target the
/// content type being created alongside them.
pub const SELF_TARGET: &str = "__self__";
pub const CONTENT_TYPE_TARGET: &str = "__contentType__";
