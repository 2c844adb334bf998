use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire key under which packaging writes category info into a built manifest.
pub const CATEGORY_WIRE_KEY: &str = "__category__";

/// Recognized fields of a category-info object. The set is closed.
pub const CATEGORY_FIELDS: [&str; 3] = ["oss", "example", "testPlugin"];

/// Classification attached to plugin manifests during packaging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PluginCategoryInfo {
    pub oss: bool,
    pub example: bool,
    pub test_plugin: bool,
}

/// Object with exactly the [`CATEGORY_FIELDS`], each a boolean.
pub fn is_valid_plugin_category_info(v: &Value) -> bool {
    v.as_object().is_some_and(|obj| {
        obj.len() == CATEGORY_FIELDS.len()
            && CATEGORY_FIELDS
                .iter()
                .all(|field| obj.get(*field).is_some_and(Value::is_boolean))
    })
}

impl PluginCategoryInfo {
    pub(crate) fn from_value(v: &Value) -> Result<Self, ValidationError> {
        if !is_valid_plugin_category_info(v) {
            return Err(ValidationError::schema(
                &format!("plugin.{CATEGORY_WIRE_KEY}"),
                Some(v),
                "is not valid",
            ));
        }
        serde_json::from_value(v.clone()).map_err(|e| {
            ValidationError::schema(&format!("plugin.{CATEGORY_WIRE_KEY}"), Some(v), e.to_string())
        })
    }

    /// Derive the category of a package from its directory relative to the
    /// repository root (forward slashes).
    pub fn for_repo_rel_dir(rel: &str) -> Self {
        let rel = rel.trim_start_matches("./");
        Self {
            oss: !rel.starts_with("x-pack/"),
            example: rel.starts_with("examples/") || rel.starts_with("x-pack/examples/"),
            test_plugin: rel.starts_with("test/")
                || rel.starts_with("x-pack/test/")
                || rel.split('/').any(|seg| seg == "test_plugins"),
        }
    }
}
