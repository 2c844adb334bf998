use crate::category::{PluginCategoryInfo, CATEGORY_WIRE_KEY};
use crate::error::ValidationError;
use crate::manifest::{optional_bool, optional_string_list, string_items};
use crate::predicates::{is_arr_of_ids, is_arr_of_strings, is_some_string};
use crate::repo::RepoContext;
use crate::types::PluginId;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::trace;

const PLUGIN_ID_EXPECTED: &str = "must be a string in camel or snake case";
const ID_LIST_EXPECTED: &str = "must be an array of strings in camel or snake case";

/// The only accepted value of `plugin.type`.
pub const PREBOOT: &str = "preboot";

/// `plugin.configPath`: a single key or a key path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigPath {
    Single(String),
    Path(Vec<String>),
}

impl ConfigPath {
    /// Dotted form, e.g. `xpack.security`.
    pub fn dotted(&self) -> String {
        match self {
            Self::Single(s) => s.clone(),
            Self::Path(parts) => parts.join("."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginType {
    Preboot,
}

/// The validated `plugin` object of a plugin package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    pub id: PluginId,
    pub browser: bool,
    pub server: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub plugin_type: Option<PluginType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<ConfigPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_plugins: Option<Vec<PluginId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_plugins: Option<Vec<PluginId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_bundles: Option<Vec<PluginId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_on_anonymous_pages: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_public_dirs: Option<Vec<String>>,
    /// Present exactly when the manifest is a built artifact.
    #[serde(rename = "__category__", skip_serializing_if = "Option::is_none")]
    pub category: Option<PluginCategoryInfo>,
}

impl PluginManifest {
    pub fn required_plugins(&self) -> &[PluginId] {
        self.required_plugins.as_deref().unwrap_or_default()
    }

    pub fn optional_plugins(&self) -> &[PluginId] {
        self.optional_plugins.as_deref().unwrap_or_default()
    }

    pub fn required_bundles(&self) -> &[PluginId] {
        self.required_bundles.as_deref().unwrap_or_default()
    }

    pub fn is_preboot(&self) -> bool {
        self.plugin_type == Some(PluginType::Preboot)
    }
}

fn required_bool(obj: &Map<String, Value>, key: &str) -> Result<bool, ValidationError> {
    let label = format!("plugin.{key}");
    match obj.get(key) {
        Some(Value::Bool(b)) => Ok(*b),
        None => Err(ValidationError::schema(&label, None, "is required and must be a boolean")),
        Some(other) => Err(ValidationError::schema(&label, Some(other), "must be a boolean")),
    }
}

fn optional_ids(obj: &Map<String, Value>, key: &str) -> Result<Option<Vec<PluginId>>, ValidationError> {
    let label = format!("plugin.{key}");
    match obj.get(key) {
        None => Ok(None),
        Some(v) if is_arr_of_ids(v) => string_items(v)
            .into_iter()
            .map(PluginId::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
            .map_err(|_| ValidationError::schema(&label, Some(v), ID_LIST_EXPECTED)),
        Some(other) => Err(ValidationError::schema(&label, Some(other), ID_LIST_EXPECTED)),
    }
}

fn config_path(obj: &Map<String, Value>) -> Result<Option<ConfigPath>, ValidationError> {
    match obj.get("configPath") {
        None => Ok(None),
        Some(v) if is_some_string(v) => Ok(v.as_str().map(|s| ConfigPath::Single(s.to_owned()))),
        Some(v) if is_arr_of_strings(v) => Ok(Some(ConfigPath::Path(string_items(v)))),
        Some(other) => Err(ValidationError::schema(
            "plugin.configPath",
            Some(other),
            "must be a non-empty string, or an array of non-empty strings",
        )),
    }
}

/// Validate the `plugin` object of a plugin package at `path`.
///
/// Category info must be present when `path` is a built artifact and
/// absent otherwise.
pub fn validate_plugin(
    value: Option<&Value>,
    ctx: &RepoContext,
    path: &Path,
) -> Result<PluginManifest, ValidationError> {
    let Some(obj) = value.and_then(Value::as_object) else {
        return Err(ValidationError::schema("plugin", value, "must be an object"));
    };

    let id_value = obj.get("id");
    let id = id_value
        .and_then(Value::as_str)
        .and_then(|s| PluginId::parse(s).ok())
        .ok_or_else(|| ValidationError::schema("plugin.id", id_value, PLUGIN_ID_EXPECTED))?;

    let browser = required_bool(obj, "browser")?;
    let server = required_bool(obj, "server")?;

    let extra_public_dirs = optional_string_list(
        obj,
        "extraPublicDirs",
        "plugin.extraPublicDirs",
        "must be an array of strings",
    )?;
    let config_path = config_path(obj)?;
    let required_plugins = optional_ids(obj, "requiredPlugins")?;
    let optional_plugins = optional_ids(obj, "optionalPlugins")?;
    let required_bundles = optional_ids(obj, "requiredBundles")?;
    let enabled_on_anonymous_pages = optional_bool(
        obj,
        "enabledOnAnonymousPages",
        "plugin.enabledOnAnonymousPages",
        "must be a boolean",
    )?;

    let plugin_type = match obj.get("type") {
        None => None,
        Some(Value::String(s)) if s == PREBOOT => Some(PluginType::Preboot),
        Some(other) => {
            return Err(ValidationError::schema(
                "plugin.type",
                Some(other),
                format!("must be undefined or \"{PREBOOT}\""),
            ))
        }
    };

    let is_build = ctx.is_build_artifact(path);
    trace!("{} build artifact: {is_build}", path.display());
    let category_label = format!("plugin.{CATEGORY_WIRE_KEY}");
    let category = match obj.get(CATEGORY_WIRE_KEY) {
        Some(raw) if !is_build => {
            return Err(ValidationError::schema(
                &category_label,
                Some(raw),
                format!(
                    "may only be specified on built packages in {}",
                    ctx.layout().install_dir
                ),
            ))
        }
        Some(raw) => Some(PluginCategoryInfo::from_value(raw)?),
        None if is_build => {
            return Err(ValidationError::schema(
                &category_label,
                None,
                format!(
                    "must be defined on built packages in {}",
                    ctx.layout().install_dir
                ),
            ))
        }
        None => None,
    };

    Ok(PluginManifest {
        id,
        browser,
        server,
        plugin_type,
        config_path,
        required_plugins,
        optional_plugins,
        required_bundles,
        enabled_on_anonymous_pages,
        extra_public_dirs,
        category,
    })
}
