use crate::error::{KeyScope, ManifestError, ValidationError};
use crate::jsonc::parse_jsonc;
use crate::plugin::{validate_plugin, PluginManifest};
use crate::predicates::{
    is_arr_of_strings, is_some_string, is_valid_owner, PackageType, PACKAGE_ID_PREFIX,
};
use crate::repo::RepoContext;
use crate::source::{read_source, MANIFEST_FILE_NAME};
use crate::types::{OwnerHandle, PackageId};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

const MANIFEST_KEYS: [&str; 9] = [
    "type",
    "id",
    "owner",
    "devOnly",
    "plugin",
    "sharedBrowserBundle",
    "build",
    "description",
    "serviceFolders",
];

const BUILD_KEYS: [&str; 2] = ["extraExcludes", "noParse"];

/// A validated, normalized `kibana.jsonc`.
///
/// `plugin` is set exactly when `package_type` is [`PackageType::Plugin`];
/// `shared_browser_bundle` can only be set on the shared-browser family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(rename = "type")]
    pub package_type: PackageType,
    pub id: PackageId,
    /// Always a sequence, even when the source held a single handle.
    pub owner: Vec<OwnerHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_folders: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_browser_bundle: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<PluginManifest>,
}

impl PackageManifest {
    pub fn is_plugin(&self) -> bool {
        self.package_type == PackageType::Plugin
    }

    pub fn is_dev_only(&self) -> bool {
        self.dev_only.unwrap_or(false)
    }
}

/// Packaging options from the `build` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_excludes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_parse: Option<Vec<String>>,
}

/// Read, parse, and validate the manifest at `path`.
pub fn read_package_manifest(
    ctx: &RepoContext,
    path: &Path,
) -> Result<PackageManifest, ManifestError> {
    debug!("reading package manifest {}", path.display());
    let content = read_source(path, MANIFEST_FILE_NAME)?;
    parse_package_manifest_str(ctx, path, &content)
}

/// Parse and validate manifest text that claims to live at `path`.
pub fn parse_package_manifest_str(
    ctx: &RepoContext,
    path: &Path,
    content: &str,
) -> Result<PackageManifest, ManifestError> {
    let parsed = parse_jsonc(content)?;
    validate_package_manifest(&parsed, ctx, path).map_err(|source| ManifestError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}

/// Collect every key of `obj` outside `known`, in source order.
pub(crate) fn reject_unknown_keys(
    obj: &Map<String, Value>,
    known: &[&str],
    scope: KeyScope,
) -> Result<(), ValidationError> {
    let keys: Vec<String> = obj
        .keys()
        .filter(|k| !known.contains(&k.as_str()))
        .cloned()
        .collect();
    if keys.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::UnexpectedKeys { scope, keys })
    }
}

pub(crate) fn optional_bool(
    obj: &Map<String, Value>,
    key: &str,
    label: &str,
    expected: &str,
) -> Result<Option<bool>, ValidationError> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(ValidationError::schema(label, Some(other), expected)),
    }
}

pub(crate) fn optional_string_list(
    obj: &Map<String, Value>,
    key: &str,
    label: &str,
    expected: &str,
) -> Result<Option<Vec<String>>, ValidationError> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) if is_arr_of_strings(v) => Ok(Some(string_items(v))),
        Some(other) => Err(ValidationError::schema(label, Some(other), expected)),
    }
}

pub(crate) fn string_items(v: &Value) -> Vec<String> {
    v.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn validate_owner(value: Option<&Value>) -> Result<Vec<OwnerHandle>, ValidationError> {
    let owners = match value {
        Some(Value::String(s)) => OwnerHandle::parse(s.as_str()).ok().map(|h| vec![h]),
        Some(Value::Array(items)) if !items.is_empty() && items.iter().all(is_valid_owner) => items
            .iter()
            .filter_map(Value::as_str)
            .map(OwnerHandle::parse)
            .collect::<Result<Vec<_>, _>>()
            .ok(),
        _ => None,
    };

    owners.ok_or_else(|| {
        ValidationError::schema(
            "owner",
            value,
            "must be a valid Github team handle starting with @, or an array of such handles",
        )
    })
}

fn validate_build(value: Option<&Value>) -> Result<Option<BuildConfig>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let Some(obj) = value.as_object() else {
        return Err(ValidationError::schema(
            "build",
            Some(value),
            "must be an object or undefined",
        ));
    };

    reject_unknown_keys(obj, &BUILD_KEYS, KeyScope::Build)?;

    Ok(Some(BuildConfig {
        extra_excludes: optional_string_list(
            obj,
            "extraExcludes",
            "build.extraExcludes",
            "must be an array of non-empty strings when defined",
        )?,
        no_parse: optional_string_list(
            obj,
            "noParse",
            "build.noParse",
            "must be an array of non-empty strings when defined",
        )?,
    }))
}

/// Validate a parsed descriptor against the package manifest schema.
///
/// Checks run in a fixed order and the first failure is returned.
pub fn validate_package_manifest(
    parsed: &Value,
    ctx: &RepoContext,
    path: &Path,
) -> Result<PackageManifest, ValidationError> {
    let Some(obj) = parsed.as_object() else {
        return Err(ValidationError::RootNotObject);
    };

    reject_unknown_keys(obj, &MANIFEST_KEYS, KeyScope::Manifest)?;

    let type_value = obj.get("type");
    let package_type = type_value
        .and_then(Value::as_str)
        .and_then(PackageType::from_name)
        .ok_or_else(|| {
            ValidationError::schema(
                "type",
                type_value,
                format!("options are [{}]", PackageType::options()),
            )
        })?;

    let id_value = obj.get("id");
    let id = id_value
        .and_then(Value::as_str)
        .and_then(|s| PackageId::parse(s).ok())
        .ok_or_else(|| {
            ValidationError::schema(
                "id",
                id_value,
                format!("must be a string that starts with {PACKAGE_ID_PREFIX}"),
            )
        })?;

    let owner = validate_owner(obj.get("owner"))?;

    let dev_only = optional_bool(obj, "devOnly", "devOnly", "must be a boolean when defined")?;

    let description = match obj.get("description") {
        None => None,
        Some(v) if is_some_string(v) => v.as_str().map(str::to_owned),
        Some(other) => {
            return Err(ValidationError::schema(
                "description",
                Some(other),
                "must be a non-empty string when specified",
            ))
        }
    };

    let service_folders = optional_string_list(
        obj,
        "serviceFolders",
        "serviceFolders",
        "must be an array of non-empty strings",
    )?;

    let build = validate_build(obj.get("build"))?;

    let mut manifest = PackageManifest {
        package_type,
        id,
        owner,
        dev_only,
        description,
        service_folders,
        build,
        shared_browser_bundle: None,
        plugin: None,
    };

    if package_type != PackageType::Plugin {
        if let Some(plugin) = obj.get("plugin") {
            return Err(ValidationError::schema(
                "plugin",
                Some(plugin),
                "may only be specified on packages of type \"plugin\"",
            ));
        }
    }

    if package_type == PackageType::Plugin {
        manifest.plugin = Some(validate_plugin(obj.get("plugin"), ctx, path)?);
    }

    if package_type.allows_shared_browser_bundle() {
        manifest.shared_browser_bundle = optional_bool(
            obj,
            "sharedBrowserBundle",
            "sharedBrowserBundle",
            "must be a boolean when defined",
        )?;
    } else if let Some(bundle) = obj.get("sharedBrowserBundle") {
        return Err(ValidationError::schema(
            "sharedBrowserBundle",
            Some(bundle),
            "may only be specified on shared-browser and shared-common packages",
        ));
    }

    Ok(manifest)
}
