//! Reader for YAML role-resource files (`roles.yml`), which share the
//! missing-file error family with manifests.

use crate::error::ManifestError;
use serde_json::{Map, Value};
use std::path::Path;

const ROLE_RESOURCE_EXTENSION: &str = "yml";

fn load_mapping(path: &Path) -> Result<Map<String, Value>, ManifestError> {
    let has_extension = path
        .extension()
        .is_some_and(|ext| ext == ROLE_RESOURCE_EXTENSION);
    if !path.is_file() || !has_extension {
        return Err(ManifestError::NotAResource {
            path: path.to_path_buf(),
        });
    }

    let content = crate::source::read_source(path, "role resource")?;
    let data: Value = serde_yaml::from_str(&content).map_err(|source| ManifestError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    match data {
        Value::Object(map) => Ok(map),
        _ => Err(ManifestError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

/// Names of the roles defined in a role-resource file, in file order.
pub fn read_roles_from_resource(path: &Path) -> Result<Vec<String>, ManifestError> {
    Ok(load_mapping(path)?.into_iter().map(|(k, _)| k).collect())
}

/// Full role descriptors keyed by role name.
pub fn read_role_descriptors_from_resource(
    path: &Path,
) -> Result<Map<String, Value>, ManifestError> {
    load_mapping(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const ROLES: &str = "viewer:\n  cluster: []\n  indices:\n    - names: ['*']\n      privileges: ['read']\neditor:\n  cluster: ['monitor']\n";

    #[test]
    fn lists_role_names_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roles.yml");
        fs::write(&path, ROLES).unwrap();
        assert_eq!(read_roles_from_resource(&path).unwrap(), vec!["viewer", "editor"]);
    }

    #[test]
    fn returns_descriptors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roles.yml");
        fs::write(&path, ROLES).unwrap();
        let descriptors = read_role_descriptors_from_resource(&path).unwrap();
        assert_eq!(descriptors["editor"]["cluster"][0], "monitor");
    }

    #[test]
    fn rejects_wrong_extension_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("roles.yaml");
        fs::write(&yaml, ROLES).unwrap();
        let err = read_roles_from_resource(&yaml).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().ends_with("does not exist or not a yml file"));

        let missing = dir.path().join("missing.yml");
        assert!(read_roles_from_resource(&missing).unwrap_err().is_not_found());
    }

    #[test]
    fn rejects_non_mapping_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roles.yml");
        fs::write(&path, "- viewer\n- editor\n").unwrap();
        let err = read_roles_from_resource(&path).unwrap_err();
        assert!(matches!(err, ManifestError::NotAnObject { .. }));
    }
}
