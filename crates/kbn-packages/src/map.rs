use crate::package::Package;
use crate::RepoError;
use kbn_manifest::{PackageId, PluginId};
use std::collections::BTreeMap;

/// All packages of a repository, indexed by package id and plugin id.
#[derive(Debug, Clone, Default)]
pub struct PackageMap {
    packages: Vec<Package>,
    by_id: BTreeMap<PackageId, usize>,
    by_plugin_id: BTreeMap<PluginId, usize>,
}

impl PackageMap {
    /// Index `packages`, rejecting duplicate package or plugin ids.
    pub fn from_packages(mut packages: Vec<Package>) -> Result<Self, RepoError> {
        packages.sort_by(|a, b| a.id().cmp(b.id()));

        let mut by_id = BTreeMap::new();
        let mut by_plugin_id = BTreeMap::new();
        for (idx, pkg) in packages.iter().enumerate() {
            if let Some(prev) = by_id.insert(pkg.id().clone(), idx) {
                return Err(RepoError::DuplicatePackageId {
                    id: pkg.id().to_string(),
                    first: packages[prev].manifest_path.clone(),
                    second: pkg.manifest_path.clone(),
                });
            }
            if let Some(plugin_id) = pkg.plugin_id() {
                if let Some(prev) = by_plugin_id.insert(plugin_id.clone(), idx) {
                    return Err(RepoError::DuplicatePluginId {
                        id: plugin_id.to_string(),
                        first: packages[prev].manifest_path.clone(),
                        second: pkg.manifest_path.clone(),
                    });
                }
            }
        }

        Ok(Self {
            packages,
            by_id,
            by_plugin_id,
        })
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Packages ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }

    pub fn plugins(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter().filter(|p| p.is_plugin())
    }

    pub fn get(&self, id: &str) -> Option<&Package> {
        self.by_id.get(id).map(|&i| &self.packages[i])
    }

    pub fn get_plugin(&self, plugin_id: &str) -> Option<&Package> {
        self.by_plugin_id.get(plugin_id).map(|&i| &self.packages[i])
    }

    /// Look a package up by package id first, then by plugin id.
    pub fn find(&self, id: &str) -> Option<&Package> {
        self.get(id).or_else(|| self.get_plugin(id))
    }
}
