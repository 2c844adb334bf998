use kbn_manifest::{PackageId, PackageManifest, PluginCategoryInfo, PluginId, PluginManifest};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A validated manifest plus where it lives in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    pub manifest: PackageManifest,
    pub manifest_path: PathBuf,
    pub directory: PathBuf,
    repo_rel_dir: String,
}

impl Package {
    pub fn new(repo_root: &Path, manifest_path: PathBuf, manifest: PackageManifest) -> Self {
        let directory = manifest_path
            .parent()
            .map_or_else(|| repo_root.to_path_buf(), Path::to_path_buf);
        let repo_rel_dir = normalize_rel(repo_root, &directory);
        Self {
            manifest,
            manifest_path,
            directory,
            repo_rel_dir,
        }
    }

    /// Directory relative to the repository root, with forward slashes.
    /// `"."` for a package at the root itself.
    #[inline]
    pub fn normalized_rel_dir(&self) -> &str {
        &self.repo_rel_dir
    }

    #[inline]
    pub fn id(&self) -> &PackageId {
        &self.manifest.id
    }

    pub fn plugin(&self) -> Option<&PluginManifest> {
        self.manifest.plugin.as_ref()
    }

    pub fn plugin_id(&self) -> Option<&PluginId> {
        self.plugin().map(|p| &p.id)
    }

    pub fn is_plugin(&self) -> bool {
        self.manifest.is_plugin()
    }

    pub fn is_dev_only(&self) -> bool {
        self.manifest.is_dev_only()
    }

    /// Category as recorded on a built manifest, or derived from the
    /// package location for source packages. `None` for non-plugins.
    pub fn plugin_categories(&self) -> Option<PluginCategoryInfo> {
        let plugin = self.plugin()?;
        Some(
            plugin
                .category
                .unwrap_or_else(|| PluginCategoryInfo::for_repo_rel_dir(self.normalized_rel_dir())),
        )
    }
}

fn normalize_rel(root: &Path, dir: &Path) -> String {
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        ".".to_owned()
    } else {
        parts.join("/")
    }
}
