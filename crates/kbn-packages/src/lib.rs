//! Repository-level view of Kibana packages.
//!
//! Finds every `kibana.jsonc` in a repository, validates each one with
//! `kbn-manifest`, indexes the results by package and plugin id, and builds
//! the plugin dependency graph on top of that index.

pub mod discover;
pub mod graph;
pub mod map;
pub mod package;

pub use discover::find_package_manifests;
pub use graph::{DependencyKind, GraphError, MissingDependency, PluginGraph};
pub use map::PackageMap;
pub use package::Package;

use kbn_manifest::{read_package_manifest, ManifestError, RepoContext};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("failed to search {path} for package manifests: {source}")]
    Discover {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("duplicate package id {id} in {first} and {second}")]
    DuplicatePackageId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("duplicate plugin id {id} in {first} and {second}")]
    DuplicatePluginId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("plugin graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Result of loading every manifest in a repository.
///
/// Manifests that fail to read or validate do not abort the load; they are
/// collected in `failures` next to the packages that did load.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub packages: PackageMap,
    pub failures: Vec<(PathBuf, ManifestError)>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn the first failure into an error.
    pub fn into_strict(mut self) -> Result<PackageMap, RepoError> {
        if self.failures.is_empty() {
            Ok(self.packages)
        } else {
            let (_, err) = self.failures.swap_remove(0);
            Err(RepoError::Manifest(err))
        }
    }
}

/// Discover and validate all packages below the context's repository root.
pub fn load_packages(ctx: &RepoContext) -> Result<LoadReport, RepoError> {
    let root = ctx.repo_root();
    let paths = find_package_manifests(root).map_err(|source| RepoError::Discover {
        path: root.to_path_buf(),
        source,
    })?;
    debug!("found {} manifests under {}", paths.len(), root.display());

    let mut packages = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();
    for path in paths {
        match read_package_manifest(ctx, &path) {
            Ok(manifest) => packages.push(Package::new(root, path, manifest)),
            Err(err) => {
                warn!("{err}");
                failures.push((path, err));
            }
        }
    }

    let packages = PackageMap::from_packages(packages)?;
    info!(
        "loaded {} packages ({} plugins), {} invalid",
        packages.len(),
        packages.plugins().count(),
        failures.len()
    );
    Ok(LoadReport { packages, failures })
}

/// Load packages and build the plugin graph, failing on any invalid
/// manifest or graph problem.
pub fn load_plugin_graph(ctx: &RepoContext) -> Result<(PackageMap, PluginGraph), RepoError> {
    let packages = load_packages(ctx)?.into_strict()?;
    let graph = PluginGraph::from_map(&packages);
    graph.check()?;
    Ok((packages, graph))
}
