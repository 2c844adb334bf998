//! Repository context and build-artifact classification.
//!
//! Git-root discovery happens once, in [`RepoContext::discover`]. The
//! detector itself is a pure function of the context and a path.

use std::path::{Component, Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Directory names that decide whether a manifest is a packaged copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    /// Dependency-install directory; any path segment with this name is built.
    pub install_dir: String,
    /// Build output directory directly under the git root.
    pub build_dir: String,
    /// Product directory inside the build output.
    pub product: String,
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self {
            install_dir: "node_modules".to_owned(),
            build_dir: "build".to_owned(),
            product: "kibana".to_owned(),
        }
    }
}

/// Everything validation needs to know about the surrounding repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoContext {
    repo_root: PathBuf,
    /// The root exactly as the caller spelled it, for relative inputs.
    given_root: PathBuf,
    git_root: Option<PathBuf>,
    layout: ArtifactLayout,
}

impl RepoContext {
    /// Build a context with an explicitly known (or unknown) git root.
    /// Relative roots are anchored at the current directory.
    pub fn new(repo_root: impl Into<PathBuf>, git_root: Option<PathBuf>) -> Self {
        let given_root = repo_root.into();
        Self {
            repo_root: absolutize(&given_root),
            given_root,
            git_root: git_root.map(|root| absolutize(&root)),
            layout: ArtifactLayout::default(),
        }
    }

    /// Build a context, locating the git root from `repo_root`.
    pub fn discover(repo_root: impl Into<PathBuf>) -> Self {
        let repo_root = repo_root.into();
        let git_root = find_git_root(&absolutize(&repo_root));
        debug!(
            "repo root {} (git root: {})",
            repo_root.display(),
            git_root
                .as_deref()
                .map_or_else(|| "unknown".to_owned(), |p| p.display().to_string())
        );
        Self::new(repo_root, git_root)
    }

    #[must_use]
    pub fn with_layout(mut self, layout: ArtifactLayout) -> Self {
        self.layout = layout;
        self
    }

    #[inline]
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    #[inline]
    pub fn git_root(&self) -> Option<&Path> {
        self.git_root.as_deref()
    }

    #[inline]
    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// `<git root>/<build dir>/<product>`, when the git root is known.
    pub fn build_output_dir(&self) -> Option<PathBuf> {
        self.git_root
            .as_ref()
            .map(|root| root.join(&self.layout.build_dir).join(&self.layout.product))
    }

    /// Resolve a manifest path against the repository root. A relative
    /// path that already begins with a relative root is not joined twice.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        let rest = if self.given_root.is_relative() && !is_current_dir(&self.given_root) {
            path.strip_prefix(&self.given_root).unwrap_or(path)
        } else {
            path
        };
        self.repo_root.join(rest)
    }

    /// Whether the manifest at `manifest_path` is a built artifact rather
    /// than a source package.
    pub fn is_build_artifact(&self, manifest_path: &Path) -> bool {
        let in_install_dir = manifest_path
            .components()
            .any(|c| matches!(c, Component::Normal(seg) if *seg == *self.layout.install_dir));
        if in_install_dir {
            return true;
        }
        self.build_output_dir()
            .is_some_and(|out| self.resolve(manifest_path).starts_with(out))
    }
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn is_current_dir(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::CurDir))
}

/// Locate the enclosing git repository root: ask git first, then fall back
/// to walking parents for a `.git` entry.
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    let start = absolutize(start);
    let from_git = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(&start)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);

    from_git.or_else(|| {
        start
            .ancestors()
            .filter(|dir| !dir.as_os_str().is_empty())
            .find(|dir| dir.join(".git").exists())
            .map(Path::to_path_buf)
    })
}
