use kbn_manifest::MANIFEST_FILE_NAME;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory names never searched for source packages.
const SKIPPED_DIRS: [&str; 5] = ["node_modules", "target", "build", "data", "logs"];

fn is_skipped(name: &str) -> bool {
    name.starts_with('.') || name.starts_with("bazel-") || SKIPPED_DIRS.contains(&name)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    let skipped = entry.depth() > 0
        && entry.file_type().is_dir()
        && is_skipped(&entry.file_name().to_string_lossy());
    if skipped {
        trace!("skipping {}", entry.path().display());
    }
    skipped
}

/// Find every `kibana.jsonc` below `repo_root`, sorted. Subdirectories
/// that cannot be read are logged and skipped.
pub fn find_package_manifests(repo_root: &Path) -> io::Result<Vec<PathBuf>> {
    if !fs::metadata(repo_root)?.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a directory", repo_root.display()),
        ));
    }

    let mut found = Vec::new();
    let walker = WalkDir::new(repo_root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(err.into()),
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if entry.file_type().is_file() && entry.file_name() == MANIFEST_FILE_NAME {
            found.push(entry.into_path());
        }
    }

    found.sort();
    Ok(found)
}
