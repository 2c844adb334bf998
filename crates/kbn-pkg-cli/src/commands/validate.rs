use super::{describe_failure, json_pretty, EXIT_MANIFEST_ERROR, EXIT_SUCCESS};
use kbn_manifest::{read_package_manifest, PackageManifest, RepoContext, MANIFEST_FILE_NAME};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Serialize)]
struct Outcome {
    path: PathBuf,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    manifest: Option<PackageManifest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// A directory argument stands for the manifest inside it.
fn manifest_path(ctx: &RepoContext, arg: &Path) -> PathBuf {
    let path = ctx.resolve(arg);
    if path.is_dir() {
        path.join(MANIFEST_FILE_NAME)
    } else {
        path
    }
}

pub fn run(ctx: &RepoContext, paths: &[PathBuf], json: bool) -> Result<u8, String> {
    let outcomes: Vec<Outcome> = paths
        .iter()
        .map(|arg| {
            let path = manifest_path(ctx, arg);
            debug!("validating {}", path.display());
            match read_package_manifest(ctx, &path) {
                Ok(manifest) => Outcome {
                    path,
                    valid: true,
                    manifest: Some(manifest),
                    error: None,
                },
                Err(e) => Outcome {
                    error: Some(describe_failure(&path, &e)),
                    path,
                    valid: false,
                    manifest: None,
                },
            }
        })
        .collect();

    if json {
        println!("{}", json_pretty(&outcomes)?);
    } else {
        for outcome in &outcomes {
            match (&outcome.manifest, &outcome.error) {
                (Some(m), _) => println!(
                    "✓ {} ({}, {})",
                    outcome.path.display(),
                    m.id,
                    m.package_type
                ),
                (None, Some(err)) => eprintln!("✗ {err}"),
                (None, None) => {}
            }
        }
    }

    let failed = outcomes.iter().filter(|o| !o.valid).count();
    Ok(if failed == 0 {
        EXIT_SUCCESS
    } else {
        EXIT_MANIFEST_ERROR
    })
}
