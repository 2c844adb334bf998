pub mod check;
pub mod completions;
pub mod deps;
pub mod inspect;
pub mod list;
pub mod man_pages;
pub mod roles;
pub mod validate;

use indicatif::{ProgressBar, ProgressStyle};
use kbn_manifest::{ManifestError, PackageType, RepoContext};
use kbn_packages::{load_packages, LoadReport, RepoError};
use std::path::Path;
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MANIFEST_ERROR: u8 = 2;
pub const EXIT_REPO_ERROR: u8 = 3;

/// Prefix of error messages that map to [`EXIT_MANIFEST_ERROR`].
pub const MANIFEST_ERROR_PREFIX: &str = "manifest error:";
/// Prefix of error messages that map to [`EXIT_REPO_ERROR`].
pub const REPO_ERROR_PREFIX: &str = "repository error:";

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn manifest_error(err: &ManifestError) -> String {
    format!("{MANIFEST_ERROR_PREFIX} {err}")
}

/// Message for a single manifest failure that always names the file.
pub fn describe_failure(path: &Path, err: &ManifestError) -> String {
    match err {
        ManifestError::Malformed { .. } => format!("{}: {err}", path.display()),
        other => other.to_string(),
    }
}

pub fn repo_error(err: &RepoError) -> String {
    match err {
        RepoError::Manifest(inner) => manifest_error(inner),
        other => format!("{REPO_ERROR_PREFIX} {other}"),
    }
}

fn finished_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_spinner())
}

pub fn spinner(msg: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    let pb = ProgressBar::new_spinner();
    pb.set_style(style);
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(finished_style());
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(finished_style());
    pb.finish_with_message(format!("✗ {msg}"));
}

pub fn colorize_type(package_type: PackageType) -> String {
    use console::Style;
    let name = package_type.as_str();
    match package_type {
        PackageType::Plugin => Style::new().cyan().bold().apply_to(name).to_string(),
        PackageType::SharedBrowser | PackageType::SharedScss => {
            Style::new().magenta().apply_to(name).to_string()
        }
        PackageType::SharedServer => Style::new().blue().apply_to(name).to_string(),
        PackageType::SharedCommon => Style::new().green().apply_to(name).to_string(),
        PackageType::FunctionalTests | PackageType::TestHelper => {
            Style::new().dim().apply_to(name).to_string()
        }
    }
}

/// Used as a clap value parser for `--type`.
pub fn parse_package_type(name: &str) -> Result<PackageType, String> {
    PackageType::from_name(name)
        .ok_or_else(|| format!("unknown package type '{name}', expected {}", PackageType::options()))
}

/// Discover and validate every package, showing a spinner unless JSON
/// output is requested. Invalid manifests are reported on stderr.
pub fn load_repo(ctx: &RepoContext, json: bool) -> Result<LoadReport, String> {
    let pb = (!json).then(|| spinner("loading packages..."));
    let result = load_packages(ctx);
    match (&result, &pb) {
        (Ok(report), Some(pb)) => spin_ok(
            pb,
            &format!(
                "loaded {} packages from {}",
                report.packages.len(),
                ctx.repo_root().display()
            ),
        ),
        (Err(_), Some(pb)) => spin_fail(pb, "failed to load packages"),
        _ => {}
    }
    let report = result.map_err(|e| repo_error(&e))?;
    if !json {
        for (path, err) in &report.failures {
            eprintln!("warning: {}", describe_failure(path, err));
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn json_pretty_serializes_object() {
        let val = serde_json::json!({"key": "value"});
        let result = json_pretty(&val).unwrap();
        assert!(result.contains("\"key\""));
        assert!(result.contains("\"value\""));
    }

    #[test]
    fn colorize_type_keeps_name() {
        for ty in PackageType::ALL {
            assert!(colorize_type(ty).contains(ty.as_str()));
        }
    }

    #[test]
    fn parse_package_type_names() {
        assert_eq!(parse_package_type("shared-browser"), Ok(PackageType::SharedBrowser));
        let err = parse_package_type("library").unwrap_err();
        assert!(err.contains("unknown package type 'library'"));
    }

    #[test]
    fn repo_errors_carry_exit_prefixes() {
        let dup = RepoError::DuplicatePackageId {
            id: "@kbn/a".to_owned(),
            first: PathBuf::from("a/kibana.jsonc"),
            second: PathBuf::from("b/kibana.jsonc"),
        };
        assert!(repo_error(&dup).starts_with(REPO_ERROR_PREFIX));

        let malformed = RepoError::Manifest(ManifestError::Malformed {
            line: 1,
            column: 2,
            message: "EOF while parsing".to_owned(),
        });
        assert!(repo_error(&malformed).starts_with(MANIFEST_ERROR_PREFIX));
    }

    #[test]
    fn failures_name_the_manifest() {
        let path = Path::new("packages/kbn-a/kibana.jsonc");
        let malformed = ManifestError::Malformed {
            line: 1,
            column: 52,
            message: "trailing comma".to_owned(),
        };
        assert_eq!(
            describe_failure(path, &malformed),
            "packages/kbn-a/kibana.jsonc: malformed descriptor at line 1, column 52: trailing comma"
        );

        let missing = ManifestError::NotAResource {
            path: path.to_path_buf(),
        };
        let msg = describe_failure(path, &missing);
        assert_eq!(msg.matches("packages/kbn-a/kibana.jsonc").count(), 1, "{msg}");
    }

    #[test]
    fn exit_codes_are_distinct() {
        assert_ne!(EXIT_SUCCESS, EXIT_FAILURE);
        assert_ne!(EXIT_FAILURE, EXIT_MANIFEST_ERROR);
        assert_ne!(EXIT_MANIFEST_ERROR, EXIT_REPO_ERROR);
    }

    #[test]
    fn spinner_finishes() {
        let pb = spinner("testing...");
        spin_ok(&pb, "done");
        let pb = spinner("testing...");
        spin_fail(&pb, "failed");
    }
}
