//! CLI subprocess integration tests.
//!
//! These tests invoke the `kbn-pkg` binary against a fixture repository and
//! verify exit codes, stdout content, and JSON output shape.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn kbn_pkg(repo: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kbn-pkg"));
    cmd.arg("--repo-root").arg(repo);
    cmd.env_remove("KBN_PKG_LOG");
    cmd
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout)
        .unwrap_or_else(|e| panic!("invalid JSON ({e}): {}", stdout(output)))
}

fn fixture_repo() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "src/plugins/data/kibana.jsonc",
        r#"{
  // data services
  "type": "plugin",
  "id": "@kbn/data-plugin",
  "owner": ["@elastic/kibana-data-discovery"],
  "plugin": { "id": "data", "browser": true, "server": true, "requiredPlugins": ["expressions"] }
}"#,
    );
    write(
        root,
        "src/plugins/expressions/kibana.jsonc",
        r#"{
  "type": "plugin",
  "id": "@kbn/expressions-plugin",
  "owner": "@elastic/kibana-visualizations",
  "plugin": { "id": "expressions", "browser": true, "server": true }
}"#,
    );
    write(
        root,
        "x-pack/plugins/maps/kibana.jsonc",
        r#"{
  "type": "plugin",
  "id": "@kbn/maps-plugin",
  "owner": "@elastic/kibana-presentation",
  "plugin": {
    "id": "maps",
    "browser": true,
    "server": true,
    "requiredPlugins": ["data"],
    "optionalPlugins": ["home"]
  }
}"#,
    );
    write(
        root,
        "packages/kbn-std/kibana.jsonc",
        r#"{ "type": "shared-common", "id": "@kbn/std", "owner": "@elastic/kibana-core" }"#,
    );
    dir
}

#[test]
fn cli_version_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = kbn_pkg(dir.path()).arg("--version").output().unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("kbn-pkg"));
}

#[test]
fn cli_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    let output = kbn_pkg(dir.path()).arg("--help").output().unwrap();
    assert!(output.status.success());
    let out = stdout(&output);
    for cmd in ["validate", "list", "inspect", "check", "deps", "roles"] {
        assert!(out.contains(cmd), "help must list '{cmd}': {out}");
    }
}

#[test]
fn validate_valid_manifest_json() {
    let repo = fixture_repo();
    let output = kbn_pkg(repo.path())
        .args(["--json", "validate", "src/plugins/data"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let value = json(&output);
    assert_eq!(value[0]["valid"], true);
    assert_eq!(value[0]["manifest"]["id"], "@kbn/data-plugin");
    assert_eq!(value[0]["manifest"]["owner"][0], "@elastic/kibana-data-discovery");
    assert_eq!(value[0]["manifest"]["plugin"]["requiredPlugins"][0], "expressions");
}

#[test]
fn validate_invalid_manifest_exits_two() {
    let repo = fixture_repo();
    write(
        repo.path(),
        "packages/kbn-bad/kibana.jsonc",
        r#"{ "type": "shared-common", "id": "@kbn/bad", "owner": "@t", "foo": 1, "bar": 2 }"#,
    );
    let output = kbn_pkg(repo.path())
        .args(["validate", "packages/kbn-bad/kibana.jsonc"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("Invalid manifest ["), "{err}");
    assert!(err.contains("unexpected keys in package manifest [foo, bar]"), "{err}");
}

#[test]
fn validate_missing_manifest_exits_two() {
    let repo = fixture_repo();
    let output = kbn_pkg(repo.path())
        .args(["validate", "packages/absent/kibana.jsonc"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("missing kibana.jsonc file at"));
}

#[test]
fn validate_malformed_manifest_names_the_file() {
    let repo = fixture_repo();
    write(
        repo.path(),
        "packages/kbn-trailing/kibana.jsonc",
        r#"{ "type": "shared-common", "id": "@kbn/trailing", "owner": "@t", }"#,
    );
    let output = kbn_pkg(repo.path())
        .args(["validate", "packages/kbn-trailing"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("packages/kbn-trailing/kibana.jsonc: malformed descriptor"), "{err}");

    let output = kbn_pkg(repo.path())
        .args(["--json", "validate", "packages/kbn-trailing"])
        .output()
        .unwrap();
    let value = json(&output);
    assert_eq!(value[0]["valid"], false);
    assert!(value[0]["error"]
        .as_str()
        .unwrap()
        .contains("packages/kbn-trailing/kibana.jsonc"));
}

#[test]
fn list_json_filters_plugins() {
    let repo = fixture_repo();
    let output = kbn_pkg(repo.path())
        .args(["--json", "list", "--plugins"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let value = json(&output);
    let ids: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec!["@kbn/data-plugin", "@kbn/expressions-plugin", "@kbn/maps-plugin"]
    );
}

#[test]
fn list_by_type() {
    let repo = fixture_repo();
    let output = kbn_pkg(repo.path())
        .args(["--json", "list", "--type", "shared-common"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value = json(&output);
    assert_eq!(value.as_array().unwrap().len(), 1);
    assert_eq!(value[0]["id"], "@kbn/std");
    assert_eq!(value[0]["type"], "shared-common");
}

#[test]
fn list_rejects_unknown_type() {
    let repo = fixture_repo();
    let output = kbn_pkg(repo.path())
        .args(["list", "--type", "library"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown package type"));
}

#[test]
fn inspect_by_plugin_id() {
    let repo = fixture_repo();
    let output = kbn_pkg(repo.path())
        .args(["--json", "inspect", "maps"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let value = json(&output);
    assert_eq!(value["manifest"]["id"], "@kbn/maps-plugin");
    assert_eq!(value["repo_rel_dir"], "x-pack/plugins/maps");
}

#[test]
fn inspect_unknown_package_fails() {
    let repo = fixture_repo();
    let output = kbn_pkg(repo.path()).args(["inspect", "nope"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("no package matching 'nope'"));
}

#[test]
fn check_healthy_repository() {
    let repo = fixture_repo();
    let output = kbn_pkg(repo.path()).args(["--json", "check"]).output().unwrap();
    assert!(output.status.success(), "{}", stdout(&output));
    let value = json(&output);
    assert_eq!(value["healthy"], true);
    let warned = value["checks"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["status"] == "warn" && c["message"].as_str().unwrap().contains("home"));
    assert!(warned, "missing optional plugin should warn: {value}");
}

#[test]
fn check_reports_cycles() {
    let repo = fixture_repo();
    write(
        repo.path(),
        "src/plugins/expressions/kibana.jsonc",
        r#"{
  "type": "plugin",
  "id": "@kbn/expressions-plugin",
  "owner": "@elastic/kibana-visualizations",
  "plugin": { "id": "expressions", "browser": true, "server": true, "requiredPlugins": ["data"] }
}"#,
    );
    let output = kbn_pkg(repo.path()).args(["--json", "check"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let value = json(&output);
    assert_eq!(value["healthy"], false);
    let cycle = value["checks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "plugin_cycles")
        .unwrap();
    assert_eq!(cycle["status"], "fail");
    assert_eq!(
        cycle["message"],
        "Circular plugin dependency: data -> expressions -> data"
    );
}

#[test]
fn check_names_malformed_manifest() {
    let repo = fixture_repo();
    write(
        repo.path(),
        "packages/kbn-trailing/kibana.jsonc",
        r#"{ "type": "shared-common", "id": "@kbn/trailing", "owner": "@t", }"#,
    );
    let output = kbn_pkg(repo.path()).args(["--json", "check"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let value = json(&output);
    let failure = value["checks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "manifest")
        .unwrap();
    let message = failure["message"].as_str().unwrap();
    assert!(message.contains("packages/kbn-trailing/kibana.jsonc"), "{message}");
    assert!(message.contains("trailing comma"), "{message}");
}

#[test]
fn list_warns_with_malformed_manifest_path() {
    let repo = fixture_repo();
    write(
        repo.path(),
        "packages/kbn-trailing/kibana.jsonc",
        r#"{ "type": "shared-common", "id": "@kbn/trailing", "owner": "@t", }"#,
    );
    let output = kbn_pkg(repo.path()).arg("list").output().unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let err = stderr(&output);
    assert!(err.contains("warning: "), "{err}");
    assert!(err.contains("packages/kbn-trailing/kibana.jsonc: malformed"), "{err}");
}

#[test]
fn deps_lists_transitive_plugins() {
    let repo = fixture_repo();
    let output = kbn_pkg(repo.path())
        .args(["--json", "deps", "maps"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let value = json(&output);
    assert_eq!(value["plugin"], "maps");
    assert_eq!(value["dependencies"], serde_json::json!(["data", "expressions"]));
}

#[test]
fn deps_unknown_plugin_exits_three() {
    let repo = fixture_repo();
    let output = kbn_pkg(repo.path()).args(["deps", "ghost"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("unknown plugin ghost"));
}

#[test]
fn roles_lists_role_names() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("roles.yml");
    fs::write(&file, "viewer:\n  cluster: []\nadmin:\n  cluster: ['all']\n").unwrap();
    let output = kbn_pkg(dir.path())
        .arg("--json")
        .arg("roles")
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(json(&output), serde_json::json!(["viewer", "admin"]));
}

#[test]
fn roles_file_resolves_against_repo_root() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "config/roles.yml", "viewer:\n  cluster: []\n");
    let output = kbn_pkg(dir.path())
        .args(["--json", "roles", "config/roles.yml"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(json(&output), serde_json::json!(["viewer"]));
}

#[test]
fn roles_rejects_non_yml_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("roles.json");
    fs::write(&file, "{}").unwrap();
    let output = kbn_pkg(dir.path()).arg("roles").arg(&file).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("does not exist or not a yml file"));
}

#[test]
fn completions_bash() {
    let dir = tempfile::tempdir().unwrap();
    let output = kbn_pkg(dir.path())
        .args(["completions", "bash"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains("kbn-pkg"));
}

#[test]
fn man_pages_written_per_subcommand() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("man");
    let output = kbn_pkg(dir.path())
        .arg("man-pages")
        .arg(&out_dir)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(out_dir.join("kbn-pkg.1").exists());
    assert!(out_dir.join("kbn-pkg-validate.1").exists());
}
