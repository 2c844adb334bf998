use super::{describe_failure, repo_error, EXIT_FAILURE, EXIT_SUCCESS};
use kbn_manifest::RepoContext;
use kbn_packages::{load_packages, LoadReport, PluginGraph, RepoError};
use serde::Serialize;

pub fn run(ctx: &RepoContext, json_output: bool) -> Result<u8, String> {
    let mut checks: Vec<Check> = Vec::new();
    let mut all_pass = true;

    match load_packages(ctx) {
        Ok(report) => {
            check_manifests(&report, &mut checks, &mut all_pass);
            checks.push(Check::pass(
                "unique_ids",
                "Package and plugin ids are unique",
            ));
            check_graph(&report, &mut checks, &mut all_pass);
        }
        Err(e @ (RepoError::DuplicatePackageId { .. } | RepoError::DuplicatePluginId { .. })) => {
            all_pass = false;
            checks.push(Check::fail("unique_ids", &e.to_string()));
        }
        Err(e) => return Err(repo_error(&e)),
    }

    print_results(&checks, all_pass, json_output)
}

fn check_manifests(report: &LoadReport, checks: &mut Vec<Check>, all_pass: &mut bool) {
    let total = report.packages.len() + report.failures.len();
    if report.is_clean() {
        checks.push(Check::pass(
            "manifests",
            &format!("All {total} manifests are valid"),
        ));
    } else {
        *all_pass = false;
        checks.push(Check::fail(
            "manifests",
            &format!("{} of {total} manifests are invalid", report.failures.len()),
        ));
        for (path, err) in &report.failures {
            checks.push(Check::fail("manifest", &describe_failure(path, err)));
        }
    }
    checks.push(Check::info(
        "packages",
        &format!(
            "{} packages ({} plugins)",
            report.packages.len(),
            report.packages.plugins().count()
        ),
    ));
}

fn check_graph(report: &LoadReport, checks: &mut Vec<Check>, all_pass: &mut bool) {
    let graph = PluginGraph::from_map(&report.packages);

    let missing = graph.missing_dependencies();
    let mut missing_required = 0;
    for dep in &missing {
        let message = format!(
            "{} depends on unknown {} plugin {}",
            dep.plugin, dep.kind, dep.dependency
        );
        if dep.is_error() {
            missing_required += 1;
            checks.push(Check::fail("plugin_dependency", &message));
        } else {
            checks.push(Check::warn("plugin_dependency", &message));
        }
    }
    if missing_required == 0 {
        checks.push(Check::pass(
            "plugin_dependencies",
            "All required plugins and bundles exist",
        ));
    } else {
        *all_pass = false;
    }

    match graph.find_cycle() {
        None => checks.push(Check::pass(
            "plugin_cycles",
            "Plugin dependency graph has no cycles",
        )),
        Some(cycle) => {
            *all_pass = false;
            let path: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
            checks.push(Check::fail(
                "plugin_cycles",
                &format!("Circular plugin dependency: {}", path.join(" -> ")),
            ));
        }
    }
}

fn print_results(checks: &[Check], all_pass: bool, json_output: bool) -> Result<u8, String> {
    if json_output {
        let json = serde_json::json!({
            "healthy": all_pass,
            "checks": checks,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&json).map_err(|e| e.to_string())?
        );
    } else {
        println!("Kibana package check\n");
        for check in checks {
            let icon = match check.status {
                "pass" => "✓",
                "fail" => "✗",
                "warn" => "⚠",
                _ => "ℹ",
            };
            println!("  {icon} {}", check.message);
        }
        println!();
        if all_pass {
            println!("All checks passed.");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }
    Ok(if all_pass { EXIT_SUCCESS } else { EXIT_FAILURE })
}

#[derive(Serialize)]
struct Check {
    name: String,
    status: &'static str,
    message: String,
}

impl Check {
    fn new(name: &str, status: &'static str, message: &str) -> Self {
        Self {
            name: name.to_owned(),
            status,
            message: message.to_owned(),
        }
    }

    fn pass(name: &str, message: &str) -> Self {
        Self::new(name, "pass", message)
    }

    fn fail(name: &str, message: &str) -> Self {
        Self::new(name, "fail", message)
    }

    fn warn(name: &str, message: &str) -> Self {
        Self::new(name, "warn", message)
    }

    fn info(name: &str, message: &str) -> Self {
        Self::new(name, "info", message)
    }
}
