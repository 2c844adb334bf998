use super::{json_pretty, load_repo, REPO_ERROR_PREFIX, EXIT_SUCCESS};
use kbn_manifest::RepoContext;
use kbn_packages::PluginGraph;

pub fn run(ctx: &RepoContext, plugin_id: &str, json: bool) -> Result<u8, String> {
    let report = load_repo(ctx, json)?;
    let graph = PluginGraph::from_map(&report.packages);
    let deps = graph
        .dependencies_of(plugin_id)
        .map_err(|e| format!("{REPO_ERROR_PREFIX} {e}"))?;

    if json {
        let value = serde_json::json!({
            "plugin": plugin_id,
            "dependencies": deps,
        });
        println!("{}", json_pretty(&value)?);
    } else if deps.is_empty() {
        println!("{plugin_id} has no plugin dependencies");
    } else {
        for dep in &deps {
            let dir = report
                .packages
                .get_plugin(dep)
                .map_or("-", |p| p.normalized_rel_dir());
            println!("{:<32} {dir}", dep.as_str());
        }
    }
    Ok(EXIT_SUCCESS)
}
