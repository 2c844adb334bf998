use super::{colorize_type, json_pretty, load_repo, EXIT_SUCCESS};
use kbn_manifest::RepoContext;

fn join_or_none<T: AsRef<str>>(items: &[T]) -> String {
    if items.is_empty() {
        "(none)".to_owned()
    } else {
        items.iter().map(|s| s.as_ref()).collect::<Vec<&str>>().join(", ")
    }
}

/// `id` may be a package id or a plugin id.
pub fn run(ctx: &RepoContext, id: &str, json: bool) -> Result<u8, String> {
    let report = load_repo(ctx, json)?;
    let pkg = report
        .packages
        .find(id)
        .ok_or_else(|| format!("no package matching '{id}'"))?;

    if json {
        println!("{}", json_pretty(pkg)?);
        return Ok(EXIT_SUCCESS);
    }

    let m = &pkg.manifest;
    println!("id:          {}", m.id);
    println!("type:        {}", colorize_type(m.package_type));
    println!("owner:       {}", join_or_none(&m.owner));
    println!("dir:         {}", pkg.normalized_rel_dir());
    println!("dev_only:    {}", pkg.is_dev_only());
    if let Some(description) = &m.description {
        println!("description: {description}");
    }
    if let Some(bundle) = m.shared_browser_bundle {
        println!("bundle:      {bundle}");
    }
    if let Some(plugin) = pkg.plugin() {
        println!("plugin:      {}", plugin.id);
        println!("  browser:   {}", plugin.browser);
        println!("  server:    {}", plugin.server);
        if plugin.is_preboot() {
            println!("  type:      preboot");
        }
        if let Some(config_path) = &plugin.config_path {
            println!("  config:    {}", config_path.dotted());
        }
        println!("  required:  {}", join_or_none(plugin.required_plugins()));
        println!("  optional:  {}", join_or_none(plugin.optional_plugins()));
        println!("  bundles:   {}", join_or_none(plugin.required_bundles()));
        if let Some(cat) = pkg.plugin_categories() {
            println!(
                "  category:  oss={} example={} testPlugin={}",
                cat.oss, cat.example, cat.test_plugin
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
