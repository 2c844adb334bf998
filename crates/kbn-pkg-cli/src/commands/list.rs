use super::{colorize_type, json_pretty, load_repo, EXIT_SUCCESS};
use kbn_manifest::{PackageType, RepoContext};
use kbn_packages::Package;
use serde::Serialize;

#[derive(Serialize)]
struct Row<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    package_type: PackageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    plugin_id: Option<&'a str>,
    dir: &'a str,
    dev_only: bool,
}

impl<'a> From<&'a Package> for Row<'a> {
    fn from(pkg: &'a Package) -> Self {
        Self {
            id: pkg.id().as_str(),
            package_type: pkg.manifest.package_type,
            plugin_id: pkg.plugin_id().map(|id| id.as_str()),
            dir: pkg.normalized_rel_dir(),
            dev_only: pkg.is_dev_only(),
        }
    }
}

pub fn run(
    ctx: &RepoContext,
    type_filter: Option<PackageType>,
    plugins_only: bool,
    json: bool,
) -> Result<u8, String> {
    let report = load_repo(ctx, json)?;
    let rows: Vec<Row<'_>> = report
        .packages
        .iter()
        .filter(|p| type_filter.map_or(true, |t| p.manifest.package_type == t))
        .filter(|p| !plugins_only || p.is_plugin())
        .map(Row::from)
        .collect();

    if json {
        println!("{}", json_pretty(&rows)?);
    } else if rows.is_empty() {
        println!("no packages found");
    } else {
        println!("{:<44} {:<18} {:<24} DIR", "ID", "TYPE", "PLUGIN");
        for row in &rows {
            let type_str = colorize_type(row.package_type);
            // pad on the raw name; color codes would throw the width off
            let pad = 18usize.saturating_sub(row.package_type.as_str().len());
            println!(
                "{:<44} {type_str}{:pad$} {:<24} {}",
                row.id,
                "",
                row.plugin_id.unwrap_or("-"),
                row.dir
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
