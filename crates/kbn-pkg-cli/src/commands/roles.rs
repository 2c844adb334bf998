use super::{json_pretty, manifest_error, EXIT_SUCCESS};
use kbn_manifest::{read_roles_from_resource, RepoContext};
use std::path::Path;
use tracing::debug;

pub fn run(ctx: &RepoContext, file: &Path, json: bool) -> Result<u8, String> {
    let path = ctx.resolve(file);
    debug!("reading roles from {}", path.display());
    let roles = read_roles_from_resource(&path).map_err(|e| manifest_error(&e))?;
    if json {
        println!("{}", json_pretty(&roles)?);
    } else if roles.is_empty() {
        println!("no roles defined in {}", path.display());
    } else {
        for role in &roles {
            println!("{role}");
        }
    }
    Ok(EXIT_SUCCESS)
}
