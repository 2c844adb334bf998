//! Package manifest (`kibana.jsonc`) reading and validation.
//!
//! This crate defines the schema layer: reading a descriptor from disk
//! ([`read_source`]), comment-tolerant parsing ([`parse_jsonc`]), closed-schema
//! validation into a normalized [`PackageManifest`], the plugin sub-schema
//! ([`PluginManifest`]), and build-artifact classification ([`RepoContext`]).
//! Every call is a pure transform of its inputs; nothing is cached.

pub mod category;
pub mod error;
pub mod jsonc;
pub mod manifest;
pub mod plugin;
pub mod predicates;
pub mod repo;
pub mod roles;
pub mod source;
pub mod types;

pub use category::{is_valid_plugin_category_info, PluginCategoryInfo, CATEGORY_WIRE_KEY};
pub use error::{render_value, KeyScope, ManifestError, ValidationError};
pub use jsonc::parse_jsonc;
pub use manifest::{
    parse_package_manifest_str, read_package_manifest, validate_package_manifest, BuildConfig,
    PackageManifest,
};
pub use plugin::{validate_plugin, ConfigPath, PluginManifest, PluginType};
pub use predicates::{PackageType, PACKAGE_ID_PREFIX};
pub use repo::{find_git_root, ArtifactLayout, RepoContext};
pub use roles::{read_role_descriptors_from_resource, read_roles_from_resource};
pub use source::{read_source, MANIFEST_FILE_NAME};
pub use types::{InvalidIdentifier, OwnerHandle, PackageId, PluginId};
