//! Shape predicates over parsed descriptor values.
//!
//! Every predicate is a pure function of a single value so it can be tested
//! and reused on its own.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const PACKAGE_ID_PREFIX: &str = "@kbn/";

/// Closed set of package kinds. The kind determines which optional
/// fields a manifest may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageType {
    FunctionalTests,
    Plugin,
    SharedBrowser,
    SharedCommon,
    SharedScss,
    SharedServer,
    TestHelper,
}

impl PackageType {
    pub const ALL: [PackageType; 7] = [
        Self::FunctionalTests,
        Self::Plugin,
        Self::SharedBrowser,
        Self::SharedCommon,
        Self::SharedScss,
        Self::SharedServer,
        Self::TestHelper,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FunctionalTests => "functional-tests",
            Self::Plugin => "plugin",
            Self::SharedBrowser => "shared-browser",
            Self::SharedCommon => "shared-common",
            Self::SharedScss => "shared-scss",
            Self::SharedServer => "shared-server",
            Self::TestHelper => "test-helper",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Kinds that carry no type-specific fields at all.
    pub fn is_basic(self) -> bool {
        matches!(
            self,
            Self::SharedServer | Self::FunctionalTests | Self::TestHelper
        )
    }

    /// Kinds that may set `sharedBrowserBundle`.
    pub fn allows_shared_browser_bundle(self) -> bool {
        !self.is_basic() && self != Self::Plugin
    }

    /// Comma-separated list of every accepted name, for diagnostics.
    pub fn options() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string with at least one non-whitespace character.
pub fn is_some_string(v: &Value) -> bool {
    v.as_str().is_some_and(|s| !s.trim().is_empty())
}

pub fn is_obj(v: &Value) -> bool {
    v.is_object()
}

pub(crate) fn is_valid_plugin_id_str(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_alphabetic() || c == '_')
}

pub(crate) fn is_valid_owner_str(s: &str) -> bool {
    s.starts_with('@')
}

/// camelCase or snake_case: `^[a-z][a-zA-Z_]*$`.
pub fn is_valid_plugin_id(v: &Value) -> bool {
    v.as_str().is_some_and(is_valid_plugin_id_str)
}

pub fn is_valid_pkg_type(v: &Value) -> bool {
    v.as_str().and_then(PackageType::from_name).is_some()
}

pub fn is_arr_of_ids(v: &Value) -> bool {
    v.as_array()
        .is_some_and(|items| items.iter().all(is_valid_plugin_id))
}

pub fn is_arr_of_strings(v: &Value) -> bool {
    v.as_array()
        .is_some_and(|items| items.iter().all(is_some_string))
}

pub fn is_valid_owner(v: &Value) -> bool {
    v.as_str().is_some_and(is_valid_owner_str)
}
