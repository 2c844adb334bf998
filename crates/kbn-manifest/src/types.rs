//! Validated newtypes for the identifiers that appear in a package manifest.
//!
//! Each type can only be constructed through [`TryFrom`] (or `parse`), so a
//! value in hand always satisfies its rule. All serialize as plain strings.

use crate::predicates::{is_valid_owner_str, is_valid_plugin_id_str, PACKAGE_ID_PREFIX};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Returned when a string does not satisfy an identifier rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{value}\" {expected}")]
pub struct InvalidIdentifier {
    pub value: String,
    pub expected: &'static str,
}

macro_rules! validated_string {
    ($(#[$meta:meta])* $name:ident, $check:expr, $expected:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Human-readable rule this identifier must satisfy.
            pub const EXPECTED: &'static str = $expected;

            pub fn parse(s: impl Into<String>) -> Result<Self, InvalidIdentifier> {
                let s = s.into();
                let check: fn(&str) -> bool = $check;
                if check(&s) {
                    Ok(Self(s))
                } else {
                    Err(InvalidIdentifier {
                        value: s,
                        expected: Self::EXPECTED,
                    })
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidIdentifier;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = InvalidIdentifier;
            fn try_from(s: &str) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> String {
                v.0
            }
        }
    };
}

validated_string!(
    /// Repository-wide package id, always namespaced under `@kbn/`.
    PackageId,
    |s| s.starts_with(PACKAGE_ID_PREFIX),
    "must be a string that starts with @kbn/"
);

validated_string!(
    /// Plugin id in camelCase or snake_case.
    PluginId,
    is_valid_plugin_id_str,
    "must be a string in camel or snake case"
);

validated_string!(
    /// GitHub team handle, e.g. `@elastic/kibana-core`.
    OwnerHandle,
    is_valid_owner_str,
    "must be a valid Github team handle starting with @"
);
