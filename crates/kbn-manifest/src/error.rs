use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const MAX_RENDERED_LEN: usize = 120;

/// Failures surfaced while reading a package descriptor from disk.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("missing {file_name} file at {}", path.display())]
    NotFound {
        path: PathBuf,
        file_name: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{} does not exist or not a yml file", path.display())]
    NotAResource { path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed descriptor at line {line}, column {column}: {message}")]
    Malformed {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("expected {} file to parse to an object", path.display())]
    NotAnObject { path: PathBuf },
    #[error("Invalid manifest [{}]: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },
}

impl ManifestError {
    /// True for the missing-file family, independent of the message text.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::NotAResource { .. } => true,
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// The schema-level cause, when this is a validation failure.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Invalid { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Where a closed-object check found keys it does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    Manifest,
    Build,
}

impl fmt::Display for KeyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manifest => f.write_str("package manifest"),
            Self::Build => f.write_str("\"build\" of package"),
        }
    }
}

/// A structural or semantic violation of the manifest schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("expected manifest root to be an object")]
    RootNotObject,
    #[error("invalid package \"{key}\" [{value}], {expected}")]
    Schema {
        /// Dotted path of the offending field, e.g. `plugin.server`.
        key: String,
        /// Diagnostic rendering of the actual value.
        value: String,
        expected: String,
    },
    #[error("unexpected keys in {scope} [{}]", keys.join(", "))]
    UnexpectedKeys { scope: KeyScope, keys: Vec<String> },
}

impl ValidationError {
    pub(crate) fn schema(key: &str, value: Option<&Value>, expected: impl Into<String>) -> Self {
        Self::Schema {
            key: key.to_owned(),
            value: render_value(value),
            expected: expected.into(),
        }
    }

    /// Field path named by the error, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Schema { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// Render a value for diagnostics: primitives as-is, containers as
/// truncated compact JSON, absent values as `undefined`.
pub fn render_value(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_owned(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            let compact = other.to_string();
            if compact.chars().count() > MAX_RENDERED_LEN {
                let cut: String = compact.chars().take(MAX_RENDERED_LEN).collect();
                format!("{cut}...")
            } else {
                compact
            }
        }
    }
}
