use crate::error::ManifestError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const MANIFEST_FILE_NAME: &str = "kibana.jsonc";

/// Read a descriptor file, distinguishing a missing file from other I/O
/// failures.
pub fn read_source(path: &Path, file_name: &'static str) -> Result<String, ManifestError> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ManifestError::NotFound {
                path: path.to_path_buf(),
                file_name,
                source,
            }
        } else {
            ManifestError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}
