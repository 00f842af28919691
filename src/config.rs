//! Credential file loading.
//!
//! The Spreaker bearer token lives in a local JSON file of the shape
//! `{"TOKEN": "..."}`. It is read once at startup and passed by value into
//! the statistics fetches; nothing else in the pipeline touches the
//! filesystem. The BigQuery service-account file is consumed directly by
//! the warehouse client and is not parsed here.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Contents of the Spreaker auth file.
#[derive(Debug, Deserialize)]
pub struct SpreakerAuth {
    /// The opaque bearer token presented on statistics requests.
    #[serde(rename = "TOKEN")]
    pub token: String,
}

/// Read and decode the auth file at `path`.
///
/// # Errors
///
/// [`Error::AuthFile`] naming the path, whether the file is unreadable or
/// not the expected JSON shape.
pub fn load_auth(path: &Path) -> Result<SpreakerAuth> {
    let raw = fs::read_to_string(path).map_err(|source| Error::AuthFile {
        path: path.to_path_buf(),
        source: source.into(),
    })?;
    serde_json::from_str(&raw).map_err(|source| Error::AuthFile {
        path: path.to_path_buf(),
        source: source.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn valid_auth_file_yields_token() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"TOKEN": "sekrit"}}"#).unwrap();

        let auth = load_auth(file.path()).unwrap();
        assert_eq!(auth.token, "sekrit");
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let err = load_auth(Path::new("/nonexistent/auth.json")).unwrap_err();
        match err {
            Error::AuthFile { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/auth.json"));
            }
            other => panic!("expected AuthFile, got {other:?}"),
        }
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"token": "lowercase key"}}"#).unwrap();

        assert!(matches!(
            load_auth(file.path()),
            Err(Error::AuthFile { .. })
        ));
    }
}
