//! Raw data acquisition.
//!
//! Downloads the housing CSV to a local path when it is not already
//! present. Transport failures are logged and propagated unchanged; there
//! is no retry, and an existing file is never overwritten.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::io::write_atomic;

/// Errors raised while acquiring the raw dataset.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed or returned a non-success status.
    #[error("download failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error while writing the downloaded file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Download `url` to `path` unless the file already exists.
///
/// Parent directories are created as needed. Returns `true` when a
/// download happened and `false` when the existing file was kept. The
/// body is written atomically, so an interrupted download never leaves a
/// partial file at `path`.
pub fn download_if_absent(url: &str, path: &Path) -> Result<bool, FetchError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    if path.exists() {
        log::info!("file already exists at {}, skipping download", path.display());
        return Ok(false);
    }

    log::info!("downloading data to {}", path.display());
    let bytes = fetch_bytes(url).inspect_err(|e| log::error!("download failed: {e}"))?;
    write_atomic(path, &bytes)?;
    log::info!("download completed successfully");

    Ok(true)
}

fn fetch_bytes(url: &str) -> Result<Vec<u8>, FetchError> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let bytes = response.bytes()?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_file_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        fs::write(&path, b"already here").unwrap();

        // The URL is never touched when the file exists.
        let downloaded = download_if_absent("http://invalid.invalid/data.csv", &path).unwrap();
        assert!(!downloaded);
        assert_eq!(fs::read(&path).unwrap(), b"already here");
    }

    #[test]
    fn unreachable_host_propagates_a_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("raw.csv");

        let err = download_if_absent("http://invalid.invalid/data.csv", &path).unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
        // No partial file is left behind.
        assert!(!path.exists());
    }
}
