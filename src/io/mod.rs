//! Native `.hval` storage format for model artifacts.
//!
//! An artifact is a 32-byte header followed by a Postcard-encoded payload.
//!
//! # Format Structure
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Header (32 bytes)                        │
//! ├────────────────────────────────────────────────────────────┤
//! │                    Payload (variable)                       │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The header carries a magic tag, a format version, the payload length
//! and its CRC32 checksum, so a corrupt or truncated artifact is rejected
//! before any payload decoding happens. Artifacts are written atomically
//! (temp file + rename): either the full file is published or none is.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Magic bytes identifying a homeval model artifact.
pub const MAGIC: &[u8; 4] = b"HVAL";

/// Current format version (major).
pub const CURRENT_VERSION_MAJOR: u8 = 1;

/// Current format version (minor).
pub const CURRENT_VERSION_MINOR: u8 = 0;

/// Size of the format header in bytes.
pub const HEADER_SIZE: usize = 32;

// ============================================================================
// Format Header
// ============================================================================

/// 32-byte header for the artifact format.
///
/// # Layout
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     Magic ("HVAL")
/// 4       1     Version major
/// 5       1     Version minor
/// 6       6     Reserved
/// 12      4     Payload size (bytes)
/// 16      4     CRC32 checksum of payload
/// 20      4     Number of features
/// 24      4     Number of trees
/// 28      4     Reserved
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatHeader {
    /// Format version (major).
    pub version_major: u8,
    /// Format version (minor).
    pub version_minor: u8,
    /// Size of the payload in bytes.
    pub payload_size: u32,
    /// CRC32 checksum of the payload.
    pub checksum: u32,
    /// Number of input features the model was trained on.
    pub n_features: u32,
    /// Number of trees in the forest.
    pub n_trees: u32,
}

impl FormatHeader {
    /// Create a new header with the current version.
    pub fn new(n_features: u32, n_trees: u32) -> Self {
        Self {
            version_major: CURRENT_VERSION_MAJOR,
            version_minor: CURRENT_VERSION_MINOR,
            payload_size: 0,
            checksum: 0,
            n_features,
            n_trees,
        }
    }

    /// Serialize header to 32 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];

        buf[0..4].copy_from_slice(MAGIC);
        buf[4] = self.version_major;
        buf[5] = self.version_minor;
        // Offsets 6-11 reserved.
        buf[12..16].copy_from_slice(&self.payload_size.to_le_bytes());
        buf[16..20].copy_from_slice(&self.checksum.to_le_bytes());
        buf[20..24].copy_from_slice(&self.n_features.to_le_bytes());
        buf[24..28].copy_from_slice(&self.n_trees.to_le_bytes());
        // Offsets 28-31 reserved.

        buf
    }

    /// Parse header from 32 bytes.
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Result<Self, DeserializeError> {
        if &buf[0..4] != MAGIC {
            return Err(DeserializeError::NotAnArtifact);
        }

        let version_major = buf[4];
        let version_minor = buf[5];
        if version_major > CURRENT_VERSION_MAJOR {
            return Err(DeserializeError::UnsupportedVersion {
                major: version_major,
                minor: version_minor,
            });
        }

        Ok(Self {
            version_major,
            version_minor,
            payload_size: u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]),
            checksum: u32::from_le_bytes([buf[16], buf[17], buf[18], buf[19]]),
            n_features: u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]),
            n_trees: u32::from_le_bytes([buf[24], buf[25], buf[26], buf[27]]),
        })
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during artifact serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postcard encoding error.
    #[error("encoding error: {0}")]
    Encoding(#[from] postcard::Error),
}

/// Errors that can occur during artifact deserialization.
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// File is not a homeval artifact (wrong magic).
    #[error("not a homeval model artifact")]
    NotAnArtifact,

    /// Artifact requires a newer format version.
    #[error("artifact requires format version {major}.{minor} or later")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// Payload checksum doesn't match.
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// File was truncated or incomplete.
    #[error("file truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// I/O error during reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Postcard decoding error.
    #[error("decoding error: {0}")]
    Decoding(#[from] postcard::Error),
}

// ============================================================================
// Checksum
// ============================================================================

/// Compute CRC32 checksum of data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

// ============================================================================
// Serialization
// ============================================================================

/// Serialize a payload to bytes, header included.
pub fn serialize_artifact<T: Serialize>(
    n_features: u32,
    n_trees: u32,
    payload: &T,
) -> Result<Vec<u8>, SerializeError> {
    let payload_bytes = postcard::to_allocvec(payload)?;

    let mut header = FormatHeader::new(n_features, n_trees);
    header.payload_size = payload_bytes.len() as u32;
    header.checksum = compute_checksum(&payload_bytes);

    let mut out = Vec::with_capacity(HEADER_SIZE + payload_bytes.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(&payload_bytes);
    Ok(out)
}

/// Deserialize a payload from bytes, validating magic, version and checksum.
pub fn deserialize_artifact<T: DeserializeOwned>(
    bytes: &[u8],
) -> Result<(FormatHeader, T), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::Truncated {
            expected: HEADER_SIZE,
            actual: bytes.len(),
        });
    }

    let mut header_buf = [0u8; HEADER_SIZE];
    header_buf.copy_from_slice(&bytes[..HEADER_SIZE]);
    let header = FormatHeader::from_bytes(&header_buf)?;

    let payload = &bytes[HEADER_SIZE..];
    if payload.len() != header.payload_size as usize {
        return Err(DeserializeError::Truncated {
            expected: HEADER_SIZE + header.payload_size as usize,
            actual: bytes.len(),
        });
    }

    let actual_checksum = compute_checksum(payload);
    if actual_checksum != header.checksum {
        return Err(DeserializeError::ChecksumMismatch {
            expected: header.checksum,
            actual: actual_checksum,
        });
    }

    let value = postcard::from_bytes(payload)?;
    Ok((header, value))
}

/// Serialize a payload and write it to disk atomically.
pub fn write_artifact<T: Serialize>(
    path: &Path,
    n_features: u32,
    n_trees: u32,
    payload: &T,
) -> Result<(), SerializeError> {
    let bytes = serialize_artifact(n_features, n_trees, payload)?;
    write_atomic(path, &bytes)?;
    Ok(())
}

/// Read an artifact file and deserialize its payload.
pub fn read_artifact<T: DeserializeOwned>(
    path: &Path,
) -> Result<(FormatHeader, T), DeserializeError> {
    let bytes = fs::read(path)?;
    deserialize_artifact(&bytes)
}

// ============================================================================
// Atomic Writes
// ============================================================================

/// Write bytes to a path atomically, creating parent directories as needed.
///
/// The data is first written to a sibling temp file and then renamed over
/// the destination, so readers never observe a partially written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        weights: Vec<f32>,
        columns: Vec<String>,
    }

    fn sample_payload() -> Payload {
        Payload {
            weights: vec![1.5, -2.0, 0.25],
            columns: vec!["a".into(), "b".into()],
        }
    }

    #[test]
    fn header_roundtrip() {
        let mut header = FormatHeader::new(12, 100);
        header.payload_size = 345;
        header.checksum = 0xDEADBEEF;

        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE);

        let parsed = FormatHeader::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn payload_roundtrip() {
        let payload = sample_payload();
        let bytes = serialize_artifact(12, 100, &payload).unwrap();

        let (header, decoded): (_, Payload) = deserialize_artifact(&bytes).unwrap();
        assert_eq!(header.n_features, 12);
        assert_eq!(header.n_trees, 100);
        assert_eq!(decoded, payload);
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut bytes = serialize_artifact(1, 1, &sample_payload()).unwrap();
        bytes[0] = b'X';

        let err = deserialize_artifact::<Payload>(&bytes).unwrap_err();
        assert!(matches!(err, DeserializeError::NotAnArtifact));
    }

    #[test]
    fn newer_major_version_is_rejected() {
        let mut bytes = serialize_artifact(1, 1, &sample_payload()).unwrap();
        bytes[4] = CURRENT_VERSION_MAJOR + 1;

        let err = deserialize_artifact::<Payload>(&bytes).unwrap_err();
        assert!(matches!(err, DeserializeError::UnsupportedVersion { .. }));
    }

    #[test]
    fn corrupted_payload_fails_checksum() {
        let mut bytes = serialize_artifact(1, 1, &sample_payload()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        let err = deserialize_artifact::<Payload>(&bytes).unwrap_err();
        assert!(matches!(err, DeserializeError::ChecksumMismatch { .. }));
    }

    #[test]
    fn truncated_file_is_rejected() {
        let bytes = serialize_artifact(1, 1, &sample_payload()).unwrap();

        let err = deserialize_artifact::<Payload>(&bytes[..HEADER_SIZE + 2]).unwrap_err();
        assert!(matches!(err, DeserializeError::Truncated { .. }));

        let err = deserialize_artifact::<Payload>(&bytes[..10]).unwrap_err();
        assert!(matches!(err, DeserializeError::Truncated { .. }));
    }

    #[test]
    fn write_atomic_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.bin");

        write_atomic(&path, b"first").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"first");

        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("artifact.hval");

        let payload = sample_payload();
        write_artifact(&path, 3, 7, &payload).unwrap();

        let (header, decoded): (_, Payload) = read_artifact(&path).unwrap();
        assert_eq!(header.n_features, 3);
        assert_eq!(decoded, payload);
    }
}
