//! Artifact store: locating, verifying and deserializing model artifacts.
//!
//! # Integrity
//!
//! A model directory may carry a `manifest.json` that binds every artifact to
//! its SHA-256 digest:
//!
//! ```json
//! { "version": 1, "files": { "preprocessor.json": "<hex>", "final_model.json": "<hex>" } }
//! ```
//!
//! When a manifest is present, an artifact that is not listed or whose digest
//! differs is refused.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// File name of the optional integrity manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Which of the two required artifacts an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Preprocessor,
    Model,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preprocessor => write!(f, "preprocessor"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// Startup failure: an artifact is unavailable or unusable.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("The {kind} file was not found at: {}", path.display())]
    Missing { kind: ArtifactKind, path: PathBuf },

    #[error("The {kind} file at {} could not be read: {source}", path.display())]
    Unreadable {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The {kind} file at {} is corrupt: {reason}", path.display())]
    Corrupt {
        kind: ArtifactKind,
        path: PathBuf,
        reason: String,
    },

    #[error("The {kind} file at {} does not match its manifest digest", path.display())]
    IntegrityMismatch { kind: ArtifactKind, path: PathBuf },

    #[error("Artifact manifest at {} is invalid: {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("The preprocessor and model are incompatible: {0}")]
    Incompatible(String),
}

impl ArtifactError {
    /// The artifact this error refers to, if it refers to a single one.
    #[must_use]
    pub fn kind(&self) -> Option<ArtifactKind> {
        match self {
            Self::Missing { kind, .. }
            | Self::Unreadable { kind, .. }
            | Self::Corrupt { kind, .. }
            | Self::IntegrityMismatch { kind, .. } => Some(*kind),
            Self::Manifest { .. } | Self::Incompatible(_) => None,
        }
    }
}

/// Digest manifest for a model directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    /// File name (relative to the model directory) to lowercase SHA-256 hex.
    pub files: BTreeMap<String, String>,
}

/// Fail unless `path` exists.
///
/// # Errors
/// Returns `ArtifactError::Missing` naming the artifact.
pub fn ensure_present(kind: ArtifactKind, path: &Path) -> Result<(), ArtifactError> {
    if path.exists() {
        Ok(())
    } else {
        Err(ArtifactError::Missing {
            kind,
            path: path.to_path_buf(),
        })
    }
}

/// Load `manifest.json` from `dir` if there is one.
///
/// # Errors
/// Returns `ArtifactError::Manifest` if the manifest is required but absent,
/// unreadable, malformed, or of an unsupported version.
pub fn load_manifest(dir: &Path, required: bool) -> Result<Option<ArtifactManifest>, ArtifactError> {
    let path = dir.join(MANIFEST_FILE);
    let manifest_err = |reason: String| ArtifactError::Manifest {
        path: path.clone(),
        reason,
    };

    if !path.exists() {
        if required {
            return Err(manifest_err("manifest is required but missing".into()));
        }
        tracing::debug!("No artifact manifest in {:?}; skipping digest checks", dir);
        return Ok(None);
    }

    let bytes = std::fs::read(&path).map_err(|e| manifest_err(e.to_string()))?;
    let manifest: ArtifactManifest =
        serde_json::from_slice(&bytes).map_err(|e| manifest_err(e.to_string()))?;

    if manifest.version != 1 {
        return Err(manifest_err(format!(
            "unsupported manifest version {}",
            manifest.version
        )));
    }
    if manifest.files.is_empty() {
        return Err(manifest_err("manifest lists no files".into()));
    }

    tracing::info!("Loaded artifact manifest ({} files)", manifest.files.len());
    Ok(Some(manifest))
}

/// Read, verify and deserialize one artifact.
///
/// # Errors
/// Returns `Unreadable` on I/O failure, `IntegrityMismatch` when a manifest
/// digest differs, and `Corrupt` when the artifact is not listed in the
/// manifest or is not valid JSON for `T`.
pub fn read_artifact<T: DeserializeOwned>(
    kind: ArtifactKind,
    path: &Path,
    manifest: Option<&ArtifactManifest>,
) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Unreadable {
        kind,
        path: path.to_path_buf(),
        source,
    })?;

    let digest = sha256_hex(&bytes);

    if let Some(manifest) = manifest {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let expected = manifest.files.get(&name).ok_or_else(|| ArtifactError::Corrupt {
            kind,
            path: path.to_path_buf(),
            reason: format!("{name} is not listed in {MANIFEST_FILE}"),
        })?;

        if !constant_time_eq_str(&digest, &expected.to_ascii_lowercase()) {
            return Err(ArtifactError::IntegrityMismatch {
                kind,
                path: path.to_path_buf(),
            });
        }
    }

    let value = serde_json::from_slice(&bytes).map_err(|e| ArtifactError::Corrupt {
        kind,
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    tracing::info!("Read {} artifact {:?} (sha256={})", kind, path, digest);
    Ok(value)
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// Constant-time compare for ASCII strings (used for SHA-256 hex digests).
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        value: u32,
    }

    fn write_manifest(dir: &Path, files: &[(&str, &[u8])]) {
        let manifest = ArtifactManifest {
            version: 1,
            files: files
                .iter()
                .map(|(name, bytes)| ((*name).to_string(), sha256_hex(bytes)))
                .collect(),
        };
        let json = serde_json::to_vec(&manifest).expect("serialize manifest");
        std::fs::write(dir.join(MANIFEST_FILE), json).expect("write manifest");
    }

    #[test]
    fn test_ensure_present() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("preprocessor.json");

        let err = ensure_present(ArtifactKind::Preprocessor, &path).unwrap_err();
        assert!(matches!(err, ArtifactError::Missing { kind: ArtifactKind::Preprocessor, .. }));
        assert!(err.to_string().contains("preprocessor.json"));

        std::fs::write(&path, b"{}").expect("write");
        assert!(ensure_present(ArtifactKind::Preprocessor, &path).is_ok());
    }

    #[test]
    fn test_read_artifact_without_manifest() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("final_model.json");
        std::fs::write(&path, br#"{"value": 7}"#).expect("write");

        let payload: Payload = read_artifact(ArtifactKind::Model, &path, None).expect("read");
        assert_eq!(payload, Payload { value: 7 });
    }

    #[test]
    fn test_corrupt_json_is_reported() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("final_model.json");
        std::fs::write(&path, b"\x80\x04\x95pickle").expect("write");

        let err = read_artifact::<Payload>(ArtifactKind::Model, &path, None).unwrap_err();
        assert!(matches!(err, ArtifactError::Corrupt { kind: ArtifactKind::Model, .. }));
        assert_eq!(err.kind(), Some(ArtifactKind::Model));
    }

    #[test]
    fn test_manifest_digest_is_enforced() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        let path = dir.join("final_model.json");
        let original = br#"{"value": 1}"#;
        std::fs::write(&path, original).expect("write");
        write_manifest(dir, &[("final_model.json", original)]);

        let manifest = load_manifest(dir, true).expect("load").expect("present");
        let payload: Payload =
            read_artifact(ArtifactKind::Model, &path, Some(&manifest)).expect("verified read");
        assert_eq!(payload.value, 1);

        std::fs::write(&path, br#"{"value": 2}"#).expect("tamper");
        let err = read_artifact::<Payload>(ArtifactKind::Model, &path, Some(&manifest)).unwrap_err();
        assert!(matches!(err, ArtifactError::IntegrityMismatch { .. }));
    }

    #[test]
    fn test_manifest_must_list_artifact() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        let path = dir.join("preprocessor.json");
        std::fs::write(&path, br#"{"value": 1}"#).expect("write");
        write_manifest(dir, &[("other.json", b"x")]);

        let manifest = load_manifest(dir, false).expect("load").expect("present");
        let err =
            read_artifact::<Payload>(ArtifactKind::Preprocessor, &path, Some(&manifest)).unwrap_err();
        assert!(matches!(err, ArtifactError::Corrupt { .. }));
    }

    #[test]
    fn test_manifest_requirements() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();

        assert!(load_manifest(dir, false).expect("optional").is_none());
        assert!(matches!(
            load_manifest(dir, true),
            Err(ArtifactError::Manifest { .. })
        ));

        std::fs::write(dir.join(MANIFEST_FILE), br#"{"version": 2, "files": {"a": "b"}}"#)
            .expect("write");
        assert!(load_manifest(dir, false).is_err());
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(constant_time_eq_str("abc", "abc"));
        assert!(!constant_time_eq_str("abc", "abd"));
        assert!(!constant_time_eq_str("abc", "ab"));
    }
}
