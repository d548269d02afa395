//! Artifact adapter: loads model weights and the scaler from JSON files.
//!
//! Expected layout of the artifact directory:
//!
//! ```text
//! models.json     feature_names, log_w, log_b, svm_w, svm_b, optional label
//! scaler.json     feature_names, center, scale
//! manifest.json   optional, SHA-256 digests of the files above
//! artifacts.sig   optional, Ed25519 signature over manifest.json
//! ```
//!
//! # Integrity
//!
//! When `manifest.json` and `artifacts.sig` are present the signature is
//! verified against the configured key and every bound file is hashed. When
//! they are absent, loading proceeds unless [`IntegrityPolicy::require_signature`]
//! is set. Use the `sign_artifacts` binary to produce both files.
//!
//! `models.json` and `scaler.json` are read once. The bytes that were hashed
//! are the bytes that get parsed, so a file swapped between the two steps
//! cannot slip past the manifest.
//!
//! # Schema
//!
//! Both JSON files carry `feature_names`, which must equal
//! [`FEATURE_NAMES`](crate::domain::FEATURE_NAMES) in order. A reordered
//! column would otherwise score silently wrong.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{
    LinearModel, ModelParameters, ParameterError, ParameterStore, ScalingParameters,
    FEATURE_COUNT, FEATURE_NAMES,
};
use crate::ports::ParameterSource;

pub const MODELS_FILE: &str = "models.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const SIGNATURE_FILE: &str = "artifacts.sig";

/// Only manifest version understood by this loader.
pub const MANIFEST_VERSION: u32 = 1;

/// Clock skew tolerated for `created_at` in the future.
const MAX_FUTURE_SKEW_SECS: i64 = 300;

/// Errors raised while loading artifacts. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact directory not found: {0:?}")]
    MissingDirectory(PathBuf),

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{file}: feature schema mismatch at index {index}: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        file: &'static str,
        index: usize,
        expected: String,
        found: String,
    },

    #[error("{file}: {source}")]
    Parameters {
        file: &'static str,
        #[source]
        source: ParameterError,
    },

    #[error("Artifact integrity check failed: {0}")]
    Integrity(String),
}

/// Layout of `models.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedModels {
    /// Free-form provenance note, e.g. marking sample weights
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub feature_names: Vec<String>,
    pub log_w: Vec<f64>,
    pub log_b: f64,
    pub svm_w: Vec<f64>,
    pub svm_b: f64,
}

/// Layout of `scaler.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedScaler {
    pub feature_names: Vec<String>,
    pub center: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Layout of `manifest.json`; the signature covers its exact bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedManifest {
    pub version: u32,
    /// Unix timestamp (seconds) when the manifest was written
    pub created_at: i64,
    /// File name to lowercase SHA-256 hex digest
    pub files: BTreeMap<String, String>,
}

/// How strictly artifact signatures are enforced.
#[derive(Debug, Clone, Default)]
pub struct IntegrityPolicy {
    /// Refuse to load artifacts without a signed manifest.
    pub require_signature: bool,
    /// Key that signed the manifest.
    pub verifying_key: Option<VerifyingKey>,
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Parse a base64-encoded 32-byte Ed25519 verifying key.
///
/// # Errors
/// Returns `ArtifactError::Integrity` if the encoding or key is invalid.
pub fn verifying_key_from_b64(b64: &str) -> Result<VerifyingKey, ArtifactError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|_| ArtifactError::Integrity("Invalid public key base64".into()))?;
    let key: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        ArtifactError::Integrity(format!(
            "Invalid public key length (expected 32 bytes, got {})",
            bytes.len()
        ))
    })?;
    VerifyingKey::from_bytes(&key)
        .map_err(|_| ArtifactError::Integrity("Invalid verifying key".into()))
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

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn check_schema(file: &'static str, names: &[String]) -> Result<(), ArtifactError> {
    for index in 0..names.len().max(FEATURE_COUNT) {
        let expected = FEATURE_NAMES.get(index).copied();
        let found = names.get(index).map(String::as_str);
        if expected != found {
            return Err(ArtifactError::SchemaMismatch {
                file,
                index,
                expected: expected.unwrap_or("<end of schema>").to_string(),
                found: found.unwrap_or("<missing>").to_string(),
            });
        }
    }
    Ok(())
}

/// Reads `models.json` and `scaler.json` from one directory.
pub struct JsonArtifactSource {
    dir: PathBuf,
    policy: IntegrityPolicy,
}

impl JsonArtifactSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, policy: IntegrityPolicy) -> Self {
        Self {
            dir: dir.into(),
            policy,
        }
    }

    fn read_bytes(&self, name: &str) -> Result<Vec<u8>, ArtifactError> {
        let path = self.dir.join(name);
        fs::read(&path).map_err(|source| ArtifactError::Read { path, source })
    }

    fn parse_json<T: DeserializeOwned>(&self, name: &str, bytes: &[u8]) -> Result<T, ArtifactError> {
        serde_json::from_slice(bytes).map_err(|source| ArtifactError::Malformed {
            path: self.dir.join(name),
            source,
        })
    }

    /// Verify the signed manifest if present.
    ///
    /// `loaded` holds files already read by the caller; their digests are
    /// taken from those bytes rather than from a second read. Other files
    /// the manifest binds are read from disk.
    ///
    /// Returns `true` when a signature was checked, `false` when the
    /// artifacts are unsigned and the policy allows it.
    fn verify_integrity(&self, loaded: &[(&str, &[u8])]) -> Result<bool, ArtifactError> {
        let sig_path = self.dir.join(SIGNATURE_FILE);
        let manifest_path = self.dir.join(MANIFEST_FILE);

        if !sig_path.exists() || !manifest_path.exists() {
            if self.policy.require_signature {
                tracing::error!(
                    "Signed manifest not found in {:?}; signatures are required",
                    self.dir
                );
                return Err(ArtifactError::Integrity(format!(
                    "{MANIFEST_FILE} and {SIGNATURE_FILE} are required"
                )));
            }
            tracing::warn!("Loading UNSIGNED model artifacts from {:?}", self.dir);
            return Ok(false);
        }

        let public_key = self.policy.verifying_key.as_ref().ok_or_else(|| {
            ArtifactError::Integrity(
                "Artifacts are signed but no verifying key is configured".into(),
            )
        })?;

        let sig_bytes = self.read_bytes(SIGNATURE_FILE)?;
        let sig_array: [u8; 64] = sig_bytes.as_slice().try_into().map_err(|_| {
            ArtifactError::Integrity("Invalid signature length (expected 64 bytes)".into())
        })?;
        let signature = Signature::from_bytes(&sig_array);

        let manifest_content = self.read_bytes(MANIFEST_FILE)?;
        public_key
            .verify(&manifest_content, &signature)
            .map_err(|_| ArtifactError::Integrity("Invalid manifest signature".into()))?;

        let manifest: SignedManifest =
            serde_json::from_slice(&manifest_content).map_err(|source| {
                ArtifactError::Malformed {
                    path: manifest_path.clone(),
                    source,
                }
            })?;

        if manifest.version != MANIFEST_VERSION {
            return Err(ArtifactError::Integrity(format!(
                "Unsupported manifest version: {}",
                manifest.version
            )));
        }
        if manifest.created_at > unix_now() + MAX_FUTURE_SKEW_SECS {
            return Err(ArtifactError::Integrity(
                "manifest created_at is in the future".into(),
            ));
        }

        for required in [MODELS_FILE, SCALER_FILE] {
            if !manifest.files.contains_key(required) {
                return Err(ArtifactError::Integrity(format!(
                    "manifest does not bind {required}"
                )));
            }
        }

        for (rel, expected_hex) in &manifest.files {
            let actual_hex = match loaded.iter().find(|(name, _)| *name == rel.as_str()) {
                Some((_, bytes)) => sha256_hex(bytes),
                None => sha256_hex(&self.read_bytes(rel)?),
            };
            if !constant_time_eq_str(&actual_hex, &expected_hex.to_ascii_lowercase()) {
                return Err(ArtifactError::Integrity(format!(
                    "File hash mismatch for {rel}"
                )));
            }
        }

        tracing::info!("Artifact signature and hashes verified");
        Ok(true)
    }
}

impl ParameterSource for JsonArtifactSource {
    type Error = ArtifactError;

    fn load(&self) -> Result<ParameterStore, ArtifactError> {
        if !self.dir.is_dir() {
            return Err(ArtifactError::MissingDirectory(self.dir.clone()));
        }

        let models_bytes = self.read_bytes(MODELS_FILE)?;
        let scaler_bytes = self.read_bytes(SCALER_FILE)?;
        let signed = self.verify_integrity(&[
            (MODELS_FILE, models_bytes.as_slice()),
            (SCALER_FILE, scaler_bytes.as_slice()),
        ])?;

        let models: ExportedModels = self.parse_json(MODELS_FILE, &models_bytes)?;
        if let Some(label) = &models.label {
            tracing::warn!("{MODELS_FILE} is labelled: {label}");
        }
        check_schema(MODELS_FILE, &models.feature_names)?;
        let parameters = |source| ArtifactError::Parameters {
            file: MODELS_FILE,
            source,
        };
        let logistic = LinearModel::new("log_w", &models.log_w, models.log_b).map_err(parameters)?;
        let svm = LinearModel::new("svm_w", &models.svm_w, models.svm_b).map_err(parameters)?;

        let scaler: ExportedScaler = self.parse_json(SCALER_FILE, &scaler_bytes)?;
        check_schema(SCALER_FILE, &scaler.feature_names)?;
        let scaler = ScalingParameters::new(&scaler.center, &scaler.scale).map_err(|source| {
            ArtifactError::Parameters {
                file: SCALER_FILE,
                source,
            }
        })?;

        tracing::info!(
            "Loaded model artifacts from {:?} (n_features={}, signed={})",
            self.dir,
            FEATURE_COUNT,
            signed
        );

        ParameterStore::new(ModelParameters { logistic, svm }, scaler).map_err(parameters)
    }
}
