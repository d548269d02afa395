//! Runtime configuration, read once from the environment at startup.

use std::path::PathBuf;

use ed25519_dalek::VerifyingKey;

use crate::adapters::artifacts::{verifying_key_from_b64, IntegrityPolicy};

pub const ARTIFACT_DIR_ENV: &str = "CARDIOFORM_ARTIFACT_DIR";
pub const REPORT_DIR_ENV: &str = "CARDIOFORM_REPORT_DIR";
pub const REQUIRE_SIGNED_ENV: &str = "CARDIOFORM_REQUIRE_SIGNED_ARTIFACTS";
pub const PUBKEY_ENV: &str = "CARDIOFORM_ARTIFACT_PUBKEY_B64";
pub const PUBKEY_FILE_ENV: &str = "CARDIOFORM_ARTIFACT_PUBKEY_B64_FILE";
pub const LOG_MODE_ENV: &str = "CARDIOFORM_LOG_MODE";
pub const LOG_FILE_ENV: &str = "CARDIOFORM_LOG_FILE";

const DEFAULT_ARTIFACT_DIR: &str = "models";
const DEFAULT_REPORT_DIR: &str = ".";
const DEFAULT_LOG_FILE: &str = "cardioform.log";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: expected a boolean (1/0, true/false, yes/no), got {value:?}")]
    InvalidBool { var: &'static str, value: String },

    #[error("{var}: expected one of auto, file, stdout, got {value:?}")]
    InvalidLogMode { var: &'static str, value: String },

    #[error("{var}: {reason}")]
    InvalidKey { var: &'static str, reason: String },

    #[error("{var}: failed to read {path:?}: {source}")]
    Read {
        var: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when stdout is a terminal (the TUI owns it), stdout otherwise
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    /// Resolve `Auto` against whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::Auto => interactive,
            Self::File => true,
            Self::Stdout => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub artifact_dir: PathBuf,
    pub report_dir: PathBuf,
    pub require_signed_artifacts: bool,
    pub artifact_pubkey: Option<VerifyingKey>,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            require_signed_artifacts: false,
            artifact_pubkey: None,
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}

fn parse_log_mode(value: &str) -> Result<LogMode, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "auto" => Ok(LogMode::Auto),
        "file" => Ok(LogMode::File),
        "stdout" => Ok(LogMode::Stdout),
        _ => Err(ConfigError::InvalidLogMode {
            var: LOG_MODE_ENV,
            value: value.to_string(),
        }),
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `ConfigError` for malformed values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `ConfigError` for malformed values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(ARTIFACT_DIR_ENV).filter(|v| !v.is_empty()) {
            config.artifact_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(REPORT_DIR_ENV).filter(|v| !v.is_empty()) {
            config.report_dir = PathBuf::from(dir);
        }
        if let Some(v) = lookup(REQUIRE_SIGNED_ENV) {
            config.require_signed_artifacts = parse_bool(REQUIRE_SIGNED_ENV, &v)?;
        }

        // Inline value wins over the file indirection.
        let pubkey = match lookup(PUBKEY_ENV).filter(|v| !v.trim().is_empty()) {
            Some(b64) => Some((PUBKEY_ENV, b64)),
            None => match lookup(PUBKEY_FILE_ENV).filter(|v| !v.is_empty()) {
                Some(path) => {
                    let path = PathBuf::from(path);
                    let b64 = std::fs::read_to_string(&path).map_err(|source| {
                        ConfigError::Read {
                            var: PUBKEY_FILE_ENV,
                            path,
                            source,
                        }
                    })?;
                    Some((PUBKEY_FILE_ENV, b64))
                }
                None => None,
            },
        };
        if let Some((var, b64)) = pubkey {
            let key = verifying_key_from_b64(&b64).map_err(|e| ConfigError::InvalidKey {
                var,
                reason: e.to_string(),
            })?;
            config.artifact_pubkey = Some(key);
        }

        if let Some(v) = lookup(LOG_MODE_ENV) {
            config.log_mode = parse_log_mode(&v)?;
        }
        if let Some(file) = lookup(LOG_FILE_ENV).filter(|v| !v.is_empty()) {
            config.log_file = PathBuf::from(file);
        }

        Ok(config)
    }

    /// Signature policy for the artifact loader.
    #[must_use]
    pub fn integrity_policy(&self) -> IntegrityPolicy {
        IntegrityPolicy {
            require_signature: self.require_signed_artifacts,
            verifying_key: self.artifact_pubkey,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use ed25519_dalek::SigningKey;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn pubkey_b64() -> (VerifyingKey, String) {
        let key = SigningKey::from_bytes(&[7u8; 32]).verifying_key();
        let b64 = base64::engine::general_purpose::STANDARD.encode(key.to_bytes());
        (key, b64)
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).expect("defaults");
        assert_eq!(config.artifact_dir, PathBuf::from("models"));
        assert_eq!(config.report_dir, PathBuf::from("."));
        assert!(!config.require_signed_artifacts);
        assert!(config.artifact_pubkey.is_none());
        assert_eq!(config.log_mode, LogMode::Auto);
        assert_eq!(config.log_file, PathBuf::from("cardioform.log"));
    }

    #[test]
    fn test_overrides() {
        let (key, b64) = pubkey_b64();
        let config = AppConfig::from_lookup(lookup(&[
            (ARTIFACT_DIR_ENV, "/srv/models"),
            (REPORT_DIR_ENV, "/tmp/reports"),
            (REQUIRE_SIGNED_ENV, "YES"),
            (PUBKEY_ENV, b64.as_str()),
            (LOG_MODE_ENV, "stdout"),
            (LOG_FILE_ENV, "/var/log/cf.log"),
        ]))
        .expect("valid config");

        assert_eq!(config.artifact_dir, PathBuf::from("/srv/models"));
        assert_eq!(config.report_dir, PathBuf::from("/tmp/reports"));
        assert!(config.require_signed_artifacts);
        assert_eq!(config.artifact_pubkey, Some(key));
        assert_eq!(config.log_mode, LogMode::Stdout);
        assert_eq!(config.log_file, PathBuf::from("/var/log/cf.log"));

        let policy = config.integrity_policy();
        assert!(policy.require_signature);
        assert_eq!(policy.verifying_key, Some(key));
    }

    #[test]
    fn test_pubkey_from_file() {
        let (key, b64) = pubkey_b64();
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("artifact.pub");
        std::fs::write(&path, format!("{b64}\n")).expect("write key");

        let path = path.to_string_lossy().into_owned();
        let config = AppConfig::from_lookup(lookup(&[(PUBKEY_FILE_ENV, path.as_str())]))
            .expect("valid config");
        assert_eq!(config.artifact_pubkey, Some(key));
    }

    #[test]
    fn test_missing_pubkey_file() {
        let err = AppConfig::from_lookup(lookup(&[(PUBKEY_FILE_ENV, "/nonexistent/key.pub")]))
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_values() {
        let err = AppConfig::from_lookup(lookup(&[(REQUIRE_SIGNED_ENV, "maybe")]))
            .expect_err("bad bool");
        assert!(matches!(err, ConfigError::InvalidBool { .. }));

        let err = AppConfig::from_lookup(lookup(&[(PUBKEY_ENV, "%%%")])).expect_err("bad key");
        assert!(matches!(err, ConfigError::InvalidKey { var: PUBKEY_ENV, .. }));

        let err = AppConfig::from_lookup(lookup(&[(LOG_MODE_ENV, "syslog")]))
            .expect_err("bad mode");
        assert!(err.to_string().contains("syslog"));
    }

    #[test]
    fn test_log_mode_resolution() {
        assert!(LogMode::Auto.use_file(true));
        assert!(!LogMode::Auto.use_file(false));
        assert!(LogMode::File.use_file(false));
        assert!(!LogMode::Stdout.use_file(true));
    }
}
