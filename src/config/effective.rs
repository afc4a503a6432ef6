//! Effective configuration with provenance
//!
//! Resolution reads the default document (fatal on any failure) and the
//! optional user document (any failure falls back to the defaults alone),
//! then merges them once. The result records which documents contributed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::merge::merge;
use super::schema::LazitConfig;

/// Schema version for the serialized effective config
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "lazit/effective_config@1";

/// Origin of a configuration source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Default,
    User,
}

/// What happened to a source during resolution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    /// Parsed and merged
    Loaded,
    /// Not present on disk
    Missing,
    /// Present but ignored; the defaults were used instead
    Fallback { reason: String },
}

/// A configuration document considered during resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    pub path: String,

    /// SHA-256 digest of raw file bytes (None when unreadable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    #[serde(flatten)]
    pub status: SourceStatus,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{} is empty", .path.display())]
    Empty { path: PathBuf },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{} must contain a JSON object at the top level", .path.display())]
    NotAnObject { path: PathBuf },

    #[error("schema error: {0}")]
    Schema(serde_json::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("canonicalization error: {0}")]
    Canonicalization(String),
}

/// The merged configuration tree plus the sources that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub schema_version: u32,

    pub schema_id: String,

    /// The merged configuration object
    pub config: Value,

    /// Documents considered, default first
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Resolve the effective configuration from the default and user documents.
    ///
    /// The default document must load. The user document is optional: a
    /// missing, empty or malformed file is logged and ignored.
    pub fn resolve(default_path: &Path, user_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (default_value, default_digest) = Self::load_json_file(default_path)?;
        tracing::debug!(path = %default_path.display(), "loaded default configuration");

        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Default,
            path: default_path.display().to_string(),
            digest: Some(default_digest),
            status: SourceStatus::Loaded,
        }];

        let mut user_value = None;
        if let Some(path) = user_path {
            let source = if !path.exists() {
                tracing::info!(path = %path.display(), "no user configuration, using defaults");
                ConfigSource {
                    origin: ConfigOrigin::User,
                    path: path.display().to_string(),
                    digest: None,
                    status: SourceStatus::Missing,
                }
            } else {
                match Self::load_json_file(path) {
                    Ok((value, digest)) => {
                        tracing::debug!(path = %path.display(), "loaded user configuration");
                        user_value = Some(value);
                        ConfigSource {
                            origin: ConfigOrigin::User,
                            path: path.display().to_string(),
                            digest: Some(digest),
                            status: SourceStatus::Loaded,
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "ignoring user configuration, falling back to defaults"
                        );
                        ConfigSource {
                            origin: ConfigOrigin::User,
                            path: path.display().to_string(),
                            digest: fs::read(path).ok().map(|bytes| sha256_hex(&bytes)),
                            status: SourceStatus::Fallback {
                                reason: e.to_string(),
                            },
                        }
                    }
                }
            };
            sources.push(source);
        }

        Ok(Self::from_parts(default_value, user_value, sources))
    }

    /// Merge already-parsed documents (no provenance beyond what is passed in)
    pub fn from_values(default: Value, user: Option<Value>) -> Self {
        Self::from_parts(default, user, Vec::new())
    }

    fn from_parts(default: Value, user: Option<Value>, sources: Vec<ConfigSource>) -> Self {
        let config = match user {
            Some(user) => merge(&default, &user),
            None => default,
        };

        Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            config,
            sources,
        }
    }

    /// Load and parse a JSON document, returning the value and digest
    fn load_json_file(path: &Path) -> Result<(Value, String), ConfigError> {
        let bytes = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let digest = sha256_hex(&bytes);

        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ConfigError::Empty {
                path: path.to_path_buf(),
            });
        }

        let value: Value = serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if !value.is_object() {
            return Err(ConfigError::NotAnObject {
                path: path.to_path_buf(),
            });
        }

        Ok((value, digest))
    }

    /// Deserialize into the typed, validated schema
    pub fn typed(&self) -> Result<LazitConfig, ConfigError> {
        LazitConfig::from_value(&self.config)
    }

    /// SHA-256 of the RFC 8785 canonical form of the merged tree
    pub fn digest(&self) -> Result<String, ConfigError> {
        let jcs_bytes = serde_json_canonicalizer::to_vec(&self.config)
            .map_err(|e| ConfigError::Canonicalization(e.to_string()))?;
        Ok(sha256_hex(&jcs_bytes))
    }

    /// Whether the user document took part in the merge
    pub fn uses_user_config(&self) -> bool {
        self.sources
            .iter()
            .any(|s| s.origin == ConfigOrigin::User && s.status == SourceStatus::Loaded)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a config value by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.config;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Get a config value as string
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    /// Get a config value as bool
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| v.as_bool())
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
