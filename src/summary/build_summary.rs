//! Build summary (lazit-build.json)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::compile::CompiledArtifacts;
use crate::config::ConfigSource;

/// Schema version for lazit-build.json
pub const BUILD_SUMMARY_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for lazit-build.json
pub const BUILD_SUMMARY_SCHEMA_ID: &str = "lazit/build_summary@1";

/// One fragment as written in this run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FragmentRecord {
    /// Path relative to the sass root, `/`-separated
    pub path: String,
    pub sha256: String,
}

/// Record of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSummary {
    pub schema_version: u32,
    pub schema_id: String,
    pub created_at: DateTime<Utc>,

    /// JCS SHA-256 of the effective configuration
    pub config_digest: String,

    pub sources: Vec<ConfigSource>,

    /// Settings modules in import order
    pub settings: Vec<String>,

    /// Utility modules in import order
    pub utilities: Vec<String>,

    pub fragments: Vec<FragmentRecord>,

    /// Stale fragments removed in this run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pruned: Vec<String>,

    /// Absent when the run only generated sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<CompiledArtifacts>,
}

impl BuildSummary {
    pub fn new(config_digest: String, sources: Vec<ConfigSource>) -> Self {
        Self {
            schema_version: BUILD_SUMMARY_SCHEMA_VERSION,
            schema_id: BUILD_SUMMARY_SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config_digest,
            sources,
            settings: Vec::new(),
            utilities: Vec::new(),
            fragments: Vec::new(),
            pruned: Vec::new(),
            artifacts: None,
        }
    }

    /// One-line description for the terminal
    pub fn human_summary(&self) -> String {
        let mut line = format!(
            "{} settings module(s), {} utility module(s), {} fragment(s)",
            self.settings.len(),
            self.utilities.len(),
            self.fragments.len()
        );
        if let Some(artifacts) = &self.artifacts {
            line.push_str(&format!(
                "; {} ({} bytes)",
                artifacts.css.display(),
                artifacts.css_bytes
            ));
        }
        line
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Write to file, creating the parent directory
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("JSON error: {}", e))
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        crate::emit::atomic_write(path, json.as_bytes())
    }

    pub fn from_file(path: &Path) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("JSON error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigOrigin, SourceStatus};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn summary() -> BuildSummary {
        let mut summary = BuildSummary::new(
            "ab".repeat(32),
            vec![ConfigSource {
                origin: ConfigOrigin::Default,
                path: "build/lazit_default.conf.json".to_string(),
                digest: Some("cd".repeat(32)),
                status: SourceStatus::Loaded,
            }],
        );
        summary.settings = vec!["core".to_string(), "colors".to_string()];
        summary.utilities = vec!["display".to_string()];
        summary.fragments = vec![FragmentRecord {
            path: "1_settings/_core.scss".to_string(),
            sha256: "ef".repeat(32),
        }];
        summary
    }

    #[test]
    fn test_schema_fields() {
        let json = summary().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["schema_version"], 1);
        assert_eq!(value["schema_id"], "lazit/build_summary@1");
        assert_eq!(value["sources"][0]["origin"], "default");
        assert_eq!(value["sources"][0]["status"], "loaded");
        assert!(value.get("artifacts").is_none());
        assert!(value.get("pruned").is_none());
    }

    #[test]
    fn test_human_summary() {
        let mut summary = summary();
        assert_eq!(
            summary.human_summary(),
            "2 settings module(s), 1 utility module(s), 1 fragment(s)"
        );

        summary.artifacts = Some(CompiledArtifacts {
            css: PathBuf::from("public/main.min.css"),
            map: PathBuf::from("public/main.min.css.map"),
            css_sha256: "00".repeat(32),
            css_bytes: 42,
        });
        assert!(summary.human_summary().ends_with("; public/main.min.css (42 bytes)"));
    }

    #[test]
    fn test_write_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("public/lazit-build.json");

        summary().write_to_file(&path).unwrap();
        let loaded = BuildSummary::from_file(&path).unwrap();

        assert_eq!(loaded.settings, vec!["core", "colors"]);
        assert_eq!(loaded.fragments[0].path, "1_settings/_core.scss");
    }
}
