//! Stylesheet source generation
//!
//! Two generators consume disjoint slices of the typed configuration:
//! - [`SettingsGenerator`]: `setup` + `settings` → `1_settings/*`
//! - [`UtilitiesGenerator`]: `utilities` → `7_utilities/*`
//!
//! Each returns its fragments in emission order, the aggregator last, plus
//! the names of the enabled modules in the order they are imported.

mod html_colors;
mod settings;
mod spacing;
mod utilities;

use std::path::PathBuf;

use lazit_scss::{Item, ScssError, Stylesheet};
use sha2::{Digest, Sha256};

pub use html_colors::{html_colors, HTML_COLORS};
pub use settings::{RootVarsCapabilities, SettingsGenerator, SETTINGS_AGGREGATOR, SETTINGS_DIR};
pub use spacing::SpacingValue;
pub use utilities::{check_rule_sources, UtilitiesGenerator, UTILITIES_AGGREGATOR, UTILITIES_DIR};

/// Banner at the top of every generated file
pub const GENERATED_HEADER: &str = "Generated by lazit. Do not edit: changes are overwritten on every build.";

/// Errors raised while generating fragments
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("settings.spacing.defaultSpacingValue is required when spacing is enabled")]
    MissingSpacingValue,

    #[error("invalid spacing value '{value}': {reason}")]
    InvalidSpacingValue { value: String, reason: String },

    #[error("spacing factor '{name}' is not a finite number")]
    InvalidSpacingFactor { name: String },

    #[error("color alias '{alias}' refers to unknown color '{target}'")]
    UnknownColorAlias { alias: String, target: String },

    #[error("utility '{utility}' takes its rules from the {domain} settings, which are disabled")]
    MissingRuleSource { utility: String, domain: String },

    #[error("{context}: {source}")]
    Scss {
        context: String,
        #[source]
        source: ScssError,
    },
}

impl GenerateError {
    pub(crate) fn scss(context: impl Into<String>) -> impl FnOnce(ScssError) -> Self {
        let context = context.into();
        move |source| GenerateError::Scss { context, source }
    }
}

/// One generated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFragment {
    /// Path relative to the sass root (e.g., `1_settings/_core.scss`)
    pub path: PathBuf,

    pub contents: String,
}

impl GeneratedFragment {
    pub fn new(path: impl Into<PathBuf>, sheet: &Stylesheet) -> Self {
        Self {
            path: path.into(),
            contents: sheet.render(),
        }
    }

    /// SHA-256 of the rendered contents
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.contents.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Module name as imported by an aggregator (`_core.scss` → `core`)
    pub fn module_name(&self) -> Option<&str> {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.trim_start_matches('_'))
    }
}

/// Output of one generator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedModules {
    /// Domain fragments in emission order, aggregator last
    pub fragments: Vec<GeneratedFragment>,

    /// Enabled module names in import order
    pub enabled: Vec<String>,
}

impl GeneratedModules {
    pub fn aggregator(&self) -> Option<&GeneratedFragment> {
        self.fragments.last()
    }

    #[cfg(test)]
    pub fn get(&self, relative: impl AsRef<std::path::Path>) -> Option<&GeneratedFragment> {
        let relative = relative.as_ref();
        self.fragments.iter().find(|f| f.path == relative)
    }
}

/// New stylesheet starting with the generated-file banner
pub(crate) fn stylesheet_with_header() -> Stylesheet {
    let mut sheet = Stylesheet::new();
    sheet.push(Item::Comment(GENERATED_HEADER.to_string()));
    sheet
}

/// Aggregator importing `names` in order
pub(crate) fn aggregator(names: &[String]) -> Stylesheet {
    let mut sheet = stylesheet_with_header();
    for name in names {
        sheet.push(Item::Import(format!("./{}", name)));
    }
    sheet
}
