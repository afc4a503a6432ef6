//! Bundled default configuration
//!
//! The same document that ships as `build/lazit_default.conf.json`, compiled
//! into the binary so `lazit init` can scaffold a user config without
//! touching the package layout.

use serde_json::Value;

/// Raw text of the bundled default configuration
pub const DEFAULT_CONFIG_JSON: &str = include_str!("../../build/lazit_default.conf.json");

/// File name of the default configuration inside `<base>/build`
pub const DEFAULT_CONFIG_FILE: &str = "lazit_default.conf.json";

/// File name of the user configuration at the project root
pub const USER_CONFIG_FILE: &str = "lazit.conf.json";

/// Bundled defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledDefaults;

impl BundledDefaults {
    /// Raw document text
    pub fn as_str(&self) -> &'static str {
        DEFAULT_CONFIG_JSON
    }

    /// Parse into a JSON value for merging
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(DEFAULT_CONFIG_JSON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_defaults_parse() {
        let value = BundledDefaults.to_value().unwrap();

        assert_eq!(value["setup"]["prefix"], "lz");
        assert_eq!(value["settings"]["spacing"]["defaultSpacingValue"], "16px");
        assert_eq!(value["utilities"]["enabled"], true);
    }

    #[test]
    fn test_bundled_defaults_key_order() {
        let value = BundledDefaults.to_value().unwrap();
        let breakpoints: Vec<&String> = value["settings"]["breakpoints"]["breakpoints"]
            .as_object()
            .unwrap()
            .keys()
            .collect();

        assert_eq!(breakpoints, vec!["tabletV", "tabletH", "laptop", "desktop"]);
    }
}
