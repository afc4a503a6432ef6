//! Typed configuration schema
//!
//! The merged JSON tree is deserialized into these structs once, right after
//! resolution. Unknown keys and mistyped values are rejected here instead of
//! surfacing later as broken generated output.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ConfigError;
use crate::naming;

fn default_breakpoint_separator() -> String {
    "@".to_string()
}

fn default_measure_unit() -> String {
    "rem".to_string()
}

/// A scalar design token: either a JSON number or a string such as `16px`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Number(n) => write!(f, "{}", n),
            TokenValue::Text(s) => f.write_str(s),
        }
    }
}

/// `setup` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Setup {
    /// Class prefix (e.g., "lz")
    pub prefix: String,

    /// Separator between prefix, property and rule name
    pub separator: String,

    /// Base font size used for unit conversion (e.g., "16px")
    pub default_font_size: TokenValue,

    /// Root custom-property export switches
    #[serde(default)]
    pub root_vars: RootVars,
}

/// `setup.rootVars`: an `enabled` switch plus one flag per exportable domain.
///
/// Domain flags accept any JSON value and follow JSON truthiness: `false`,
/// `null`, `0` and `""` are off, anything else is on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RootVars {
    #[serde(default)]
    pub enabled: bool,

    #[serde(flatten)]
    pub domains: IndexMap<String, Value>,
}

impl RootVars {
    /// Domain names whose flag is truthy, in document order
    pub fn switched_on(&self) -> impl Iterator<Item = &str> {
        self.domains
            .iter()
            .filter(|(_, flag)| is_truthy(flag))
            .map(|(name, _)| name.as_str())
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `settings` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub breakpoints: BreakpointSettings,

    #[serde(default)]
    pub colors: ColorSettings,

    #[serde(default)]
    pub spacing: SpacingSettings,
}

/// `settings.breakpoints`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BreakpointSettings {
    #[serde(default)]
    pub enabled: bool,

    /// Single character between a class and its breakpoint suffix
    #[serde(default = "default_breakpoint_separator")]
    pub separator: String,

    #[serde(default)]
    pub breakpoints: IndexMap<String, TokenValue>,
}

impl Default for BreakpointSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            separator: default_breakpoint_separator(),
            breakpoints: IndexMap::new(),
        }
    }
}

/// `settings.colors`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ColorSettings {
    #[serde(default)]
    pub enabled: bool,

    /// Merge the named HTML colors under the configured palette
    #[serde(rename = "includeHTMLColors", default)]
    pub include_html_colors: bool,

    #[serde(default)]
    pub colors: IndexMap<String, TokenValue>,

    /// alias name → name of an already declared color
    #[serde(default)]
    pub color_alias: IndexMap<String, String>,
}

/// `settings.spacing`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpacingSettings {
    #[serde(default)]
    pub enabled: bool,

    /// Length every factor is multiplied with (e.g., "16px")
    #[serde(default)]
    pub default_spacing_value: Option<String>,

    /// name → factor
    #[serde(default)]
    pub spacements: IndexMap<String, f64>,
}

/// `utilities` section as written in the document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct UtilitiesDocument {
    #[serde(default)]
    enabled: bool,

    #[serde(default)]
    utilities: IndexMap<String, UtilityDefinition>,
}

/// One entry under `utilities.utilities`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UtilityDefinition {
    #[serde(default)]
    pub enabled: bool,

    /// Property value used when the utility has no rule map
    pub initial: TokenValue,

    /// Explicit rule name → value map
    #[serde(default)]
    pub rules: Option<IndexMap<String, TokenValue>>,

    /// Target unit for spacing-sourced utilities
    #[serde(default)]
    pub measure_unit: Option<String>,
}

/// Where a utility's rules come from
#[derive(Debug, Clone, PartialEq)]
pub enum UtilityKind {
    /// Rules listed in the definition
    ExplicitRules(IndexMap<String, TokenValue>),
    /// The generated `$colors` map
    ColorSourced,
    /// The generated `$spacing` map converted to `measure_unit`
    SpacingSourced { measure_unit: String },
    /// No rule map; the utility only emits its initial value
    Custom,
}

/// A validated utility
#[derive(Debug, Clone, PartialEq)]
pub struct Utility {
    /// Name as written in the configuration (e.g., "textColor")
    pub name: String,
    pub enabled: bool,
    pub initial: String,
    pub kind: UtilityKind,
}

impl Utility {
    fn from_definition(name: &str, definition: UtilityDefinition) -> Result<Self, ConfigError> {
        if !naming::is_valid_utility_name(name) {
            return Err(ConfigError::Validation(format!(
                "utility name '{}' must be a camel-case identifier",
                name
            )));
        }

        let spacing = naming::is_spacing_utility(name);
        if let Some(unit) = &definition.measure_unit {
            if unit.is_empty() || !unit.chars().all(|c| c.is_ascii_lowercase() || c == '%') {
                return Err(ConfigError::Validation(format!(
                    "utility '{}': invalid measureUnit '{}'",
                    name, unit
                )));
            }
            if !spacing || definition.rules.is_some() {
                tracing::warn!(utility = name, "measureUnit is ignored for this utility");
            }
        }

        let kind = match definition.rules {
            Some(rules) => UtilityKind::ExplicitRules(rules),
            None if naming::is_color_utility(name) => UtilityKind::ColorSourced,
            None if spacing => UtilityKind::SpacingSourced {
                measure_unit: definition.measure_unit.unwrap_or_else(default_measure_unit),
            },
            None => UtilityKind::Custom,
        };

        Ok(Self {
            name: name.to_string(),
            enabled: definition.enabled,
            initial: definition.initial.to_string(),
            kind,
        })
    }
}

/// Validated `utilities` section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Utilities {
    pub enabled: bool,
    /// In document order
    pub entries: Vec<Utility>,
}

/// Whole document as written, before utility kinds are decided
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigDocument {
    setup: Setup,
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    utilities: UtilitiesDocument,
}

/// Fully typed and validated configuration
#[derive(Debug, Clone)]
pub struct LazitConfig {
    pub setup: Setup,
    pub settings: Settings,
    pub utilities: Utilities,
}

impl LazitConfig {
    /// Deserialize and validate a merged configuration tree
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let document: ConfigDocument =
            serde_json::from_value(value.clone()).map_err(ConfigError::Schema)?;

        let entries = document
            .utilities
            .utilities
            .into_iter()
            .map(|(name, definition)| Utility::from_definition(&name, definition))
            .collect::<Result<Vec<_>, _>>()?;

        let config = Self {
            setup: document.setup,
            settings: document.settings,
            utilities: Utilities {
                enabled: document.utilities.enabled,
                entries,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field rules not expressible in the schema
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Rule: prefix is a class-name fragment
        let prefix = &self.setup.prefix;
        let valid_prefix = prefix
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_' || c == '-')
            .unwrap_or(false)
            && prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid_prefix {
            return Err(ConfigError::Validation(format!(
                "setup.prefix '{}' is not a valid class name fragment",
                prefix
            )));
        }

        // Rule: separators are single characters
        Self::validate_separator("setup.separator", &self.setup.separator)?;
        if self.settings.breakpoints.enabled {
            Self::validate_separator(
                "settings.breakpoints.separator",
                &self.settings.breakpoints.separator,
            )?;
        }

        // Rule: breakpoint, color and spacing names are non-empty
        let names = self
            .settings
            .breakpoints
            .breakpoints
            .keys()
            .chain(self.settings.colors.colors.keys())
            .chain(self.settings.colors.color_alias.keys())
            .chain(self.settings.spacing.spacements.keys());
        for name in names {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "settings contain an empty entry name".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn validate_separator(field: &str, separator: &str) -> Result<(), ConfigError> {
        let mut chars = separator.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_whitespace() => Ok(()),
            _ => Err(ConfigError::Validation(format!(
                "{} must be exactly one non-whitespace character, got '{}'",
                field, separator
            ))),
        }
    }
}
