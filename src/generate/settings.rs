//! Settings fragments: core, breakpoints, colors, spacing
//!
//! The core step always runs first and yields the root-variable
//! capabilities that the colors and spacing steps consult.

use std::collections::HashSet;
use std::path::PathBuf;

use lazit_scss::{Expr, Item, Stylesheet};
use serde_json::{Map, Value};

use super::html_colors::html_colors;
use super::spacing::SpacingValue;
use super::{aggregator, stylesheet_with_header, GenerateError, GeneratedFragment, GeneratedModules};
use crate::config::{merge_maps, RootVars, Settings, Setup, TokenValue};

/// Directory of the settings fragments, relative to the sass root
pub const SETTINGS_DIR: &str = "1_settings";

/// Settings aggregator file name
pub const SETTINGS_AGGREGATOR: &str = "_mainSettings.scss";

/// Domains whose maps are exported into `$rootVars`, in `rootVars` key order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootVarsCapabilities {
    domains: Vec<String>,
}

impl RootVarsCapabilities {
    /// Every `rootVars` key other than `enabled` whose flag is truthy.
    ///
    /// Empty when the root-variable collection itself is disabled, since
    /// there is no `$rootVars` to export into.
    pub fn from_root_vars(root_vars: &RootVars) -> Self {
        if !root_vars.enabled {
            return Self::default();
        }
        Self {
            domains: root_vars.switched_on().map(str::to_string).collect(),
        }
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| d == domain)
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }
}

/// Generator for the `1_settings` fragments
pub struct SettingsGenerator<'a> {
    setup: &'a Setup,
    settings: &'a Settings,
}

impl<'a> SettingsGenerator<'a> {
    pub fn new(setup: &'a Setup, settings: &'a Settings) -> Self {
        Self { setup, settings }
    }

    /// Generate every enabled settings fragment plus the aggregator
    pub fn generate(&self) -> Result<GeneratedModules, GenerateError> {
        let mut modules = GeneratedModules::default();

        let (core, capabilities) = self.core()?;
        Self::push(&mut modules, "core", &core);
        tracing::debug!(root_vars = ?capabilities.domains(), "core settings generated");

        if self.settings.breakpoints.enabled {
            Self::push(&mut modules, "breakpoints", &self.breakpoints()?);
        }
        if self.settings.colors.enabled {
            Self::push(&mut modules, "colors", &self.colors(&capabilities)?);
        }
        if self.settings.spacing.enabled {
            Self::push(&mut modules, "spacing", &self.spacing(&capabilities)?);
        }

        modules.fragments.push(GeneratedFragment::new(
            settings_path(SETTINGS_AGGREGATOR),
            &aggregator(&modules.enabled),
        ));

        tracing::info!(enabled = ?modules.enabled, "settings generated");
        Ok(modules)
    }

    fn push(modules: &mut GeneratedModules, name: &str, sheet: &Stylesheet) {
        modules.fragments.push(GeneratedFragment::new(
            settings_path(&format!("_{}.scss", name)),
            sheet,
        ));
        modules.enabled.push(name.to_string());
    }

    /// Prefix, separator, font size, the utility registry and `$rootVars`
    pub fn core(&self) -> Result<(Stylesheet, RootVarsCapabilities), GenerateError> {
        let setup = self.setup;
        let declare = |name: &str, value: Expr| {
            Item::variable(name, value).map_err(GenerateError::scss("core"))
        };
        let font_size = token_expr(&setup.default_font_size)
            .map_err(GenerateError::scss("setup.defaultFontSize"))?;

        let mut sheet = stylesheet_with_header();
        sheet
            .push(declare("utilityPrefix", Expr::str(&setup.prefix))?)
            .push(declare("utilitySeparator", Expr::str(&setup.separator))?)
            .push(declare("defaultFontSize", font_size)?)
            .push(declare("utilities", empty_map())?);

        if setup.root_vars.enabled {
            sheet.push(declare("rootVars", empty_map())?);
        }

        Ok((sheet, RootVarsCapabilities::from_root_vars(&setup.root_vars)))
    }

    /// `$mq-breakpoints` in document order plus the escaped separator
    pub fn breakpoints(&self) -> Result<Stylesheet, GenerateError> {
        let config = &self.settings.breakpoints;

        let mut entries = Vec::with_capacity(config.breakpoints.len());
        for (name, value) in &config.breakpoints {
            let expr = token_expr(value)
                .map_err(GenerateError::scss(format!("breakpoint '{}'", name)))?;
            entries.push((name.clone(), expr));
        }

        let separator = config.separator.chars().next().ok_or_else(|| GenerateError::Scss {
            context: "settings.breakpoints.separator".to_string(),
            source: lazit_scss::ScssError::InvalidLiteral(config.separator.clone()),
        })?;

        let mut sheet = stylesheet_with_header();
        sheet
            .push(
                Item::variable("mq-breakpoints", Expr::map(entries))
                    .map_err(GenerateError::scss("breakpoints"))?,
            )
            .push(
                Item::variable("breakpointSeparator", Expr::Escaped(separator))
                    .map_err(GenerateError::scss("breakpoints"))?,
            );
        Ok(sheet)
    }

    /// `$colors`, alias bindings and the optional root export
    pub fn colors(&self, capabilities: &RootVarsCapabilities) -> Result<Stylesheet, GenerateError> {
        let config = &self.settings.colors;

        let configured: Map<String, Value> = config
            .colors
            .iter()
            .map(|(name, value)| (name.clone(), token_value(value)))
            .collect();
        let palette = if config.include_html_colors {
            merge_maps(&html_colors(), &configured)
        } else {
            configured
        };

        let mut known: HashSet<&str> = HashSet::with_capacity(palette.len());
        let mut entries = Vec::with_capacity(palette.len());
        for (name, value) in &palette {
            let raw = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let expr =
                Expr::literal(raw).map_err(GenerateError::scss(format!("color '{}'", name)))?;
            entries.push((name.clone(), expr));
            known.insert(name.as_str());
        }

        let mut sheet = stylesheet_with_header();
        sheet
            .push(Item::Use("sass:map".to_string()))
            .push(
                Item::variable("colors", Expr::map(entries))
                    .map_err(GenerateError::scss("colors"))?,
            );

        // Each alias is a lookup against the map as built so far
        for (alias, target) in &config.color_alias {
            if !known.contains(target.as_str()) {
                return Err(GenerateError::UnknownColorAlias {
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
            let lookup = map_call("map.get", vec![colors_var()?, Expr::str(target)])?;
            let binding = map_call("map.set", vec![colors_var()?, Expr::str(alias), lookup])?;
            sheet.push(Item::variable("colors", binding).map_err(GenerateError::scss("colors"))?);
            known.insert(alias.as_str());
        }

        if capabilities.contains("colors") {
            sheet.push(root_export("color", "colors")?);
        }

        Ok(sheet)
    }

    /// `$spacing` with absolute lengths and the optional root export
    pub fn spacing(&self, capabilities: &RootVarsCapabilities) -> Result<Stylesheet, GenerateError> {
        let config = &self.settings.spacing;

        let raw = config
            .default_spacing_value
            .as_deref()
            .ok_or(GenerateError::MissingSpacingValue)?;
        let base = SpacingValue::parse(raw)?;

        let mut entries = Vec::with_capacity(config.spacements.len());
        for (name, factor) in &config.spacements {
            if !factor.is_finite() {
                return Err(GenerateError::InvalidSpacingFactor { name: name.clone() });
            }
            let length = Expr::literal(base.scale(*factor))
                .map_err(GenerateError::scss(format!("spacing '{}'", name)))?;
            entries.push((name.clone(), length));
        }

        let mut sheet = stylesheet_with_header();
        let export = capabilities.contains("spacements");
        if export {
            sheet.push(Item::Use("sass:map".to_string()));
        }
        sheet.push(
            Item::variable("spacing", Expr::map(entries)).map_err(GenerateError::scss("spacing"))?,
        );
        if export {
            sheet.push(root_export("space", "spacing")?);
        }

        Ok(sheet)
    }
}

fn settings_path(file: &str) -> PathBuf {
    PathBuf::from(SETTINGS_DIR).join(file)
}

fn empty_map() -> Expr {
    Expr::map(Vec::<(String, Expr)>::new())
}

fn colors_var() -> Result<Expr, GenerateError> {
    Expr::var("colors").map_err(GenerateError::scss("colors"))
}

fn map_call(function: &str, args: Vec<Expr>) -> Result<Expr, GenerateError> {
    Expr::call(function, args).map_err(GenerateError::scss(function))
}

/// `$rootVars: map.set($rootVars, "<key>", $<variable>);`
fn root_export(key: &str, variable: &str) -> Result<Item, GenerateError> {
    let value = map_call(
        "map.set",
        vec![
            Expr::var("rootVars").map_err(GenerateError::scss("rootVars"))?,
            Expr::str(key),
            Expr::var(variable).map_err(GenerateError::scss(variable))?,
        ],
    )?;
    Item::variable("rootVars", value).map_err(GenerateError::scss("rootVars"))
}

fn token_expr(token: &TokenValue) -> Result<Expr, lazit_scss::ScssError> {
    Expr::literal(token.to_string())
}

fn token_value(token: &TokenValue) -> Value {
    match token {
        TokenValue::Number(n) => Value::Number(n.clone()),
        TokenValue::Text(s) => Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BundledDefaults, LazitConfig};
    use crate::generate::GENERATED_HEADER;
    use serde_json::json;

    fn config(value: Value) -> LazitConfig {
        LazitConfig::from_value(&value).unwrap()
    }

    fn base() -> Value {
        json!({
            "setup": {
                "prefix": "lz",
                "separator": "-",
                "defaultFontSize": "16px",
                "rootVars": {"enabled": true, "colors": true, "spacements": true}
            }
        })
    }

    fn header() -> String {
        format!("// {}\n", GENERATED_HEADER)
    }

    #[test]
    fn test_core_fragment() {
        let config = config(base());
        let generator = SettingsGenerator::new(&config.setup, &config.settings);
        let (sheet, capabilities) = generator.core().unwrap();

        assert_eq!(
            sheet.render(),
            format!(
                "{}$utilityPrefix: \"lz\";\n$utilitySeparator: \"-\";\n$defaultFontSize: 16px;\n$utilities: ();\n$rootVars: ();\n",
                header()
            )
        );
        assert_eq!(capabilities.domains(), ["colors", "spacements"]);
    }

    #[test]
    fn test_core_without_root_vars() {
        let mut value = base();
        value["setup"]["rootVars"] = json!({"enabled": false, "colors": true});
        let config = config(value);
        let (sheet, capabilities) = SettingsGenerator::new(&config.setup, &config.settings)
            .core()
            .unwrap();

        assert!(!sheet.render().contains("$rootVars"));
        assert!(capabilities.domains().is_empty());
    }

    #[test]
    fn test_capabilities_skip_falsy_domains() {
        let root_vars = RootVars {
            enabled: true,
            domains: [
                ("colors".to_string(), json!(false)),
                ("spacements".to_string(), json!(1)),
            ]
            .into_iter()
            .collect(),
        };
        let capabilities = RootVarsCapabilities::from_root_vars(&root_vars);

        assert!(!capabilities.contains("colors"));
        assert!(capabilities.contains("spacements"));
    }

    #[test]
    fn test_breakpoints_fragment() {
        let mut value = base();
        value["settings"] = json!({
            "breakpoints": {
                "separator": "_",
                "breakpoints": {"tabletV": "600px", "laptop": 1200}
            }
        });
        let config = config(value);
        let sheet = SettingsGenerator::new(&config.setup, &config.settings)
            .breakpoints()
            .unwrap();

        assert_eq!(
            sheet.render(),
            format!(
                "{}$mq-breakpoints: (\n  \"tabletV\": 600px,\n  \"laptop\": 1200,\n);\n$breakpointSeparator: \\_;\n",
                header()
            )
        );
    }

    #[test]
    fn test_colors_alias_is_lookup() {
        let mut value = base();
        value["settings"] = json!({
            "colors": {"colors": {"red": "#f00"}, "colorAlias": {"primary": "red"}}
        });
        let config = config(value);
        let generator = SettingsGenerator::new(&config.setup, &config.settings);
        let capabilities = RootVarsCapabilities::default();
        let rendered = generator.colors(&capabilities).unwrap().render();

        assert_eq!(
            rendered,
            format!(
                "{}@use \"sass:map\";\n$colors: (\n  \"red\": #f00,\n);\n$colors: map.set($colors, \"primary\", map.get($colors, \"red\"));\n",
                header()
            )
        );
    }

    #[test]
    fn test_colors_alias_chain_and_unknown_target() {
        let mut value = base();
        value["settings"] = json!({
            "colors": {
                "colors": {"blue": "#00f"},
                "colorAlias": {"primary": "blue", "brand": "primary"}
            }
        });
        let config = config(value);
        let rendered = SettingsGenerator::new(&config.setup, &config.settings)
            .colors(&RootVarsCapabilities::default())
            .unwrap()
            .render();
        assert!(rendered.contains("map.set($colors, \"brand\", map.get($colors, \"primary\"))"));

        let mut value = base();
        value["settings"] = json!({
            "colors": {"colors": {"blue": "#00f"}, "colorAlias": {"primary": "teal"}}
        });
        let config = self::config(value);
        let err = SettingsGenerator::new(&config.setup, &config.settings)
            .colors(&RootVarsCapabilities::default())
            .unwrap_err();
        assert!(matches!(err, GenerateError::UnknownColorAlias { ref target, .. } if target == "teal"));
    }

    #[test]
    fn test_colors_root_export() {
        let mut value = base();
        value["settings"] = json!({"colors": {"colors": {"red": "#f00"}}});
        let config = config(value);
        let generator = SettingsGenerator::new(&config.setup, &config.settings);
        let (_, capabilities) = generator.core().unwrap();
        let rendered = generator.colors(&capabilities).unwrap().render();

        assert!(rendered.ends_with("$rootVars: map.set($rootVars, \"color\", $colors);\n"));
    }

    #[test]
    fn test_colors_with_html_table() {
        let mut value = base();
        value["settings"] = json!({
            "colors": {"includeHTMLColors": true, "colors": {"red": "#e53935", "brand": "#123456"}}
        });
        let config = config(value);
        let rendered = SettingsGenerator::new(&config.setup, &config.settings)
            .colors(&RootVarsCapabilities::default())
            .unwrap()
            .render();

        // Configured colors come first and override the table
        let red = rendered.find("\"red\": #e53935,").unwrap();
        let brand = rendered.find("\"brand\": #123456,").unwrap();
        let aliceblue = rendered.find("\"aliceblue\": #f0f8ff,").unwrap();
        assert!(red < brand && brand < aliceblue);
        assert!(!rendered.contains("\"red\": #ff0000"));
        assert!(rendered.contains("\"rebeccapurple\": #663399,"));
    }

    #[test]
    fn test_spacing_fragment() {
        let mut value = base();
        value["settings"] = json!({
            "spacing": {"defaultSpacingValue": "16px", "spacements": {"sm": 0.5, "lg": 2}}
        });
        let config = config(value);
        let generator = SettingsGenerator::new(&config.setup, &config.settings);
        let (_, capabilities) = generator.core().unwrap();

        assert_eq!(
            generator.spacing(&capabilities).unwrap().render(),
            format!(
                "{}@use \"sass:map\";\n$spacing: (\n  \"sm\": 8px,\n  \"lg\": 32px,\n);\n$rootVars: map.set($rootVars, \"space\", $spacing);\n",
                header()
            )
        );
        assert_eq!(
            generator.spacing(&RootVarsCapabilities::default()).unwrap().render(),
            format!("{}$spacing: (\n  \"sm\": 8px,\n  \"lg\": 32px,\n);\n", header())
        );
    }

    #[test]
    fn test_spacing_rejects_malformed_value() {
        let mut value = base();
        value["settings"] = json!({
            "spacing": {"enabled": true, "defaultSpacingValue": "px16", "spacements": {"sm": 0.5}}
        });
        let config = config(value);
        let err = SettingsGenerator::new(&config.setup, &config.settings)
            .generate()
            .unwrap_err();
        assert!(matches!(err, GenerateError::InvalidSpacingValue { ref value, .. } if value == "px16"));

        let mut value = base();
        value["settings"] = json!({"spacing": {"enabled": true, "spacements": {"sm": 0.5}}});
        let config = self::config(value);
        assert!(matches!(
            SettingsGenerator::new(&config.setup, &config.settings).generate(),
            Err(GenerateError::MissingSpacingValue)
        ));
    }

    #[test]
    fn test_generate_enabled_order_and_aggregator() {
        let value = BundledDefaults.to_value().unwrap();
        let config = config(value);
        let modules = SettingsGenerator::new(&config.setup, &config.settings)
            .generate()
            .unwrap();

        assert_eq!(modules.enabled, vec!["core", "breakpoints", "colors", "spacing"]);
        let paths: Vec<String> = modules
            .fragments
            .iter()
            .map(|f| f.path.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            paths,
            vec![
                "1_settings/_core.scss",
                "1_settings/_breakpoints.scss",
                "1_settings/_colors.scss",
                "1_settings/_spacing.scss",
                "1_settings/_mainSettings.scss",
            ]
        );
        assert_eq!(
            modules.aggregator().unwrap().contents,
            format!(
                "{}@import \"./core\";\n@import \"./breakpoints\";\n@import \"./colors\";\n@import \"./spacing\";\n",
                header()
            )
        );
    }

    #[test]
    fn test_disabled_domains_are_excluded() {
        let mut value = BundledDefaults.to_value().unwrap();
        value["settings"]["breakpoints"]["enabled"] = json!(false);
        value["settings"]["spacing"]["enabled"] = json!(false);
        let config = config(value);
        let modules = SettingsGenerator::new(&config.setup, &config.settings)
            .generate()
            .unwrap();

        assert_eq!(modules.enabled, vec!["core", "colors"]);
        assert!(modules.get("1_settings/_spacing.scss").is_none());
        assert!(modules.get("1_settings/_breakpoints.scss").is_none());
        let aggregator = &modules.aggregator().unwrap().contents;
        assert!(!aggregator.contains("spacing"));
        assert!(!aggregator.contains("breakpoints"));
    }

    #[test]
    fn test_replaced_domain_without_flag_is_skipped() {
        let defaults = BundledDefaults.to_value().unwrap();
        let user = json!({"settings": {"colors": {"colors": {"brand": "#123456"}}}});
        let merged = crate::config::EffectiveConfig::from_values(defaults, Some(user));
        assert_eq!(
            merged.config["settings"]["colors"],
            json!({"colors": {"brand": "#123456"}})
        );

        let config = config(merged.config);
        let modules = SettingsGenerator::new(&config.setup, &config.settings)
            .generate()
            .unwrap();

        assert_eq!(modules.enabled, vec!["core", "breakpoints", "spacing"]);
        assert!(!modules.aggregator().unwrap().contents.contains("colors"));
    }
}
