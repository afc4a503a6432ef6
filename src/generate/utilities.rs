//! Utility fragments under `7_utilities`

use std::path::PathBuf;

use lazit_scss::{Expr, Item, Param, ScssError, Stylesheet};

use super::{aggregator, stylesheet_with_header, GenerateError, GeneratedFragment, GeneratedModules};
use crate::config::{Utilities, Utility, UtilityKind};
use crate::naming;

/// Directory of the utility fragments, relative to the sass root
pub const UTILITIES_DIR: &str = "7_utilities";

/// Utilities aggregator file name
pub const UTILITIES_AGGREGATOR: &str = "_mainUtilities.scss";

/// Generator for the `7_utilities` fragments
pub struct UtilitiesGenerator<'a> {
    utilities: &'a Utilities,
}

impl<'a> UtilitiesGenerator<'a> {
    pub fn new(utilities: &'a Utilities) -> Self {
        Self { utilities }
    }

    /// One fragment per enabled utility, in document order, then the aggregator.
    ///
    /// The aggregator is always produced so that the entry stylesheet can
    /// import it unconditionally; it is empty when the section is disabled.
    pub fn generate(&self) -> Result<GeneratedModules, GenerateError> {
        let mut modules = GeneratedModules::default();

        if self.utilities.enabled {
            for utility in self.utilities.entries.iter().filter(|u| u.enabled) {
                let sheet = utility_sheet(utility)?;
                let path = utility_path(&format!("_{}.scss", utility.name));
                modules.fragments.push(GeneratedFragment::new(path, &sheet));
                modules.enabled.push(utility.name.clone());
            }
        } else {
            tracing::info!("utilities disabled, emitting empty aggregator");
        }

        modules.fragments.push(GeneratedFragment::new(
            utility_path(UTILITIES_AGGREGATOR),
            &aggregator(&modules.enabled),
        ));

        tracing::info!(count = modules.enabled.len(), "utilities generated");
        Ok(modules)
    }
}

/// Fail when an enabled utility draws its rules from a settings domain that
/// was not generated (`enabled_settings` as returned by the settings step).
pub fn check_rule_sources(
    utilities: &Utilities,
    enabled_settings: &[String],
) -> Result<(), GenerateError> {
    if !utilities.enabled {
        return Ok(());
    }
    for utility in utilities.entries.iter().filter(|u| u.enabled) {
        let domain = match utility.kind {
            UtilityKind::ColorSourced => "colors",
            UtilityKind::SpacingSourced { .. } => "spacing",
            UtilityKind::ExplicitRules(_) | UtilityKind::Custom => continue,
        };
        if !enabled_settings.iter().any(|d| d == domain) {
            return Err(GenerateError::MissingRuleSource {
                utility: utility.name.clone(),
                domain: domain.to_string(),
            });
        }
    }
    Ok(())
}

fn utility_path(file: &str) -> PathBuf {
    PathBuf::from(UTILITIES_DIR).join(file)
}

fn utility_sheet(utility: &Utility) -> Result<Stylesheet, GenerateError> {
    build_sheet(utility).map_err(GenerateError::scss(format!("utility '{}'", utility.name)))
}

fn build_sheet(utility: &Utility) -> Result<Stylesheet, ScssError> {
    let mixin_name = format!("{}Utility", utility.name);

    let mut body = Vec::with_capacity(2);
    let rules_arg = match rule_source(utility)? {
        Some(source) => {
            body.push(Item::variable("utilityRules", source)?);
            Expr::var("utilityRules")?
        }
        None => Expr::Null,
    };
    body.push(Item::include(
        "createUtility",
        vec![
            Expr::str(naming::property_name(&utility.name)),
            Expr::str(&utility.initial),
            rules_arg,
            Expr::var("breakpoint")?,
        ],
    )?);

    let params = vec![Param::new("breakpoint", Some(Expr::Null))?];
    let mixin = Item::mixin(mixin_name.as_str(), params, body)?;

    let registration = Expr::call(
        "map.set",
        vec![
            Expr::var("utilities")?,
            Expr::str(&utility.name),
            Expr::call("meta.get-mixin", vec![Expr::str(mixin_name)])?,
        ],
    )?;

    let mut sheet = stylesheet_with_header();
    sheet
        .push(Item::Use("sass:map".to_string()))
        .push(Item::Use("sass:meta".to_string()))
        .push(mixin)
        .push(Item::variable("utilities", registration)?);
    Ok(sheet)
}

/// `None` for custom utilities, which only carry their initial value
fn rule_source(utility: &Utility) -> Result<Option<Expr>, ScssError> {
    let expr = match &utility.kind {
        UtilityKind::ExplicitRules(rules) => {
            let entries = rules
                .iter()
                .map(|(name, value)| Ok((name.clone(), Expr::literal(value.to_string())?)))
                .collect::<Result<Vec<_>, ScssError>>()?;
            Expr::map(entries)
        }
        UtilityKind::ColorSourced => Expr::var("colors")?,
        UtilityKind::SpacingSourced { measure_unit } => {
            let converted = Expr::call(
                "convertSpaceList",
                vec![Expr::var("spacing")?, Expr::str(measure_unit)],
            )?;
            // A zero key always resolves to a unitless zero
            Expr::call("map.set", vec![converted, Expr::str("0"), Expr::number(0.0)?])?
        }
        UtilityKind::Custom => return Ok(None),
    };
    Ok(Some(expr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LazitConfig, TokenValue};
    use crate::generate::GENERATED_HEADER;
    use indexmap::IndexMap;
    use serde_json::json;

    fn utilities(section: serde_json::Value) -> Utilities {
        let value = json!({
            "setup": {"prefix": "lz", "separator": "-", "defaultFontSize": "16px"},
            "utilities": section
        });
        LazitConfig::from_value(&value).unwrap().utilities
    }

    fn utility(name: &str, kind: UtilityKind) -> Utility {
        Utility {
            name: name.to_string(),
            enabled: true,
            initial: "initial".to_string(),
            kind,
        }
    }

    const USES: &str = "@use \"sass:map\";\n@use \"sass:meta\";\n";

    #[test]
    fn test_explicit_rules_fragment() {
        let mut rules = IndexMap::new();
        rules.insert("none".to_string(), TokenValue::Text("none".to_string()));
        rules.insert("block".to_string(), TokenValue::Text("block".to_string()));
        let mut display = utility("display", UtilityKind::ExplicitRules(rules));
        display.initial = "block".to_string();

        let expected = format!(
            "// {}\n{}@mixin displayUtility($breakpoint: null) {{\n  $utilityRules: (\n    \"none\": none,\n    \"block\": block,\n  );\n  @include createUtility(\"display\", \"block\", $utilityRules, $breakpoint);\n}}\n$utilities: map.set($utilities, \"display\", meta.get-mixin(\"displayUtility\"));\n",
            GENERATED_HEADER, USES
        );
        assert_eq!(utility_sheet(&display).unwrap().render(), expected);
    }

    #[test]
    fn test_color_sourced_uses_property_exception() {
        let rendered = utility_sheet(&utility("textColor", UtilityKind::ColorSourced))
            .unwrap()
            .render();

        assert!(rendered.contains("  $utilityRules: $colors;\n"));
        assert!(rendered.contains("@include createUtility(\"color\", \"initial\", $utilityRules, $breakpoint);"));
        assert!(rendered.contains("map.set($utilities, \"textColor\", meta.get-mixin(\"textColorUtility\"))"));
    }

    #[test]
    fn test_spacing_sourced_forces_zero_entry() {
        let margin = utility(
            "marginTop",
            UtilityKind::SpacingSourced {
                measure_unit: "em".to_string(),
            },
        );
        let rendered = utility_sheet(&margin).unwrap().render();

        assert!(rendered.contains(
            "  $utilityRules: map.set(convertSpaceList($spacing, \"em\"), \"0\", 0);\n"
        ));
        assert!(rendered.contains("createUtility(\"margin-top\", "));
    }

    #[test]
    fn test_custom_utility_passes_null_rules() {
        let rendered = utility_sheet(&utility("cursor", UtilityKind::Custom))
            .unwrap()
            .render();

        assert!(!rendered.contains("$utilityRules"));
        assert!(rendered.contains("@include createUtility(\"cursor\", \"initial\", null, $breakpoint);"));
    }

    #[test]
    fn test_generate_skips_disabled_and_unflagged() {
        let utilities = utilities(json!({
            "enabled": true,
            "utilities": {
                "textAlign": {
                    "enabled": true,
                    "initial": "left",
                    "rules": {"left": "left", "center": "center"}
                },
                "fontWeight": {"enabled": false, "initial": "400", "rules": {"bold": 700}},
                "opacity": {"initial": 1, "rules": {"half": 0.5}},
                "padding": {"enabled": true, "initial": "0"}
            }
        }));
        let modules = UtilitiesGenerator::new(&utilities).generate().unwrap();

        assert_eq!(modules.enabled, vec!["textAlign", "padding"]);
        assert!(modules.get("7_utilities/_textAlign.scss").is_some());
        assert!(modules.get("7_utilities/_fontWeight.scss").is_none());
        assert!(modules.get("7_utilities/_opacity.scss").is_none());
        assert_eq!(
            modules.aggregator().unwrap().contents,
            format!(
                "// {}\n@import \"./textAlign\";\n@import \"./padding\";\n",
                GENERATED_HEADER
            )
        );
    }

    #[test]
    fn test_disabled_section_yields_empty_aggregator() {
        let utilities = utilities(json!({
            "enabled": false,
            "utilities": {"display": {"initial": "block", "rules": {"none": "none"}}}
        }));
        let modules = UtilitiesGenerator::new(&utilities).generate().unwrap();

        assert!(modules.enabled.is_empty());
        assert_eq!(modules.fragments.len(), 1);
        assert_eq!(
            modules.aggregator().unwrap().path,
            PathBuf::from("7_utilities").join("_mainUtilities.scss")
        );
        assert_eq!(modules.aggregator().unwrap().contents, format!("// {}\n", GENERATED_HEADER));
    }

    #[test]
    fn test_check_rule_sources() {
        let utilities = Utilities {
            enabled: true,
            entries: vec![
                utility("backgroundColor", UtilityKind::ColorSourced),
                utility(
                    "margin",
                    UtilityKind::SpacingSourced {
                        measure_unit: "rem".to_string(),
                    },
                ),
            ],
        };
        let all = vec!["core".to_string(), "colors".to_string(), "spacing".to_string()];
        assert!(check_rule_sources(&utilities, &all).is_ok());

        let no_spacing = vec!["core".to_string(), "colors".to_string()];
        let err = check_rule_sources(&utilities, &no_spacing).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::MissingRuleSource { ref utility, ref domain } if utility == "margin" && domain == "spacing"
        ));

        let disabled = Utilities {
            enabled: false,
            ..utilities
        };
        assert!(check_rule_sources(&disabled, &[]).is_ok());
    }
}
