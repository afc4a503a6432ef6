//! Utility naming rules
//!
//! Maps configuration utility names (camel case) to stylesheet property
//! tokens and decides which family a utility belongs to.

use std::sync::OnceLock;

use regex_lite::Regex;

/// Utilities whose property name differs from their kebab-cased name
const PROPERTY_EXCEPTIONS: &[(&str, &str)] = &[
    ("textColor", "color"),
    ("backgroundColor", "background-color"),
];

/// Utilities that take their rules from the generated color map
const COLOR_UTILITIES: &[&str] = &["textColor", "backgroundColor", "borderColor", "outlineColor"];

fn spacing_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^(?:(?:margin|padding)(?:Top|Right|Bottom|Left|(?:Block|Inline)(?:Start|End)?)?",
            r"|gap|rowGap|columnGap)$"
        ))
        .expect("static pattern")
    })
}

fn utility_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").expect("static pattern")
    })
}

/// Convert camel case to hyphenated lower case (`marginTop` → `margin-top`)
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Stylesheet property token for a utility name
pub fn property_name(utility: &str) -> String {
    PROPERTY_EXCEPTIONS
        .iter()
        .find(|(name, _)| *name == utility)
        .map(|(_, property)| property.to_string())
        .unwrap_or_else(|| kebab_case(utility))
}

pub fn is_color_utility(utility: &str) -> bool {
    COLOR_UTILITIES.contains(&utility)
}

/// `margin`, `padding`, their physical and logical side variants, and the gap properties
pub fn is_spacing_utility(utility: &str) -> bool {
    spacing_pattern().is_match(utility)
}

pub fn is_valid_utility_name(utility: &str) -> bool {
    utility_name_pattern().is_match(utility)
}
