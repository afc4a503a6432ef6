//! Spacing base value parsing

use std::sync::OnceLock;

use lazit_scss::format_number;
use regex_lite::Regex;

use super::GenerateError;

fn length_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+(?:\.\d+)?|\.\d+)([A-Za-z%]+)$").expect("static pattern")
    })
}

/// A length split into magnitude and unit (`16px` → 16, `px`)
#[derive(Debug, Clone, PartialEq)]
pub struct SpacingValue {
    pub magnitude: f64,
    pub unit: String,
}

impl SpacingValue {
    pub fn parse(raw: &str) -> Result<Self, GenerateError> {
        let invalid = |reason: &str| GenerateError::InvalidSpacingValue {
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid("value is empty"));
        }

        let captures = length_pattern()
            .captures(trimmed)
            .ok_or_else(|| invalid("expected a number followed by a unit, e.g. 16px"))?;

        let magnitude: f64 = captures[1]
            .parse()
            .map_err(|_| invalid("magnitude is not a number"))?;

        Ok(Self {
            magnitude,
            unit: captures[2].to_string(),
        })
    }

    /// `factor × magnitude` with the unit re-appended
    pub fn scale(&self, factor: f64) -> String {
        format!("{}{}", format_number(self.magnitude * factor), self.unit)
    }
}
