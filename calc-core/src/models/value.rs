use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::field::FieldKind;

/// Current value of a single input field.
///
/// Numeric and date fields carry an `Option` so an empty form field can be
/// told apart from an explicit zero. Empty values are normalized only when a
/// calculator reads them through [`InputState`](super::InputState).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum InputValue {
    Number(Option<Decimal>),
    Boolean(bool),
    Choice(String),
    Date(Option<NaiveDate>),
    Series(Vec<Decimal>),
}

impl InputValue {
    /// Shorthand for a filled-in numeric value.
    pub fn number(value: Decimal) -> Self {
        Self::Number(Some(value))
    }

    /// Shorthand for a select value.
    pub fn choice(value: impl Into<String>) -> Self {
        Self::Choice(value.into())
    }

    /// The field kind this value belongs to.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Number(_) => FieldKind::Number,
            Self::Boolean(_) => FieldKind::Boolean,
            Self::Choice(_) => FieldKind::Select,
            Self::Date(_) => FieldKind::Date,
            Self::Series(_) => FieldKind::Series,
        }
    }

    /// Parses raw text typed or pasted by a user into a value of `kind`.
    ///
    /// Parsing never fails. Malformed numbers and dates become empty values
    /// and are logged, matching how an empty form field is treated.
    pub fn parse(
        kind: FieldKind,
        raw: &str,
    ) -> Self {
        match kind {
            FieldKind::Number => Self::Number(parse_optional_decimal(raw)),
            FieldKind::Boolean => Self::Boolean(parse_flag(raw)),
            FieldKind::Select => Self::Choice(raw.trim().to_string()),
            FieldKind::Date => Self::Date(parse_optional_date(raw)),
            FieldKind::Series => Self::Series(parse_series(raw)),
        }
    }

    /// Human readable rendering used in reports and the command line.
    pub fn display(&self) -> String {
        match self {
            Self::Number(Some(v)) => v.normalize().to_string(),
            Self::Number(None) | Self::Date(None) => "—".to_string(),
            Self::Boolean(b) => if *b { "yes" } else { "no" }.to_string(),
            Self::Choice(c) => c.clone(),
            Self::Date(Some(d)) => d.format("%Y-%m-%d").to_string(),
            Self::Series(items) => items
                .iter()
                .map(|v| v.normalize().to_string())
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into an optional [`Decimal`].
///
/// Handles comma as thousands separator. Returns `None` for empty or whitespace-only input,
/// or when parsing fails (logs a warning on parse failure).
pub fn parse_optional_decimal(s: &str) -> Option<Decimal> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        None
    } else {
        normalized.parse().map_or_else(
            |e| {
                warn!(input = %s, "invalid number treated as empty: {}", e);
                None
            },
            Some,
        )
    }
}

fn parse_flag(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "on" | "si" | "sì" | "sí"
    )
}

fn parse_optional_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_or_else(
        |e| {
            warn!(input = %s, "invalid date treated as empty: {}", e);
            None
        },
        Some,
    )
}

/// Splits a cash-flow list on `;` or whitespace. Items that do not parse are dropped.
fn parse_series(s: &str) -> Vec<Decimal> {
    s.split(|c: char| c == ';' || c.is_whitespace())
        .filter(|item| !item.trim().is_empty())
        .filter_map(parse_optional_decimal)
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_number_accepts_comma_thousands_separator() {
        assert_eq!(
            InputValue::parse(FieldKind::Number, "1,234.56"),
            InputValue::number(dec!(1234.56))
        );
    }

    #[test]
    fn parse_number_empty_is_none() {
        assert_eq!(InputValue::parse(FieldKind::Number, "   "), InputValue::Number(None));
    }

    #[test]
    fn parse_number_garbage_is_none_not_error() {
        assert_eq!(InputValue::parse(FieldKind::Number, "12abc"), InputValue::Number(None));
    }

    #[test]
    fn parse_flag_variants() {
        assert_eq!(InputValue::parse(FieldKind::Boolean, "Yes"), InputValue::Boolean(true));
        assert_eq!(InputValue::parse(FieldKind::Boolean, "on"), InputValue::Boolean(true));
        assert_eq!(InputValue::parse(FieldKind::Boolean, "0"), InputValue::Boolean(false));
        assert_eq!(InputValue::parse(FieldKind::Boolean, "maybe"), InputValue::Boolean(false));
    }

    #[test]
    fn parse_date_iso() {
        assert_eq!(
            InputValue::parse(FieldKind::Date, "2012-02-12"),
            InputValue::Date(NaiveDate::from_ymd_opt(2012, 2, 12))
        );
        assert_eq!(InputValue::parse(FieldKind::Date, "12/02/2012"), InputValue::Date(None));
    }

    #[test]
    fn parse_series_semicolons_and_spaces() {
        assert_eq!(
            InputValue::parse(FieldKind::Series, "-50000; 15000 20000;x;25000"),
            InputValue::Series(vec![dec!(-50000), dec!(15000), dec!(20000), dec!(25000)])
        );
    }

    #[test]
    fn value_serializes_tagged() {
        let json = serde_json::to_string(&InputValue::Boolean(true)).unwrap();
        assert_eq!(json, r#"{"kind":"boolean","value":true}"#);
    }
}
