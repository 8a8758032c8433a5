//! Locale-aware rendering of calculator results.
//!
//! Amounts are always rounded half-up to two decimals for display only;
//! calculators keep full precision internally.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;
use crate::models::{InputField, InputValue, OutputUnit, OutputValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Es,
    It,
    #[default]
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::It => "it",
            Self::En => "en",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es" => Some(Self::Es),
            "it" => Some(Self::It),
            "en" => Some(Self::En),
            _ => None,
        }
    }

    fn separators(&self) -> (char, char) {
        match self {
            Self::Es | Self::It => ('.', ','),
            Self::En => (',', '.'),
        }
    }

    fn unavailable(&self) -> &'static str {
        match self {
            Self::Es => "no se puede calcular",
            Self::It => "non calcolabile",
            Self::En => "cannot be calculated",
        }
    }

    fn yes_no(
        &self,
        flag: bool,
    ) -> &'static str {
        match (self, flag) {
            (Self::Es, true) => "sí",
            (Self::It, true) => "sì",
            (Self::En, true) => "yes",
            (_, false) => "no",
        }
    }

    fn unit_word(
        &self,
        unit: OutputUnit,
    ) -> &'static str {
        match (self, unit) {
            (Self::Es, OutputUnit::Years) => "años",
            (Self::It, OutputUnit::Years) => "anni",
            (Self::En, OutputUnit::Years) => "years",
            (Self::Es, OutputUnit::Months) => "meses",
            (Self::It, OutputUnit::Months) => "mesi",
            (Self::En, OutputUnit::Months) => "months",
            (Self::Es, OutputUnit::Days) => "días",
            (Self::It, OutputUnit::Days) => "giorni",
            (Self::En, OutputUnit::Days) => "days",
            _ => "",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats `value` with two decimals and the locale's separators, e.g. `1.234,56`.
pub fn format_amount(
    value: Decimal,
    locale: Locale,
) -> String {
    let (thousands, decimal) = locale.separators();
    let rounded = round_half_up(value);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(thousands);
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{grouped}{decimal}{frac_part}")
}

/// Formats a euro amount the way each locale writes it.
pub fn format_currency(
    value: Decimal,
    locale: Locale,
) -> String {
    let amount = format_amount(value, locale);
    match locale {
        Locale::Es | Locale::It => format!("{amount} €"),
        Locale::En => match amount.strip_prefix('-') {
            Some(positive) => format!("-€{positive}"),
            None => format!("€{amount}"),
        },
    }
}

/// Formats a value already expressed in percent (`12.5` → `12,50 %`).
pub fn format_percent(
    value: Decimal,
    locale: Locale,
) -> String {
    let amount = format_amount(value, locale);
    match locale {
        Locale::Es => format!("{amount} %"),
        Locale::It | Locale::En => format!("{amount}%"),
    }
}

/// Renders one output value for display.
pub fn format_output(
    value: &OutputValue,
    unit: OutputUnit,
    locale: Locale,
) -> String {
    match value {
        OutputValue::Unavailable => locale.unavailable().to_string(),
        OutputValue::Flag(flag) => locale.yes_no(*flag).to_string(),
        OutputValue::Text(text) => text.clone(),
        OutputValue::Number(v) => match unit {
            OutputUnit::Currency => format_currency(*v, locale),
            OutputUnit::Percent => format_percent(*v, locale),
            OutputUnit::Years | OutputUnit::Months | OutputUnit::Days => {
                format!("{} {}", format_amount(*v, locale), locale.unit_word(unit))
            }
            OutputUnit::Count => round_half_up(*v).normalize().to_string(),
            OutputUnit::Plain => format_amount(*v, locale),
        },
    }
}

/// Renders an input value for reports, using the field's unit and option labels.
pub fn format_input(
    field: &InputField,
    value: &InputValue,
    locale: Locale,
) -> String {
    match value {
        InputValue::Number(None) | InputValue::Date(None) => "—".to_string(),
        InputValue::Number(Some(v)) => match field.unit.as_deref() {
            Some("€") => format_currency(*v, locale),
            Some("%") => format_percent(*v, locale),
            Some(unit) => format!("{} {unit}", format_amount(*v, locale)),
            None => v.normalize().to_string(),
        },
        InputValue::Boolean(flag) => locale.yes_no(*flag).to_string(),
        InputValue::Choice(choice) => field
            .options
            .iter()
            .find(|o| &o.value == choice)
            .map_or_else(|| choice.clone(), |o| o.label.clone()),
        InputValue::Date(Some(date)) => match locale {
            Locale::Es | Locale::It => date.format("%d/%m/%Y").to_string(),
            Locale::En => date.format("%Y-%m-%d").to_string(),
        },
        InputValue::Series(items) => items
            .iter()
            .map(|v| format_amount(*v, locale))
            .collect::<Vec<_>>()
            .join("; "),
    }
}
