use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How an output number is meant to be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputUnit {
    Currency,
    Percent,
    Years,
    Months,
    Days,
    Count,
    Plain,
}

/// Static description of one calculator output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputField {
    pub id: String,
    pub label: String,
    pub unit: OutputUnit,
}

impl OutputField {
    pub fn new(
        id: &str,
        label: &str,
        unit: OutputUnit,
    ) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            unit,
        }
    }
}

/// A single computed result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OutputValue {
    Number(Decimal),
    Text(String),
    Flag(bool),
    /// The result cannot be calculated for the current inputs.
    Unavailable,
}

impl OutputValue {
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

impl From<Decimal> for OutputValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for OutputValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Option<Decimal>> for OutputValue {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(Self::Unavailable, Self::Number)
    }
}

/// Complete set of results produced by one `compute` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputValues {
    values: BTreeMap<String, OutputValue>,
}

impl OutputValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert used by calculators.
    pub fn with(
        mut self,
        id: &str,
        value: impl Into<OutputValue>,
    ) -> Self {
        self.values.insert(id.to_string(), value.into());
        self
    }

    pub fn get(
        &self,
        id: &str,
    ) -> Option<&OutputValue> {
        self.values.get(id)
    }

    /// Numeric output `id`, or `None` if it is missing or not a number.
    pub fn number(
        &self,
        id: &str,
    ) -> Option<Decimal> {
        self.values.get(id).and_then(OutputValue::as_number)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OutputValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn option_converts_to_unavailable() {
        let values = OutputValues::new()
            .with("irr", None::<Decimal>)
            .with("npv", dec!(12.5));

        assert_eq!(values.get("irr"), Some(&OutputValue::Unavailable));
        assert_eq!(values.number("npv"), Some(dec!(12.5)));
        assert_eq!(values.number("irr"), None);
    }

    #[test]
    fn output_value_serializes_tagged() {
        let json = serde_json::to_string(&OutputValue::Unavailable).unwrap();

        assert_eq!(json, r#"{"kind":"unavailable"}"#);
    }
}
