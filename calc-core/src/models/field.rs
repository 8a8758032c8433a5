use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::value::InputValue;

/// The widget type of an input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Number,
    Boolean,
    Select,
    Date,
    /// An ordered list of numbers, e.g. yearly cash flows.
    Series,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Select => "select",
            Self::Date => "date",
            Self::Series => "series",
        }
    }
}

/// One entry of a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Static description of one calculator input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputField {
    pub id: String,
    pub label: String,
    pub kind: FieldKind,
    pub unit: Option<String>,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub step: Option<Decimal>,
    pub default: InputValue,
    pub options: Vec<SelectOption>,
    pub visible_when: Option<Condition>,
}

impl InputField {
    fn new(
        id: &str,
        label: &str,
        default: InputValue,
    ) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind: default.kind(),
            unit: None,
            min: None,
            max: None,
            step: None,
            default,
            options: Vec::new(),
            visible_when: None,
        }
    }

    /// A numeric field with a filled-in default.
    pub fn number(
        id: &str,
        label: &str,
        default: Decimal,
    ) -> Self {
        Self::new(id, label, InputValue::number(default))
    }

    /// A numeric field that starts out empty.
    pub fn empty_number(
        id: &str,
        label: &str,
    ) -> Self {
        Self::new(id, label, InputValue::Number(None))
    }

    pub fn boolean(
        id: &str,
        label: &str,
        default: bool,
    ) -> Self {
        Self::new(id, label, InputValue::Boolean(default))
    }

    /// A select field. `options` are `(value, label)` pairs; `default` must be one of the values.
    pub fn select(
        id: &str,
        label: &str,
        options: &[(&str, &str)],
        default: &str,
    ) -> Self {
        let mut field = Self::new(id, label, InputValue::choice(default));
        field.options = options
            .iter()
            .map(|(value, label)| SelectOption {
                value: value.to_string(),
                label: label.to_string(),
            })
            .collect();
        field
    }

    pub fn date(
        id: &str,
        label: &str,
        default: Option<NaiveDate>,
    ) -> Self {
        Self::new(id, label, InputValue::Date(default))
    }

    pub fn series(
        id: &str,
        label: &str,
        default: Vec<Decimal>,
    ) -> Self {
        Self::new(id, label, InputValue::Series(default))
    }

    pub fn unit(
        mut self,
        unit: &str,
    ) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn min(
        mut self,
        min: Decimal,
    ) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(
        mut self,
        max: Decimal,
    ) -> Self {
        self.max = Some(max);
        self
    }

    pub fn step(
        mut self,
        step: Decimal,
    ) -> Self {
        self.step = Some(step);
        self
    }

    pub fn visible_when(
        mut self,
        condition: Condition,
    ) -> Self {
        self.visible_when = Some(condition);
        self
    }

    /// Returns `true` if `value` is one of this select field's option values.
    pub fn has_option(
        &self,
        value: &str,
    ) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    /// Clamps numeric values (and series items) into `[min, max]`.
    ///
    /// Empty numbers stay empty and non-numeric values pass through unchanged.
    pub fn clamp(
        &self,
        value: InputValue,
    ) -> InputValue {
        match value {
            InputValue::Number(Some(v)) => InputValue::Number(Some(self.clamp_decimal(v))),
            InputValue::Series(items) if self.min.is_some() || self.max.is_some() => {
                InputValue::Series(items.into_iter().map(|v| self.clamp_decimal(v)).collect())
            }
            other => other,
        }
    }

    fn clamp_decimal(
        &self,
        value: Decimal,
    ) -> Decimal {
        let mut v = value;
        if let Some(min) = self.min {
            v = v.max(min);
        }
        if let Some(max) = self.max {
            v = v.min(max);
        }
        v
    }
}
