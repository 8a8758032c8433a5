use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::value::InputValue;

/// Mapping from input field id to its current value.
///
/// The typed accessors are the single place where empty or missing values
/// are normalized before a calculator sees them: empty numbers read as zero,
/// missing booleans as `false`, missing choices as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputState {
    values: BTreeMap<String, InputValue>,
}

impl InputState {
    pub fn get(
        &self,
        id: &str,
    ) -> Option<&InputValue> {
        self.values.get(id)
    }

    /// Replaces the value stored under `id`, returning the previous one.
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        value: InputValue,
    ) -> Option<InputValue> {
        self.values.insert(id.into(), value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Numeric value of `id`; empty or missing reads as zero.
    pub fn number(
        &self,
        id: &str,
    ) -> Decimal {
        self.number_or(id, Decimal::ZERO)
    }

    /// Numeric value of `id`, or `sentinel` when the field is empty or missing.
    pub fn number_or(
        &self,
        id: &str,
        sentinel: Decimal,
    ) -> Decimal {
        match self.values.get(id) {
            Some(InputValue::Number(Some(v))) => *v,
            _ => sentinel,
        }
    }

    /// Returns `true` if the numeric field `id` holds a value.
    pub fn is_filled(
        &self,
        id: &str,
    ) -> bool {
        matches!(self.values.get(id), Some(InputValue::Number(Some(_))))
    }

    pub fn flag(
        &self,
        id: &str,
    ) -> bool {
        matches!(self.values.get(id), Some(InputValue::Boolean(true)))
    }

    pub fn choice(
        &self,
        id: &str,
    ) -> &str {
        match self.values.get(id) {
            Some(InputValue::Choice(c)) => c.as_str(),
            _ => "",
        }
    }

    pub fn date(
        &self,
        id: &str,
    ) -> Option<NaiveDate> {
        match self.values.get(id) {
            Some(InputValue::Date(d)) => *d,
            _ => None,
        }
    }

    pub fn series(
        &self,
        id: &str,
    ) -> &[Decimal] {
        match self.values.get(id) {
            Some(InputValue::Series(items)) => items.as_slice(),
            _ => &[],
        }
    }
}

impl FromIterator<(String, InputValue)> for InputState {
    fn from_iter<I: IntoIterator<Item = (String, InputValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn empty_number_reads_as_zero() {
        let mut state = InputState::default();
        state.insert("income", InputValue::Number(None));

        assert_eq!(state.number("income"), Decimal::ZERO);
        assert_eq!(state.number_or("income", dec!(1)), dec!(1));
        assert!(!state.is_filled("income"));
    }

    #[test]
    fn accessors_tolerate_missing_and_mismatched_fields() {
        let mut state = InputState::default();
        state.insert("flag", InputValue::number(dec!(1)));

        assert!(!state.flag("flag"));
        assert_eq!(state.choice("missing"), "");
        assert_eq!(state.date("missing"), None);
        assert!(state.series("missing").is_empty());
    }

    #[test]
    fn insert_replaces_previous_value() {
        let mut state = InputState::default();
        state.insert("x", InputValue::number(dec!(1)));
        let previous = state.insert("x", InputValue::number(dec!(2)));

        assert_eq!(previous, Some(InputValue::number(dec!(1))));
        assert_eq!(state.number("x"), dec!(2));
        assert_eq!(state.len(), 1);
    }
}
