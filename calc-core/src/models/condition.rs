use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::state::InputState;
use super::value::InputValue;

/// Typed visibility predicate over the current [`InputState`].
///
/// A field whose condition evaluates to `false` is hidden from the form and
/// excluded from [`CalculatorDefinition::active_inputs`](super::CalculatorDefinition::active_inputs).
/// Its value is still kept in the state so toggling the controlling field
/// back restores what the user typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Equals(String, InputValue),
    NotEquals(String, InputValue),
    /// Numeric comparison; an empty number compares as zero.
    GreaterThan(String, Decimal),
    LessThan(String, Decimal),
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// `field` is a boolean that is switched on.
    pub fn is_on(field: &str) -> Self {
        Self::Equals(field.to_string(), InputValue::Boolean(true))
    }

    /// `field` is a boolean that is switched off.
    pub fn is_off(field: &str) -> Self {
        Self::Equals(field.to_string(), InputValue::Boolean(false))
    }

    /// `field` is a select with `value` chosen.
    pub fn chosen(
        field: &str,
        value: &str,
    ) -> Self {
        Self::Equals(field.to_string(), InputValue::choice(value))
    }

    pub fn evaluate(
        &self,
        state: &InputState,
    ) -> bool {
        match self {
            Self::Equals(field, expected) => state.get(field) == Some(expected),
            Self::NotEquals(field, expected) => state.get(field) != Some(expected),
            Self::GreaterThan(field, bound) => state.number(field) > *bound,
            Self::LessThan(field, bound) => state.number(field) < *bound,
            Self::All(conditions) => conditions.iter().all(|c| c.evaluate(state)),
            Self::Any(conditions) => conditions.iter().any(|c| c.evaluate(state)),
            Self::Not(inner) => !inner.evaluate(state),
        }
    }

    /// Ids of every field this condition reads.
    pub fn referenced_fields(&self) -> Vec<&str> {
        match self {
            Self::Equals(field, _)
            | Self::NotEquals(field, _)
            | Self::GreaterThan(field, _)
            | Self::LessThan(field, _) => vec![field.as_str()],
            Self::All(conditions) | Self::Any(conditions) => conditions
                .iter()
                .flat_map(|c| c.referenced_fields())
                .collect(),
            Self::Not(inner) => inner.referenced_fields(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn state() -> InputState {
        let mut state = InputState::default();
        state.insert("regime", InputValue::choice("micro"));
        state.insert("startup", InputValue::Boolean(true));
        state.insert("revenue", InputValue::number(dec!(90000)));
        state.insert("empty", InputValue::Number(None));
        state
    }

    #[test]
    fn equals_matches_choice() {
        assert!(Condition::chosen("regime", "micro").evaluate(&state()));
        assert!(!Condition::chosen("regime", "ordinary").evaluate(&state()));
    }

    #[test]
    fn boolean_helpers() {
        assert!(Condition::is_on("startup").evaluate(&state()));
        assert!(!Condition::is_off("startup").evaluate(&state()));
    }

    #[test]
    fn numeric_comparisons_treat_empty_as_zero() {
        assert!(Condition::GreaterThan("revenue".into(), dec!(85000)).evaluate(&state()));
        assert!(Condition::LessThan("empty".into(), dec!(1)).evaluate(&state()));
    }

    #[test]
    fn combinators() {
        let both = Condition::All(vec![
            Condition::is_on("startup"),
            Condition::chosen("regime", "micro"),
        ]);
        let neither = Condition::Not(Box::new(Condition::Any(vec![
            Condition::is_on("startup"),
            Condition::chosen("regime", "ordinary"),
        ])));

        assert!(both.evaluate(&state()));
        assert!(!neither.evaluate(&state()));
        assert_eq!(both.referenced_fields(), vec!["startup", "regime"]);
    }

    #[test]
    fn missing_field_is_not_equal() {
        assert!(!Condition::is_on("nope").evaluate(&state()));
        assert!(Condition::NotEquals("nope".into(), InputValue::Boolean(true)).evaluate(&state()));
    }
}
