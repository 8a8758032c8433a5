use serde::{Deserialize, Serialize};

use super::chart::ChartDefinition;
use super::field::InputField;
use super::output::OutputField;
use super::state::InputState;
use crate::format::Locale;

/// Where and how many saved results a calculator keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPolicy {
    /// Storage key of the saved-results list. Calculator families may share a key.
    pub key: String,
    /// Maximum number of entries kept, most recent first.
    pub limit: usize,
}

impl HistoryPolicy {
    pub fn new(
        key: &str,
        limit: usize,
    ) -> Self {
        Self {
            key: key.to_string(),
            limit,
        }
    }
}

/// Immutable description of a calculator: its inputs, outputs and chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorDefinition {
    pub slug: String,
    pub title: String,
    pub locale: Locale,
    pub inputs: Vec<InputField>,
    pub outputs: Vec<OutputField>,
    pub chart: ChartDefinition,
    pub history: HistoryPolicy,
}

impl CalculatorDefinition {
    /// State holding every declared field at its default value.
    pub fn default_state(&self) -> InputState {
        self.inputs
            .iter()
            .map(|f| (f.id.clone(), f.default.clone()))
            .collect()
    }

    pub fn field(
        &self,
        id: &str,
    ) -> Option<&InputField> {
        self.inputs.iter().find(|f| f.id == id)
    }

    pub fn output(
        &self,
        id: &str,
    ) -> Option<&OutputField> {
        self.outputs.iter().find(|o| o.id == id)
    }

    /// `state` with every declared numeric value clamped into its field's bounds.
    ///
    /// Calculators apply this before computing, so states that were built
    /// without going through a session are bounded too.
    pub fn clamp_state(
        &self,
        state: &InputState,
    ) -> InputState {
        state
            .iter()
            .map(|(id, value)| {
                let value = match self.field(id) {
                    Some(field) => field.clamp(value.clone()),
                    None => value.clone(),
                };
                (id.to_string(), value)
            })
            .collect()
    }

    /// Fields that are visible for `state`, in declaration order.
    pub fn active_inputs<'a>(
        &'a self,
        state: &'a InputState,
    ) -> impl Iterator<Item = &'a InputField> + 'a {
        self.inputs.iter().filter(move |f| {
            f.visible_when
                .as_ref()
                .is_none_or(|condition| condition.evaluate(state))
        })
    }

    /// Ids declared more than once, or referenced by a visibility condition
    /// without being declared. Empty for a well-formed definition.
    pub fn integrity_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (i, field) in self.inputs.iter().enumerate() {
            if self.inputs[..i].iter().any(|f| f.id == field.id) {
                problems.push(format!("duplicate input id '{}'", field.id));
            }
            if let Some(condition) = &field.visible_when {
                for referenced in condition.referenced_fields() {
                    if self.field(referenced).is_none() {
                        problems.push(format!(
                            "input '{}' depends on undeclared field '{}'",
                            field.id, referenced
                        ));
                    }
                }
            }
        }
        for (i, output) in self.outputs.iter().enumerate() {
            if self.outputs[..i].iter().any(|o| o.id == output.id) {
                problems.push(format!("duplicate output id '{}'", output.id));
            }
        }
        for series in &self.chart.outputs {
            if self.output(series).is_none() {
                problems.push(format!("chart references undeclared output '{series}'"));
            }
        }
        problems
    }
}
