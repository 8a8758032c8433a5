//! Italian VAT ("IVA"): add VAT to a net amount or extract it from a gross one.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::Calculator;
use crate::calculations::common::{MAX_AMOUNT, round_half_up};
use crate::calculations::vat::{add_vat, remove_vat};
use crate::format::Locale;
use crate::models::{
    CalculatorDefinition, ChartDefinition, ChartKind, Condition, HistoryPolicy, InputField,
    InputState, OutputField, OutputUnit, OutputValues,
};

pub const SLUG: &str = "calcolatore-iva";

pub const STANDARD_RATE: Decimal = dec!(22);
const CUSTOM: &str = "custom";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatMode {
    /// The amount is net; compute the gross.
    Add,
    /// The amount is gross; extract the net.
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatInput {
    pub amount: Decimal,
    pub mode: VatMode,
    /// Rate in percent.
    pub rate: Decimal,
}

impl VatInput {
    pub fn from_state(state: &InputState) -> Self {
        let mode = if state.choice("mode") == "remove" {
            VatMode::Remove
        } else {
            VatMode::Add
        };
        let rate = match state.choice("rate") {
            CUSTOM => state.number("custom_rate"),
            preset => preset.parse().unwrap_or(STANDARD_RATE),
        };
        Self {
            amount: state.number("amount"),
            mode,
            rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatResult {
    pub net: Decimal,
    pub vat: Decimal,
    pub gross: Decimal,
    pub rate: Decimal,
}

#[derive(Debug, Clone)]
pub struct Vat {
    definition: CalculatorDefinition,
}

impl Vat {
    pub fn new() -> Self {
        Self {
            definition: definition(),
        }
    }

    pub fn calculate(
        &self,
        input: &VatInput,
    ) -> VatResult {
        let (net, gross) = match input.mode {
            VatMode::Add => (input.amount, round_half_up(add_vat(input.amount, input.rate))),
            VatMode::Remove => (round_half_up(remove_vat(input.amount, input.rate)), input.amount),
        };
        VatResult {
            net,
            vat: gross - net,
            gross,
            rate: input.rate,
        }
    }
}

impl Default for Vat {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator for Vat {
    fn definition(&self) -> &CalculatorDefinition {
        &self.definition
    }

    fn compute(
        &self,
        state: &InputState,
    ) -> OutputValues {
        let state = &self.definition.clamp_state(state);
        let result = self.calculate(&VatInput::from_state(state));
        OutputValues::new()
            .with("net", result.net)
            .with("vat", result.vat)
            .with("gross", result.gross)
            .with("rate", result.rate)
    }
}

fn definition() -> CalculatorDefinition {
    CalculatorDefinition {
        slug: SLUG.to_string(),
        title: "Calcolatore IVA".to_string(),
        locale: Locale::It,
        inputs: vec![
            InputField::number("amount", "Importo", dec!(100))
                .unit("€")
                .min(Decimal::ZERO)
                .max(MAX_AMOUNT)
                .step(dec!(0.01)),
            InputField::select(
                "mode",
                "Operazione",
                &[
                    ("add", "Aggiungi IVA (da imponibile a totale)"),
                    ("remove", "Scorpora IVA (da totale a imponibile)"),
                ],
                "add",
            ),
            InputField::select(
                "rate",
                "Aliquota IVA",
                &[
                    ("22", "22% ordinaria"),
                    ("10", "10% ridotta"),
                    ("5", "5% ridotta"),
                    ("4", "4% minima"),
                    (CUSTOM, "Altra aliquota"),
                ],
                "22",
            ),
            InputField::number("custom_rate", "Aliquota personalizzata", STANDARD_RATE)
                .unit("%")
                .min(Decimal::ZERO)
                .max(dec!(100))
                .step(dec!(0.1))
                .visible_when(Condition::chosen("rate", CUSTOM)),
        ],
        outputs: vec![
            OutputField::new("net", "Imponibile", OutputUnit::Currency),
            OutputField::new("vat", "IVA", OutputUnit::Currency),
            OutputField::new("gross", "Totale IVA inclusa", OutputUnit::Currency),
            OutputField::new("rate", "Aliquota applicata", OutputUnit::Percent),
        ],
        chart: ChartDefinition::new(ChartKind::Pie, "Composizione del totale", &["net", "vat"]),
        history: HistoryPolicy::new("saved-results:iva", 100),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::InputValue;

    #[test]
    fn add_standard_rate() {
        let result = Vat::new().calculate(&VatInput {
            amount: dec!(100),
            mode: VatMode::Add,
            rate: dec!(22),
        });

        assert_eq!(result.gross, dec!(122));
        assert_eq!(result.vat, dec!(22));
    }

    #[test]
    fn remove_rounds_net_to_cents() {
        let result = Vat::new().calculate(&VatInput {
            amount: dec!(100),
            mode: VatMode::Remove,
            rate: dec!(22),
        });

        // 100 / 1.22 = 81.967...
        assert_eq!(result.net, dec!(81.97));
        assert_eq!(result.vat, dec!(18.03));
        assert_eq!(result.net + result.vat, result.gross);
    }

    #[test]
    fn preset_rate_from_state() {
        let calculator = Vat::new();
        let mut state = calculator.definition().default_state();
        state.insert("rate", InputValue::choice("4"));

        assert_eq!(VatInput::from_state(&state).rate, dec!(4));
    }

    #[test]
    fn custom_rate_only_when_selected() {
        let calculator = Vat::new();
        let mut state = calculator.definition().default_state();
        state.insert("custom_rate", InputValue::number(dec!(8.5)));

        assert_eq!(VatInput::from_state(&state).rate, dec!(22));
        assert!(
            !calculator
                .definition()
                .active_inputs(&state)
                .any(|f| f.id == "custom_rate")
        );

        state.insert("rate", InputValue::choice("custom"));
        assert_eq!(VatInput::from_state(&state).rate, dec!(8.5));
        assert!(
            calculator
                .definition()
                .active_inputs(&state)
                .any(|f| f.id == "custom_rate")
        );
    }
}
