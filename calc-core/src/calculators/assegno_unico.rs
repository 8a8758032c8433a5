//! Italian universal child benefit ("assegno unico e universale").
//!
//! Every amount is means-tested on the family ISEE: full between zero and
//! the lower threshold, reduced linearly up to the upper threshold, flat
//! above it. Families that do not present an ISEE receive the amounts at
//! the upper threshold.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::Calculator;
use crate::calculations::common::{MAX_AMOUNT, max, round_half_up};
use crate::calculations::interpolation::ThresholdScale;
use crate::format::Locale;
use crate::models::{
    CalculatorDefinition, ChartDefinition, ChartKind, Condition, HistoryPolicy, InputField,
    InputState, OutputField, OutputUnit, OutputValues,
};

pub const SLUG: &str = "assegno-unico";

pub const ISEE_MIN: Decimal = dec!(17090.61);
pub const ISEE_MAX: Decimal = dec!(45574.96);

/// Monthly amount per minor child.
pub const PER_CHILD: ThresholdScale =
    ThresholdScale::new(ISEE_MIN, ISEE_MAX, dec!(199.40), dec!(57.00));
/// Monthly supplement for each child from the third on.
pub const THIRD_CHILD: ThresholdScale =
    ThresholdScale::new(ISEE_MIN, ISEE_MAX, dec!(96.30), dec!(17.10));
/// Monthly supplement per child when both parents earn an income.
pub const DUAL_EARNER: ThresholdScale =
    ThresholdScale::new(ISEE_MIN, ISEE_MAX, dec!(34.10), dec!(0.00));
/// Children under one year receive the per-child amount increased by half.
const UNDER_ONE_INCREASE: Decimal = dec!(0.5);
const MONTHS: Decimal = dec!(12);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssegnoUnicoInput {
    /// `None` when the family does not present an ISEE.
    pub isee: Option<Decimal>,
    pub children: u32,
    pub children_under_one: u32,
    pub dual_earner: bool,
}

impl AssegnoUnicoInput {
    pub fn from_state(state: &InputState) -> Self {
        // A presented but blank ISEE earns no more than no ISEE at all.
        let isee = state
            .flag("has_isee")
            .then(|| state.number_or("isee", ISEE_MAX));
        let children = whole(state.number("children"));
        Self {
            isee,
            children,
            children_under_one: whole(state.number("children_under_one")).min(children),
            dual_earner: state.flag("dual_earner"),
        }
    }
}

/// Whole non-negative count from a numeric field.
fn whole(value: Decimal) -> u32 {
    max(value.trunc(), Decimal::ZERO).to_u32().unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssegnoUnicoResult {
    /// ISEE value the scales were read at.
    pub isee_used: Decimal,
    pub per_child: Decimal,
    pub base_amount: Decimal,
    pub under_one_supplement: Decimal,
    pub third_child_supplement: Decimal,
    pub dual_earner_supplement: Decimal,
    pub monthly_total: Decimal,
    pub annual_total: Decimal,
}

#[derive(Debug, Clone)]
pub struct AssegnoUnico {
    definition: CalculatorDefinition,
}

impl AssegnoUnico {
    pub fn new() -> Self {
        Self {
            definition: definition(),
        }
    }

    pub fn calculate(
        &self,
        input: &AssegnoUnicoInput,
    ) -> AssegnoUnicoResult {
        let isee_used = input.isee.unwrap_or(ISEE_MAX);
        let children = Decimal::from(input.children);

        let per_child = round_half_up(PER_CHILD.value_at(isee_used));
        let base_amount = per_child * children;
        let under_one_supplement =
            round_half_up(per_child * UNDER_ONE_INCREASE) * Decimal::from(input.children_under_one);
        let third_child_supplement = round_half_up(THIRD_CHILD.value_at(isee_used))
            * Decimal::from(input.children.saturating_sub(2));
        let dual_earner_supplement = if input.dual_earner {
            round_half_up(DUAL_EARNER.value_at(isee_used)) * children
        } else {
            Decimal::ZERO
        };

        let monthly_total =
            base_amount + under_one_supplement + third_child_supplement + dual_earner_supplement;

        AssegnoUnicoResult {
            isee_used,
            per_child,
            base_amount,
            under_one_supplement,
            third_child_supplement,
            dual_earner_supplement,
            monthly_total,
            annual_total: monthly_total * MONTHS,
        }
    }
}

impl Default for AssegnoUnico {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator for AssegnoUnico {
    fn definition(&self) -> &CalculatorDefinition {
        &self.definition
    }

    fn compute(
        &self,
        state: &InputState,
    ) -> OutputValues {
        let state = &self.definition.clamp_state(state);
        let result = self.calculate(&AssegnoUnicoInput::from_state(state));
        OutputValues::new()
            .with("isee_used", result.isee_used)
            .with("per_child", result.per_child)
            .with("base_amount", result.base_amount)
            .with("under_one_supplement", result.under_one_supplement)
            .with("third_child_supplement", result.third_child_supplement)
            .with("dual_earner_supplement", result.dual_earner_supplement)
            .with("monthly_total", result.monthly_total)
            .with("annual_total", result.annual_total)
    }
}

fn definition() -> CalculatorDefinition {
    CalculatorDefinition {
        slug: SLUG.to_string(),
        title: "Calcolo assegno unico".to_string(),
        locale: Locale::It,
        inputs: vec![
            InputField::boolean("has_isee", "Presento un ISEE valido", true),
            InputField::number("isee", "Valore ISEE", dec!(25000))
                .unit("€")
                .min(Decimal::ZERO)
                .max(MAX_AMOUNT)
                .step(dec!(100))
                .visible_when(Condition::is_on("has_isee")),
            InputField::number("children", "Figli minorenni", dec!(2))
                .min(Decimal::ZERO)
                .max(dec!(20))
                .step(Decimal::ONE),
            InputField::number("children_under_one", "Di cui con meno di un anno", Decimal::ZERO)
                .min(Decimal::ZERO)
                .max(dec!(20))
                .step(Decimal::ONE),
            InputField::boolean("dual_earner", "Entrambi i genitori lavorano", false),
        ],
        outputs: vec![
            OutputField::new("isee_used", "ISEE considerato", OutputUnit::Currency),
            OutputField::new("per_child", "Importo per figlio", OutputUnit::Currency),
            OutputField::new("base_amount", "Quota base", OutputUnit::Currency),
            OutputField::new(
                "under_one_supplement",
                "Maggiorazione figli sotto un anno",
                OutputUnit::Currency,
            ),
            OutputField::new(
                "third_child_supplement",
                "Maggiorazione dal terzo figlio",
                OutputUnit::Currency,
            ),
            OutputField::new(
                "dual_earner_supplement",
                "Maggiorazione genitori lavoratori",
                OutputUnit::Currency,
            ),
            OutputField::new("monthly_total", "Assegno mensile", OutputUnit::Currency),
            OutputField::new("annual_total", "Assegno annuo", OutputUnit::Currency),
        ],
        chart: ChartDefinition::new(
            ChartKind::Bar,
            "Composizione dell'assegno mensile",
            &[
                "base_amount",
                "under_one_supplement",
                "third_child_supplement",
                "dual_earner_supplement",
            ],
        ),
        history: HistoryPolicy::new("saved-results:assegno-unico", 20),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::InputValue;

    fn input(
        isee: Option<Decimal>,
        children: u32,
    ) -> AssegnoUnicoInput {
        AssegnoUnicoInput {
            isee,
            children,
            children_under_one: 0,
            dual_earner: false,
        }
    }

    #[test]
    fn full_amount_at_lower_threshold() {
        let result = AssegnoUnico::new().calculate(&input(Some(ISEE_MIN), 1));

        assert_eq!(result.per_child, dec!(199.40));
        assert_eq!(result.monthly_total, dec!(199.40));
        assert_eq!(result.annual_total, dec!(2392.80));
    }

    #[test]
    fn midpoint_isee() {
        let result = AssegnoUnico::new().calculate(&input(Some(dec!(31332.785)), 1));

        assert_eq!(result.per_child, dec!(128.20));
    }

    #[test]
    fn no_isee_uses_upper_threshold() {
        let result = AssegnoUnico::new().calculate(&input(None, 2));

        assert_eq!(result.isee_used, ISEE_MAX);
        assert_eq!(result.per_child, dec!(57.00));
        assert_eq!(result.base_amount, dec!(114.00));
    }

    #[test]
    fn third_child_supplement_counts_from_the_third() {
        let result = AssegnoUnico::new().calculate(&input(Some(dec!(10000)), 4));

        // two children past the second, at the full 96.30
        assert_eq!(result.third_child_supplement, dec!(192.60));
        assert_eq!(result.base_amount, dec!(797.60));
    }

    #[test]
    fn under_one_and_dual_earner_supplements() {
        let mut family = input(Some(dec!(10000)), 2);
        family.children_under_one = 1;
        family.dual_earner = true;

        let result = AssegnoUnico::new().calculate(&family);
        assert_eq!(result.under_one_supplement, dec!(99.70));
        assert_eq!(result.dual_earner_supplement, dec!(68.20));
        assert_eq!(result.monthly_total, dec!(398.80) + dec!(99.70) + dec!(68.20));
    }

    #[test]
    fn dual_earner_supplement_vanishes_at_upper_threshold() {
        let mut family = input(Some(dec!(60000)), 2);
        family.dual_earner = true;

        assert_eq!(
            AssegnoUnico::new().calculate(&family).dual_earner_supplement,
            Decimal::ZERO
        );
    }

    #[test]
    fn from_state_ignores_isee_when_not_presented() {
        let calculator = AssegnoUnico::new();
        let mut state = calculator.definition().default_state();
        state.insert("has_isee", InputValue::Boolean(false));

        assert_eq!(AssegnoUnicoInput::from_state(&state).isee, None);
    }

    #[test]
    fn from_state_caps_children_under_one() {
        let calculator = AssegnoUnico::new();
        let mut state = calculator.definition().default_state();
        state.insert("children", InputValue::number(dec!(1)));
        state.insert("children_under_one", InputValue::number(dec!(3)));
        state.insert("isee", InputValue::Number(None));

        assert_eq!(AssegnoUnicoInput::from_state(&state).children_under_one, 1);
    }

    #[test]
    fn blank_isee_is_read_at_the_upper_threshold() {
        let calculator = AssegnoUnico::new();
        let mut session = crate::CalculatorSession::new(&calculator);
        session.set_field("has_isee", InputValue::Boolean(true)).unwrap();
        session.set_field_text("isee", "").unwrap();

        assert_eq!(session.outputs().number("isee_used"), Some(ISEE_MAX));
        assert_eq!(session.outputs().number("per_child"), Some(dec!(57.00)));
    }
}
