//! Italian inheritance tax ("imposta di successione").
//!
//! The rate and the tax-free allowance depend on the heir's relationship
//! to the deceased. Real estate additionally bears mortgage and cadastral
//! taxes, fixed at 200 € each when the property becomes the heir's first home.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::Calculator;
use crate::calculations::common::{MAX_AMOUNT, max, percent_of, round_half_up, safe_percent};
use crate::format::Locale;
use crate::models::{
    CalculatorDefinition, ChartDefinition, ChartKind, Condition, HistoryPolicy, InputField,
    InputState, OutputField, OutputUnit, OutputValues,
};

pub const SLUG: &str = "imposta-successione";

/// Allowance for a heir with a recognized severe disability, whatever the relationship.
pub const DISABLED_ALLOWANCE: Decimal = dec!(1500000);
const FIXED_PROPERTY_TAX: Decimal = dec!(200);
const MORTGAGE_RATE: Decimal = dec!(2);
const CADASTRAL_RATE: Decimal = dec!(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    SpouseOrDirectLine,
    Sibling,
    OtherRelative,
    Other,
}

impl Relationship {
    fn from_choice(choice: &str) -> Self {
        match choice {
            "fratelli" => Self::Sibling,
            "altri_parenti" => Self::OtherRelative,
            "altri" => Self::Other,
            _ => Self::SpouseOrDirectLine,
        }
    }

    /// Tax rate in percent.
    pub fn rate(&self) -> Decimal {
        match self {
            Self::SpouseOrDirectLine => dec!(4),
            Self::Sibling | Self::OtherRelative => dec!(6),
            Self::Other => dec!(8),
        }
    }

    pub fn allowance(&self) -> Decimal {
        match self {
            Self::SpouseOrDirectLine => dec!(1000000),
            Self::Sibling => dec!(100000),
            Self::OtherRelative | Self::Other => Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealEstate {
    pub value: Decimal,
    pub first_home: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessionInput {
    pub share_value: Decimal,
    pub relationship: Relationship,
    pub disabled_heir: bool,
    pub real_estate: Option<RealEstate>,
}

impl SuccessionInput {
    pub fn from_state(state: &InputState) -> Self {
        let real_estate = state.flag("includes_real_estate").then(|| RealEstate {
            value: state.number("real_estate_value"),
            first_home: state.flag("first_home"),
        });
        Self {
            share_value: state.number("share_value"),
            relationship: Relationship::from_choice(state.choice("relationship")),
            disabled_heir: state.flag("disabled_heir"),
            real_estate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessionResult {
    pub allowance: Decimal,
    pub taxable_amount: Decimal,
    pub rate: Decimal,
    pub succession_tax: Decimal,
    pub mortgage_tax: Decimal,
    pub cadastral_tax: Decimal,
    pub total_tax: Decimal,
    pub net_inheritance: Decimal,
    pub effective_rate: Decimal,
}

#[derive(Debug, Clone)]
pub struct Succession {
    definition: CalculatorDefinition,
}

impl Succession {
    pub fn new() -> Self {
        Self {
            definition: definition(),
        }
    }

    pub fn calculate(
        &self,
        input: &SuccessionInput,
    ) -> SuccessionResult {
        let share_value = max(input.share_value, Decimal::ZERO);
        let allowance = if input.disabled_heir {
            DISABLED_ALLOWANCE
        } else {
            input.relationship.allowance()
        };
        let taxable_amount = max(share_value - allowance, Decimal::ZERO);
        let rate = input.relationship.rate();
        let succession_tax = round_half_up(percent_of(taxable_amount, rate));
        let (mortgage_tax, cadastral_tax) = property_taxes(input.real_estate);
        let total_tax = succession_tax + mortgage_tax + cadastral_tax;

        SuccessionResult {
            allowance,
            taxable_amount,
            rate,
            succession_tax,
            mortgage_tax,
            cadastral_tax,
            total_tax,
            net_inheritance: share_value - total_tax,
            effective_rate: safe_percent(total_tax, share_value),
        }
    }
}

/// Mortgage and cadastral taxes on inherited real estate.
fn property_taxes(real_estate: Option<RealEstate>) -> (Decimal, Decimal) {
    match real_estate {
        None => (Decimal::ZERO, Decimal::ZERO),
        Some(RealEstate {
            first_home: true, ..
        }) => (FIXED_PROPERTY_TAX, FIXED_PROPERTY_TAX),
        Some(RealEstate { value, .. }) => {
            let value = max(value, Decimal::ZERO);
            (
                max(round_half_up(percent_of(value, MORTGAGE_RATE)), FIXED_PROPERTY_TAX),
                max(round_half_up(percent_of(value, CADASTRAL_RATE)), FIXED_PROPERTY_TAX),
            )
        }
    }
}

impl Default for Succession {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator for Succession {
    fn definition(&self) -> &CalculatorDefinition {
        &self.definition
    }

    fn compute(
        &self,
        state: &InputState,
    ) -> OutputValues {
        let state = &self.definition.clamp_state(state);
        let result = self.calculate(&SuccessionInput::from_state(state));
        OutputValues::new()
            .with("allowance", result.allowance)
            .with("taxable_amount", result.taxable_amount)
            .with("rate", result.rate)
            .with("succession_tax", result.succession_tax)
            .with("mortgage_tax", result.mortgage_tax)
            .with("cadastral_tax", result.cadastral_tax)
            .with("total_tax", result.total_tax)
            .with("net_inheritance", result.net_inheritance)
            .with("effective_rate", result.effective_rate)
    }
}

fn definition() -> CalculatorDefinition {
    CalculatorDefinition {
        slug: SLUG.to_string(),
        title: "Calcolo imposta di successione".to_string(),
        locale: Locale::It,
        inputs: vec![
            InputField::number("share_value", "Valore della quota ereditata", dec!(500000))
                .unit("€")
                .min(Decimal::ZERO)
                .max(MAX_AMOUNT)
                .step(dec!(1000)),
            InputField::select(
                "relationship",
                "Grado di parentela",
                &[
                    ("coniuge_linea_retta", "Coniuge o parente in linea retta"),
                    ("fratelli", "Fratelli e sorelle"),
                    ("altri_parenti", "Altri parenti fino al 4° grado e affini"),
                    ("altri", "Altri soggetti"),
                ],
                "coniuge_linea_retta",
            ),
            InputField::boolean("disabled_heir", "Erede con disabilità grave", false),
            InputField::boolean("includes_real_estate", "L'eredità comprende immobili", false),
            InputField::number("real_estate_value", "Valore catastale degli immobili", Decimal::ZERO)
                .unit("€")
                .min(Decimal::ZERO)
                .max(MAX_AMOUNT)
                .visible_when(Condition::is_on("includes_real_estate")),
            InputField::boolean("first_home", "Agevolazione prima casa", false)
                .visible_when(Condition::is_on("includes_real_estate")),
        ],
        outputs: vec![
            OutputField::new("allowance", "Franchigia", OutputUnit::Currency),
            OutputField::new("taxable_amount", "Imponibile", OutputUnit::Currency),
            OutputField::new("rate", "Aliquota", OutputUnit::Percent),
            OutputField::new("succession_tax", "Imposta di successione", OutputUnit::Currency),
            OutputField::new("mortgage_tax", "Imposta ipotecaria", OutputUnit::Currency),
            OutputField::new("cadastral_tax", "Imposta catastale", OutputUnit::Currency),
            OutputField::new("total_tax", "Totale imposte", OutputUnit::Currency),
            OutputField::new("net_inheritance", "Eredità netta", OutputUnit::Currency),
            OutputField::new("effective_rate", "Incidenza complessiva", OutputUnit::Percent),
        ],
        chart: ChartDefinition::new(
            ChartKind::Pie,
            "Ripartizione della quota ereditata",
            &["net_inheritance", "succession_tax", "mortgage_tax", "cadastral_tax"],
        ),
        history: HistoryPolicy::new("saved-results:fisco-it", 50),
    }
}
