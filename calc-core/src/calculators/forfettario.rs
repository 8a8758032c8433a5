//! Italian flat-rate regime ("regime forfettario") for sole traders.
//!
//! Taxable income is revenue times the profitability coefficient of the
//! activity. Pension contributions are charged on that income and deducted
//! from it before the substitute tax (5 % for new activities, else 15 %).

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

pub const SLUG: &str = "regime-forfettario";

/// Revenue ceiling for staying in the regime.
pub const REVENUE_LIMIT: Decimal = dec!(85000);
pub const STARTUP_RATE: Decimal = dec!(5);
pub const STANDARD_RATE: Decimal = dec!(15);
pub const SEPARATE_SCHEME_RATE: Decimal = dec!(26.07);
pub const CRAFTS_TRADE_RATE: Decimal = dec!(24);
/// Share of artisan/trader contributions still due with the 35 % reduction.
const REDUCED_SHARE: Decimal = dec!(0.65);

/// Activity groups with their profitability coefficient in percent.
const ACTIVITIES: [(&str, &str, Decimal); 5] = [
    ("professionisti", "Attività professionali, scientifiche e tecniche (78%)", dec!(78)),
    ("commercio", "Commercio all'ingrosso e al dettaglio (40%)", dec!(40)),
    ("costruzioni", "Costruzioni e attività immobiliari (86%)", dec!(86)),
    ("intermediari", "Intermediari del commercio (62%)", dec!(62)),
    ("altre", "Altre attività economiche (67%)", dec!(67)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PensionScheme {
    /// INPS gestione separata.
    SeparateScheme,
    /// INPS artigiani e commercianti, optionally with the 35 % reduction.
    CraftsAndTrade { reduced: bool },
    /// A professional fund with its own rate, in percent.
    ProfessionalFund { rate: Decimal },
}

impl PensionScheme {
    pub fn rate(&self) -> Decimal {
        match self {
            Self::SeparateScheme => SEPARATE_SCHEME_RATE,
            Self::CraftsAndTrade { reduced: false } => CRAFTS_TRADE_RATE,
            Self::CraftsAndTrade { reduced: true } => CRAFTS_TRADE_RATE * REDUCED_SHARE,
            Self::ProfessionalFund { rate } => *rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForfettarioInput {
    pub revenue: Decimal,
    /// Profitability coefficient in percent.
    pub coefficient: Decimal,
    pub startup: bool,
    pub pension: PensionScheme,
}

impl ForfettarioInput {
    pub fn from_state(state: &InputState) -> Self {
        let activity = state.choice("activity");
        let coefficient = ACTIVITIES
            .iter()
            .find(|(value, _, _)| *value == activity)
            .map_or(ACTIVITIES[0].2, |(_, _, coefficient)| *coefficient);

        let pension = match state.choice("pension_scheme") {
            "artigiani_commercianti" => PensionScheme::CraftsAndTrade {
                reduced: state.flag("reduction_35"),
            },
            "cassa" => PensionScheme::ProfessionalFund {
                rate: state.number("fund_rate"),
            },
            _ => PensionScheme::SeparateScheme,
        };

        Self {
            revenue: state.number("revenue"),
            coefficient,
            startup: state.flag("startup"),
            pension,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForfettarioResult {
    pub coefficient: Decimal,
    pub taxable_income: Decimal,
    pub contributions: Decimal,
    pub tax_base: Decimal,
    pub tax_rate: Decimal,
    pub substitute_tax: Decimal,
    pub total_due: Decimal,
    pub net_income: Decimal,
    pub effective_rate: Decimal,
    pub eligible: bool,
}

#[derive(Debug, Clone)]
pub struct Forfettario {
    definition: CalculatorDefinition,
}

impl Forfettario {
    pub fn new() -> Self {
        Self {
            definition: definition(),
        }
    }

    pub fn calculate(
        &self,
        input: &ForfettarioInput,
    ) -> ForfettarioResult {
        let revenue = max(input.revenue, Decimal::ZERO);
        let taxable_income = round_half_up(percent_of(revenue, input.coefficient));
        let contributions = round_half_up(percent_of(taxable_income, input.pension.rate()));
        let tax_base = max(taxable_income - contributions, Decimal::ZERO);
        let tax_rate = if input.startup { STARTUP_RATE } else { STANDARD_RATE };
        let substitute_tax = round_half_up(percent_of(tax_base, tax_rate));
        let total_due = contributions + substitute_tax;

        ForfettarioResult {
            coefficient: input.coefficient,
            taxable_income,
            contributions,
            tax_base,
            tax_rate,
            substitute_tax,
            total_due,
            net_income: revenue - total_due,
            effective_rate: safe_percent(total_due, revenue),
            eligible: revenue <= REVENUE_LIMIT,
        }
    }
}

impl Default for Forfettario {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator for Forfettario {
    fn definition(&self) -> &CalculatorDefinition {
        &self.definition
    }

    fn compute(
        &self,
        state: &InputState,
    ) -> OutputValues {
        let state = &self.definition.clamp_state(state);
        let result = self.calculate(&ForfettarioInput::from_state(state));
        OutputValues::new()
            .with("coefficient", result.coefficient)
            .with("taxable_income", result.taxable_income)
            .with("contributions", result.contributions)
            .with("tax_base", result.tax_base)
            .with("tax_rate", result.tax_rate)
            .with("substitute_tax", result.substitute_tax)
            .with("total_due", result.total_due)
            .with("net_income", result.net_income)
            .with("effective_rate", result.effective_rate)
            .with("eligible", result.eligible)
    }
}

fn definition() -> CalculatorDefinition {
    let activities: Vec<(&str, &str)> = ACTIVITIES
        .iter()
        .map(|(value, label, _)| (*value, *label))
        .collect();

    CalculatorDefinition {
        slug: SLUG.to_string(),
        title: "Calcolo tasse regime forfettario".to_string(),
        locale: Locale::It,
        inputs: vec![
            InputField::number("revenue", "Ricavi o compensi annui", dec!(40000))
                .unit("€")
                .min(Decimal::ZERO)
                .max(MAX_AMOUNT)
                .step(dec!(100)),
            InputField::select("activity", "Tipo di attività", &activities, "professionisti"),
            InputField::boolean("startup", "Nuova attività (aliquota al 5% per 5 anni)", false),
            InputField::select(
                "pension_scheme",
                "Cassa previdenziale",
                &[
                    ("gestione_separata", "INPS gestione separata"),
                    ("artigiani_commercianti", "INPS artigiani e commercianti"),
                    ("cassa", "Cassa professionale"),
                ],
                "gestione_separata",
            ),
            InputField::boolean("reduction_35", "Riduzione contributiva del 35%", false)
                .visible_when(Condition::chosen("pension_scheme", "artigiani_commercianti")),
            InputField::number("fund_rate", "Aliquota della cassa professionale", dec!(14))
                .unit("%")
                .min(Decimal::ZERO)
                .max(dec!(50))
                .step(dec!(0.5))
                .visible_when(Condition::chosen("pension_scheme", "cassa")),
        ],
        outputs: vec![
            OutputField::new("coefficient", "Coefficiente di redditività", OutputUnit::Percent),
            OutputField::new("taxable_income", "Reddito imponibile lordo", OutputUnit::Currency),
            OutputField::new("contributions", "Contributi previdenziali", OutputUnit::Currency),
            OutputField::new("tax_base", "Base imponibile", OutputUnit::Currency),
            OutputField::new("tax_rate", "Aliquota imposta sostitutiva", OutputUnit::Percent),
            OutputField::new("substitute_tax", "Imposta sostitutiva", OutputUnit::Currency),
            OutputField::new("total_due", "Totale tasse e contributi", OutputUnit::Currency),
            OutputField::new("net_income", "Reddito netto", OutputUnit::Currency),
            OutputField::new("effective_rate", "Incidenza sui ricavi", OutputUnit::Percent),
            OutputField::new("eligible", "Requisito ricavi entro 85.000 €", OutputUnit::Plain),
        ],
        chart: ChartDefinition::new(
            ChartKind::Pie,
            "Destinazione dei ricavi",
            &["net_income", "contributions", "substitute_tax"],
        ),
        history: HistoryPolicy::new("saved-results:fisco-it", 50),
    }
}
