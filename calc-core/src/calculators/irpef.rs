//! Italian personal income tax (IRPEF) with regional and municipal surcharges.
//!
//! Gross tax uses the three-bracket scale 23 / 35 / 43 %. Employment and
//! pension income earn a deduction that shrinks as income grows and is
//! prorated by the days worked in the year.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::Calculator;
use crate::calculations::brackets::{Bracket, BracketError, BracketSchedule};
use crate::calculations::common::{MAX_AMOUNT, max, percent_of, round_half_up, safe_percent};
use crate::format::Locale;
use crate::models::{
    CalculatorDefinition, ChartDefinition, ChartKind, HistoryPolicy, InputField, InputState,
    OutputField, OutputUnit, OutputValues,
};

pub const SLUG: &str = "calcolo-irpef";

const DAYS_IN_YEAR: Decimal = dec!(365);

pub fn irpef_schedule() -> Result<BracketSchedule, BracketError> {
    BracketSchedule::new(vec![
        Bracket::up_to(dec!(28000), dec!(0.23)),
        Bracket::up_to(dec!(50000), dec!(0.35)),
        Bracket::open(dec!(0.43)),
    ])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeType {
    Employee,
    Pensioner,
    SelfEmployed,
}

impl IncomeType {
    fn from_choice(choice: &str) -> Self {
        match choice {
            "pensione" => Self::Pensioner,
            "autonomo" => Self::SelfEmployed,
            _ => Self::Employee,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrpefInput {
    pub income: Decimal,
    pub income_type: IncomeType,
    /// Days of employment or pension in the year, 1 to 365.
    pub days: Decimal,
    /// Regional surcharge in percent.
    pub regional_rate: Decimal,
    /// Municipal surcharge in percent.
    pub municipal_rate: Decimal,
}

impl IrpefInput {
    pub fn from_state(state: &InputState) -> Self {
        Self {
            income: state.number("income"),
            income_type: IncomeType::from_choice(state.choice("income_type")),
            days: state.number_or("days", DAYS_IN_YEAR),
            regional_rate: state.number("regional_rate"),
            municipal_rate: state.number("municipal_rate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrpefResult {
    pub gross_tax: Decimal,
    pub deduction: Decimal,
    pub net_tax: Decimal,
    pub regional_surcharge: Decimal,
    pub municipal_surcharge: Decimal,
    pub total_tax: Decimal,
    pub net_income: Decimal,
    pub marginal_rate: Decimal,
    pub effective_rate: Decimal,
}

#[derive(Debug, Clone)]
pub struct Irpef {
    definition: CalculatorDefinition,
    schedule: BracketSchedule,
}

impl Irpef {
    pub fn new() -> Result<Self, BracketError> {
        Ok(Self {
            definition: definition(),
            schedule: irpef_schedule()?,
        })
    }

    pub fn calculate(
        &self,
        input: &IrpefInput,
    ) -> IrpefResult {
        let income = max(input.income, Decimal::ZERO);
        let gross_tax = round_half_up(self.schedule.tax(income));
        let deduction = round_half_up(self.deduction(input));
        let net_tax = max(gross_tax - deduction, Decimal::ZERO);
        let regional_surcharge = round_half_up(percent_of(income, input.regional_rate));
        let municipal_surcharge = round_half_up(percent_of(income, input.municipal_rate));
        let total_tax = net_tax + regional_surcharge + municipal_surcharge;

        IrpefResult {
            gross_tax,
            deduction,
            net_tax,
            regional_surcharge,
            municipal_surcharge,
            total_tax,
            net_income: income - total_tax,
            marginal_rate: self.schedule.marginal_rate(income) * Decimal::ONE_HUNDRED,
            effective_rate: safe_percent(total_tax, income),
        }
    }

    fn deduction(
        &self,
        input: &IrpefInput,
    ) -> Decimal {
        let days = input.days.clamp(Decimal::ZERO, DAYS_IN_YEAR);
        let share = days / DAYS_IN_YEAR;
        match input.income_type {
            IncomeType::Employee => employee_deduction(input.income, share),
            IncomeType::Pensioner => pension_deduction(input.income, share),
            IncomeType::SelfEmployed => Decimal::ZERO,
        }
    }
}

/// Employment income deduction (art. 13 TUIR), prorated by `share` of the year.
pub fn employee_deduction(
    income: Decimal,
    share: Decimal,
) -> Decimal {
    if income <= dec!(15000) {
        // The floor applies to the prorated amount.
        return (dec!(1955) * share).max(dec!(690));
    }
    let base = if income <= dec!(28000) {
        dec!(1910) + dec!(1190) * (dec!(28000) - income) / dec!(13000)
    } else if income <= dec!(50000) {
        dec!(1910) * (dec!(50000) - income) / dec!(22000)
    } else {
        Decimal::ZERO
    };

    let bonus = if income > dec!(25000) && income <= dec!(35000) {
        dec!(65)
    } else {
        Decimal::ZERO
    };

    (base + bonus) * share
}

/// Pension income deduction, prorated by `share` of the year.
pub fn pension_deduction(
    income: Decimal,
    share: Decimal,
) -> Decimal {
    if income <= dec!(8500) {
        return (dec!(1955) * share).max(dec!(713));
    }
    let base = if income <= dec!(28000) {
        dec!(700) + dec!(1255) * (dec!(28000) - income) / dec!(19500)
    } else if income <= dec!(50000) {
        dec!(700) * (dec!(50000) - income) / dec!(22000)
    } else {
        Decimal::ZERO
    };
    base * share
}

impl Calculator for Irpef {
    fn definition(&self) -> &CalculatorDefinition {
        &self.definition
    }

    fn compute(
        &self,
        state: &InputState,
    ) -> OutputValues {
        let state = &self.definition.clamp_state(state);
        let result = self.calculate(&IrpefInput::from_state(state));
        OutputValues::new()
            .with("gross_tax", result.gross_tax)
            .with("deduction", result.deduction)
            .with("net_tax", result.net_tax)
            .with("regional_surcharge", result.regional_surcharge)
            .with("municipal_surcharge", result.municipal_surcharge)
            .with("total_tax", result.total_tax)
            .with("net_income", result.net_income)
            .with("marginal_rate", result.marginal_rate)
            .with("effective_rate", result.effective_rate)
    }
}

fn definition() -> CalculatorDefinition {
    CalculatorDefinition {
        slug: SLUG.to_string(),
        title: "Calcolo IRPEF".to_string(),
        locale: Locale::It,
        inputs: vec![
            InputField::number("income", "Reddito complessivo annuo", dec!(35000))
                .unit("€")
                .min(Decimal::ZERO)
                .max(MAX_AMOUNT)
                .step(dec!(100)),
            InputField::select(
                "income_type",
                "Tipo di reddito",
                &[
                    ("dipendente", "Lavoro dipendente"),
                    ("pensione", "Pensione"),
                    ("autonomo", "Lavoro autonomo"),
                ],
                "dipendente",
            ),
            InputField::number("days", "Giorni di lavoro o pensione", DAYS_IN_YEAR)
                .min(Decimal::ONE)
                .max(DAYS_IN_YEAR)
                .step(Decimal::ONE),
            InputField::number("regional_rate", "Addizionale regionale", dec!(1.73))
                .unit("%")
                .min(Decimal::ZERO)
                .max(dec!(3.33))
                .step(dec!(0.01)),
            InputField::number("municipal_rate", "Addizionale comunale", dec!(0.8))
                .unit("%")
                .min(Decimal::ZERO)
                .max(dec!(0.9))
                .step(dec!(0.01)),
        ],
        outputs: vec![
            OutputField::new("gross_tax", "Imposta lorda", OutputUnit::Currency),
            OutputField::new("deduction", "Detrazioni", OutputUnit::Currency),
            OutputField::new("net_tax", "Imposta netta", OutputUnit::Currency),
            OutputField::new("regional_surcharge", "Addizionale regionale", OutputUnit::Currency),
            OutputField::new("municipal_surcharge", "Addizionale comunale", OutputUnit::Currency),
            OutputField::new("total_tax", "Totale imposte", OutputUnit::Currency),
            OutputField::new("net_income", "Reddito netto", OutputUnit::Currency),
            OutputField::new("marginal_rate", "Aliquota marginale", OutputUnit::Percent),
            OutputField::new("effective_rate", "Aliquota media", OutputUnit::Percent),
        ],
        chart: ChartDefinition::new(
            ChartKind::Bar,
            "Composizione delle imposte",
            &["net_tax", "regional_surcharge", "municipal_surcharge"],
        ),
        history: HistoryPolicy::new("saved-results:fisco-it", 50),
    }
}
