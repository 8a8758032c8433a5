//! Spanish dismissal compensation ("indemnización por despido").
//!
//! Compensation is a number of salary days per year of service, capped by
//! dismissal type. Unfair dismissals of contracts that started before the
//! 2012 labour reform accrue 45 days per year up to the reform date and
//! 33 days per year after it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::Calculator;
use crate::calculations::common::{MAX_AMOUNT, max, round_half_up, safe_ratio};
use crate::format::Locale;
use crate::models::{
    CalculatorDefinition, ChartDefinition, ChartKind, HistoryPolicy, InputField, InputState,
    OutputField, OutputUnit, OutputValues,
};

pub const SLUG: &str = "indemnizacion-despido";

const DAYS_PER_YEAR: Decimal = dec!(365);
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Date the 2012 labour reform took effect.
fn labour_reform() -> NaiveDate {
    NaiveDate::from_ymd_opt(2012, 2, 12).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissalType {
    /// Despido improcedente.
    Unfair,
    /// Despido objetivo.
    Objective,
    /// Fin de contrato temporal.
    EndOfTemporaryContract,
    /// Despido disciplinario procedente.
    FairDisciplinary,
}

impl DismissalType {
    fn from_choice(choice: &str) -> Self {
        match choice {
            "objetivo" => Self::Objective,
            "fin_contrato" => Self::EndOfTemporaryContract,
            "procedente" => Self::FairDisciplinary,
            _ => Self::Unfair,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveranceInput {
    pub annual_salary: Decimal,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub dismissal: DismissalType,
}

impl SeveranceInput {
    pub fn from_state(state: &InputState) -> Self {
        Self {
            annual_salary: state.number("annual_salary"),
            start_date: state.date("start_date"),
            end_date: state.date("end_date"),
            dismissal: DismissalType::from_choice(state.choice("dismissal_type")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveranceResult {
    pub daily_salary: Decimal,
    /// `None` when a date is missing or the end precedes the start.
    pub seniority_years: Option<Decimal>,
    pub compensation_days: Option<Decimal>,
    pub compensation: Option<Decimal>,
    pub months_of_salary: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct Severance {
    definition: CalculatorDefinition,
}

impl Severance {
    pub fn new() -> Self {
        Self {
            definition: definition(),
        }
    }

    pub fn calculate(
        &self,
        input: &SeveranceInput,
    ) -> SeveranceResult {
        let annual_salary = max(input.annual_salary, Decimal::ZERO);
        let daily_salary = annual_salary / DAYS_PER_YEAR;

        let service = match (input.start_date, input.end_date) {
            (Some(start), Some(end)) if end >= start => Some((start, end)),
            _ => None,
        };
        let days = service.map(|(start, end)| compensation_days(input.dismissal, start, end));
        let compensation = days.map(|d| round_half_up(d * daily_salary));
        let monthly_salary = annual_salary / MONTHS_PER_YEAR;

        SeveranceResult {
            daily_salary: round_half_up(daily_salary),
            seniority_years: service.map(|(start, end)| round_half_up(years_between(start, end))),
            compensation_days: days.map(round_half_up),
            compensation,
            months_of_salary: compensation.map(|c| round_half_up(safe_ratio(c, monthly_salary))),
        }
    }
}

fn years_between(
    start: NaiveDate,
    end: NaiveDate,
) -> Decimal {
    Decimal::from((end - start).num_days()) / DAYS_PER_YEAR
}

/// Salary days owed for service between `start` and `end`.
pub fn compensation_days(
    dismissal: DismissalType,
    start: NaiveDate,
    end: NaiveDate,
) -> Decimal {
    match dismissal {
        DismissalType::Unfair => unfair_days(start, end),
        DismissalType::Objective => (dec!(20) * years_between(start, end)).min(dec!(360)),
        DismissalType::EndOfTemporaryContract => dec!(12) * years_between(start, end),
        DismissalType::FairDisciplinary => Decimal::ZERO,
    }
}

fn unfair_days(
    start: NaiveDate,
    end: NaiveDate,
) -> Decimal {
    let reform = labour_reform();
    if start >= reform {
        return (dec!(33) * years_between(start, end)).min(dec!(720));
    }

    let before = dec!(45) * years_between(start, end.min(reform));
    let after = if end > reform {
        dec!(33) * years_between(reform, end)
    } else {
        Decimal::ZERO
    };

    // Service before the reform already worth more than 720 days keeps
    // that amount, up to 1260 days, and accrues nothing afterwards.
    if before > dec!(720) {
        before.min(dec!(1260))
    } else {
        (before + after).min(dec!(720))
    }
}

impl Default for Severance {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator for Severance {
    fn definition(&self) -> &CalculatorDefinition {
        &self.definition
    }

    fn compute(
        &self,
        state: &InputState,
    ) -> OutputValues {
        let state = &self.definition.clamp_state(state);
        let input = SeveranceInput::from_state(state);
        let result = self.calculate(&input);
        OutputValues::new()
            .with("annual_salary", max(input.annual_salary, Decimal::ZERO))
            .with("daily_salary", result.daily_salary)
            .with("seniority_years", result.seniority_years)
            .with("compensation_days", result.compensation_days)
            .with("compensation", result.compensation)
            .with("months_of_salary", result.months_of_salary)
    }
}

fn definition() -> CalculatorDefinition {
    CalculatorDefinition {
        slug: SLUG.to_string(),
        title: "Calculadora de indemnización por despido".to_string(),
        locale: Locale::Es,
        inputs: vec![
            InputField::number("annual_salary", "Salario bruto anual", dec!(30000))
                .unit("€")
                .min(Decimal::ZERO)
                .max(MAX_AMOUNT)
                .step(dec!(100)),
            InputField::date(
                "start_date",
                "Fecha de inicio del contrato",
                NaiveDate::from_ymd_opt(2015, 3, 1),
            ),
            InputField::date("end_date", "Fecha de despido", NaiveDate::from_ymd_opt(2025, 3, 1)),
            InputField::select(
                "dismissal_type",
                "Tipo de despido",
                &[
                    ("improcedente", "Despido improcedente"),
                    ("objetivo", "Despido objetivo"),
                    ("fin_contrato", "Fin de contrato temporal"),
                    ("procedente", "Despido disciplinario procedente"),
                ],
                "improcedente",
            ),
        ],
        outputs: vec![
            OutputField::new("annual_salary", "Salario anual", OutputUnit::Currency),
            OutputField::new("daily_salary", "Salario diario", OutputUnit::Currency),
            OutputField::new("seniority_years", "Antigüedad", OutputUnit::Years),
            OutputField::new("compensation_days", "Días de indemnización", OutputUnit::Days),
            OutputField::new("compensation", "Indemnización", OutputUnit::Currency),
            OutputField::new("months_of_salary", "Equivale a", OutputUnit::Months),
        ],
        chart: ChartDefinition::new(
            ChartKind::Bar,
            "Indemnización frente al salario anual",
            &["compensation", "annual_salary"],
        ),
        history: HistoryPolicy::new("saved-results:despido", 10),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{InputValue, OutputValue};

    fn date(
        y: i32,
        m: u32,
        d: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input(
        dismissal: DismissalType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> SeveranceInput {
        SeveranceInput {
            annual_salary: dec!(30000),
            start_date: Some(start),
            end_date: Some(end),
            dismissal,
        }
    }

    #[test]
    fn unfair_after_reform() {
        let result = Severance::new().calculate(&input(
            DismissalType::Unfair,
            date(2015, 3, 1),
            date(2025, 3, 1),
        ));

        assert_eq!(result.seniority_years, Some(dec!(10.01)));
        assert_eq!(result.compensation_days, Some(dec!(330.27)));
        assert_eq!(result.compensation, Some(dec!(27145.58)));
    }

    #[test]
    fn unfair_spanning_reform_is_capped_at_720_days() {
        let days = compensation_days(DismissalType::Unfair, date(2000, 1, 1), date(2020, 1, 1));

        assert_eq!(days, dec!(720));
    }

    #[test]
    fn unfair_long_pre_reform_service_keeps_its_days() {
        let days = compensation_days(DismissalType::Unfair, date(1990, 1, 1), date(2020, 1, 1));

        assert_eq!(round_half_up(days), dec!(995.79));
    }

    #[test]
    fn unfair_pre_reform_transitional_cap() {
        let days = compensation_days(DismissalType::Unfair, date(1975, 1, 1), date(2020, 1, 1));

        assert_eq!(days, dec!(1260));
    }

    #[test]
    fn objective_dismissal() {
        let mut objective = input(DismissalType::Objective, date(2020, 1, 1), date(2023, 1, 1));
        objective.annual_salary = dec!(36500);

        let result = Severance::new().calculate(&objective);
        assert_eq!(result.daily_salary, dec!(100));
        assert_eq!(result.compensation_days, Some(dec!(60.05)));
        assert_eq!(result.compensation, Some(dec!(6005.48)));
    }

    #[test]
    fn objective_dismissal_cap() {
        let days = compensation_days(DismissalType::Objective, date(1990, 1, 1), date(2020, 1, 1));

        assert_eq!(days, dec!(360));
    }

    #[test]
    fn fair_dismissal_pays_nothing() {
        let result = Severance::new().calculate(&input(
            DismissalType::FairDisciplinary,
            date(2015, 3, 1),
            date(2025, 3, 1),
        ));

        assert_eq!(result.compensation, Some(Decimal::ZERO));
    }

    #[test]
    fn end_before_start_is_unavailable() {
        let calculator = Severance::new();
        let mut state = calculator.definition().default_state();
        state.insert("end_date", InputValue::Date(Some(date(2010, 1, 1))));

        let outputs = calculator.compute(&state);
        assert_eq!(outputs.get("compensation"), Some(&OutputValue::Unavailable));
        assert_eq!(outputs.get("seniority_years"), Some(&OutputValue::Unavailable));
        assert!(outputs.number("daily_salary").is_some());
    }

    #[test]
    fn missing_date_is_unavailable() {
        let calculator = Severance::new();
        let mut state = calculator.definition().default_state();
        state.insert("start_date", InputValue::Date(None));

        assert_eq!(
            calculator.compute(&state).get("compensation"),
            Some(&OutputValue::Unavailable)
        );
    }
}
