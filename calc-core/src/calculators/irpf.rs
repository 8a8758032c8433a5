//! Spanish personal income tax (IRPF) for salaried workers.
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Social security: 6.47 % of gross income, or an amount typed by the user |
//! | 2    | Taxable base: gross − social security − other deductible expenses, minimum 0 |
//! | 3    | Tax: schedule(base) − schedule(min(personal minimum, base)) |
//! | 4    | Net income: gross − social security − tax, split over 12 or 14 payments |
//! | 5    | Balance: tax − withholdings (negative means a refund) |
//!
//! The schedule combines the state and regional scales into the single
//! general scale 19 / 24 / 30 / 37 / 45 / 47 %.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::Calculator;
use crate::calculations::brackets::{Bracket, BracketError, BracketSchedule};
use crate::calculations::common::{
    MAX_AMOUNT, max, percent_of, round_half_up, safe_percent, safe_ratio,
};
use crate::format::Locale;
use crate::models::{
    CalculatorDefinition, ChartDefinition, ChartKind, Condition, HistoryPolicy, InputField,
    InputState, OutputField, OutputUnit, OutputValues,
};

pub const SLUG: &str = "calculadora-irpf";

/// Employee social security rate (common contingencies, unemployment, training, MEI).
pub const SOCIAL_SECURITY_RATE: Decimal = dec!(6.47);
pub const DEFAULT_OTHER_EXPENSES: Decimal = dec!(2000);
pub const DEFAULT_PERSONAL_MINIMUM: Decimal = dec!(5550);

/// General IRPF scale (state + regional combined).
pub fn general_schedule() -> Result<BracketSchedule, BracketError> {
    BracketSchedule::new(vec![
        Bracket::up_to(dec!(12450), dec!(0.19)),
        Bracket::up_to(dec!(20200), dec!(0.24)),
        Bracket::up_to(dec!(35200), dec!(0.30)),
        Bracket::up_to(dec!(60000), dec!(0.37)),
        Bracket::up_to(dec!(300000), dec!(0.45)),
        Bracket::open(dec!(0.47)),
    ])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrpfInput {
    pub gross_income: Decimal,
    /// `None` when social security is computed automatically.
    pub manual_social_security: Option<Decimal>,
    pub other_expenses: Decimal,
    pub personal_minimum: Decimal,
    pub withholding: Decimal,
    /// 12 or 14 yearly payments.
    pub payments: u32,
}

impl IrpfInput {
    pub fn from_state(state: &InputState) -> Self {
        let automatic = state.get("ss_automatic").is_none() || state.flag("ss_automatic");
        let manual_social_security = (!automatic).then(|| state.number("social_security"));
        Self {
            gross_income: state.number("gross_income"),
            manual_social_security,
            other_expenses: state.number("other_expenses"),
            personal_minimum: state.number("personal_minimum"),
            withholding: state.number("withholding"),
            payments: if state.choice("payments") == "12" { 12 } else { 14 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrpfResult {
    pub social_security: Decimal,
    pub taxable_base: Decimal,
    pub tax: Decimal,
    /// In percent; zero while the personal minimum covers the whole base.
    pub marginal_rate: Decimal,
    /// Tax over gross income, in percent; zero for an empty income.
    pub effective_rate: Decimal,
    pub net_annual: Decimal,
    pub net_monthly: Decimal,
    /// Positive: amount to pay with the annual return. Negative: refund.
    pub balance: Decimal,
}

#[derive(Debug, Clone)]
pub struct Irpf {
    definition: CalculatorDefinition,
    schedule: BracketSchedule,
}

impl Irpf {
    pub fn new() -> Result<Self, BracketError> {
        Ok(Self::with_schedule(general_schedule()?))
    }

    /// Uses a custom scale, e.g. a region with its own regional half.
    pub fn with_schedule(schedule: BracketSchedule) -> Self {
        Self {
            definition: definition(),
            schedule,
        }
    }

    pub fn calculate(
        &self,
        input: &IrpfInput,
    ) -> IrpfResult {
        let social_security = self.social_security(input);
        let taxable_base = max(
            input.gross_income - social_security - input.other_expenses,
            Decimal::ZERO,
        );
        let tax = round_half_up(self.tax(taxable_base, input.personal_minimum));
        let net_annual = input.gross_income - social_security - tax;
        let marginal_rate = if taxable_base <= input.personal_minimum {
            Decimal::ZERO
        } else {
            self.schedule.marginal_rate(taxable_base) * Decimal::ONE_HUNDRED
        };

        IrpfResult {
            social_security,
            taxable_base,
            tax,
            marginal_rate,
            effective_rate: safe_percent(tax, input.gross_income),
            net_annual,
            net_monthly: round_half_up(safe_ratio(net_annual, Decimal::from(input.payments))),
            balance: tax - input.withholding,
        }
    }

    fn social_security(
        &self,
        input: &IrpfInput,
    ) -> Decimal {
        match input.manual_social_security {
            Some(amount) => amount,
            None => round_half_up(percent_of(input.gross_income, SOCIAL_SECURITY_RATE)),
        }
    }

    /// The personal minimum is taxed at zero by subtracting the tax it
    /// would bear at the bottom of the scale.
    fn tax(
        &self,
        taxable_base: Decimal,
        personal_minimum: Decimal,
    ) -> Decimal {
        let exempt = personal_minimum.min(taxable_base).max(Decimal::ZERO);
        self.schedule.tax(taxable_base) - self.schedule.tax(exempt)
    }
}

impl Calculator for Irpf {
    fn definition(&self) -> &CalculatorDefinition {
        &self.definition
    }

    fn compute(
        &self,
        state: &InputState,
    ) -> OutputValues {
        let state = &self.definition.clamp_state(state);
        let result = self.calculate(&IrpfInput::from_state(state));
        OutputValues::new()
            .with("social_security", result.social_security)
            .with("taxable_base", result.taxable_base)
            .with("tax", result.tax)
            .with("marginal_rate", result.marginal_rate)
            .with("effective_rate", result.effective_rate)
            .with("net_annual", result.net_annual)
            .with("net_monthly", result.net_monthly)
            .with("balance", result.balance)
    }
}

fn definition() -> CalculatorDefinition {
    CalculatorDefinition {
        slug: SLUG.to_string(),
        title: "Calculadora de IRPF".to_string(),
        locale: Locale::Es,
        inputs: vec![
            InputField::number("gross_income", "Salario bruto anual", dec!(30000))
                .unit("€")
                .min(Decimal::ZERO)
                .max(MAX_AMOUNT)
                .step(dec!(100)),
            InputField::boolean(
                "ss_automatic",
                "Calcular la Seguridad Social automáticamente",
                true,
            ),
            InputField::number("social_security", "Cotizaciones a la Seguridad Social", Decimal::ZERO)
                .unit("€")
                .min(Decimal::ZERO)
                .max(MAX_AMOUNT)
                .visible_when(Condition::is_off("ss_automatic")),
            InputField::number("other_expenses", "Otros gastos deducibles", DEFAULT_OTHER_EXPENSES)
                .unit("€")
                .min(Decimal::ZERO)
                .max(MAX_AMOUNT),
            InputField::number("personal_minimum", "Mínimo personal y familiar", DEFAULT_PERSONAL_MINIMUM)
                .unit("€")
                .min(Decimal::ZERO)
                .max(MAX_AMOUNT),
            InputField::number("withholding", "Retenciones practicadas", Decimal::ZERO)
                .unit("€")
                .min(Decimal::ZERO)
                .max(MAX_AMOUNT),
            InputField::select(
                "payments",
                "Número de pagas",
                &[("12", "12 pagas"), ("14", "14 pagas")],
                "14",
            ),
        ],
        outputs: vec![
            OutputField::new("social_security", "Seguridad Social", OutputUnit::Currency),
            OutputField::new("taxable_base", "Base liquidable", OutputUnit::Currency),
            OutputField::new("tax", "Cuota íntegra de IRPF", OutputUnit::Currency),
            OutputField::new("marginal_rate", "Tipo marginal", OutputUnit::Percent),
            OutputField::new("effective_rate", "Tipo efectivo", OutputUnit::Percent),
            OutputField::new("net_annual", "Salario neto anual", OutputUnit::Currency),
            OutputField::new("net_monthly", "Salario neto por paga", OutputUnit::Currency),
            OutputField::new("balance", "Resultado de la declaración", OutputUnit::Currency),
        ],
        chart: ChartDefinition::new(
            ChartKind::Pie,
            "Reparto del salario bruto",
            &["net_annual", "tax", "social_security"],
        ),
        history: HistoryPolicy::new("saved-results:irpf", 10),
    }
}
