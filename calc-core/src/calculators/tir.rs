//! Investment appraisal: internal rate of return ("TIR"), NPV and payback.
//!
//! Flows with more than one sign change may have several internal rates of
//! return. The IRR is then reported as unavailable together with a warning
//! flag, and the decision falls back to the NPV at the discount rate.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::Calculator;
use crate::calculations::common::{MAX_AMOUNT, round_half_up};
use crate::calculations::finance::{
    cumulative, irr, npv, payback_period, sign_changes, to_decimal, to_f64_flows,
};
use crate::format::Locale;
use crate::models::{
    CalculatorDefinition, ChartDefinition, ChartKind, ChartPoint, ChartSpec, HistoryPolicy,
    InputField, InputState, OutputField, OutputUnit, OutputValue, OutputValues,
};

pub const SLUG: &str = "calcolo-tir";

pub const DEFAULT_DISCOUNT_RATE: Decimal = dec!(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// IRR above the discount rate.
    IrrAboveRate,
    /// IRR at or below the discount rate.
    IrrBelowRate,
    /// No usable IRR; positive NPV.
    PositiveNpv,
    /// No usable IRR; zero or negative NPV.
    NegativeNpv,
}

impl Decision {
    pub fn message(&self) -> &'static str {
        match self {
            Self::IrrAboveRate => "Investimento conveniente: il TIR supera il tasso di attualizzazione",
            Self::IrrBelowRate => "Investimento non conveniente: il TIR non supera il tasso di attualizzazione",
            Self::PositiveNpv => "TIR non determinabile: il VAN positivo indica un investimento conveniente",
            Self::NegativeNpv => "TIR non determinabile: il VAN non positivo sconsiglia l'investimento",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TirInput {
    pub cash_flows: Vec<Decimal>,
    /// Discount rate in percent.
    pub discount_rate: Decimal,
}

impl TirInput {
    pub fn from_state(state: &InputState) -> Self {
        Self {
            cash_flows: state.series("cash_flows").to_vec(),
            discount_rate: state.number("discount_rate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TirResult {
    /// Internal rate of return in percent, `None` when it cannot be calculated.
    pub irr: Option<Decimal>,
    pub npv: Option<Decimal>,
    pub multiple_sign_changes: bool,
    /// Undiscounted payback in periods, `None` if the flows never pay back.
    pub payback: Option<Decimal>,
    pub decision: Decision,
    pub total_inflows: Decimal,
    pub total_outflows: Decimal,
    pub net_cash_flow: Decimal,
}

#[derive(Debug, Clone)]
pub struct Tir {
    definition: CalculatorDefinition,
}

impl Tir {
    pub fn new() -> Self {
        Self {
            definition: definition(),
        }
    }

    pub fn calculate(
        &self,
        input: &TirInput,
    ) -> TirResult {
        let flows = to_f64_flows(&input.cash_flows);
        let rate = (input.discount_rate / Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0);

        let multiple_sign_changes = sign_changes(&flows) > 1;
        let irr = if multiple_sign_changes {
            None
        } else {
            irr(&flows).and_then(|r| to_decimal(r * 100.0))
        };
        let npv = if flows.is_empty() {
            None
        } else {
            to_decimal(npv(rate, &flows)).map(round_half_up)
        };

        let decision = match (irr, npv) {
            (Some(irr), _) if irr > input.discount_rate => Decision::IrrAboveRate,
            (Some(_), _) => Decision::IrrBelowRate,
            (None, Some(npv)) if npv > Decimal::ZERO => Decision::PositiveNpv,
            (None, _) => Decision::NegativeNpv,
        };

        let total_inflows: Decimal = input
            .cash_flows
            .iter()
            .filter(|cf| cf.is_sign_positive())
            .sum();
        let total_outflows: Decimal = input
            .cash_flows
            .iter()
            .filter(|cf| cf.is_sign_negative())
            .map(|cf| cf.abs())
            .sum();

        TirResult {
            irr,
            npv,
            multiple_sign_changes,
            payback: payback_period(&input.cash_flows),
            decision,
            total_inflows,
            total_outflows,
            net_cash_flow: total_inflows - total_outflows,
        }
    }
}

impl Default for Tir {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator for Tir {
    fn definition(&self) -> &CalculatorDefinition {
        &self.definition
    }

    fn compute(
        &self,
        state: &InputState,
    ) -> OutputValues {
        let state = &self.definition.clamp_state(state);
        let result = self.calculate(&TirInput::from_state(state));
        OutputValues::new()
            .with("irr", result.irr)
            .with("npv", result.npv)
            .with("multiple_sign_changes", result.multiple_sign_changes)
            .with("payback", result.payback)
            .with("decision", OutputValue::Text(result.decision.message().to_string()))
            .with("total_inflows", result.total_inflows)
            .with("total_outflows", result.total_outflows)
            .with("net_cash_flow", result.net_cash_flow)
    }

    /// Cumulative cash flow per period.
    fn chart(
        &self,
        _outputs: &OutputValues,
        state: &InputState,
    ) -> ChartSpec {
        let state = self.definition.clamp_state(state);
        let points = cumulative(state.series("cash_flows"))
            .into_iter()
            .enumerate()
            .map(|(period, value)| ChartPoint {
                label: format!("Anno {period}"),
                value,
            })
            .collect();

        ChartSpec {
            kind: self.definition.chart.kind,
            title: self.definition.chart.title.clone(),
            points,
        }
    }
}

fn definition() -> CalculatorDefinition {
    CalculatorDefinition {
        slug: SLUG.to_string(),
        title: "Calcolo TIR e VAN".to_string(),
        locale: Locale::It,
        inputs: vec![
            InputField::series(
                "cash_flows",
                "Flussi di cassa per anno (anno 0 = investimento)",
                vec![
                    dec!(-50000),
                    dec!(15000),
                    dec!(20000),
                    dec!(25000),
                    dec!(15000),
                ],
            )
            .unit("€")
            .min(-MAX_AMOUNT)
            .max(MAX_AMOUNT),
            InputField::number("discount_rate", "Tasso di attualizzazione", DEFAULT_DISCOUNT_RATE)
                .unit("%")
                .min(dec!(-99))
                .max(dec!(1000))
                .step(dec!(0.1)),
        ],
        outputs: vec![
            OutputField::new("irr", "TIR", OutputUnit::Percent),
            OutputField::new("npv", "VAN al tasso di attualizzazione", OutputUnit::Currency),
            OutputField::new(
                "multiple_sign_changes",
                "Più cambi di segno nei flussi",
                OutputUnit::Plain,
            ),
            OutputField::new("payback", "Tempo di recupero", OutputUnit::Years),
            OutputField::new("decision", "Valutazione", OutputUnit::Plain),
            OutputField::new("total_inflows", "Totale entrate", OutputUnit::Currency),
            OutputField::new("total_outflows", "Totale uscite", OutputUnit::Currency),
            OutputField::new("net_cash_flow", "Flusso netto", OutputUnit::Currency),
        ],
        chart: ChartDefinition::new(ChartKind::Line, "Flusso di cassa cumulato", &[]),
        history: HistoryPolicy::new("saved-results:tir", 30),
    }
}
