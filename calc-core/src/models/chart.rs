use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

/// Which outputs a calculator summarizes in its chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDefinition {
    pub kind: ChartKind,
    pub title: String,
    /// Output ids plotted, in order.
    pub outputs: Vec<String>,
}

impl ChartDefinition {
    pub fn new(
        kind: ChartKind,
        title: &str,
        outputs: &[&str],
    ) -> Self {
        Self {
            kind,
            title: title.to_string(),
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: Decimal,
}

/// Data handed to a chart renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("chart '{0}' has no data points")]
    Empty(String),
}

/// Capability that turns chart data into a rendered artifact.
///
/// Calculators never depend on a concrete renderer; front ends inject one.
pub trait ChartRenderer {
    fn render(
        &self,
        spec: &ChartSpec,
    ) -> Result<String, ChartError>;
}
