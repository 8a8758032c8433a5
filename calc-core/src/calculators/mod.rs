//! The calculator catalogue.
//!
//! Every calculator follows the same shape: a typed input read from an
//! [`InputState`] (where empty fields are normalized), a pure `calculate`
//! step producing a typed result, and a conversion of that result into
//! [`OutputValues`] for display, history and export.

use std::sync::OnceLock;

use tracing::error;

use crate::calculations::brackets::BracketError;
use crate::models::{CalculatorDefinition, ChartPoint, ChartSpec, InputState, OutputValues};

pub mod assegno_unico;
pub mod forfettario;
pub mod irpef;
pub mod irpf;
pub mod severance;
pub mod succession;
pub mod tir;
pub mod vat;

pub use assegno_unico::AssegnoUnico;
pub use forfettario::Forfettario;
pub use irpef::Irpef;
pub use irpf::Irpf;
pub use severance::Severance;
pub use succession::Succession;
pub use tir::Tir;
pub use vat::Vat;

/// A single financial calculator.
///
/// `compute` must be a pure function of `state`: calling it twice with the
/// same state yields identical outputs, and every numeric output is finite.
pub trait Calculator: Send + Sync {
    fn definition(&self) -> &CalculatorDefinition;

    fn compute(
        &self,
        state: &InputState,
    ) -> OutputValues;

    /// Chart data summarizing `outputs`. Defaults to the outputs listed in
    /// the definition's chart, skipping any that are not numeric.
    fn chart(
        &self,
        outputs: &OutputValues,
        _state: &InputState,
    ) -> ChartSpec {
        outputs_chart(self.definition(), outputs)
    }

    fn slug(&self) -> &str {
        &self.definition().slug
    }
}

/// Builds a chart from the outputs named in `definition.chart`.
pub fn outputs_chart(
    definition: &CalculatorDefinition,
    outputs: &OutputValues,
) -> ChartSpec {
    let points = definition
        .chart
        .outputs
        .iter()
        .filter_map(|id| {
            let value = outputs.number(id)?;
            let label = definition.output(id).map_or(id.as_str(), |o| o.label.as_str());
            Some(ChartPoint {
                label: label.to_string(),
                value,
            })
        })
        .collect();

    ChartSpec {
        kind: definition.chart.kind,
        title: definition.chart.title.clone(),
        points,
    }
}

fn boxed<C: Calculator + 'static>(calculator: C) -> Box<dyn Calculator> {
    Box::new(calculator)
}

fn build_catalogue() -> Vec<Box<dyn Calculator>> {
    let built: [Result<Box<dyn Calculator>, BracketError>; 8] = [
        Irpf::new().map(boxed),
        Irpef::new().map(boxed),
        Ok(boxed(Forfettario::new())),
        Ok(boxed(AssegnoUnico::new())),
        Ok(boxed(Vat::new())),
        Ok(boxed(Tir::new())),
        Ok(boxed(Severance::new())),
        Ok(boxed(Succession::new())),
    ];

    built
        .into_iter()
        .filter_map(|calculator| {
            calculator
                .inspect_err(|e| error!("calculator left out of the catalogue: {}", e))
                .ok()
        })
        .collect()
}

/// Every available calculator, built once.
pub fn all() -> &'static [Box<dyn Calculator>] {
    static CATALOGUE: OnceLock<Vec<Box<dyn Calculator>>> = OnceLock::new();
    CATALOGUE.get_or_init(build_catalogue)
}

/// Looks up a calculator by slug.
pub fn find(slug: &str) -> Option<&'static dyn Calculator> {
    all().iter().find(|c| c.slug() == slug).map(|c| c.as_ref())
}

/// Slugs of every calculator in catalogue order.
pub fn slugs() -> Vec<&'static str> {
    all().iter().map(|c| c.slug()).collect()
}
