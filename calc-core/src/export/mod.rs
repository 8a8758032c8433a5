//! Export of a calculator result as a downloadable document.
//!
//! A [`ResultReport`] is the locale-formatted, renderer-independent view of
//! one result. [`Exporter`]s turn it into a [`Document`]; they are injected by
//! front ends and the core never picks one itself.

mod csv;
mod json;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::format::{Locale, format_input, format_output};
use crate::models::{CalculatorDefinition, ChartSpec, InputState, OutputValues};

pub use self::csv::CsvExporter;
pub use self::json::JsonExporter;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("could not write CSV: {0}")]
    Csv(String),

    #[error("could not encode JSON: {0}")]
    Json(String),
}

/// One labelled, formatted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    pub id: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultReport {
    pub slug: String,
    pub title: String,
    pub locale: Locale,
    pub generated_at: DateTime<Utc>,
    /// Visible inputs only, in declaration order.
    pub inputs: Vec<ReportLine>,
    pub outputs: Vec<ReportLine>,
    pub chart: ChartSpec,
}

impl ResultReport {
    pub fn build(
        definition: &CalculatorDefinition,
        state: &InputState,
        outputs: &OutputValues,
        chart: ChartSpec,
        locale: Locale,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let inputs = definition
            .active_inputs(state)
            .filter_map(|field| {
                state.get(&field.id).map(|value| ReportLine {
                    id: field.id.clone(),
                    label: field.label.clone(),
                    value: format_input(field, value, locale),
                })
            })
            .collect();

        let outputs = definition
            .outputs
            .iter()
            .filter_map(|field| {
                outputs.get(&field.id).map(|value| ReportLine {
                    id: field.id.clone(),
                    label: field.label.clone(),
                    value: format_output(value, field.unit, locale),
                })
            })
            .collect();

        Self {
            slug: definition.slug.clone(),
            title: definition.title.clone(),
            locale,
            generated_at,
            inputs,
            outputs,
            chart,
        }
    }

    /// File name for a document with extension `ext`, e.g. `calcolatore-iva-20250101-120000.csv`.
    pub fn file_name(
        &self,
        ext: &str,
    ) -> String {
        format!(
            "{}-{}.{ext}",
            self.slug,
            self.generated_at.format("%Y%m%d-%H%M%S")
        )
    }
}

/// Encoded report ready to be written to disk or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Capability that encodes a report into a document.
pub trait Exporter {
    fn export(
        &self,
        report: &ResultReport,
    ) -> Result<Document, ExportError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{TimeZone, Utc};

    use super::ResultReport;
    use crate::calculators::{Calculator, Vat};
    use crate::format::Locale;

    /// Report of the VAT calculator at its defaults.
    pub fn vat_report(locale: Locale) -> ResultReport {
        let vat = Vat::new();
        let state = vat.definition().default_state();
        let outputs = vat.compute(&state);
        ResultReport::build(
            vat.definition(),
            &state,
            &outputs,
            vat.chart(&outputs, &state),
            locale,
            Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::test_support::vat_report;
    use super::*;

    #[test]
    fn report_formats_inputs_and_outputs_for_locale() {
        let report = vat_report(Locale::It);

        let gross = report.outputs.iter().find(|l| l.id == "gross").unwrap();
        assert_eq!(gross.label, "Totale IVA inclusa");
        assert_eq!(gross.value, "122,00 €");

        let rate = report.inputs.iter().find(|l| l.id == "rate").unwrap();
        assert_eq!(rate.value, "22% ordinaria");
    }

    #[test]
    fn report_lists_only_visible_inputs() {
        let report = vat_report(Locale::En);

        let ids: Vec<&str> = report.inputs.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["amount", "mode", "rate"]);
    }

    #[test]
    fn file_name_uses_slug_and_timestamp() {
        assert_eq!(
            vat_report(Locale::En).file_name("csv"),
            "calcolatore-iva-20250101-120000.csv"
        );
    }
}
