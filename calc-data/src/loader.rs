use std::io::{Read, Write};

use calc_core::{
    Calculator, CalculatorDefinition, InputState, InputValue, OutputValue, OutputValues,
};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur when loading scenario files.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Column '{0}' is not a field of this calculator")]
    UnknownField(String),

    #[error("Row {row}: '{value}' is not an option of field '{field}'")]
    InvalidChoice {
        row: usize,
        field: String,
        value: String,
    },
}

impl From<csv::Error> for ScenarioError {
    fn from(err: csv::Error) -> Self {
        ScenarioError::CsvParse(err.to_string())
    }
}

/// Loader for batches of calculator inputs from CSV files.
///
/// The header names field ids of one calculator, in any order. Columns may
/// be omitted; omitted fields keep their defaults. Every cell is parsed the
/// way the interactive front ends parse typed text, so an empty numeric cell
/// is an empty field.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Parse one input state per data row.
    ///
    /// Rows are numbered from 1, the header excluded.
    pub fn parse<R: Read>(
        reader: R,
        definition: &CalculatorDefinition,
    ) -> Result<Vec<InputState>, ScenarioError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let fields = csv_reader
            .headers()?
            .iter()
            .map(|id| {
                definition
                    .field(id)
                    .ok_or_else(|| ScenarioError::UnknownField(id.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut states = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record = record?;
            let row = index + 1;
            let mut state = definition.default_state();

            for (field, raw) in fields.iter().zip(record.iter()) {
                let value = InputValue::parse(field.kind, raw);
                if let InputValue::Choice(choice) = &value {
                    if !field.has_option(choice) {
                        return Err(ScenarioError::InvalidChoice {
                            row,
                            field: field.id.clone(),
                            value: choice.clone(),
                        });
                    }
                }

                let clamped = field.clamp(value.clone());
                if clamped != value {
                    warn!(row, field = %field.id, "value clamped to {}", clamped.display());
                }
                state.insert(field.id.as_str(), clamped);
            }
            states.push(state);
        }

        Ok(states)
    }
}

/// Computes every scenario.
pub fn run(
    calculator: &dyn Calculator,
    states: &[InputState],
) -> Vec<OutputValues> {
    states.iter().map(|state| calculator.compute(state)).collect()
}

/// Writes one CSV row per result, with a `scenario` column followed by the
/// calculator's output ids. Unavailable values are written as empty cells.
pub fn write_results<W: Write>(
    writer: W,
    definition: &CalculatorDefinition,
    results: &[OutputValues],
) -> Result<(), ScenarioError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["scenario"];
    header.extend(definition.outputs.iter().map(|o| o.id.as_str()));
    csv_writer.write_record(&header)?;

    for (index, outputs) in results.iter().enumerate() {
        let mut record = vec![(index + 1).to_string()];
        record.extend(
            definition
                .outputs
                .iter()
                .map(|o| outputs.get(&o.id).map(raw_value).unwrap_or_default()),
        );
        csv_writer.write_record(&record)?;
    }

    csv_writer
        .flush()
        .map_err(|e| ScenarioError::CsvParse(e.to_string()))?;
    Ok(())
}

fn raw_value(value: &OutputValue) -> String {
    match value {
        OutputValue::Number(n) => n.normalize().to_string(),
        OutputValue::Text(text) => text.clone(),
        OutputValue::Flag(flag) => flag.to_string(),
        OutputValue::Unavailable => String::new(),
    }
}
