//! Editing state of one calculator.
//!
//! A session owns the current [`InputState`] and the [`OutputValues`] derived
//! from it. Every accepted edit replaces exactly one field and recomputes the
//! outputs in full; later edits simply overwrite earlier ones.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculators::Calculator;
use crate::export::{Document, ExportError, Exporter, ResultReport};
use crate::format::Locale;
use crate::models::{
    CalculatorDefinition, ChartSpec, FieldKind, InputField, InputState, InputValue, OutputValues,
    SavedResult,
};
use crate::store::{HistoryError, ResultHistory};

/// Errors raised when an edit is rejected. The session is left unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("field '{field}' expects a {expected} value, got {actual}")]
    KindMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("'{value}' is not an option of field '{field}'")]
    InvalidChoice { field: String, value: String },
}

pub struct CalculatorSession<'a> {
    calculator: &'a dyn Calculator,
    state: InputState,
    outputs: OutputValues,
}

impl<'a> CalculatorSession<'a> {
    /// Starts a session at the calculator's defaults.
    pub fn new(calculator: &'a dyn Calculator) -> Self {
        let state = calculator.definition().default_state();
        let outputs = calculator.compute(&state);
        Self {
            calculator,
            state,
            outputs,
        }
    }

    pub fn definition(&self) -> &CalculatorDefinition {
        self.calculator.definition()
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn outputs(&self) -> &OutputValues {
        &self.outputs
    }

    /// Fields visible for the current state.
    pub fn active_inputs(&self) -> Vec<&InputField> {
        self.definition().active_inputs(&self.state).collect()
    }

    pub fn chart(&self) -> ChartSpec {
        self.calculator.chart(&self.outputs, &self.state)
    }

    /// Replaces the value of field `id`.
    ///
    /// Numeric values are clamped to the field's bounds before they are
    /// stored. Returns the value actually stored.
    pub fn set_field(
        &mut self,
        id: &str,
        value: InputValue,
    ) -> Result<InputValue, SessionError> {
        let field = self
            .calculator
            .definition()
            .field(id)
            .ok_or_else(|| SessionError::UnknownField(id.to_string()))?;

        if value.kind() != field.kind {
            return Err(SessionError::KindMismatch {
                field: id.to_string(),
                expected: field.kind.as_str(),
                actual: value.kind().as_str(),
            });
        }
        if let InputValue::Choice(choice) = &value {
            if !field.has_option(choice) {
                return Err(SessionError::InvalidChoice {
                    field: id.to_string(),
                    value: choice.clone(),
                });
            }
        }

        let clamped = field.clamp(value.clone());
        if clamped != value {
            warn!(field = id, "value clamped to {}", clamped.display());
        }

        self.state.insert(id, clamped.clone());
        self.recompute();
        Ok(clamped)
    }

    /// Parses `raw` according to the field's kind, then calls [`set_field`](Self::set_field).
    pub fn set_field_text(
        &mut self,
        id: &str,
        raw: &str,
    ) -> Result<InputValue, SessionError> {
        let kind = self
            .calculator
            .definition()
            .field(id)
            .map(|f| f.kind)
            .ok_or_else(|| SessionError::UnknownField(id.to_string()))?;
        self.set_field(id, InputValue::parse(kind, raw))
    }

    /// Restores every field to its default.
    pub fn reset(&mut self) {
        self.state = self.calculator.definition().default_state();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.outputs = self.calculator.compute(&self.state);
        debug!(
            calculator = %self.definition().slug,
            outputs = self.outputs.len(),
            "recomputed"
        );
    }

    /// Snapshot of the current inputs and outputs taken at `now`.
    pub fn snapshot(
        &self,
        now: DateTime<Utc>,
    ) -> SavedResult {
        let definition = self.definition();
        SavedResult {
            slug: definition.slug.clone(),
            title: definition.title.clone(),
            inputs: self.state.clone(),
            outputs: self.outputs.clone(),
            timestamp: now,
        }
    }

    /// Appends the current result to `history`.
    ///
    /// On failure the error is returned for the caller to report; the
    /// session and any previously stored history stay as they were.
    pub async fn save_result(
        &self,
        history: &ResultHistory,
    ) -> Result<SavedResult, HistoryError> {
        let saved = self.snapshot(Utc::now());
        history.save(&self.definition().history, saved.clone()).await?;
        info!(calculator = %saved.slug, "result saved");
        Ok(saved)
    }

    /// Builds a report of the current result and hands it to `exporter`.
    pub fn export(
        &self,
        exporter: &dyn Exporter,
        locale: Locale,
    ) -> Result<Document, ExportError> {
        let report = ResultReport::build(
            self.definition(),
            &self.state,
            &self.outputs,
            self.chart(),
            locale,
            Utc::now(),
        );
        let document = exporter.export(&report)?;
        info!(
            calculator = %report.slug,
            file = %document.file_name,
            bytes = document.bytes.len(),
            "result exported"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::common::MAX_AMOUNT;
    use crate::calculators::{self, Tir, Vat};

    #[test]
    fn new_session_starts_at_defaults() {
        let vat = Vat::new();
        let session = CalculatorSession::new(&vat);

        assert_eq!(session.state(), &vat.definition().default_state());
        assert_eq!(session.outputs().number("gross"), Some(dec!(122)));
    }

    #[test]
    fn set_field_recomputes() {
        let vat = Vat::new();
        let mut session = CalculatorSession::new(&vat);

        session
            .set_field("amount", InputValue::number(dec!(200)))
            .unwrap();

        assert_eq!(session.outputs().number("gross"), Some(dec!(244)));
    }

    #[test]
    fn set_field_clamps_to_bounds() {
        let vat = Vat::new();
        let mut session = CalculatorSession::new(&vat);

        let stored = session
            .set_field("amount", InputValue::number(dec!(-50)))
            .unwrap();

        assert_eq!(stored, InputValue::number(dec!(0)));
        assert_eq!(session.outputs().number("gross"), Some(dec!(0)));
    }

    #[test]
    fn set_field_rejects_unknown_field() {
        let vat = Vat::new();
        let mut session = CalculatorSession::new(&vat);

        let err = session
            .set_field("nope", InputValue::number(dec!(1)))
            .unwrap_err();

        assert_eq!(err, SessionError::UnknownField("nope".to_string()));
    }

    #[test]
    fn set_field_rejects_kind_mismatch() {
        let vat = Vat::new();
        let mut session = CalculatorSession::new(&vat);
        let before = session.state().clone();

        let err = session
            .set_field("amount", InputValue::Boolean(true))
            .unwrap_err();

        assert_eq!(
            err,
            SessionError::KindMismatch {
                field: "amount".to_string(),
                expected: "number",
                actual: "boolean",
            }
        );
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn set_field_rejects_unknown_choice() {
        let vat = Vat::new();
        let mut session = CalculatorSession::new(&vat);

        let err = session
            .set_field("rate", InputValue::choice("19"))
            .unwrap_err();

        assert!(matches!(err, SessionError::InvalidChoice { .. }));
    }

    #[test]
    fn set_field_text_parses_per_kind() {
        let vat = Vat::new();
        let mut session = CalculatorSession::new(&vat);

        session.set_field_text("amount", "1,000").unwrap();
        session.set_field_text("mode", "remove").unwrap();

        assert_eq!(session.outputs().number("gross"), Some(dec!(1000)));
        assert_eq!(session.outputs().number("net"), Some(dec!(819.67)));
    }

    #[test]
    fn empty_text_is_an_empty_number() {
        let vat = Vat::new();
        let mut session = CalculatorSession::new(&vat);

        session.set_field_text("amount", "").unwrap();

        assert_eq!(session.state().get("amount"), Some(&InputValue::Number(None)));
        assert_eq!(session.outputs().number("vat"), Some(dec!(0)));
    }

    #[test]
    fn oversized_amount_is_clamped_to_the_money_bound() {
        let vat = Vat::new();
        let mut session = CalculatorSession::new(&vat);

        let stored = session
            .set_field_text("amount", "79228162514264337593543950335")
            .unwrap();

        assert_eq!(stored, InputValue::number(MAX_AMOUNT));
        assert_eq!(session.outputs().number("net"), Some(MAX_AMOUNT));
    }

    #[test]
    fn oversized_cash_flows_are_clamped_before_totals() {
        let tir = Tir::new();
        let mut session = CalculatorSession::new(&tir);

        session
            .set_field_text(
                "cash_flows",
                "-1; 50000000000000000000000000000; 50000000000000000000000000000",
            )
            .unwrap();

        assert_eq!(
            session.outputs().number("total_inflows"),
            Some(MAX_AMOUNT * dec!(2))
        );
    }

    #[test]
    fn reset_twice_equals_reset_once() {
        for calculator in calculators::all() {
            let mut session = CalculatorSession::new(calculator.as_ref());
            if let Some(field) = calculator
                .definition()
                .inputs
                .iter()
                .find(|f| f.kind == FieldKind::Number)
            {
                session
                    .set_field(&field.id, InputValue::number(dec!(1)))
                    .unwrap();
            }

            session.reset();
            let once = (session.state().clone(), session.outputs().clone());
            session.reset();

            assert_eq!((session.state().clone(), session.outputs().clone()), once);
            assert_eq!(session.state(), &calculator.definition().default_state());
        }
    }

    #[test]
    fn snapshot_captures_state_and_outputs() {
        let vat = Vat::new();
        let session = CalculatorSession::new(&vat);
        let now = Utc::now();

        let saved = session.snapshot(now);

        assert_eq!(saved.slug, "calcolatore-iva");
        assert_eq!(&saved.inputs, session.state());
        assert_eq!(&saved.outputs, session.outputs());
        assert_eq!(saved.timestamp, now);
    }
}
