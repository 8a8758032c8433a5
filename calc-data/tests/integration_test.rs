//! Integration tests for scenario files on disk.

use calc_core::OutputValue;
use calc_core::calculators;
use calc_data::{ScenarioError, ScenarioLoader, run};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

const IRPF_CSV: &str = include_str!("../test-data/irpf_scenarios.csv");
const TIR_CSV: &str = include_str!("../test-data/tir_scenarios.csv");
const ASSEGNO_CSV: &str = include_str!("../test-data/assegno_bad_choice.csv");

#[test]
fn test_irpf_scenarios() {
    let calculator = calculators::find("calculadora-irpf").unwrap();

    let states = ScenarioLoader::parse(IRPF_CSV.as_bytes(), calculator.definition())
        .expect("Failed to parse CSV");
    let results = run(calculator, &states);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].number("social_security"), Some(dec!(1941.00)));
    assert_eq!(results[1].number("social_security"), Some(dec!(1500)));
    assert_eq!(results[2].number("tax"), Some(dec!(0)));
    assert_eq!(results[2].get("effective_rate"), Some(&OutputValue::Number(dec!(0))));
}

#[test]
fn test_tir_scenarios_mark_unavailable_rates() {
    let calculator = calculators::find("calcolo-tir").unwrap();

    let states = ScenarioLoader::parse(TIR_CSV.as_bytes(), calculator.definition())
        .expect("Failed to parse CSV");
    let results = run(calculator, &states);

    assert!(results[0].number("irr").is_some());
    assert_eq!(results[0].number("npv"), Some(dec!(11906.92)));
    assert_eq!(results[1].get("irr"), Some(&OutputValue::Unavailable));
    assert_eq!(results[2].get("irr"), Some(&OutputValue::Unavailable));
    assert_eq!(
        results[2].get("multiple_sign_changes"),
        Some(&OutputValue::Flag(true))
    );
}

#[test]
fn test_scenarios_are_checked_against_the_right_calculator() {
    let calculator = calculators::find("calcolatore-iva").unwrap();

    let err = ScenarioLoader::parse(ASSEGNO_CSV.as_bytes(), calculator.definition()).unwrap_err();

    assert_eq!(err, ScenarioError::UnknownField("isee".to_string()));
}
