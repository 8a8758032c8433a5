//! End-to-end checks of the catalogue through the public API.

use calc_core::calculations::brackets::{Bracket, BracketSchedule};
use calc_core::calculations::finance::{irr, npv};
use calc_core::calculators::{self, Calculator, irpf};
use calc_core::export::{CsvExporter, JsonExporter};
use calc_core::store::{KeyValueStore, MemoryStore};
use calc_core::{
    CalculatorSession, HistoryError, InputValue, Locale, OutputValue, ResultHistory, StoreError,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const SHARED_HISTORY: &str = include_str!("fixtures/shared_history.json");

fn session(slug: &str) -> CalculatorSession<'static> {
    let calculator = calculators::find(slug).expect("calculator in catalogue");
    CalculatorSession::new(calculator)
}

// ==== scenarios ====

#[test]
fn irpf_base_of_20200_pays_4225_50() {
    let schedule = irpf::general_schedule().unwrap();

    assert_eq!(schedule.tax(dec!(20200)), dec!(4225.50));
}

#[test]
fn irr_of_simple_profitable_project() {
    let flows = [-50000.0, 15000.0, 20000.0, 25000.0, 15000.0];

    let rate = irr(&flows).expect("irr converges");

    assert!(rate > 0.0 && rate < 1.0, "rate {rate}");
    assert!(npv(rate, &flows).abs() < 1e-4 * 125000.0);
}

#[test]
fn assegno_unico_at_isee_thresholds() {
    let mut session = session("assegno-unico");
    session.set_field("children", InputValue::number(dec!(1))).unwrap();

    session
        .set_field("isee", InputValue::number(dec!(17090.61)))
        .unwrap();
    assert_eq!(session.outputs().number("per_child"), Some(dec!(199.40)));

    session
        .set_field("isee", InputValue::number(dec!(45574.96)))
        .unwrap();
    assert_eq!(session.outputs().number("per_child"), Some(dec!(57.00)));
}

#[test]
fn vat_round_trip_through_sessions() {
    let mut add = session("calcolatore-iva");
    let mut remove = session("calcolatore-iva");
    remove.set_field_text("mode", "remove").unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let net = Decimal::new(rng.gen_range(0..10_000_000), 2);
        add.set_field("amount", InputValue::number(net)).unwrap();
        let gross = add.outputs().number("gross").unwrap();

        remove.set_field("amount", InputValue::number(gross)).unwrap();
        let back = remove.outputs().number("net").unwrap();

        assert!((back - net).abs() <= dec!(0.01), "{net} -> {gross} -> {back}");
    }
}

// ==== properties ====

#[test]
fn progressive_schedules_are_monotonic() {
    let schedule = BracketSchedule::new(vec![
        Bracket::up_to(dec!(28000), dec!(0.23)),
        Bracket::up_to(dec!(50000), dec!(0.35)),
        Bracket::open(dec!(0.43)),
    ])
    .unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    assert_eq!(schedule.tax(Decimal::ZERO), Decimal::ZERO);
    for _ in 0..500 {
        let b1 = Decimal::new(rng.gen_range(0..20_000_000), 2);
        let b2 = b1 + Decimal::new(rng.gen_range(1..1_000_000), 2);
        assert!(schedule.tax(b2) >= schedule.tax(b1));
    }
}

#[test]
fn every_calculator_is_deterministic_under_random_edits() {
    let mut rng = StdRng::seed_from_u64(2024);

    for calculator in calculators::all() {
        let mut state = calculator.definition().default_state();
        for field in &calculator.definition().inputs {
            if let InputValue::Number(_) = field.default {
                let value = Decimal::new(rng.gen_range(-1_000_000..100_000_000), 2);
                state.insert(&field.id, field.clamp(InputValue::number(value)));
            }
        }

        assert_eq!(
            calculator.compute(&state),
            calculator.compute(&state),
            "{}",
            calculator.slug()
        );
    }
}

#[test]
fn unavailable_irr_renders_in_the_calculator_language() {
    let mut session = session("calcolo-tir");
    session.set_field_text("cash_flows", "-100; -50").unwrap();

    assert_eq!(session.outputs().get("irr"), Some(&OutputValue::Unavailable));

    let document = session.export(&CsvExporter, Locale::It).unwrap();
    let text = String::from_utf8(document.bytes).unwrap();
    assert!(text.contains("output,irr,TIR,non calcolabile"));
}

// ==== history ====

#[tokio::test]
async fn saved_results_round_trip_through_memory_store() {
    let history = ResultHistory::new(Box::new(MemoryStore::new()));
    let mut session = session("calcolatore-iva");
    let policy = session.definition().history.clone();

    session.save_result(&history).await.unwrap();
    session
        .set_field("amount", InputValue::number(dec!(250)))
        .unwrap();
    let latest = session.save_result(&history).await.unwrap();

    let entries = history.list(&policy).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], latest);
    assert_eq!(entries[0].outputs.number("gross"), Some(dec!(305)));
    assert_eq!(entries[1].outputs.number("gross"), Some(dec!(122)));
}

#[tokio::test]
async fn shared_key_keeps_foreign_entries() {
    let store = MemoryStore::new();
    store
        .set("saved-results:fisco-it", SHARED_HISTORY)
        .await
        .unwrap();
    let history = ResultHistory::new(Box::new(store));
    let session = session("regime-forfettario");
    let policy = session.definition().history.clone();

    session.save_result(&history).await.unwrap();

    let all = history.list(&policy).await.unwrap();
    let slugs: Vec<&str> = all.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(
        slugs,
        vec!["regime-forfettario", "calcolo-irpef", "imposta-successione"]
    );
    assert_eq!(
        history
            .list_for(&policy, "calcolo-irpef")
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn failed_save_leaves_session_and_store_untouched() {
    let history = ResultHistory::new(Box::new(MemoryStore::disabled()));
    let session = session("calculadora-irpf");
    let before = session.outputs().clone();

    let err = session.save_result(&history).await.unwrap_err();

    assert!(matches!(
        err,
        HistoryError::Store(StoreError::Unavailable(_))
    ));
    assert_eq!(session.outputs(), &before);
}

// ==== export ====

#[test]
fn json_export_of_every_calculator() {
    for calculator in calculators::all() {
        let session = CalculatorSession::new(calculator.as_ref());

        let document = session.export(&JsonExporter, calculator.definition().locale).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&document.bytes).unwrap();

        assert_eq!(value["slug"], calculator.slug());
        assert!(document.file_name.starts_with(calculator.slug()));
        assert_eq!(
            value["outputs"].as_array().map(Vec::len),
            Some(calculator.definition().outputs.len())
        );
    }
}
