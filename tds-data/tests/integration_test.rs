//! Integration tests for loading slab schedules into a rule set.

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tds_core::TaxEngine;
use tds_core::models::{AnnualTaxRequest, Regime, SlabRate};
use tds_core::rules::RuleBook;
use tds_data::{SlabScheduleLoader, SlabScheduleLoaderError};

const TEST_CSV: &str = include_str!("../test-data/regime_slabs.csv");

#[test]
fn test_load_both_regimes() {
    let records = SlabScheduleLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

    assert_eq!(records.len(), 11);
    assert_eq!(records.iter().filter(|r| r.regime == "old").count(), 4);
    assert_eq!(records.iter().filter(|r| r.regime == "new").count(), 7);
}

#[test]
fn test_loaded_schedule_replaces_new_regime_slabs() {
    let book = RuleBook::builtin();
    let rules = book.latest();
    let records = SlabScheduleLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

    let loaded = SlabScheduleLoader::apply(rules, &records).expect("Failed to apply schedule");

    let new_regime = loaded.regime(Regime::New);
    assert_eq!(new_regime.slabs.len(), 7);
    assert_eq!(
        new_regime.slabs[6],
        SlabRate::new(dec!(2400000), None, dec!(30))
    );
    assert_eq!(new_regime.standard_deduction, dec!(50000));
    assert_eq!(loaded.regime(Regime::Old), rules.regime(Regime::Old));
    assert_eq!(loaded.version, rules.version);
}

#[test]
fn test_loaded_schedule_drives_annual_tax() {
    let book = RuleBook::builtin();
    let records = SlabScheduleLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
    let loaded = SlabScheduleLoader::apply(book.latest(), &records).expect("Failed to apply schedule");
    let request = AnnualTaxRequest {
        gross_income: dec!(1250000),
        deductions: vec![],
        regime: Regime::New,
    };

    let result = TaxEngine::new(&loaded)
        .compute_annual_tax(&request)
        .expect("Failed to compute tax");

    // taxable 1200000: 5% of 400000 + 10% of 400000
    assert_eq!(result.taxable_income, dec!(1200000));
    assert_eq!(result.total_tax, dec!(60000));
}

#[test]
fn test_overlapping_schedule_is_rejected() {
    let csv = "regime,min_income,max_income,rate\nold,0,300000,0\nold,250000,,5\n";
    let book = RuleBook::builtin();
    let records = SlabScheduleLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

    let result = SlabScheduleLoader::apply(book.latest(), &records);

    let err = result.expect_err("Should fail for overlapping slabs");
    assert!(
        matches!(err, SlabScheduleLoaderError::Tax(_)),
        "Expected Tax error, got: {:?}",
        err
    );
}
