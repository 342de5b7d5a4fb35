//! End-to-end checks of the engine against the built-in rule book.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tds_core::models::{
    AnnualTaxRequest, AssetClass, DeductionInput, DeductionSection, FinancialYear, PayeeType,
    Quarter, Regime, SectionCode, WithholdingRequest,
};
use tds_core::rules::RuleBook;
use tds_core::{TaxEngine, TaxError};

fn date(
    year: i32,
    month: u32,
    day: u32,
) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn with_engine(
    on: NaiveDate,
    test: impl FnOnce(TaxEngine<'_>),
) {
    let book = RuleBook::builtin();
    let rules = book.for_date(on).unwrap();
    test(TaxEngine::new(rules));
}

// =============================================================================
// Withholding scenarios
// =============================================================================

#[test]
fn professional_fees_above_threshold() {
    with_engine(date(2025, 6, 15), |engine| {
        let request = WithholdingRequest::new(dec!(60000), "194J", PayeeType::Individual);

        let result = engine.calculate_withholding(&request).unwrap();

        assert!(result.applicable);
        assert_eq!(result.threshold, dec!(50000));
        assert_eq!(result.rate, dec!(10));
        assert_eq!(result.basic_tax, dec!(6000));
        assert_eq!(result.surcharge.amount, dec!(0));
        assert_eq!(result.cess, dec!(240));
        assert_eq!(result.total_tax, dec!(6240));
        assert_eq!(result.net_payment, dec!(53760));
    });
}

#[test]
fn contractor_payment_below_threshold() {
    with_engine(date(2025, 6, 15), |engine| {
        let request = WithholdingRequest::new(dec!(20000), "194C", PayeeType::Individual);

        let result = engine.calculate_withholding(&request).unwrap();

        assert!(!result.applicable);
        assert_eq!(result.total_tax, dec!(0));
        assert_eq!(result.net_payment, dec!(20000));
    });
}

#[test]
fn same_payment_under_earlier_vintage() {
    with_engine(date(2024, 12, 1), |engine| {
        let request = WithholdingRequest::new(dec!(40000), "194J", PayeeType::Individual);

        let result = engine.calculate_withholding(&request).unwrap();

        assert_eq!(engine.rules().version, "FY2024");
        assert!(result.applicable);
        assert_eq!(result.threshold, dec!(30000));
        assert_eq!(result.total_tax, dec!(4160));
    });
}

#[test]
fn date_before_every_vintage_is_rejected() {
    let book = RuleBook::builtin();

    let result = book.for_date(date(2020, 1, 1));

    assert!(matches!(result, Err(TaxError::NoRulesInEffect(_))));
}

// =============================================================================
// Annual scenarios
// =============================================================================

#[test]
fn new_regime_standard_deduction_only() {
    with_engine(date(2025, 6, 15), |engine| {
        let request = AnnualTaxRequest {
            gross_income: dec!(900000),
            deductions: vec![],
            regime: Regime::New,
        };

        let result = engine.compute_annual_tax(&request).unwrap();

        assert_eq!(result.taxable_income, dec!(850000));
        assert_eq!(result.total_tax, dec!(40000));
        assert_eq!(result.rebate, dec!(0));
        assert_eq!(result.effective_rate, dec!(4.44));
    });
}

#[test]
fn old_regime_rebate_wipes_tax() {
    with_engine(date(2025, 6, 15), |engine| {
        let request = AnnualTaxRequest {
            gross_income: dec!(600000),
            deductions: vec![DeductionInput::new("80C", dec!(150000), dec!(150000))],
            regime: Regime::Old,
        };

        let result = engine.compute_annual_tax(&request).unwrap();

        assert_eq!(result.taxable_income, dec!(400000));
        assert_eq!(result.tax_before_rebate, dec!(7500));
        assert_eq!(result.total_tax, dec!(0));
        assert_eq!(result.effective_rate, dec!(0));
    });
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn withholding_balances_for_every_section() {
    with_engine(date(2025, 6, 15), |engine| {
        let amounts = [dec!(0), dec!(9999), dec!(61735), dec!(250000), dec!(7500000)];
        let payees = [PayeeType::Individual, PayeeType::Company, PayeeType::SeniorCitizen];

        for code in SectionCode::ALL {
            for payee in payees {
                for amount in amounts {
                    let mut request = WithholdingRequest::new(amount, code.as_str(), payee);
                    request.annual_income = Some(dec!(60000000));
                    if code.requires_asset_class() {
                        request.asset_class = Some(AssetClass::LandBuilding);
                    }

                    let result = engine.calculate_withholding(&request).unwrap();

                    assert_eq!(
                        result.basic_tax + result.surcharge.amount + result.cess,
                        result.total_tax,
                        "{code} {payee} {amount}"
                    );
                    assert_eq!(result.total_tax + result.net_payment, result.amount);
                    if !result.applicable {
                        assert_eq!(result.total_tax, Decimal::ZERO);
                    }
                }
            }
        }
    });
}

#[test]
fn identical_requests_give_identical_results() {
    with_engine(date(2025, 6, 15), |engine| {
        let mut request = WithholdingRequest::new(dec!(1234567), "194C", PayeeType::Company);
        request.annual_income = Some(dec!(150000000));

        let first = engine.calculate_withholding(&request).unwrap();
        let second = engine.calculate_withholding(&request).unwrap();

        assert_eq!(first, second);
    });
}

fn total_tax(
    engine: &TaxEngine<'_>,
    gross_income: Decimal,
    regime: Regime,
) -> Decimal {
    let request = AnnualTaxRequest {
        gross_income,
        deductions: vec![],
        regime,
    };
    engine.compute_annual_tax(&request).unwrap().total_tax
}

#[test]
fn annual_tax_never_decreases_with_income() {
    with_engine(date(2025, 6, 15), |engine| {
        for regime in [Regime::Old, Regime::New] {
            let mut previous = Decimal::ZERO;
            let mut income = Decimal::ZERO;
            while income <= dec!(3000000) {
                let tax = total_tax(&engine, income, regime);

                assert!(tax >= previous, "{regime} at {income}: {tax} < {previous}");
                previous = tax;
                income += dec!(25000);
            }
        }
    });
}

#[test]
fn annual_tax_never_decreases_across_rebate_ceiling() {
    with_engine(date(2025, 6, 15), |engine| {
        for regime in [Regime::Old, Regime::New] {
            let definition = engine.rules().regime(regime);
            let ceiling = definition.rebate.ceiling;
            let gross_at_ceiling = ceiling + definition.standard_deduction;

            let mut previous = Decimal::ZERO;
            for offset in -10..=10 {
                let income = gross_at_ceiling + Decimal::from(offset);
                let tax = total_tax(&engine, income, regime);

                assert!(tax >= previous, "{regime} at {income}: {tax} < {previous}");
                previous = tax;
            }

            assert_eq!(total_tax(&engine, gross_at_ceiling, regime), Decimal::ZERO);
            assert!(total_tax(&engine, gross_at_ceiling + Decimal::ONE, regime) > Decimal::ZERO);
        }
    });
}

#[test]
fn payments_below_threshold_are_never_withheld() {
    let book = RuleBook::builtin();
    for rules in book.vintages() {
        let engine = TaxEngine::new(rules);
        for code in SectionCode::ALL {
            let asset_classes = if code.requires_asset_class() {
                vec![Some(AssetClass::PlantMachinery), Some(AssetClass::LandBuilding)]
            } else {
                vec![None]
            };
            for payee in PayeeType::ALL {
                for asset_class in asset_classes.iter().copied() {
                    let threshold = engine.get_threshold(code.as_str(), payee, asset_class).unwrap();
                    let withhold = |amount| {
                        let mut request = WithholdingRequest::new(amount, code.as_str(), payee);
                        request.asset_class = asset_class;
                        engine.calculate_withholding(&request).unwrap()
                    };
                    let case = format!("{} {code} {payee} {asset_class:?}", rules.version);

                    if threshold > Decimal::ZERO {
                        for below in [threshold - Decimal::ONE, threshold - dec!(0.01)] {
                            let result = withhold(below);
                            assert!(!result.applicable, "{case} at {below}");
                            assert_eq!(result.net_payment, below, "{case}");
                            assert_eq!(result.total_tax, Decimal::ZERO, "{case}");
                        }
                    }
                    assert!(withhold(threshold).applicable, "{case} at {threshold}");
                }
            }
        }
    }
}

#[test]
fn new_regime_suppresses_every_deduction() {
    with_engine(date(2025, 6, 15), |engine| {
        let deductions: Vec<DeductionInput> = DeductionSection::ALL
            .into_iter()
            .map(|section| DeductionInput::statutory(section, section.statutory_cap()))
            .collect();

        let comparison = engine.compare_regimes(dec!(1500000), &deductions).unwrap();

        assert_eq!(comparison.new.investment_deduction, dec!(0));
        assert_eq!(comparison.old.investment_deduction, dec!(435000));
    });
}

// =============================================================================
// Calendar
// =============================================================================

#[test]
fn january_belongs_to_previous_financial_year() {
    with_engine(date(2025, 6, 15), |engine| {
        let period = engine.derive_period(date(2025, 1, 15));

        assert_eq!(period.year.to_string(), "2024-2025");
        assert_eq!(period.quarter, Quarter::Q4);
    });
}

#[test]
fn due_dates_for_financial_year() {
    with_engine(date(2025, 6, 15), |engine| {
        let fy: FinancialYear = "2024-25".parse().unwrap();

        let dates = engine.quarterly_due_dates(&fy).unwrap();

        assert_eq!(dates.get(Quarter::Q1).due_date, date(2024, 7, 31));
        assert_eq!(dates.get(Quarter::Q3).due_date, date(2025, 1, 31));
        assert_eq!(dates.get(Quarter::Q4).due_date, date(2025, 5, 31));
        assert_eq!(dates.get(Quarter::Q4).late_filing_date, date(2026, 5, 31));
    });
}

#[test]
fn march_deductions_are_deposited_by_end_of_april() {
    with_engine(date(2025, 6, 15), |engine| {
        assert_eq!(engine.deposit_due_date(date(2025, 3, 12)), Ok(date(2025, 4, 30)));
        assert_eq!(engine.deposit_due_date(date(2025, 6, 12)), Ok(date(2025, 7, 7)));
    });
}

#[test]
fn due_dates_beyond_calendar_range_are_rejected() {
    with_engine(date(2025, 6, 15), |engine| {
        let fy = FinancialYear::starting(262_142);

        let result = engine.quarterly_due_dates(&fy);

        assert!(matches!(result, Err(TaxError::Validation(_))));
    });
}
