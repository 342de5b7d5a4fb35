//! Rule vintages compiled into the crate.
//!
//! `FY2024` carries the thresholds in force from 1 April 2024; `FY2025` the
//! revised limits from 1 April 2025. Slabs and surcharge brackets are shared.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{RuleSet, SurchargeBracket, SurchargeTables};
use crate::models::{
    PayeeRates, RateTable, Rebate, Regime, RegimeDefinition, SectionCode, SlabRate,
    ThresholdTable, WithholdingSection,
};

const FY2024_START: NaiveDate = first_of_april(2024);
const FY2025_START: NaiveDate = first_of_april(2025);

/// Evaluated at compile time; an invalid year fails the build.
const fn first_of_april(year: i32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, 4, 1) {
        Some(date) => date,
        None => panic!("financial year start out of range"),
    }
}

/// Limits that changed between vintages.
struct Limits {
    dividend: Decimal,
    other_interest: Decimal,
    other_interest_senior: Decimal,
    insurance_commission: Decimal,
    commission: Decimal,
    commission_rate: Decimal,
    professional_fees: Decimal,
    rent: ThresholdTable,
}

pub(super) fn fy2024() -> RuleSet {
    build(
        "FY2024",
        FY2024_START,
        Limits {
            dividend: dec!(5000),
            other_interest: dec!(40000),
            other_interest_senior: dec!(50000),
            insurance_commission: dec!(15000),
            commission: dec!(15000),
            commission_rate: dec!(5),
            professional_fees: dec!(30000),
            rent: ThresholdTable::default().with_asset_classes(dec!(240000), dec!(240000)),
        },
    )
}

pub(super) fn fy2025() -> RuleSet {
    build(
        "FY2025",
        FY2025_START,
        Limits {
            dividend: dec!(10000),
            other_interest: dec!(50000),
            other_interest_senior: dec!(100000),
            insurance_commission: dec!(20000),
            commission: dec!(20000),
            commission_rate: dec!(2),
            professional_fees: dec!(50000),
            rent: ThresholdTable::single(dec!(50000)),
        },
    )
}

fn build(
    version: &str,
    effective_from: NaiveDate,
    limits: Limits,
) -> RuleSet {
    RuleSet {
        version: version.to_string(),
        effective_from,
        sections: sections(limits),
        surcharge: surcharge_tables(),
        old_regime: old_regime(),
        new_regime: new_regime(),
    }
}

fn section(
    code: SectionCode,
    name: &str,
    rates: RateTable,
    thresholds: ThresholdTable,
    notes: &str,
) -> WithholdingSection {
    WithholdingSection {
        code,
        name: name.to_string(),
        rates,
        thresholds,
        notes: notes.to_string(),
    }
}

fn sections(limits: Limits) -> Vec<WithholdingSection> {
    vec![
        section(
            SectionCode::S193,
            "Interest on securities",
            RateTable::Flat(PayeeRates::flat(dec!(10))),
            ThresholdTable::single(dec!(10000)),
            "Interest on debentures and other securities paid to residents.",
        ),
        section(
            SectionCode::S194,
            "Dividends",
            RateTable::Flat(PayeeRates::flat(dec!(10))),
            ThresholdTable::aggregate(limits.dividend),
            "Dividends paid by a domestic company; limit is per shareholder per year.",
        ),
        section(
            SectionCode::S194A,
            "Interest other than interest on securities",
            RateTable::Flat(PayeeRates::flat(dec!(10))),
            ThresholdTable::aggregate(limits.other_interest)
                .with_senior_citizen(limits.other_interest_senior),
            "Bank and deposit interest; senior citizens have a higher annual limit.",
        ),
        section(
            SectionCode::S194C,
            "Payments to contractors",
            RateTable::Flat(PayeeRates::split(dec!(1), dec!(2))),
            ThresholdTable::single(dec!(30000)).with_aggregate(dec!(100000)),
            "Withhold when a single payment or the year's aggregate crosses its limit.",
        ),
        section(
            SectionCode::S194D,
            "Insurance commission",
            RateTable::Flat(PayeeRates::split(dec!(5), dec!(10))),
            ThresholdTable::aggregate(limits.insurance_commission),
            "Commission paid to insurance agents.",
        ),
        section(
            SectionCode::S194H,
            "Commission or brokerage",
            RateTable::Flat(PayeeRates::flat(limits.commission_rate)),
            ThresholdTable::aggregate(limits.commission),
            "Excludes insurance commission, which falls under 194D.",
        ),
        section(
            SectionCode::S194I,
            "Rent",
            RateTable::ByAssetClass {
                plant_machinery: PayeeRates::flat(dec!(2)),
                land_building: PayeeRates::flat(dec!(10)),
            },
            limits.rent,
            "Rate depends on whether plant and machinery or land and building is let.",
        ),
        section(
            SectionCode::S194J,
            "Fees for professional or technical services",
            RateTable::Flat(PayeeRates::flat(dec!(10))),
            ThresholdTable::single(limits.professional_fees),
            "Professional fees, royalties and non-compete fees.",
        ),
        section(
            SectionCode::S194Q,
            "Purchase of goods",
            RateTable::Flat(PayeeRates::flat(dec!(0.1))),
            ThresholdTable::aggregate(dec!(5000000)),
            "Buyer withholds on purchases from a seller above the annual limit.",
        ),
    ]
}

fn surcharge_tables() -> SurchargeTables {
    SurchargeTables {
        individual: vec![
            SurchargeBracket::new(dec!(0), Some(dec!(5000000)), dec!(0)),
            SurchargeBracket::new(dec!(5000000), Some(dec!(10000000)), dec!(10)),
            SurchargeBracket::new(dec!(10000000), Some(dec!(20000000)), dec!(15)),
            SurchargeBracket::new(dec!(20000000), Some(dec!(50000000)), dec!(25)),
            SurchargeBracket::new(dec!(50000000), None, dec!(37)),
        ],
        company: vec![
            SurchargeBracket::new(dec!(0), Some(dec!(10000000)), dec!(0)),
            SurchargeBracket::new(dec!(10000000), Some(dec!(100000000)), dec!(7)),
            SurchargeBracket::new(dec!(100000000), None, dec!(12)),
        ],
    }
}

fn old_regime() -> RegimeDefinition {
    RegimeDefinition {
        regime: Regime::Old,
        slabs: vec![
            SlabRate::new(dec!(0), Some(dec!(250000)), dec!(0)),
            SlabRate::new(dec!(250000), Some(dec!(500000)), dec!(5)),
            SlabRate::new(dec!(500000), Some(dec!(1000000)), dec!(20)),
            SlabRate::new(dec!(1000000), None, dec!(30)),
        ],
        rebate: Rebate {
            ceiling: dec!(500000),
            amount: dec!(12500),
        },
        standard_deduction: dec!(50000),
    }
}

fn new_regime() -> RegimeDefinition {
    RegimeDefinition {
        regime: Regime::New,
        slabs: vec![
            SlabRate::new(dec!(0), Some(dec!(300000)), dec!(0)),
            SlabRate::new(dec!(300000), Some(dec!(600000)), dec!(5)),
            SlabRate::new(dec!(600000), Some(dec!(900000)), dec!(10)),
            SlabRate::new(dec!(900000), Some(dec!(1200000)), dec!(15)),
            SlabRate::new(dec!(1200000), Some(dec!(1500000)), dec!(20)),
            SlabRate::new(dec!(1500000), None, dec!(30)),
        ],
        rebate: Rebate {
            ceiling: dec!(500000),
            amount: dec!(12500),
        },
        standard_deduction: dec!(50000),
    }
}
