//! Text rendering of engine results for the `tds` sub-commands.
//!
//! Every function returns the text to print so the output can be checked
//! without capturing stdout.

use std::fmt::Write;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tds_core::models::{
    AnnualTaxResult, AssetClass, DeductionInput, FinancialYear, PayeeType, RegimeComparison,
    WithholdingRequest, WithholdingResult,
};
use tds_core::{TaxEngine, TaxError};

/// Width of the label column in key/value output.
const LABEL_WIDTH: usize = 22;

fn row(
    out: &mut String,
    label: &str,
    value: impl std::fmt::Display,
) {
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{label:<LABEL_WIDTH$}{value}");
}

pub fn sections(engine: &TaxEngine<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Rules {} (from {})", engine.rules().version, engine.rules().effective_from);
    for summary in engine.list_sections() {
        let marker = if summary.requires_asset_class { " *" } else { "" };
        let _ = writeln!(out, "{:<6}{}{marker}", summary.code, summary.name);
        let _ = writeln!(out, "      {}", summary.notes);
    }
    let _ = writeln!(out, "* requires --asset-class");
    out
}

pub fn threshold(
    engine: &TaxEngine<'_>,
    section: &str,
    payee: PayeeType,
    asset_class: Option<AssetClass>,
) -> Result<String, TaxError> {
    let limit = engine.get_threshold(section, payee, asset_class)?;
    let mut out = String::new();
    row(&mut out, "Section", section.trim().to_ascii_uppercase());
    row(&mut out, "Payee", payee.display_name());
    row(&mut out, "Threshold", limit);
    Ok(out)
}

pub fn withhold(
    engine: &TaxEngine<'_>,
    request: &WithholdingRequest,
) -> Result<String, TaxError> {
    let result = engine.calculate_withholding(request)?;
    Ok(render_withholding(&result))
}

pub fn render_withholding(result: &WithholdingResult) -> String {
    let mut out = String::new();
    row(&mut out, "Section", result.section);
    row(&mut out, "Payee", result.payee_type.display_name());
    row(&mut out, "Amount", result.amount);
    row(
        &mut out,
        "Threshold",
        format!("{} ({})", result.threshold, result.threshold_kind.describe()),
    );
    if !result.applicable {
        row(&mut out, "Withholding", "not applicable");
        if let Some(reason) = &result.reason {
            row(&mut out, "Reason", reason);
        }
        row(&mut out, "Net payment", result.net_payment);
        return out;
    }

    row(&mut out, "Rate", format!("{}% ({:?})", result.rate, result.rate_source));
    row(&mut out, "Basic tax", result.basic_tax);
    row(
        &mut out,
        "Surcharge",
        format!("{} @ {}%", result.surcharge.amount, result.surcharge.rate),
    );
    row(&mut out, "Cess", result.cess);
    row(&mut out, "Total tax", result.total_tax);
    row(&mut out, "Net payment", result.net_payment);
    out
}

pub fn render_annual(result: &AnnualTaxResult) -> String {
    let mut out = String::new();
    row(&mut out, "Regime", result.regime);
    row(&mut out, "Gross income", result.gross_income);
    row(&mut out, "Standard deduction", result.standard_deduction);
    row(&mut out, "Investment deduction", result.investment_deduction);
    row(&mut out, "Taxable income", result.taxable_income);
    row(&mut out, "Tax before rebate", result.tax_before_rebate);
    row(&mut out, "Rebate", result.rebate);
    row(&mut out, "Total tax", result.total_tax);
    row(&mut out, "Effective rate", format!("{}%", result.effective_rate));
    out
}

pub fn render_comparison(comparison: &RegimeComparison) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<LABEL_WIDTH$}{:>14}{:>14}", "", "old", "new");
    for (label, old, new) in [
        ("Taxable income", comparison.old.taxable_income, comparison.new.taxable_income),
        ("Total tax", comparison.old.total_tax, comparison.new.total_tax),
        ("Effective rate %", comparison.old.effective_rate, comparison.new.effective_rate),
    ] {
        let _ = writeln!(out, "{label:<LABEL_WIDTH$}{old:>14}{new:>14}");
    }
    row(
        &mut out,
        "Recommended",
        format!("{} (saves {})", comparison.recommended, comparison.savings),
    );
    out
}

pub fn compare(
    engine: &TaxEngine<'_>,
    gross_income: Decimal,
    deductions: &[DeductionInput],
) -> Result<String, TaxError> {
    let comparison = engine.compare_regimes(gross_income, deductions)?;
    Ok(render_comparison(&comparison))
}

pub fn period(
    engine: &TaxEngine<'_>,
    date: NaiveDate,
) -> Result<String, TaxError> {
    let period = engine.derive_period(date);
    let mut out = String::new();
    row(&mut out, "Date", date);
    row(&mut out, "Financial year", period.year);
    row(
        &mut out,
        "Quarter",
        format!("{} ({})", period.quarter, period.quarter.months_label()),
    );
    row(&mut out, "Deposit due", engine.deposit_due_date(date)?);
    Ok(out)
}

pub fn due_dates(
    engine: &TaxEngine<'_>,
    financial_year: &FinancialYear,
) -> Result<String, TaxError> {
    let dates = engine.quarterly_due_dates(financial_year)?;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Financial year {} ({} to {})",
        dates.financial_year,
        financial_year.first_day()?,
        financial_year.last_day()?
    );
    let _ = writeln!(out, "{:<4}{:<16}{:<12}{}", "", "Period", "Due", "Late filing");
    for quarter in &dates.quarters {
        let _ = writeln!(
            out,
            "{:<4}{:<16}{:<12}{}",
            quarter.quarter, quarter.period_label, quarter.due_date, quarter.late_filing_date
        );
    }
    Ok(out)
}
