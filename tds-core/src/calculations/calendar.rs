//! Financial year, quarter and filing deadline arithmetic.
//!
//! | Quarter | Months  | Statement due       | Late filing limit   |
//! |---------|---------|---------------------|---------------------|
//! | Q1      | Apr-Jun | 31 Jul              | 31 Jul next year    |
//! | Q2      | Jul-Sep | 31 Oct              | 31 Oct next year    |
//! | Q3      | Oct-Dec | 31 Jan (next year)  | 31 Jan a year later |
//! | Q4      | Jan-Mar | 31 May (next year)  | 31 May a year later |
//!
//! Withheld tax is deposited by the 7th of the following month; tax withheld
//! in March may be deposited until 30 April.

use chrono::{Datelike, NaiveDate};

use crate::TaxError;
use crate::models::{
    FinancialPeriod, FinancialYear, Quarter, QuarterDueDate, QuarterlyDueDates, calendar_date,
};

/// Stateless calendar helpers for the April-March financial year.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodCalendar;

impl PeriodCalendar {
    /// Financial year and quarter containing `date`.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use tds_core::calculations::PeriodCalendar;
    /// use tds_core::models::Quarter;
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
    /// let period = PeriodCalendar::derive_financial_year(date);
    ///
    /// assert_eq!(period.year.to_string(), "2024-2025");
    /// assert_eq!(period.quarter, Quarter::Q4);
    /// ```
    pub fn derive_financial_year(date: NaiveDate) -> FinancialPeriod {
        let start_year = if date.month() >= 4 {
            date.year()
        } else {
            date.year() - 1
        };
        FinancialPeriod {
            year: FinancialYear::starting(start_year),
            quarter: Quarter::from_month(date.month()),
        }
    }

    /// Statement due dates for every quarter of `fy`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Validation`] if a deadline falls outside the
    /// supported calendar range.
    pub fn quarterly_due_dates(fy: &FinancialYear) -> Result<QuarterlyDueDates, TaxError> {
        let start = fy.start_year();
        let end = fy.end_year();
        Ok(QuarterlyDueDates {
            financial_year: *fy,
            quarters: [
                quarter_due(Quarter::Q1, start, start, 7)?,
                quarter_due(Quarter::Q2, start, start, 10)?,
                quarter_due(Quarter::Q3, start, end, 1)?,
                quarter_due(Quarter::Q4, end, end, 5)?,
            ],
        })
    }

    /// Last day to deposit tax withheld on `payment_date`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Validation`] for a payment in the last month
    /// chrono can represent.
    pub fn deposit_due_date(payment_date: NaiveDate) -> Result<NaiveDate, TaxError> {
        let (year, month) = (payment_date.year(), payment_date.month());
        match month {
            3 => calendar_date(year, 4, 30),
            12 => calendar_date(year + 1, 1, 7),
            _ => calendar_date(year, month + 1, 7),
        }
    }
}

/// Due dates fall on the 31st of `due_month`; the late filing limit is a
/// year later.
fn quarter_due(
    quarter: Quarter,
    label_year: i32,
    due_year: i32,
    due_month: u32,
) -> Result<QuarterDueDate, TaxError> {
    Ok(QuarterDueDate {
        quarter,
        period_label: format!("{} {label_year}", quarter.months_label()),
        due_date: calendar_date(due_year, due_month, 31)?,
        late_filing_date: calendar_date(due_year + 1, due_month, 31)?,
    })
}
