use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::TaxError;

static FINANCIAL_YEAR_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{2}|\d{4})$").expect("financial year pattern is valid")
});

/// April–March financial year, identified by the calendar year it starts in.
///
/// Displays and parses as `YYYY-YYYY`; the short form `YYYY-YY` is also
/// accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FinancialYear(i32);

impl FinancialYear {
    pub fn starting(start_year: i32) -> Self {
        Self(start_year)
    }

    pub fn start_year(&self) -> i32 {
        self.0
    }

    pub fn end_year(&self) -> i32 {
        self.0.saturating_add(1)
    }

    /// 1 April of the start year.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Validation`] if the year is outside the supported
    /// calendar range.
    pub fn first_day(&self) -> Result<NaiveDate, TaxError> {
        calendar_date(self.0, 4, 1)
    }

    /// 31 March of the end year.
    ///
    /// # Errors
    ///
    /// Same as [`FinancialYear::first_day`].
    pub fn last_day(&self) -> Result<NaiveDate, TaxError> {
        calendar_date(self.end_year(), 3, 31)
    }
}

/// Builds a date, failing when the year is outside chrono's range.
pub(crate) fn calendar_date(
    year: i32,
    month: u32,
    day: u32,
) -> Result<NaiveDate, TaxError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        TaxError::validation(format!(
            "date {year}-{month:02}-{day:02} is outside the supported range"
        ))
    })
}

impl fmt::Display for FinancialYear {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}-{}", self.0, self.end_year())
    }
}

impl FromStr for FinancialYear {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TaxError::validation(format!("invalid financial year '{s}'"));
        let captures = FINANCIAL_YEAR_LABEL.captures(s.trim()).ok_or_else(invalid)?;

        let start: i32 = captures[1].parse().map_err(|_| invalid())?;
        let end_text = &captures[2];
        let end: i32 = end_text.parse().map_err(|_| invalid())?;
        let end = if end_text.len() == 2 {
            (start / 100) * 100 + end + if end < start % 100 { 100 } else { 0 }
        } else {
            end
        };

        if end != start + 1 {
            return Err(TaxError::validation(format!(
                "financial year '{s}' must span exactly one year"
            )));
        }
        Ok(Self(start))
    }
}

impl TryFrom<String> for FinancialYear {
    type Error = TaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FinancialYear> for String {
    fn from(value: FinancialYear) -> Self {
        value.to_string()
    }
}

/// Three-month filing quarter of a financial year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    /// Quarter of a calendar month (1 = January).
    pub fn from_month(month: u32) -> Self {
        match month {
            4..=6 => Self::Q1,
            7..=9 => Self::Q2,
            10..=12 => Self::Q3,
            _ => Self::Q4,
        }
    }

    pub fn months_label(&self) -> &'static str {
        match self {
            Self::Q1 => "Apr-Jun",
            Self::Q2 => "Jul-Sep",
            Self::Q3 => "Oct-Dec",
            Self::Q4 => "Jan-Mar",
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Financial year and quarter a date falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialPeriod {
    pub year: FinancialYear,
    pub quarter: Quarter,
}

/// Filing deadlines of one quarterly withholding statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterDueDate {
    pub quarter: Quarter,
    /// e.g. `Apr-Jun 2024`.
    pub period_label: String,
    pub due_date: NaiveDate,
    pub late_filing_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterlyDueDates {
    pub financial_year: FinancialYear,
    pub quarters: [QuarterDueDate; 4],
}

impl QuarterlyDueDates {
    pub fn get(
        &self,
        quarter: Quarter,
    ) -> &QuarterDueDate {
        match quarter {
            Quarter::Q1 => &self.quarters[0],
            Quarter::Q2 => &self.quarters[1],
            Quarter::Q3 => &self.quarters[2],
            Quarter::Q4 => &self.quarters[3],
        }
    }
}
