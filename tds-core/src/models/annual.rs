use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::TaxError;
use crate::models::Regime;

/// Well-known investment deduction sections and their statutory caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeductionSection {
    /// Life insurance, PPF, ELSS and similar savings.
    #[serde(rename = "80C")]
    S80C,
    /// Additional NPS contribution.
    #[serde(rename = "80CCD(1B)")]
    S80Ccd1b,
    /// Health insurance premium.
    #[serde(rename = "80D")]
    S80D,
    /// Savings account interest.
    #[serde(rename = "80TTA")]
    S80Tta,
    /// Interest on a self-occupied home loan.
    #[serde(rename = "24(b)")]
    S24b,
}

impl DeductionSection {
    pub const ALL: [DeductionSection; 5] = [
        Self::S80C,
        Self::S80Ccd1b,
        Self::S80D,
        Self::S80Tta,
        Self::S24b,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S80C => "80C",
            Self::S80Ccd1b => "80CCD(1B)",
            Self::S80D => "80D",
            Self::S80Tta => "80TTA",
            Self::S24b => "24(b)",
        }
    }

    pub fn statutory_cap(&self) -> Decimal {
        match self {
            Self::S80C => dec!(150000),
            Self::S80Ccd1b => dec!(50000),
            Self::S80D => dec!(25000),
            Self::S80Tta => dec!(10000),
            Self::S24b => dec!(200000),
        }
    }
}

impl fmt::Display for DeductionSection {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeductionSection {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|section| section.as_str().to_ascii_uppercase() == normalized)
            .ok_or_else(|| TaxError::validation(format!("unknown deduction section '{s}'")))
    }
}

/// A claimed deduction with the cap the caller declares for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionInput {
    pub code: String,
    pub amount: Decimal,
    pub cap: Decimal,
}

impl DeductionInput {
    pub fn new(
        code: impl Into<String>,
        amount: Decimal,
        cap: Decimal,
    ) -> Self {
        Self {
            code: code.into(),
            amount,
            cap,
        }
    }

    /// A claim capped at the section's statutory limit.
    pub fn statutory(
        section: DeductionSection,
        amount: Decimal,
    ) -> Self {
        Self::new(section.as_str(), amount, section.statutory_cap())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualTaxRequest {
    pub gross_income: Decimal,
    #[serde(default)]
    pub deductions: Vec<DeductionInput>,
    pub regime: Regime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualTaxResult {
    pub regime: Regime,
    pub gross_income: Decimal,
    pub standard_deduction: Decimal,
    pub investment_deduction: Decimal,
    pub taxable_income: Decimal,
    pub tax_before_rebate: Decimal,
    pub rebate: Decimal,
    pub total_tax: Decimal,
    /// Total tax as a percentage of gross income, two decimals.
    pub effective_rate: Decimal,
}

/// Both regimes computed over the same inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeComparison {
    pub old: AnnualTaxResult,
    pub new: AnnualTaxResult,
    pub recommended: Regime,
    /// Absolute difference in total tax between the regimes.
    pub savings: Decimal,
}
