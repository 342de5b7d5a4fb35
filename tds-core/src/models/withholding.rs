use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AssetClass, PayeeType, SectionCode, ThresholdKind};

/// A single payment on which tax may have to be withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingRequest {
    /// Gross payment amount.
    pub amount: Decimal,

    /// Section code as entered, e.g. `194J`.
    pub section: String,

    pub payee_type: PayeeType,

    /// Required for rent (194I), rejected elsewhere.
    #[serde(default)]
    pub asset_class: Option<AssetClass>,

    /// Rate from a lower-deduction certificate; overrides the table rate.
    #[serde(default)]
    pub certificate_rate: Option<Decimal>,

    /// Payee's total annual income. Surcharge is only computed when present.
    #[serde(default)]
    pub annual_income: Option<Decimal>,

    /// Amount already paid to this payee under the section in the current
    /// financial year. Enables the aggregate threshold.
    #[serde(default)]
    pub paid_year_to_date: Option<Decimal>,
}

impl WithholdingRequest {
    /// A request with only the required fields set.
    pub fn new(
        amount: Decimal,
        section: impl Into<String>,
        payee_type: PayeeType,
    ) -> Self {
        Self {
            amount,
            section: section.into(),
            payee_type,
            asset_class: None,
            certificate_rate: None,
            annual_income: None,
            paid_year_to_date: None,
        }
    }
}

/// Where the applied rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Table,
    LowerDeductionCertificate,
    /// Threshold not met; no rate applied.
    NotApplied,
}

/// Surcharge rate and amount on the basic tax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surcharge {
    pub rate: Decimal,
    pub amount: Decimal,
}

/// Full breakdown of one withholding computation.
///
/// Every intermediate value is kept so certificates and audit trails can be
/// produced from the stored result without recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingResult {
    pub section: SectionCode,
    pub payee_type: PayeeType,
    pub amount: Decimal,

    pub applicable: bool,

    /// Why no tax is withheld. Set only when `applicable` is false.
    pub reason: Option<String>,

    /// The limit the amount was compared against.
    pub threshold: Decimal,
    pub threshold_kind: ThresholdKind,

    pub rate: Decimal,
    pub rate_source: RateSource,

    pub basic_tax: Decimal,
    pub surcharge: Surcharge,
    pub cess: Decimal,

    /// `basic_tax + surcharge.amount + cess`.
    pub total_tax: Decimal,

    /// `amount - total_tax`.
    pub net_payment: Decimal,
}
