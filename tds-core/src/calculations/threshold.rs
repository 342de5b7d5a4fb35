use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::TaxError;
use crate::models::{AssetClass, PayeeType, ThresholdKind, WithholdingSection};

/// Outcome of comparing a payment against a section's limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdCheck {
    pub applicable: bool,
    /// The limit the payment was compared against.
    pub threshold: Decimal,
    pub kind: ThresholdKind,
    /// Set only when not applicable.
    pub reason: Option<String>,
}

/// Decides whether a payment crosses the withholding limit of its section.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdEvaluator;

impl ThresholdEvaluator {
    /// Checks that an asset class is given exactly when the section needs one.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Validation`] if rent has no asset class, or any
    /// other section is given one.
    pub fn validate_asset_class(
        section: &WithholdingSection,
        asset_class: Option<AssetClass>,
    ) -> Result<(), TaxError> {
        match (section.code.requires_asset_class(), asset_class) {
            (true, None) => Err(TaxError::validation(format!(
                "section {} requires an asset class",
                section.code
            ))),
            (false, Some(class)) => Err(TaxError::validation(format!(
                "asset class '{class}' does not apply to section {}",
                section.code
            ))),
            _ => Ok(()),
        }
    }

    /// The limit that governs a payment, in order of precedence:
    /// senior-citizen limit, asset-class limit, single-payment limit,
    /// aggregate annual limit.
    pub fn threshold_for(
        section: &WithholdingSection,
        payee: PayeeType,
        asset_class: Option<AssetClass>,
    ) -> (Decimal, ThresholdKind) {
        let table = &section.thresholds;

        if payee == PayeeType::SeniorCitizen {
            if let Some(limit) = table.senior_citizen {
                return (limit, ThresholdKind::SeniorCitizen);
            }
        }
        if let Some(class) = asset_class {
            if let Some(limit) = table.for_asset_class(class) {
                return (limit, ThresholdKind::AssetClass(class));
            }
        }
        if let Some(limit) = table.single_payment {
            return (limit, ThresholdKind::SinglePayment);
        }
        if let Some(limit) = table.aggregate_annual {
            return (limit, ThresholdKind::AggregateAnnual);
        }
        (Decimal::ZERO, ThresholdKind::NoThreshold)
    }

    /// Compares `amount` against the governing limit.
    ///
    /// A single-payment limit is compared with the payment alone; annual
    /// limits are compared with `paid_year_to_date + amount`. When a payment
    /// misses the single-payment limit but the section also has an aggregate
    /// limit, crossing the aggregate still makes it applicable.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tds_core::calculations::ThresholdEvaluator;
    /// use tds_core::models::PayeeType;
    /// use tds_core::rules::RuleBook;
    ///
    /// let book = RuleBook::builtin();
    /// let section = book.latest().sections().iter().find(|s| s.code.as_str() == "194C").unwrap();
    ///
    /// let check = ThresholdEvaluator::check_threshold(dec!(20000), section, PayeeType::Individual, None, None);
    ///
    /// assert!(!check.applicable);
    /// assert_eq!(check.threshold, dec!(30000));
    /// ```
    pub fn check_threshold(
        amount: Decimal,
        section: &WithholdingSection,
        payee: PayeeType,
        asset_class: Option<AssetClass>,
        paid_year_to_date: Option<Decimal>,
    ) -> ThresholdCheck {
        let (threshold, kind) = Self::threshold_for(section, payee, asset_class);
        let year_to_date = paid_year_to_date.unwrap_or(Decimal::ZERO);
        let cumulative = year_to_date + amount;

        let compared = match kind {
            ThresholdKind::SinglePayment | ThresholdKind::NoThreshold => amount,
            ThresholdKind::AggregateAnnual
            | ThresholdKind::SeniorCitizen
            | ThresholdKind::AssetClass(_) => cumulative,
        };

        if compared >= threshold {
            return ThresholdCheck {
                applicable: true,
                threshold,
                kind,
                reason: None,
            };
        }

        if kind == ThresholdKind::SinglePayment {
            if let Some(aggregate) = section.thresholds.aggregate_annual {
                if paid_year_to_date.is_some() && cumulative >= aggregate {
                    debug!(
                        section = %section.code,
                        %amount,
                        %cumulative,
                        %aggregate,
                        "single-payment limit missed but aggregate limit crossed"
                    );
                    return ThresholdCheck {
                        applicable: true,
                        threshold: aggregate,
                        kind: ThresholdKind::AggregateAnnual,
                        reason: None,
                    };
                }
            }
        }

        let subject = if compared == amount {
            format!("payment of {amount}")
        } else {
            format!("year-to-date total of {compared}")
        };
        let reason = format!(
            "{subject} is below the {} of {threshold} for section {}",
            kind.describe(),
            section.code
        );
        debug!(section = %section.code, %amount, %threshold, "{reason}");

        ThresholdCheck {
            applicable: false,
            threshold,
            kind,
            reason: Some(reason),
        }
    }
}
