//! Withholding computation for a single payment.
//!
//! # Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Resolve the section (unknown code fails) |
//! | 2    | Compare the amount with the section's threshold; stop if below |
//! | 3    | Rate: lower-deduction certificate rate, else the table rate |
//! | 4    | Basic tax = round(amount × rate / 100) |
//! | 5    | Surcharge = round(basic tax × surcharge rate / 100), needs annual income |
//! | 6    | Cess = round((basic tax + surcharge) × 4 / 100) |
//! | 7    | Total = basic + surcharge + cess; net payment = amount - total |
//!
//! Each of basic tax, surcharge and cess is rounded once where it is computed.
//! The total is the exact sum of those rounded parts.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tds_core::calculations::WithholdingCalculator;
//! use tds_core::models::{PayeeType, WithholdingRequest};
//! use tds_core::rules::RuleBook;
//!
//! let book = RuleBook::builtin();
//! let calculator = WithholdingCalculator::new(book.latest());
//!
//! let request = WithholdingRequest::new(dec!(60000), "194J", PayeeType::Individual);
//! let result = calculator.calculate(&request).unwrap();
//!
//! assert!(result.applicable);
//! assert_eq!(result.basic_tax, dec!(6000));
//! assert_eq!(result.cess, dec!(240));
//! assert_eq!(result.total_tax, dec!(6240));
//! assert_eq!(result.net_payment, dec!(53760));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::TaxError;
use crate::calculations::common::{check_amount, percent_of};
use crate::calculations::registry::SectionRegistry;
use crate::calculations::surcharge::SurchargeEngine;
use crate::calculations::threshold::{ThresholdCheck, ThresholdEvaluator};
use crate::models::{
    RateSource, Surcharge, WithholdingRequest, WithholdingResult, WithholdingSection,
};
use crate::rules::RuleSet;

/// Health and education cess, percent of basic tax plus surcharge.
pub const CESS_RATE: Decimal = Decimal::from_parts(4, 0, 0, false, 0);

#[derive(Debug, Clone, Copy)]
pub struct WithholdingCalculator<'a> {
    rules: &'a RuleSet,
}

impl<'a> WithholdingCalculator<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Computes the withholding breakdown for one payment.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError`] if:
    /// - the section code is unknown ([`TaxError::InvalidSection`])
    /// - the amount, annual income or year-to-date total is negative or
    ///   above [`MAX_AMOUNT`](crate::calculations::common::MAX_AMOUNT)
    /// - the certificate rate is outside `0..=100`
    /// - rent has no asset class, or another section is given one
    pub fn calculate(
        &self,
        request: &WithholdingRequest,
    ) -> Result<WithholdingResult, TaxError> {
        let section = SectionRegistry::new(self.rules.sections()).lookup(&request.section)?;
        Self::validate(request, section)?;

        let check = ThresholdEvaluator::check_threshold(
            request.amount,
            section,
            request.payee_type,
            request.asset_class,
            request.paid_year_to_date,
        );
        if !check.applicable {
            return Ok(Self::not_applicable(request, section, check));
        }

        let (rate, rate_source) = self.resolve_rate(request, section)?;
        let basic_tax = self.basic_tax(request.amount, rate);
        let surcharge = SurchargeEngine::new(self.rules.surcharge()).compute(
            basic_tax,
            request.payee_type,
            request.annual_income,
        );
        let cess = self.cess(basic_tax, surcharge.amount);
        let total_tax = basic_tax + surcharge.amount + cess;
        let net_payment = request.amount - total_tax;

        debug!(
            section = %section.code,
            payee = %request.payee_type,
            amount = %request.amount,
            %rate,
            %basic_tax,
            surcharge = %surcharge.amount,
            %cess,
            %total_tax,
            "computed withholding"
        );

        Ok(WithholdingResult {
            section: section.code,
            payee_type: request.payee_type,
            amount: request.amount,
            applicable: true,
            reason: None,
            threshold: check.threshold,
            threshold_kind: check.kind,
            rate,
            rate_source,
            basic_tax,
            surcharge,
            cess,
            total_tax,
            net_payment,
        })
    }

    fn validate(
        request: &WithholdingRequest,
        section: &WithholdingSection,
    ) -> Result<(), TaxError> {
        check_amount("payment amount", request.amount)?;
        if let Some(income) = request.annual_income {
            check_amount("annual income", income)?;
        }
        if let Some(paid) = request.paid_year_to_date {
            check_amount("year-to-date payments", paid)?;
        }
        if let Some(rate) = request.certificate_rate {
            if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
                return Err(TaxError::validation(format!(
                    "certificate rate must be between 0 and 100, got {rate}"
                )));
            }
        }
        ThresholdEvaluator::validate_asset_class(section, request.asset_class)
    }

    fn not_applicable(
        request: &WithholdingRequest,
        section: &WithholdingSection,
        check: ThresholdCheck,
    ) -> WithholdingResult {
        WithholdingResult {
            section: section.code,
            payee_type: request.payee_type,
            amount: request.amount,
            applicable: false,
            reason: check.reason,
            threshold: check.threshold,
            threshold_kind: check.kind,
            rate: Decimal::ZERO,
            rate_source: RateSource::NotApplied,
            basic_tax: Decimal::ZERO,
            surcharge: Surcharge::default(),
            cess: Decimal::ZERO,
            total_tax: Decimal::ZERO,
            net_payment: request.amount,
        }
    }

    /// A lower-deduction certificate rate wins over the table rate.
    fn resolve_rate(
        &self,
        request: &WithholdingRequest,
        section: &WithholdingSection,
    ) -> Result<(Decimal, RateSource), TaxError> {
        match request.certificate_rate {
            Some(rate) => Ok((rate, RateSource::LowerDeductionCertificate)),
            None => {
                let rate = section
                    .rates
                    .rate_for(request.payee_type, request.asset_class)?;
                Ok((rate, RateSource::Table))
            }
        }
    }

    fn basic_tax(
        &self,
        amount: Decimal,
        rate: Decimal,
    ) -> Decimal {
        percent_of(amount, rate)
    }

    /// Cess on basic tax plus surcharge; never on itself.
    fn cess(
        &self,
        basic_tax: Decimal,
        surcharge: Decimal,
    ) -> Decimal {
        percent_of(basic_tax + surcharge, CESS_RATE)
    }
}
