use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::TaxError;
use crate::calculations::common::check_amount;
use crate::models::{DeductionInput, Regime};

/// Caps and sums investment deduction claims.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvestmentDeductionAggregator;

impl InvestmentDeductionAggregator {
    /// Total allowable investment deduction.
    ///
    /// Each claim is clamped to `[0, cap]`. The new regime allows no
    /// investment deductions, so it always yields zero once the inputs have
    /// been validated.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Validation`] if a claimed amount or a cap is
    /// negative or above the accepted ceiling.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tds_core::calculations::InvestmentDeductionAggregator;
    /// use tds_core::models::{DeductionInput, Regime};
    ///
    /// let claims = vec![DeductionInput::new("80C", dec!(200000), dec!(150000))];
    ///
    /// assert_eq!(InvestmentDeductionAggregator::aggregate(&claims, Regime::Old), Ok(dec!(150000)));
    /// assert_eq!(InvestmentDeductionAggregator::aggregate(&claims, Regime::New), Ok(dec!(0)));
    /// ```
    pub fn aggregate(
        inputs: &[DeductionInput],
        regime: Regime,
    ) -> Result<Decimal, TaxError> {
        for input in inputs {
            check_amount(&format!("deduction {} amount", input.code), input.amount)?;
            check_amount(&format!("deduction {} cap", input.code), input.cap)?;
        }

        if !regime.allows_investment_deductions() {
            if !inputs.is_empty() {
                debug!(%regime, claims = inputs.len(), "regime allows no investment deductions");
            }
            return Ok(Decimal::ZERO);
        }

        let total: Decimal = inputs
            .iter()
            .map(|input| {
                if input.amount > input.cap {
                    warn!(
                        code = %input.code,
                        amount = %input.amount,
                        cap = %input.cap,
                        "deduction claim exceeds cap; clamping"
                    );
                    input.cap
                } else {
                    input.amount
                }
            })
            .sum();
        Ok(total)
    }
}
