//! Progressive slab tax for one regime.
//!
//! Each slab taxes the part of taxable income falling in `[min, max)` at its
//! own rate. The slab sum is rounded once to whole rupees, then the regime's
//! rebate is applied when taxable income does not exceed the rebate ceiling.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tds_core::calculations::SlabTaxEngine;
//! use tds_core::models::Regime;
//! use tds_core::rules::RuleBook;
//!
//! let book = RuleBook::builtin();
//! let engine = SlabTaxEngine::new(book.latest().regime(Regime::New));
//!
//! // 5% of 300000 + 10% of 250000
//! let tax = engine.compute_annual_tax(dec!(850000)).unwrap();
//! assert_eq!(tax.total, dec!(40000));
//! assert_eq!(tax.rebate, dec!(0));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::TaxError;
use crate::calculations::common::{HUNDRED, check_amount, max, round_half_up, round_rupee};
use crate::models::RegimeDefinition;

/// Slab tax before and after the rebate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabTax {
    pub before_rebate: Decimal,
    /// Rebate actually applied (never more than `before_rebate`).
    pub rebate: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct SlabTaxEngine<'a> {
    definition: &'a RegimeDefinition,
}

impl<'a> SlabTaxEngine<'a> {
    pub fn new(definition: &'a RegimeDefinition) -> Self {
        Self { definition }
    }

    /// Annual tax on `taxable_income` under this regime.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Validation`] if `taxable_income` is negative or
    /// above [`MAX_AMOUNT`](crate::calculations::common::MAX_AMOUNT).
    pub fn compute_annual_tax(
        &self,
        taxable_income: Decimal,
    ) -> Result<SlabTax, TaxError> {
        check_amount("taxable income", taxable_income)?;

        let before_rebate = self.slab_tax(taxable_income);
        let rebate = self.rebate(taxable_income, before_rebate);
        let total = before_rebate - rebate;

        debug!(
            regime = %self.definition.regime,
            %taxable_income,
            %before_rebate,
            %rebate,
            %total,
            "computed slab tax"
        );

        Ok(SlabTax {
            before_rebate,
            rebate,
            total,
        })
    }

    /// Sum of every slab's portion at its rate, rounded once.
    fn slab_tax(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        let mut tax = Decimal::ZERO;
        for slab in &self.definition.slabs {
            if taxable_income <= slab.min {
                break;
            }
            tax += slab.portion_of(taxable_income) * slab.rate / HUNDRED;
        }
        round_rupee(tax)
    }

    /// Rebate applicable to `tax`: `tax - max(0, tax - rebate)` when income
    /// is at or under the ceiling.
    fn rebate(
        &self,
        taxable_income: Decimal,
        tax: Decimal,
    ) -> Decimal {
        let rebate = self.definition.rebate;
        if taxable_income > rebate.ceiling {
            return Decimal::ZERO;
        }
        tax - max(tax - rebate.amount, Decimal::ZERO)
    }
}

/// Total tax as a percentage of `income`, two decimals; zero for zero income.
pub fn effective_rate(
    total_tax: Decimal,
    income: Decimal,
) -> Decimal {
    if income > Decimal::ZERO {
        round_half_up(total_tax / income * HUNDRED)
    } else {
        Decimal::ZERO
    }
}
