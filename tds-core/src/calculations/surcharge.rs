use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::common::percent_of;
use crate::models::{PayeeType, Surcharge};
use crate::rules::SurchargeTables;

/// Tiered surcharge lookup by annual income and payee type.
#[derive(Debug, Clone, Copy)]
pub struct SurchargeEngine<'a> {
    tables: &'a SurchargeTables,
}

impl<'a> SurchargeEngine<'a> {
    pub fn new(tables: &'a SurchargeTables) -> Self {
        Self { tables }
    }

    /// Surcharge rate for the payee's income bracket.
    ///
    /// Brackets are lower-inclusive and upper-exclusive, so income exactly on
    /// a boundary takes the higher bracket's rate.
    pub fn rate_for(
        &self,
        payee: PayeeType,
        annual_income: Decimal,
    ) -> Decimal {
        let rate = self
            .tables
            .table_for(payee)
            .iter()
            .find(|bracket| bracket.contains(annual_income))
            .map(|bracket| bracket.rate);
        match rate {
            Some(rate) => rate,
            None => {
                warn!(%payee, %annual_income, "no surcharge bracket matched; applying none");
                Decimal::ZERO
            }
        }
    }

    /// Surcharge on `base_tax`. Without the payee's annual income there is no
    /// bracket to look up, so the surcharge is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tds_core::calculations::SurchargeEngine;
    /// use tds_core::models::PayeeType;
    /// use tds_core::rules::RuleBook;
    ///
    /// let book = RuleBook::builtin();
    /// let engine = SurchargeEngine::new(book.latest().surcharge());
    ///
    /// let surcharge = engine.compute(dec!(100000), PayeeType::Individual, Some(dec!(6000000)));
    /// assert_eq!(surcharge.rate, dec!(10));
    /// assert_eq!(surcharge.amount, dec!(10000));
    ///
    /// let none = engine.compute(dec!(100000), PayeeType::Individual, None);
    /// assert_eq!(none.amount, dec!(0));
    /// ```
    pub fn compute(
        &self,
        base_tax: Decimal,
        payee: PayeeType,
        annual_income: Option<Decimal>,
    ) -> Surcharge {
        let Some(income) = annual_income else {
            return Surcharge::default();
        };
        let rate = self.rate_for(payee, income);
        Surcharge {
            rate,
            amount: percent_of(base_tax, rate),
        }
    }
}
