use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::TaxError;
use crate::calculations::common::{check_amount, max};
use crate::calculations::{
    InvestmentDeductionAggregator, PeriodCalendar, SectionRegistry, SlabTaxEngine,
    ThresholdEvaluator, WithholdingCalculator, effective_rate,
};
use crate::models::{
    AnnualTaxRequest, AnnualTaxResult, AssetClass, DeductionInput, FinancialPeriod,
    FinancialYear, PayeeType, QuarterlyDueDates, Regime, RegimeComparison, SectionSummary,
    WithholdingRequest, WithholdingResult,
};
use crate::rules::RuleSet;

/// Entry point for every computation over one rule snapshot.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
/// use tds_core::TaxEngine;
/// use tds_core::models::{AnnualTaxRequest, Regime};
/// use tds_core::rules::RuleBook;
///
/// let book = RuleBook::builtin();
/// let rules = book.for_date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()).unwrap();
/// let engine = TaxEngine::new(rules);
///
/// let request = AnnualTaxRequest {
///     gross_income: dec!(900000),
///     deductions: vec![],
///     regime: Regime::New,
/// };
/// let result = engine.compute_annual_tax(&request).unwrap();
///
/// assert_eq!(result.taxable_income, dec!(850000));
/// assert_eq!(result.total_tax, dec!(40000));
/// assert_eq!(result.effective_rate, dec!(4.44));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TaxEngine<'a> {
    rules: &'a RuleSet,
}

impl<'a> TaxEngine<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'a RuleSet {
        self.rules
    }

    /// Withholding on one payment.
    ///
    /// # Errors
    ///
    /// See [`WithholdingCalculator::calculate`].
    pub fn calculate_withholding(
        &self,
        request: &WithholdingRequest,
    ) -> Result<WithholdingResult, TaxError> {
        WithholdingCalculator::new(self.rules).calculate(request)
    }

    /// Annual income tax under the requested regime.
    ///
    /// Taxable income is gross income less the regime's standard deduction
    /// and the allowable investment deductions, floored at zero.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::Validation`] if gross income, a deduction amount
    /// or a deduction cap is negative or above the accepted ceiling.
    pub fn compute_annual_tax(
        &self,
        request: &AnnualTaxRequest,
    ) -> Result<AnnualTaxResult, TaxError> {
        check_amount("gross income", request.gross_income)?;

        let definition = self.rules.regime(request.regime);
        let standard_deduction = definition.standard_deduction;
        let investment_deduction =
            InvestmentDeductionAggregator::aggregate(&request.deductions, request.regime)?;
        let taxable_income = max(
            request.gross_income - standard_deduction - investment_deduction,
            Decimal::ZERO,
        );

        let slab_tax = SlabTaxEngine::new(definition).compute_annual_tax(taxable_income)?;
        let effective_rate = effective_rate(slab_tax.total, request.gross_income);

        debug!(
            regime = %request.regime,
            gross_income = %request.gross_income,
            %taxable_income,
            total_tax = %slab_tax.total,
            "computed annual tax"
        );

        Ok(AnnualTaxResult {
            regime: request.regime,
            gross_income: request.gross_income,
            standard_deduction,
            investment_deduction,
            taxable_income,
            tax_before_rebate: slab_tax.before_rebate,
            rebate: slab_tax.rebate,
            total_tax: slab_tax.total,
            effective_rate,
        })
    }

    /// Computes both regimes over the same income and claims and recommends
    /// the cheaper one. The new regime is recommended on a tie.
    ///
    /// # Errors
    ///
    /// Same as [`TaxEngine::compute_annual_tax`].
    pub fn compare_regimes(
        &self,
        gross_income: Decimal,
        deductions: &[DeductionInput],
    ) -> Result<RegimeComparison, TaxError> {
        let compute = |regime| {
            self.compute_annual_tax(&AnnualTaxRequest {
                gross_income,
                deductions: deductions.to_vec(),
                regime,
            })
        };
        let old = compute(Regime::Old)?;
        let new = compute(Regime::New)?;

        let recommended = if old.total_tax < new.total_tax {
            Regime::Old
        } else {
            Regime::New
        };
        let savings = (old.total_tax - new.total_tax).abs();

        info!(%recommended, %savings, "compared regimes");

        Ok(RegimeComparison {
            old,
            new,
            recommended,
            savings,
        })
    }

    /// Every section of the rule set, in table order.
    pub fn list_sections(&self) -> Vec<SectionSummary> {
        SectionRegistry::new(self.rules.sections())
            .sections()
            .map(|section| section.summary())
            .collect()
    }

    /// The limit that governs a payment to `payee` under `section`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidSection`] for an unknown section and
    /// [`TaxError::Validation`] when the asset class does not fit the section.
    pub fn get_threshold(
        &self,
        section: &str,
        payee: PayeeType,
        asset_class: Option<AssetClass>,
    ) -> Result<Decimal, TaxError> {
        let section = SectionRegistry::new(self.rules.sections()).lookup(section)?;
        ThresholdEvaluator::validate_asset_class(section, asset_class)?;
        let (threshold, _) = ThresholdEvaluator::threshold_for(section, payee, asset_class);
        Ok(threshold)
    }

    pub fn derive_period(
        &self,
        date: NaiveDate,
    ) -> FinancialPeriod {
        PeriodCalendar::derive_financial_year(date)
    }

    /// # Errors
    ///
    /// See [`PeriodCalendar::quarterly_due_dates`].
    pub fn quarterly_due_dates(
        &self,
        financial_year: &FinancialYear,
    ) -> Result<QuarterlyDueDates, TaxError> {
        PeriodCalendar::quarterly_due_dates(financial_year)
    }

    /// Last day to deposit tax withheld on `payment_date`.
    ///
    /// # Errors
    ///
    /// See [`PeriodCalendar::deposit_due_date`].
    pub fn deposit_due_date(
        &self,
        payment_date: NaiveDate,
    ) -> Result<NaiveDate, TaxError> {
        PeriodCalendar::deposit_due_date(payment_date)
    }
}
