//! Withholding and annual income-tax calculations.
//!
//! Each component is a pure function over a borrowed rule table. The
//! [`crate::TaxEngine`] facade wires them together for a [`crate::rules::RuleSet`].

mod calendar;
pub mod common;
mod deductions;
mod registry;
mod slab;
mod surcharge;
mod threshold;
mod withholding;

pub use calendar::PeriodCalendar;
pub use deductions::InvestmentDeductionAggregator;
pub use registry::SectionRegistry;
pub use slab::{SlabTax, SlabTaxEngine, effective_rate};
pub use surcharge::SurchargeEngine;
pub use threshold::{ThresholdCheck, ThresholdEvaluator};
pub use withholding::{CESS_RATE, WithholdingCalculator};
