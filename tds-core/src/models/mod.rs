mod annual;
mod payee;
mod period;
mod regime;
mod section;
mod withholding;

pub use annual::{
    AnnualTaxRequest, AnnualTaxResult, DeductionInput, DeductionSection, RegimeComparison,
};
pub use payee::{AssetClass, PayeeType};
pub(crate) use period::calendar_date;
pub use period::{FinancialPeriod, FinancialYear, Quarter, QuarterDueDate, QuarterlyDueDates};
pub use regime::{Rebate, Regime, RegimeDefinition, SlabRate};
pub use section::{
    PayeeRates, RateTable, SectionCode, SectionSummary, ThresholdKind, ThresholdTable,
    WithholdingSection,
};
pub use withholding::{RateSource, Surcharge, WithholdingRequest, WithholdingResult};
