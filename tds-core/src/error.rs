use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned at the boundary of the computation core.
///
/// Every failure is a recoverable value; the caller decides how to present it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxError {
    /// The section code is not part of the rule table.
    #[error("invalid TDS section '{0}'")]
    InvalidSection(String),

    /// A numeric or categorical input failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The regime tag is neither `old` nor `new`.
    #[error("unsupported tax regime '{0}'; expected 'old' or 'new'")]
    UnsupportedRegime(String),

    /// A rule table violates a structural invariant (gaps, overlaps, ordering).
    #[error("invalid rule table: {0}")]
    InvalidRuleTable(String),

    /// No rule vintage was in force on the requested date.
    #[error("no rule table in effect on {0}")]
    NoRulesInEffect(NaiveDate),
}

impl TaxError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn rule_table(message: impl Into<String>) -> Self {
        Self::InvalidRuleTable(message.into())
    }
}
