use rust_decimal::Decimal;
use tds_core::models::{DeductionInput, DeductionSection};
use thiserror::Error;

/// Error returned when command-line text cannot be turned into an input value.
#[derive(Debug, Error)]
pub enum ParseInputError {
    #[error("invalid amount '{input}': {source}")]
    Amount {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },

    #[error("amount is empty")]
    EmptyAmount,

    #[error("invalid deduction '{0}'; expected CODE=AMOUNT or CODE=AMOUNT:CAP")]
    DeductionFormat(String),

    #[error("deduction '{0}' has no statutory cap; give one as CODE=AMOUNT:CAP")]
    UnknownDeduction(String),
}

/// Normalizes input for decimal parsing: trims whitespace, drops a leading
/// rupee sign and removes commas, so both `1,234,567` and the Indian
/// grouping `12,34,567` are accepted.
fn normalize_amount_input(s: &str) -> String {
    s.trim()
        .trim_start_matches('₹')
        .trim_start_matches("Rs.")
        .trim()
        .replace(',', "")
}

/// Parses a rupee amount.
pub fn parse_amount(s: &str) -> Result<Decimal, ParseInputError> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Err(ParseInputError::EmptyAmount);
    }
    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid amount: {}", e);
        ParseInputError::Amount {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Parses a deduction claim given as `CODE=AMOUNT` or `CODE=AMOUNT:CAP`.
///
/// Without an explicit cap the statutory cap of a well-known section is used.
pub fn parse_deduction(s: &str) -> Result<DeductionInput, ParseInputError> {
    let Some((code, rest)) = s.split_once('=') else {
        return Err(ParseInputError::DeductionFormat(s.to_string()));
    };
    let code = code.trim();
    if code.is_empty() {
        return Err(ParseInputError::DeductionFormat(s.to_string()));
    }

    match rest.split_once(':') {
        Some((amount, cap)) => Ok(DeductionInput::new(
            code,
            parse_amount(amount)?,
            parse_amount(cap)?,
        )),
        None => {
            let section: DeductionSection = code
                .parse()
                .map_err(|_| ParseInputError::UnknownDeduction(code.to_string()))?;
            Ok(DeductionInput::statutory(section, parse_amount(rest)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_amount_accepts_both_grouping_styles() {
        assert_eq!(parse_amount("1,234,567.89").unwrap(), dec!(1234567.89));
        assert_eq!(parse_amount("12,34,567").unwrap(), dec!(1234567));
    }

    #[test]
    fn parse_amount_strips_currency_and_whitespace() {
        assert_eq!(parse_amount("  ₹60,000 ").unwrap(), dec!(60000));
        assert_eq!(parse_amount("Rs. 500").unwrap(), dec!(500));
    }

    #[test]
    fn parse_amount_rejects_empty_and_garbage() {
        assert!(matches!(parse_amount("  "), Err(ParseInputError::EmptyAmount)));
        assert!(matches!(parse_amount("abc"), Err(ParseInputError::Amount { .. })));
    }

    #[test]
    fn parse_deduction_uses_statutory_cap() {
        let deduction = parse_deduction("80C=2,00,000").unwrap();

        assert_eq!(deduction, DeductionInput::new("80C", dec!(200000), dec!(150000)));
    }

    #[test]
    fn parse_deduction_with_explicit_cap() {
        let deduction = parse_deduction("80G=10000:5000").unwrap();

        assert_eq!(deduction, DeductionInput::new("80G", dec!(10000), dec!(5000)));
    }

    #[test]
    fn parse_deduction_unknown_section_needs_cap() {
        let result = parse_deduction("80G=10000");

        assert!(matches!(result, Err(ParseInputError::UnknownDeduction(code)) if code == "80G"));
    }

    #[test]
    fn parse_deduction_rejects_missing_separator() {
        assert!(matches!(
            parse_deduction("80C"),
            Err(ParseInputError::DeductionFormat(_))
        ));
        assert!(matches!(
            parse_deduction("=100"),
            Err(ParseInputError::DeductionFormat(_))
        ));
    }
}
