//! Common utility functions for tax calculations.
//!
//! Every monetary component (basic tax, surcharge, cess, slab tax) is rounded
//! exactly once with [`round_rupee`]. Sums of already rounded components are
//! never rounded again.
//!
//! Rupee inputs are bounded by [`MAX_AMOUNT`] so that products with
//! percentage rates always fit in a [`Decimal`].

use rust_decimal::{Decimal, RoundingStrategy};

use crate::TaxError;

/// Percentage divisor used by every `amount * rate / 100` computation.
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Largest accepted rupee amount (10^15, one hundred thousand crore crore).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Checks that a rupee input lies in `0..=MAX_AMOUNT`.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use tds_core::calculations::common::check_amount;
///
/// assert_eq!(check_amount("payment amount", dec!(60000)), Ok(dec!(60000)));
/// assert!(check_amount("payment amount", dec!(-1)).is_err());
/// assert!(check_amount("payment amount", Decimal::MAX).is_err());
/// ```
pub fn check_amount(
    label: &str,
    value: Decimal,
) -> Result<Decimal, TaxError> {
    if value < Decimal::ZERO {
        return Err(TaxError::validation(format!(
            "{label} must be non-negative, got {value}"
        )));
    }
    if value > MAX_AMOUNT {
        return Err(TaxError::validation(format!(
            "{label} must not exceed {MAX_AMOUNT}, got {value}"
        )));
    }
    Ok(value)
}

/// Rounds a monetary value to whole rupees using half-away-from-zero rounding.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tds_core::calculations::common::round_rupee;
///
/// assert_eq!(round_rupee(dec!(123.49)), dec!(123));
/// assert_eq!(round_rupee(dec!(123.50)), dec!(124));
/// assert_eq!(round_rupee(dec!(-123.50)), dec!(-124)); // Away from zero
/// ```
pub fn round_rupee(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Used for reported percentages (effective rate), never for money.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tds_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(4.444)), dec!(4.44));
/// assert_eq!(round_half_up(dec!(4.445)), dec!(4.45));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Applies a percentage rate to an amount and rounds the product once.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tds_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(60000), dec!(10)), dec!(6000));
/// assert_eq!(percent_of(dec!(6000), dec!(4)), dec!(240));
/// ```
pub fn percent_of(
    amount: Decimal,
    rate: Decimal,
) -> Decimal {
    round_rupee(amount * rate / HUNDRED)
}

/// Returns the maximum of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}
