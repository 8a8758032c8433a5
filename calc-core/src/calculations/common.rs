//! Small arithmetic helpers shared by every calculator.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Upper bound of every money input, and the magnitude bound of cash flows.
///
/// Keeps products and sums of inputs far inside the `Decimal` range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero. Used for display and
/// for amounts that are legally expressed in cents; bracket arithmetic never
/// rounds in between.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use calc_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// `value × percent / 100`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use calc_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(1000), dec!(6.47)), dec!(64.70));
/// ```
pub fn percent_of(
    value: Decimal,
    percent: Decimal,
) -> Decimal {
    value * percent / HUNDRED
}

/// `numerator / denominator`, or zero when the denominator is zero.
///
/// Calculators use this wherever an income field may be left empty, so a
/// rate output stays finite instead of failing.
pub fn safe_ratio(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// `numerator / denominator` expressed in percent, zero when the denominator is zero.
pub fn safe_percent(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    safe_ratio(numerator, denominator) * HUNDRED
}
