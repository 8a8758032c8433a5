//! VAT inclusion and extraction. Rates are percentages (`22` is 22 %).

use rust_decimal::Decimal;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

fn factor(rate_percent: Decimal) -> Decimal {
    Decimal::ONE + rate_percent / HUNDRED
}

/// Gross amount for a `net` amount taxed at `rate_percent`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use calc_core::calculations::vat::add_vat;
///
/// assert_eq!(add_vat(dec!(100), dec!(22)), dec!(122));
/// ```
pub fn add_vat(
    net: Decimal,
    rate_percent: Decimal,
) -> Decimal {
    net * factor(rate_percent)
}

/// Net amount contained in a `gross` amount taxed at `rate_percent`.
///
/// A rate of -100 % has no inverse; the gross amount is returned as-is.
pub fn remove_vat(
    gross: Decimal,
    rate_percent: Decimal,
) -> Decimal {
    let factor = factor(rate_percent);
    if factor.is_zero() { gross } else { gross / factor }
}

/// The tax included in `gross`.
pub fn vat_portion(
    gross: Decimal,
    rate_percent: Decimal,
) -> Decimal {
    gross - remove_vat(gross, rate_percent)
}
