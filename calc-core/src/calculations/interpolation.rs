//! Linear interpolation between two income thresholds.
//!
//! Means-tested benefits pay a full amount up to a lower threshold, a reduced
//! amount from an upper threshold on, and a linearly decreasing amount in
//! between.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdScale {
    pub min_threshold: Decimal,
    pub max_threshold: Decimal,
    pub value_at_min: Decimal,
    pub value_at_max: Decimal,
}

impl ThresholdScale {
    pub const fn new(
        min_threshold: Decimal,
        max_threshold: Decimal,
        value_at_min: Decimal,
        value_at_max: Decimal,
    ) -> Self {
        Self {
            min_threshold,
            max_threshold,
            value_at_min,
            value_at_max,
        }
    }

    /// Value of the scale at `input`.
    ///
    /// Returns `value_at_min` at or below the lower threshold and
    /// `value_at_max` at or above the upper one, exactly.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use calc_core::calculations::interpolation::ThresholdScale;
    ///
    /// let scale = ThresholdScale::new(dec!(17090.61), dec!(45574.96), dec!(199.40), dec!(57.00));
    ///
    /// assert_eq!(scale.value_at(dec!(31332.785)), dec!(128.20));
    /// ```
    pub fn value_at(
        &self,
        input: Decimal,
    ) -> Decimal {
        if input <= self.min_threshold {
            return self.value_at_min;
        }
        if input >= self.max_threshold {
            return self.value_at_max;
        }
        let span = self.max_threshold - self.min_threshold;
        self.value_at_max
            + (self.value_at_min - self.value_at_max) * (self.max_threshold - input) / span
    }
}
