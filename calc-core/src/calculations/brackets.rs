//! Progressive tax-bracket accumulation.
//!
//! A schedule is an ordered list of `(upper_bound, marginal_rate)` pairs that
//! covers `[0, ∞)`; the last bracket is open-ended. The tax owed on a base `B`
//! is the sum over brackets of `rate × (min(B, upper) − previous_upper)` for
//! every bracket whose lower bound is below `B`.
//!
//! All arithmetic is done in [`Decimal`] without intermediate rounding.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use calc_core::calculations::brackets::{Bracket, BracketSchedule};
//!
//! let schedule = BracketSchedule::new(vec![
//!     Bracket::up_to(dec!(12450), dec!(0.19)),
//!     Bracket::up_to(dec!(20200), dec!(0.24)),
//!     Bracket::open(dec!(0.30)),
//! ])
//! .unwrap();
//!
//! assert_eq!(schedule.tax(dec!(20200)), dec!(4225.50));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a bracket schedule is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketError {
    /// No brackets were provided.
    #[error("no tax brackets provided")]
    Empty,

    /// Upper bounds must be strictly ascending and positive.
    #[error("bracket {index} upper bound {upper} does not exceed the previous bound")]
    NotAscending { index: usize, upper: Decimal },

    /// Only the last bracket may be open-ended, and it must be.
    #[error("bracket {0} is open-ended but is not the last bracket")]
    OpenBracketNotLast(usize),

    /// The last bracket has an upper bound, so high bases would be untaxed.
    #[error("the last bracket must be open-ended")]
    LastBracketBounded,

    /// Marginal rates are fractions in `[0, 1]`.
    #[error("marginal rate must be between 0 and 1, got {0}")]
    InvalidRate(Decimal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    /// Inclusive upper bound of the bracket; `None` for the top bracket.
    pub upper: Option<Decimal>,
    /// Marginal rate as a fraction (`0.19` for 19 %).
    pub rate: Decimal,
}

impl Bracket {
    pub fn up_to(
        upper: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            upper: Some(upper),
            rate,
        }
    }

    pub fn open(rate: Decimal) -> Self {
        Self { upper: None, rate }
    }
}

/// The portion of a base that falls into one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlice {
    pub lower: Decimal,
    pub upper: Option<Decimal>,
    pub rate: Decimal,
    pub taxable: Decimal,
    pub tax: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSchedule {
    brackets: Vec<Bracket>,
}

impl BracketSchedule {
    /// Validates and wraps a list of brackets sorted by upper bound.
    pub fn new(brackets: Vec<Bracket>) -> Result<Self, BracketError> {
        if brackets.is_empty() {
            return Err(BracketError::Empty);
        }

        let mut previous = Decimal::ZERO;
        let last = brackets.len() - 1;
        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(BracketError::InvalidRate(bracket.rate));
            }
            match bracket.upper {
                Some(upper) if upper <= previous => {
                    return Err(BracketError::NotAscending { index, upper });
                }
                Some(_) if index == last => return Err(BracketError::LastBracketBounded),
                Some(upper) => previous = upper,
                None if index != last => return Err(BracketError::OpenBracketNotLast(index)),
                None => {}
            }
        }

        Ok(Self { brackets })
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    /// Tax owed on `base`. Zero for a zero or negative base.
    pub fn tax(
        &self,
        base: Decimal,
    ) -> Decimal {
        self.breakdown(base).iter().map(|slice| slice.tax).sum()
    }

    /// Per-bracket split of `base`, stopping at the bracket that contains it.
    pub fn breakdown(
        &self,
        base: Decimal,
    ) -> Vec<BracketSlice> {
        let mut slices = Vec::new();
        let mut lower = Decimal::ZERO;

        for bracket in &self.brackets {
            if base <= lower {
                break;
            }
            let top = bracket.upper.map_or(base, |upper| base.min(upper));
            let taxable = top - lower;
            slices.push(BracketSlice {
                lower,
                upper: bracket.upper,
                rate: bracket.rate,
                taxable,
                tax: taxable * bracket.rate,
            });
            match bracket.upper {
                Some(upper) => lower = upper,
                None => break,
            }
        }

        slices
    }

    /// Rate applied to the last euro of `base`.
    pub fn marginal_rate(
        &self,
        base: Decimal,
    ) -> Decimal {
        self.brackets
            .iter()
            .find(|b| b.upper.is_none_or(|upper| base <= upper))
            .map_or(Decimal::ZERO, |b| b.rate)
    }
}
