//! Numeric building blocks shared by the calculators.
//!
//! Everything here works on [`rust_decimal::Decimal`] except the IRR root
//! finder in [`finance`], which needs floating point powers.

pub mod brackets;
pub mod common;
pub mod finance;
pub mod interpolation;
pub mod vat;
