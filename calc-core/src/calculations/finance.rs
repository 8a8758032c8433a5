//! Discounted cash-flow helpers: net present value and internal rate of return.
//!
//! Rates are decimals (`0.1` is 10 %). Flows are ordered by period, `flows[0]`
//! being the amount at time zero. The root finder works in `f64`; callers
//! convert to and from [`Decimal`] at the boundary.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use tracing::debug;

/// Lower end of the IRR search bracket. Rates at or below -100 % are undefined.
pub const IRR_LOWER_BOUND: f64 = -0.9999;
/// Initial upper end of the IRR search bracket.
pub const IRR_INITIAL_UPPER: f64 = 0.1;
/// The upper end is never expanded past this rate (100 000 %).
pub const IRR_UPPER_LIMIT: f64 = 1000.0;

const EXPANSION_FACTOR: f64 = 1.8;
const MAX_EXPANSIONS: usize = 60;
const MAX_BISECTIONS: usize = 200;
const MAX_NEWTON_STEPS: usize = 8;
const NPV_TOLERANCE: f64 = 1e-9;
const MIN_DERIVATIVE: f64 = 1e-12;

/// Net present value of `flows` at `rate`: `Σ flows[t] / (1 + rate)^t`.
pub fn npv(
    rate: f64,
    flows: &[f64],
) -> f64 {
    let base = 1.0 + rate;
    flows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf / base.powi(t as i32))
        .sum()
}

/// Derivative of [`npv`] with respect to the rate: `Σ −t · flows[t] / (1 + rate)^(t+1)`.
pub fn npv_derivative(
    rate: f64,
    flows: &[f64],
) -> f64 {
    let base = 1.0 + rate;
    flows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(t, cf)| -(t as f64) * cf / base.powi(t as i32 + 1))
        .sum()
}

/// Number of sign changes in `flows`, ignoring zero entries.
///
/// More than one change means the flows may have several mathematically
/// valid internal rates of return.
pub fn sign_changes(flows: &[f64]) -> usize {
    flows
        .iter()
        .filter(|cf| **cf != 0.0)
        .map(|cf| cf.is_sign_positive())
        .collect::<Vec<_>>()
        .windows(2)
        .filter(|pair| pair[0] != pair[1])
        .count()
}

fn same_sign(
    a: f64,
    b: f64,
) -> bool {
    (a > 0.0 && b > 0.0) || (a < 0.0 && b < 0.0)
}

/// Internal rate of return of `flows`, or `None` when no root can be bracketed.
///
/// Requires at least two flows, a negative initial flow and at least one
/// later positive flow. The bracket `[-0.9999, 0.1]` is widened geometrically
/// until the NPV changes sign, then bisected and finally polished with a few
/// Newton steps. Newton steps that would leave the domain, produce a
/// non-finite value or increase `|NPV|` are discarded.
///
/// ```
/// use calc_core::calculations::finance::{irr, npv};
///
/// let flows = [-50000.0, 15000.0, 20000.0, 25000.0, 15000.0];
/// let rate = irr(&flows).unwrap();
///
/// assert!(npv(rate, &flows).abs() < 1e-6);
/// assert!(rate > 0.0 && rate < 1.0);
/// ```
pub fn irr(flows: &[f64]) -> Option<f64> {
    if flows.len() < 2 || flows.iter().any(|cf| !cf.is_finite()) {
        return None;
    }
    if flows[0] >= 0.0 || !flows[1..].iter().any(|cf| *cf > 0.0) {
        return None;
    }

    let mut lo = IRR_LOWER_BOUND;
    let mut hi = IRR_INITIAL_UPPER;
    let mut npv_lo = npv(lo, flows);
    let mut npv_hi = npv(hi, flows);
    if npv_lo.is_nan() {
        return None;
    }

    let mut expansions = 0;
    while same_sign(npv_lo, npv_hi) && hi < IRR_UPPER_LIMIT && expansions < MAX_EXPANSIONS {
        hi *= EXPANSION_FACTOR;
        npv_hi = npv(hi, flows);
        expansions += 1;
    }
    if npv_hi == 0.0 {
        return Some(hi);
    }
    if npv_lo == 0.0 {
        return Some(lo);
    }
    if same_sign(npv_lo, npv_hi) || npv_hi.is_nan() {
        debug!(expansions, "no sign change found for IRR bracket");
        return None;
    }

    let mut rate = (lo + hi) / 2.0;
    for _ in 0..MAX_BISECTIONS {
        rate = (lo + hi) / 2.0;
        let value = npv(rate, flows);
        if value.abs() < NPV_TOLERANCE || (hi - lo).abs() < f64::EPSILON {
            break;
        }
        if same_sign(value, npv_lo) {
            lo = rate;
            npv_lo = value;
        } else {
            hi = rate;
        }
    }

    for _ in 0..MAX_NEWTON_STEPS {
        let value = npv(rate, flows);
        let slope = npv_derivative(rate, flows);
        if slope.abs() < MIN_DERIVATIVE || !slope.is_finite() {
            break;
        }
        let next = rate - value / slope;
        if !next.is_finite() || next <= -1.0 {
            break;
        }
        let next_value = npv(next, flows);
        if !next_value.is_finite() || next_value.abs() > value.abs() {
            break;
        }
        rate = next;
        if next_value.abs() < NPV_TOLERANCE {
            break;
        }
    }

    rate.is_finite().then_some(rate)
}

/// Converts decimal flows to `f64` for the root finder. Unrepresentable values become zero.
pub fn to_f64_flows(flows: &[Decimal]) -> Vec<f64> {
    flows.iter().map(|cf| cf.to_f64().unwrap_or(0.0)).collect()
}

/// Converts a finite `f64` back to a [`Decimal`].
pub fn to_decimal(value: f64) -> Option<Decimal> {
    if value.is_finite() {
        Decimal::from_f64(value)
    } else {
        None
    }
}

/// Undiscounted payback period in periods, interpolated within the period
/// in which the cumulative flow turns non-negative. `None` if it never does.
pub fn payback_period(flows: &[Decimal]) -> Option<Decimal> {
    let first = *flows.first()?;
    if first >= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }

    let mut cumulative = first;
    for (t, cf) in flows.iter().enumerate().skip(1) {
        let previous = cumulative;
        cumulative += *cf;
        if cumulative >= Decimal::ZERO && *cf > Decimal::ZERO {
            let fraction = -previous / *cf;
            return Some(Decimal::from(t - 1) + fraction);
        }
    }
    None
}

/// Running totals of `flows`, one per period.
pub fn cumulative(flows: &[Decimal]) -> Vec<Decimal> {
    flows
        .iter()
        .scan(Decimal::ZERO, |total, cf| {
            *total += *cf;
            Some(*total)
        })
        .collect()
}
