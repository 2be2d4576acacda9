//! Curve validation, linearity detection and summary report

use crate::fixed::{round_to, PRICE_PRECISION};
use crate::steps::{uniform_range_to, LinearParams, Step};
use serde::Serialize;

/// Largest drift between consecutive price deltas still considered linear
pub const PRICE_DELTA_TOLERANCE: f64 = 0.0001;

/// Largest distance (in units) between an actual and a uniform range end still considered linear
pub const RANGE_TOLERANCE: u64 = 1;

/// Checks `steps` against the curve invariants.
///
/// Returns one message per violation, empty when valid. Ordering errors come
/// first, then the final-step mismatch, then price errors.
pub fn validate_steps(steps: &[Step], max_tickets: u64) -> Vec<String> {
    let Some(last) = steps.last() else {
        return vec!["at least one step is required".to_string()];
    };
    let mut errors = Vec::new();
    for (i, pair) in steps.windows(2).enumerate() {
        let (prev, cur) = (pair[0].range_to, pair[1].range_to);
        if cur <= prev {
            errors.push(format!(
                "step {}: range end {} must be greater than step {} range end {}",
                i + 2, cur, i + 1, prev
            ));
        }
    }
    if last.range_to != max_tickets {
        errors.push(format!(
            "final step range end {} must equal max tickets {}",
            last.range_to, max_tickets
        ));
    }
    for (i, s) in steps.iter().enumerate() {
        if s.price.is_nan() || s.price <= 0.0 {
            errors.push(format!("step {}: price {} must be greater than 0", i + 1, s.price));
        }
    }
    errors
}

/// Whether `steps` is indistinguishable from a linear curve with the same step count.
///
/// Range ends may drift by [`RANGE_TOLERANCE`] from the uniform grid and price
/// deltas by [`PRICE_DELTA_TOLERANCE`] from the first delta.
pub fn is_linear_curve(steps: &[Step], max_tickets: u64) -> bool {
    if steps.len() < 2 {
        return true;
    }
    let n = steps.len() as u64;
    let ranges_ok = steps
        .iter()
        .enumerate()
        .all(|(i, s)| s.range_to.abs_diff(uniform_range_to(max_tickets, n, i as u64)) <= RANGE_TOLERANCE);
    if !ranges_ok {
        return false;
    }
    let delta = steps[1].price - steps[0].price;
    steps
        .windows(2)
        .all(|w| ((w[1].price - w[0].price) - delta).abs() <= PRICE_DELTA_TOLERANCE)
}

/// Recovers the simple-mode parameters of a linear curve, or `None` when `steps` is not linear
pub fn infer_linear_params(steps: &[Step], max_tickets: u64) -> Option<LinearParams> {
    let first = steps.first()?;
    if !is_linear_curve(steps, max_tickets) {
        return None;
    }
    let price_delta = match steps.get(1) {
        Some(second) => round_to(second.price - first.price, PRICE_PRECISION),
        None => 0.0,
    };
    Some(LinearParams {
        max_tickets,
        num_steps: u32::try_from(steps.len()).ok()?,
        base_price: round_to(first.price, PRICE_PRECISION),
        price_delta,
    })
}

/// Summary of a step curve for display and export
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Number of steps
    pub steps: usize,
    /// Intended total supply
    pub max_tickets: u64,
    /// Validator output
    pub errors: Vec<String>,
    /// Whether the curve still matches its simple-mode description
    pub linear: bool,
    /// Whether prices strictly increase step over step
    pub monotone_ok: bool,
    /// Proceeds if every unit sells: Σ units_in_step × price
    pub total_revenue: f64,
    /// Lowest step price (0 when empty)
    pub min_price: f64,
    /// Highest step price (0 when empty)
    pub max_price: f64,
}

impl Report {
    /// True when the validator found nothing
    pub fn is_valid(&self) -> bool { self.errors.is_empty() }
}

/// Validates `steps` and gathers revenue and monotonicity figures
pub fn verify_curve(steps: &[Step], max_tickets: u64) -> Report {
    let mut total_revenue = 0.0_f64;
    let mut prev_end = 0_u64;
    let mut prev_px = f64::NEG_INFINITY;
    let mut monotone_ok = true;
    for s in steps {
        total_revenue += s.range_to.saturating_sub(prev_end) as f64 * s.price;
        prev_end = s.range_to;
        if s.price <= prev_px { monotone_ok = false; }
        prev_px = s.price;
    }
    let min_price = steps.iter().map(|s| s.price).reduce(f64::min).unwrap_or(0.0);
    let max_price = steps.iter().map(|s| s.price).reduce(f64::max).unwrap_or(0.0);

    Report {
        steps: steps.len(),
        max_tickets,
        errors: validate_steps(steps, max_tickets),
        linear: is_linear_curve(steps, max_tickets),
        monotone_ok,
        total_revenue,
        min_price,
        max_price,
    }
}
