//! Pure step-array transitions used by the table and graph editors
//!
//! Every function takes the current steps by reference and returns a new
//! vector. Out-of-range indices leave the curve unchanged. None of them
//! refuse to run on a curve that would fail validation; callers surface
//! [`crate::verifier::validate_steps`] after the call instead.

use crate::fixed::round_to;
use crate::steps::{Step, StepField};
use tracing::{debug, warn};

/// Smallest price a dragged point may take
pub const MIN_DRAG_PRICE: f64 = 0.01;

/// Decimal places kept when a price is set by dragging
pub const DRAG_PRICE_PLACES: u32 = 2;

fn warn_on_collision(op: &'static str, steps: &[Step]) {
    if let Some(i) = steps.windows(2).position(|w| w[1].range_to <= w[0].range_to) {
        warn!(op, step = i + 2, range_to = steps[i + 1].range_to, "range ends no longer strictly increasing");
    }
}

/// Replaces one field of `steps[index]`; a new price re-derives the scaled price.
///
/// No clamping: a half-typed table value is kept as entered.
pub fn update_step(steps: &[Step], index: usize, field: StepField, decimals: u32) -> Vec<Step> {
    let mut out = steps.to_vec();
    let Some(step) = out.get_mut(index) else {
        warn!(index, len = steps.len(), "update_step: index out of range");
        return out;
    };
    match field {
        StepField::RangeTo(range_to) => step.range_to = range_to,
        StepField::Price(price) => *step = step.with_price(price, decimals),
    }
    debug!(index, ?field, "updated step");
    out
}

/// Inserts a new step just before the last one.
///
/// The new step ends at 90% of the current last range end and is priced halfway between the last two prices (or one below the last
/// price when there is only one step). The last step is then pinned to
/// `max_tickets`. An empty curve becomes a single step at `base_price`.
pub fn add_step(steps: &[Step], max_tickets: u64, base_price: f64, decimals: u32) -> Vec<Step> {
    let Some(&last) = steps.last() else {
        debug!(max_tickets, base_price, "added first step");
        return vec![Step::new(max_tickets, base_price, decimals)];
    };
    let price = match steps.len() {
        1 => last.price - 1.0,
        n => (last.price + steps[n - 2].price) / 2.0,
    };
    // floor(0.9 * end) without overflowing the intermediate product
    let range_to = last.range_to / 10 * 9 + last.range_to % 10 * 9 / 10;

    let mut out = steps.to_vec();
    let last_idx = out.len() - 1;
    out[last_idx].range_to = max_tickets;
    out.insert(last_idx, Step::new(range_to, price, decimals));
    debug!(range_to, price, len = out.len(), "added step");
    warn_on_collision("add_step", &out);
    out
}

/// Removes `steps[index]` and re-pins the new last step to `max_tickets`.
///
/// A single-step curve is returned unchanged.
pub fn remove_step(steps: &[Step], index: usize, max_tickets: u64) -> Vec<Step> {
    if steps.len() <= 1 {
        warn!(index, "remove_step: curve must keep at least one step");
        return steps.to_vec();
    }
    if index >= steps.len() {
        warn!(index, len = steps.len(), "remove_step: index out of range");
        return steps.to_vec();
    }
    let mut out = steps.to_vec();
    out.remove(index);
    if let Some(last) = out.last_mut() {
        last.range_to = max_tickets;
    }
    debug!(index, len = out.len(), "removed step");
    out
}

/// Splices a step halfway between `steps[after_index]` and the step after it.
///
/// Range end and price are the floor-midpoint and mean of the two neighbours.
/// Neighbours one unit apart produce a duplicate range end, left for the
/// validator to report.
pub fn insert_step_between(steps: &[Step], after_index: usize, decimals: u32) -> Vec<Step> {
    if steps.len() < 2 || after_index > steps.len() - 2 {
        warn!(after_index, len = steps.len(), "insert_step_between: no following step");
        return steps.to_vec();
    }
    let (a, b) = (steps[after_index], steps[after_index + 1]);
    let range_to = a.range_to / 2 + b.range_to / 2 + (a.range_to % 2 + b.range_to % 2) / 2;
    let price = (a.price + b.price) / 2.0;

    let mut out = steps.to_vec();
    out.insert(after_index + 1, Step::new(range_to, price, decimals));
    debug!(after_index, range_to, price, "inserted step");
    warn_on_collision("insert_step_between", &out);
    out
}

/// Moves a point on the graph.
///
/// The last step's range end stays at `max_tickets`. Other range ends are
/// rounded and kept strictly between the neighbours' range ends (and at least
/// 1 for the first step). The price is floored at [`MIN_DRAG_PRICE`] and
/// rounded to cents.
pub fn update_step_position(
    steps: &[Step],
    index: usize,
    new_range_to: f64,
    new_price: f64,
    max_tickets: u64,
    decimals: u32,
) -> Vec<Step> {
    let mut out = steps.to_vec();
    if index >= out.len() {
        warn!(index, len = steps.len(), "update_step_position: index out of range");
        return out;
    }
    let range_to = if index == out.len() - 1 {
        max_tickets
    } else {
        let lower = if index == 0 { 1 } else { steps[index - 1].range_to.saturating_add(1) };
        let upper = steps[index + 1].range_to.saturating_sub(1);
        // max then min: inverted bounds (already-colliding neighbours) resolve to `upper`
        new_range_to.round().max(lower as f64).min(upper as f64) as u64
    };
    let price = round_to(new_price.max(MIN_DRAG_PRICE), DRAG_PRICE_PLACES);
    out[index] = Step::new(range_to, price, decimals);
    debug!(index, range_to, price, "repositioned step");
    out
}
