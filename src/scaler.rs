//! Distance-weighted redistribution for vertical point drags
//!
//! Dragging one point's price bends its neighbours along with it: step `i`
//! moves by `delta × influence × w(i)`, where
//! `w(i) = 1 − |i − k| / (d_max + 1)` and `d_max` is the farthest index
//! distance from the dragged step `k`. A left-to-right repair pass then
//! forces prices to be non-decreasing.

use crate::steps::Step;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tuning for [`apply_drag_with`]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DragParams {
    /// Floor applied to every resulting price
    pub min_price: f64,
    /// Share of the raw delta passed on to a neighbour at distance 0 (before weighting)
    pub influence: f64,
    /// Increment used to lift a price that fell below its predecessor
    pub repair_step: f64,
}

impl Default for DragParams {
    fn default() -> Self {
        Self { min_price: 0.01, influence: 0.5, repair_step: 0.01 }
    }
}

/// Sets `steps[drag_index]` to `new_price` and bends the rest of the curve with default [`DragParams`]
pub fn apply_drag(steps: &[Step], drag_index: usize, new_price: f64, decimals: u32) -> Vec<Step> {
    apply_drag_with(steps, drag_index, new_price, DragParams::default(), decimals)
}

/// Weighted drag with explicit parameters; an out-of-range index returns the steps unchanged
pub fn apply_drag_with(
    steps: &[Step],
    drag_index: usize,
    new_price: f64,
    params: DragParams,
    decimals: u32,
) -> Vec<Step> {
    let Some(dragged) = steps.get(drag_index) else {
        return steps.to_vec();
    };
    let delta = new_price - dragged.price;
    let max_distance = drag_index.max(steps.len() - 1 - drag_index) as f64;

    let mut prices: Vec<f64> = steps
        .iter()
        .enumerate()
        .map(|(i, s)| {
            if i == drag_index {
                return new_price.max(params.min_price);
            }
            let weight = 1.0 - i.abs_diff(drag_index) as f64 / (max_distance + 1.0);
            (s.price + delta * weight * params.influence).max(params.min_price)
        })
        .collect();

    let mut repaired = 0usize;
    for i in 1..prices.len() {
        if prices[i] < prices[i - 1] {
            prices[i] = prices[i - 1] + params.repair_step;
            repaired += 1;
        }
    }
    debug!(drag_index, new_price, delta, repaired, "applied weighted drag");

    steps
        .iter()
        .zip(prices)
        .map(|(s, p)| s.with_price(p, decimals))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::generate_linear_steps;
    use approx::assert_relative_eq;

    #[test]
    fn influence_decays_with_distance() {
        let s = generate_linear_steps(500, 5, 10.0, 1.0, 18);
        let out = apply_drag(&s, 2, 14.0, 18);
        // delta 2, d_max 2: weights 1/3, 2/3 either side
        assert_eq!(out[2].price, 14.0);
        assert_relative_eq!(out[1].price, 11.0 + 2.0 * (2.0 / 3.0) * 0.5, epsilon = 1e-12);
        assert_relative_eq!(out[0].price, 10.0 + 2.0 * (1.0 / 3.0) * 0.5, epsilon = 1e-12);
        assert_relative_eq!(out[4].price, 14.0 + 2.0 * (1.0 / 3.0) * 0.5, epsilon = 1e-12);
        // 13 + 2/3 falls under the dragged 14 and gets lifted
        assert_relative_eq!(out[3].price, 14.01, epsilon = 1e-9);
        assert_eq!(out.iter().map(|x| x.range_to).collect::<Vec<_>>(), vec![100, 200, 300, 400, 500]);
    }

    #[test]
    fn repair_lifts_followers_of_a_dragged_down_point() {
        let s = generate_linear_steps(300, 3, 10.0, 5.0, 18);
        let out = apply_drag(&s, 0, 40.0, 18);
        assert_eq!(out[0].price, 40.0);
        for w in out.windows(2) {
            assert!(w[1].price >= w[0].price, "{out:?}");
        }
        assert_relative_eq!(out[1].price, 40.01, epsilon = 1e-9);
    }

    #[test]
    fn prices_never_drop_below_floor() {
        let s = generate_linear_steps(300, 3, 1.0, 1.0, 18);
        let out = apply_drag(&s, 2, -50.0, 18);
        assert_eq!(out[2].price, 0.01);
        assert!(out.iter().all(|x| x.price >= 0.01));
        assert_eq!(out[0].price_scaled, 10_000_000_000_000_000);
    }

    #[test]
    fn out_of_range_index_is_noop() {
        let s = generate_linear_steps(300, 3, 1.0, 1.0, 18);
        assert_eq!(apply_drag(&s, 3, 9.0, 18), s);
        assert!(apply_drag(&[], 0, 9.0, 18).is_empty());
    }
}
