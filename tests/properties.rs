use approx::assert_relative_eq;
use proptest::prelude::*;
use stepcurve::fixed::{from_scaled, to_scaled};
use stepcurve::mutate::{insert_step_between, remove_step, update_step_position};
use stepcurve::scaler::apply_drag;
use stepcurve::steps::generate_linear_steps;
use stepcurve::verifier::{is_linear_curve, validate_steps, verify_curve};
use stepcurve::Step;

proptest! {
    #[test]
    fn six_decimal_prices_survive_scaling(
        micros in 0u64..1_000_000_000_000,  // up to 1e6 whole units
        decimals in 0u32..=24
    ) {
        let p = micros as f64 / 1e6;
        let scaled = to_scaled(p, decimals);
        if decimals >= 6 {
            prop_assert_eq!(from_scaled(scaled, decimals), p);
            prop_assert_eq!(to_scaled(from_scaled(scaled, decimals), decimals), scaled);
        } else {
            prop_assert_eq!(to_scaled(from_scaled(scaled, decimals), decimals), scaled);
        }
    }

    #[test]
    fn linear_generation_hits_max_exactly(
        max in 1u64..2_000_000,
        n in 1u32..500,
        base in 0.01f64..1e4,
        delta in 0.0f64..100.0
    ) {
        let s = generate_linear_steps(max, n, base, delta, 18);
        prop_assert_eq!(s.len(), n as usize);
        prop_assert_eq!(s.last().unwrap().range_to, max);
        prop_assert!(is_linear_curve(&s, max));

        // ceil sizing can reach max before the last step when n is large relative to max
        let size = max.div_ceil(n as u64);
        if size * (n as u64 - 1) < max {
            prop_assert!(s.windows(2).all(|w| w[1].range_to > w[0].range_to));
            prop_assert!(validate_steps(&s, max).is_empty(), "{:?}", validate_steps(&s, max));
        }
    }

    #[test]
    fn remove_never_empties_the_curve(
        n in 1u32..20,
        idx in 0usize..25,
        rounds in 1usize..30
    ) {
        let max = 10_000;
        let mut s = generate_linear_steps(max, n, 5.0, 1.0, 18);
        for _ in 0..rounds {
            s = remove_step(&s, idx, max);
            prop_assert!(!s.is_empty());
            prop_assert_eq!(s.last().unwrap().range_to, max);
        }
    }

    #[test]
    fn position_drag_keeps_curve_valid(
        n in 1u32..30,
        idx in 0usize..30,
        x in -1e6f64..1e6,
        y in -1e3f64..1e3
    ) {
        let max = 50_000;
        let s = generate_linear_steps(max, n, 1.0, 0.5, 18);
        let out = update_step_position(&s, idx, x, y, max, 18);
        prop_assert!(validate_steps(&out, max).is_empty(), "{:?}", validate_steps(&out, max));
        if let Some(moved) = out.get(idx) {
            prop_assert!(moved.price >= 0.01);
            prop_assert_eq!(moved.price_scaled, to_scaled(moved.price, 18));
        }
    }

    #[test]
    fn weighted_drag_is_monotone_and_floored(
        n in 1u32..40,
        idx in 0usize..40,
        new_price in -100.0f64..500.0
    ) {
        let s = generate_linear_steps(40_000, n, 10.0, 1.0, 18);
        let out = apply_drag(&s, idx, new_price, 18);
        prop_assert_eq!(out.len(), s.len());
        prop_assert!(out.iter().all(|x| x.price >= 0.01));
        prop_assert!(out.windows(2).all(|w| w[1].price >= w[0].price));
        prop_assert!(out.iter().zip(&s).all(|(a, b)| a.range_to == b.range_to));
    }
}

#[test]
fn default_curve_scenario() {
    let s = generate_linear_steps(100_000, 10, 10.0, 1.0, 18);
    assert_eq!((s[0].range_to, s[0].price), (10_000, 10.0));
    assert_eq!((s[9].range_to, s[9].price), (100_000, 19.0));
    assert!(validate_steps(&s, 100_000).is_empty());
    assert!(is_linear_curve(&s, 100_000));
    assert_relative_eq!(verify_curve(&s, 100_000).total_revenue, 1_450_000.0, max_relative = 1e-12);

    let dragged = apply_drag(&s, 9, 25.0, 18);
    assert_eq!(dragged[9].price, 25.0);
    assert_eq!(dragged[9].price_scaled, 25_000_000_000_000_000_000);
    for w in dragged.windows(2) {
        assert!(w[1].price >= w[0].price);
    }
    assert!(!is_linear_curve(&dragged, 100_000));
}

#[test]
fn validator_reports_empty_and_out_of_order() {
    assert_eq!(validate_steps(&[], 100_000).len(), 1);

    let s = vec![Step::new(100, 1.0, 18), Step::new(50, 2.0, 18)];
    let errs = validate_steps(&s, 50);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].starts_with("step 2:"));
    assert!(!errs.iter().any(|e| e.starts_with("final step")));
}

#[test]
fn drag_to_negative_coordinates_is_clamped() {
    let s = generate_linear_steps(1_000, 5, 3.0, 1.0, 18);
    let out = update_step_position(&s, 0, -5.0, -1.0, 1_000, 18);
    assert!(out[0].range_to >= 1);
    assert!(out[0].price >= 0.01);
}

#[test]
fn insert_between_adjacent_ranges_is_reported() {
    let s = vec![Step::new(41, 2.0, 18), Step::new(42, 3.0, 18), Step::new(100, 4.0, 18)];
    let out = insert_step_between(&s, 0, 18);
    assert_eq!(out.len(), 4);
    let errs = validate_steps(&out, 100);
    assert!(errs.iter().any(|e| e.starts_with("step 2:")), "{errs:?}");
}
