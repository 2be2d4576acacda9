//! Fixed-point price conversion
//!
//! Human prices are kept as `f64` for editing. On-chain amounts are integers
//! scaled by `10^decimals`. Prices are first rounded to [`PRICE_PRECISION`]
//! decimal places so the scaled value never carries float noise.

/// Default on-chain precision (ERC-20 style)
pub const DEFAULT_DECIMALS: u32 = 18;

/// Largest precision accepted by the editor
pub const MAX_DECIMALS: u32 = 30;

/// Number of decimal places kept from a human price before scaling
pub const PRICE_PRECISION: u32 = 6;

#[inline]
fn pow10(exp: u32) -> i128 { 10i128.saturating_pow(exp) }

/// Rounds `value` to `places` decimal places (half away from zero)
pub fn round_to(value: f64, places: u32) -> f64 {
    let f = 10f64.powi(places as i32);
    (value * f).round() / f
}

/// Converts a human price into an integer scaled by `10^decimals`.
///
/// Saturates at the `i128` bounds; `NaN` maps to 0.
pub fn to_scaled(price: f64, decimals: u32) -> i128 {
    let micros = (price * 1e6).round() as i128;
    if decimals >= PRICE_PRECISION {
        micros.saturating_mul(pow10(decimals - PRICE_PRECISION))
    } else {
        let div = pow10(PRICE_PRECISION - decimals);
        (micros + micros.signum() * (div / 2)) / div
    }
}

/// Converts a scaled integer back into a human price.
///
/// The `10^(decimals-6)` factor is divided out in integer space first, so any
/// value produced by [`to_scaled`] from a 6-decimal price comes back exactly.
pub fn from_scaled(price_scaled: i128, decimals: u32) -> f64 {
    if decimals <= PRICE_PRECISION {
        return price_scaled as f64 / pow10(decimals) as f64;
    }
    let unit = pow10(decimals - PRICE_PRECISION);
    let micros = price_scaled / unit;
    let rem = price_scaled % unit;
    let base = micros as f64 / 1e6;
    if rem == 0 { base } else { base + rem as f64 / pow10(decimals) as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_whole_and_fractional_prices() {
        assert_eq!(to_scaled(10.0, 18), 10_000_000_000_000_000_000);
        assert_eq!(to_scaled(0.01, 18), 10_000_000_000_000_000);
        assert_eq!(to_scaled(1.5, 6), 1_500_000);
        assert_eq!(to_scaled(1.25, 1), 13);
        assert_eq!(to_scaled(-2.0, 2), -200);
    }

    #[test]
    fn drops_noise_beyond_six_places() {
        assert_eq!(to_scaled(0.1 + 0.2, 18), 300_000_000_000_000_000);
        assert_eq!(to_scaled(1.234_567_89, 18), 1_234_568_000_000_000_000);
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        assert_eq!(to_scaled(1e30, 30), i128::MAX);
        assert_eq!(to_scaled(f64::NAN, 18), 0);
    }

    #[test]
    fn recovers_scaled_values() {
        assert_eq!(from_scaled(19_000_000_000_000_000_000, 18), 19.0);
        assert_eq!(from_scaled(123_456, 6), 0.123456);
        assert_eq!(to_scaled(from_scaled(10_500_000_000_000_000_000, 18), 18), 10_500_000_000_000_000_000);
    }
}
