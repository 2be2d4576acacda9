//! Step data model and linear curve generation

use crate::error::CurveError;
use crate::fixed::{from_scaled, to_scaled};
use crate::verifier::validate_steps;
use serde::{Deserialize, Serialize};

/// One price step of the curve: units up to `range_to` (cumulative, inclusive) sell at `price`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Cumulative unit count at which this step ends
    pub range_to: u64,
    /// Human-readable unit price
    pub price: f64,
    /// `price` at fixed-point precision; always derived from `price`
    pub price_scaled: i128,
}

impl Step {
    /// Builds a step, deriving the scaled price
    pub fn new(range_to: u64, price: f64, decimals: u32) -> Self {
        Self { range_to, price, price_scaled: to_scaled(price, decimals) }
    }

    /// Returns a copy with a new price and re-derived scaled price
    pub fn with_price(self, price: f64, decimals: u32) -> Self {
        Self { price, price_scaled: to_scaled(price, decimals), ..self }
    }
}

/// Field edited through the step table
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepField {
    /// New cumulative range end
    RangeTo(u64),
    /// New human price
    Price(f64),
}

/// Step entry as handed to the sale contract: range end and scaled price
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractStep {
    /// Cumulative unit count at which this step ends
    pub range_to: u64,
    /// Price scaled by `10^decimals`, as a decimal string on the wire
    #[serde(with = "u128_string")]
    pub price: u128,
}

/// Reduces a valid curve to the `(range_to, scaled price)` pairs the sale contract expects
pub fn to_contract_steps(steps: &[Step], max_tickets: u64) -> Result<Vec<ContractStep>, CurveError> {
    let errors = validate_steps(steps, max_tickets);
    if !errors.is_empty() {
        return Err(CurveError::InvalidCurve(errors));
    }
    steps
        .iter()
        .enumerate()
        .map(|(i, s)| match u128::try_from(s.price_scaled) {
            Ok(price) if price > 0 => Ok(ContractStep { range_to: s.range_to, price }),
            _ => Err(CurveError::InvalidCurve(vec![format!(
                "step {}: scaled price {} must be greater than 0",
                i + 1,
                s.price_scaled
            )])),
        })
        .collect()
}

/// Rebuilds editable steps from an existing on-chain curve.
///
/// Fails on a scaled price too large for an editable step.
pub fn steps_from_contract(entries: &[ContractStep], decimals: u32) -> Result<Vec<Step>, CurveError> {
    entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let scaled = i128::try_from(e.price)
                .map_err(|_| CurveError::PriceOutOfRange { step: i + 1, price: e.price })?;
            Ok(Step { range_to: e.range_to, price: from_scaled(scaled, decimals), price_scaled: scaled })
        })
        .collect()
}

/// Simple-mode parameters of a linear curve
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearParams {
    /// Total supply; the last step ends here
    pub max_tickets: u64,
    /// Number of steps
    pub num_steps: u32,
    /// Price of the first step
    pub base_price: f64,
    /// Price increase per step
    pub price_delta: f64,
}

impl Default for LinearParams {
    fn default() -> Self {
        Self { max_tickets: 100_000, num_steps: 10, base_price: 10.0, price_delta: 1.0 }
    }
}

impl LinearParams {
    /// Generates the step array these parameters describe
    pub fn steps(&self, decimals: u32) -> Vec<Step> {
        generate_linear_steps(self.max_tickets, self.num_steps, self.base_price, self.price_delta, decimals)
    }
}

/// Range end of step `i` on a uniform grid: `min(ceil(max/n) * (i+1), max)`
pub(crate) fn uniform_range_to(max_tickets: u64, num_steps: u64, i: u64) -> u64 {
    let step_size = max_tickets.div_ceil(num_steps);
    step_size.saturating_mul(i + 1).min(max_tickets)
}

/// Generates `num_steps` evenly sized steps with linearly increasing prices.
///
/// Returns an empty vector when either count is zero (curve not configured yet).
/// The last step always ends exactly at `max_tickets`.
pub fn generate_linear_steps(
    max_tickets: u64,
    num_steps: u32,
    base_price: f64,
    price_delta: f64,
    decimals: u32,
) -> Vec<Step> {
    if max_tickets == 0 || num_steps == 0 {
        return Vec::new();
    }
    let n = num_steps as u64;
    let steps: Vec<Step> = (0..n)
        .map(|i| Step::new(uniform_range_to(max_tickets, n, i), base_price + i as f64 * price_delta, decimals))
        .collect();
    tracing::debug!(max_tickets, num_steps, base_price, price_delta, "generated linear steps");
    steps
}

mod u128_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(val: &u128, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&val.to_string())
    }

    pub fn deserialize<'de, D>(d: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        raw.trim().parse().map_err(de::Error::custom)
    }
}
