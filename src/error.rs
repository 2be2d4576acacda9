//! Error types for the places where the curve model refuses instead of reporting

use thiserror::Error;

/// Errors returned by editor-level and export operations.
///
/// The pure step functions never fail; invalid curves are described by
/// [`crate::verifier::validate_steps`] instead.
#[derive(Error, Debug)]
pub enum CurveError {
    /// Requested fixed-point precision is larger than the scaled type can hold
    #[error("decimals must be at most {max} (got {decimals})")]
    UnsupportedDecimals {
        /// Requested precision
        decimals: u32,
        /// Largest supported precision
        max: u32,
    },
    /// Curve failed validation and cannot be exported
    #[error("curve is invalid: {}", .0.join("; "))]
    InvalidCurve(Vec<String>),
    /// Imported scaled price does not fit an editable step
    #[error("step {step}: scaled price {price} is out of range")]
    PriceOutOfRange {
        /// 1-based step number
        step: usize,
        /// Scaled price as received
        price: u128,
    },
    /// Steps no longer follow a linear progression
    #[error("steps do not form a linear curve")]
    NotLinear,
    /// Undo history is empty
    #[error("nothing to undo")]
    NothingToUndo,
    /// Redo history is empty
    #[error("nothing to redo")]
    NothingToRedo,
    /// Imported step payload could not be parsed
    #[error("failed to parse steps: {0}")]
    Json(#[from] serde_json::Error),
}
