#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(missing_docs)]
//! Library entry for the step-priced ticket curve.
//!
//! Cumulative ticket sales are split into contiguous steps, each with a fixed
//! price. This crate builds such curves from four parameters, validates
//! arbitrary step sets, and provides the pure edit operations an interactive
//! curve editor needs.
//!
//! # Modules
//! - [`fixed`]: Decimal ⇄ fixed-point price conversion
//! - [`steps`]: Step model, linear generation and contract payload
//! - [`verifier`]: Validation, linearity detection and reports
//! - [`mutate`]: Table and graph edit operations
//! - [`scaler`]: Weighted drag redistribution
//! - [`editor`]: Session state with undo/redo

/// Error types
pub mod error;

/// Fixed-point price conversion
pub mod fixed;

/// Step data model and linear curve generation
pub mod steps;

/// Validation, linearity detection and curve reports
pub mod verifier;

/// Pure step-array edit operations
pub mod mutate;

/// Distance-weighted drag redistribution
pub mod scaler;

/// Editing session state
pub mod editor;

pub use editor::CurveEditor;
pub use error::CurveError;
pub use steps::{ContractStep, LinearParams, Step, StepField};
