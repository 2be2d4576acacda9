//! Editing session state: the current steps, the simple-mode parameters and undo history
//!
//! While the curve is not custom, the four simple parameters are authoritative
//! and every change regenerates the whole curve. Any direct step edit marks it
//! custom; from then on only `max_tickets` still reaches the steps, by pinning
//! the last range end.

use crate::error::CurveError;
use crate::fixed::{DEFAULT_DECIMALS, MAX_DECIMALS};
use crate::mutate;
use crate::scaler;
use crate::steps::{steps_from_contract, to_contract_steps, ContractStep, LinearParams, Step, StepField};
use crate::verifier::{infer_linear_params, is_linear_curve, validate_steps, verify_curve, Report};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Most snapshots kept for undo
pub const HISTORY_LIMIT: usize = 100;

#[derive(Clone, Debug)]
struct Snapshot {
    steps: Vec<Step>,
    params: LinearParams,
    is_custom: bool,
}

/// Mutable editing session over a step curve
#[derive(Clone, Debug)]
pub struct CurveEditor {
    steps: Vec<Step>,
    params: LinearParams,
    is_custom: bool,
    decimals: u32,
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
}

impl Default for CurveEditor {
    fn default() -> Self {
        Self::build(LinearParams::default(), DEFAULT_DECIMALS)
    }
}

impl CurveEditor {
    fn build(params: LinearParams, decimals: u32) -> Self {
        Self {
            steps: params.steps(decimals),
            params,
            is_custom: false,
            decimals,
            undo: VecDeque::new(),
            redo: Vec::new(),
        }
    }

    fn check_decimals(decimals: u32) -> Result<(), CurveError> {
        if decimals > MAX_DECIMALS {
            return Err(CurveError::UnsupportedDecimals { decimals, max: MAX_DECIMALS });
        }
        Ok(())
    }

    /// Starts a session on the default linear curve
    pub fn new(decimals: u32) -> Result<Self, CurveError> {
        Self::with_params(LinearParams::default(), decimals)
    }

    /// Starts a session on the linear curve described by `params`
    pub fn with_params(params: LinearParams, decimals: u32) -> Result<Self, CurveError> {
        Self::check_decimals(decimals)?;
        Ok(Self::build(params, decimals))
    }

    /// Starts a custom session on existing steps.
    ///
    /// `max_tickets` is taken from the last step. Simple parameters are
    /// inferred when the steps are linear, otherwise the defaults are cached
    /// with the imported step count.
    pub fn with_steps(steps: Vec<Step>, decimals: u32) -> Result<Self, CurveError> {
        Self::check_decimals(decimals)?;
        let max_tickets = steps.last().map_or(LinearParams::default().max_tickets, |s| s.range_to);
        let params = infer_linear_params(&steps, max_tickets).unwrap_or(LinearParams {
            max_tickets,
            num_steps: u32::try_from(steps.len()).unwrap_or(u32::MAX),
            ..LinearParams::default()
        });
        info!(steps = steps.len(), max_tickets, "loaded existing curve");
        Ok(Self { steps, params, is_custom: true, decimals, undo: VecDeque::new(), redo: Vec::new() })
    }

    /// Starts a custom session from a JSON array of contract steps
    pub fn from_json(json: &str, decimals: u32) -> Result<Self, CurveError> {
        Self::check_decimals(decimals)?;
        let entries: Vec<ContractStep> = serde_json::from_str(json)?;
        Self::with_steps(steps_from_contract(&entries, decimals)?, decimals)
    }

    /// Current steps
    pub fn steps(&self) -> &[Step] { &self.steps }
    /// Intended total supply
    pub fn max_tickets(&self) -> u64 { self.params.max_tickets }
    /// Cached simple-mode parameters
    pub fn params(&self) -> LinearParams { self.params }
    /// Fixed-point precision of scaled prices
    pub fn decimals(&self) -> u32 { self.decimals }
    /// Whether steps were edited directly since the last regeneration
    pub fn is_custom(&self) -> bool { self.is_custom }

    /// Whether the current steps still look like a linear curve
    pub fn is_linear(&self) -> bool { is_linear_curve(&self.steps, self.params.max_tickets) }

    /// Validator output for the current steps
    pub fn errors(&self) -> Vec<String> { validate_steps(&self.steps, self.params.max_tickets) }

    /// Summary report for the current steps
    pub fn report(&self) -> Report { verify_curve(&self.steps, self.params.max_tickets) }

    /// Contract payload for the current steps; fails on an invalid curve
    pub fn contract_steps(&self) -> Result<Vec<ContractStep>, CurveError> {
        to_contract_steps(&self.steps, self.params.max_tickets)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot { steps: self.steps.clone(), params: self.params, is_custom: self.is_custom }
    }

    fn restore(&mut self, snap: Snapshot) {
        self.steps = snap.steps;
        self.params = snap.params;
        self.is_custom = snap.is_custom;
    }

    fn record(&mut self) {
        self.undo.push_back(self.snapshot());
        if self.undo.len() > HISTORY_LIMIT {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    fn regenerate(&mut self) {
        self.steps = self.params.steps(self.decimals);
        debug!(params = ?self.params, "regenerated linear curve");
    }

    // Params and steps change together as one history entry
    fn set_param(&mut self, pin_last: bool, update: impl FnOnce(&mut LinearParams)) {
        let mut params = self.params;
        update(&mut params);
        let steps = if self.is_custom {
            let mut steps = self.steps.clone();
            if let (true, Some(last)) = (pin_last, steps.last_mut()) {
                last.range_to = params.max_tickets;
            }
            steps
        } else {
            params.steps(self.decimals)
        };
        if params == self.params && steps == self.steps {
            return;
        }
        self.record();
        self.params = params;
        self.steps = steps;
        debug!(params = ?self.params, custom = self.is_custom, "updated simple parameters");
    }

    fn edit(&mut self, steps: Vec<Step>) {
        if steps == self.steps {
            return;
        }
        self.record();
        self.steps = steps;
        self.is_custom = true;
    }

    /// Sets total supply; on a custom curve only the last range end follows
    pub fn set_max_tickets(&mut self, max_tickets: u64) {
        self.set_param(true, |p| p.max_tickets = max_tickets);
    }

    /// Sets the step count used for regeneration
    pub fn set_num_steps(&mut self, num_steps: u32) { self.set_param(false, |p| p.num_steps = num_steps) }

    /// Sets the first-step price used for regeneration
    pub fn set_base_price(&mut self, base_price: f64) { self.set_param(false, |p| p.base_price = base_price) }

    /// Sets the per-step increase used for regeneration
    pub fn set_price_delta(&mut self, price_delta: f64) { self.set_param(false, |p| p.price_delta = price_delta) }

    /// Table edit of one field
    pub fn update_step(&mut self, index: usize, field: StepField) {
        self.edit(mutate::update_step(&self.steps, index, field, self.decimals));
    }

    /// Adds a step before the last one
    pub fn add_step(&mut self) {
        let p = self.params;
        self.edit(mutate::add_step(&self.steps, p.max_tickets, p.base_price, self.decimals));
    }

    /// Removes a step, keeping at least one
    pub fn remove_step(&mut self, index: usize) {
        self.edit(mutate::remove_step(&self.steps, index, self.params.max_tickets));
    }

    /// Splits the gap after `after_index`
    pub fn insert_step_between(&mut self, after_index: usize) {
        self.edit(mutate::insert_step_between(&self.steps, after_index, self.decimals));
    }

    /// Graph drag of a point in both axes
    pub fn move_step(&mut self, index: usize, new_range_to: f64, new_price: f64) {
        let s = mutate::update_step_position(
            &self.steps,
            index,
            new_range_to,
            new_price,
            self.params.max_tickets,
            self.decimals,
        );
        self.edit(s);
    }

    /// Vertical graph drag that bends neighbouring prices
    pub fn drag_price(&mut self, index: usize, new_price: f64) {
        self.edit(scaler::apply_drag(&self.steps, index, new_price, self.decimals));
    }

    /// Discards custom edits and regenerates from the cached parameters
    pub fn reset_to_linear(&mut self) {
        self.record();
        self.is_custom = false;
        self.regenerate();
    }

    /// Makes the simple parameters authoritative again if the curve is still linear
    pub fn switch_to_simple(&mut self) -> Result<LinearParams, CurveError> {
        let params = infer_linear_params(&self.steps, self.params.max_tickets).ok_or(CurveError::NotLinear)?;
        self.record();
        self.params = params;
        self.is_custom = false;
        self.regenerate();
        Ok(params)
    }

    /// Reverts the last change
    pub fn undo(&mut self) -> Result<(), CurveError> {
        let snap = self.undo.pop_back().ok_or(CurveError::NothingToUndo)?;
        self.redo.push(self.snapshot());
        self.restore(snap);
        Ok(())
    }

    /// Re-applies the last undone change
    pub fn redo(&mut self) -> Result<(), CurveError> {
        let snap = self.redo.pop().ok_or(CurveError::NothingToRedo)?;
        self.undo.push_back(self.snapshot());
        self.restore(snap);
        Ok(())
    }
}
