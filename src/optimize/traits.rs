//! Traits for cost minimizers.

use crate::error::{MhetsError, Result};

/// Outcome of a single minimization run.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizeOutcome {
    /// Best parameters found
    pub parameters: Vec<f64>,
    /// Cost at `parameters`
    pub cost: f64,
    /// Cost-function evaluations, calibration included
    pub n_evaluations: usize,
    pub converged: bool,
    pub message: String,
}

/// A minimizer over a scalar cost of a flat parameter vector.
///
/// Any error returned by `cost`, and any non-finite cost value, aborts the
/// run and is returned to the caller unchanged.
pub trait Optimizer {
    fn minimize<F>(
        &self,
        cost: F,
        initial: &[f64],
        max_iterations: usize,
        tolerance: f64,
    ) -> Result<OptimizeOutcome>
    where
        F: FnMut(&[f64]) -> Result<f64>;
}

/// Evaluation-counting wrapper that rejects non-finite values.
pub(crate) struct Objective<F> {
    cost: F,
    pub(crate) evaluations: usize,
}

impl<F> Objective<F>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    pub(crate) fn new(cost: F) -> Self {
        Self { cost, evaluations: 0 }
    }

    pub(crate) fn call(&mut self, x: &[f64]) -> Result<f64> {
        self.evaluations += 1;
        let value = (self.cost)(x)?;
        if !value.is_finite() {
            return Err(MhetsError::NumericAnomaly(format!(
                "cost returned {} at evaluation {}",
                value, self.evaluations
            )));
        }
        Ok(value)
    }
}
