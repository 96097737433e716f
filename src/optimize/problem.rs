//! Adaptor between the counting `Objective` and argmin's problem traits.

use std::cell::RefCell;

use argmin::core::{CostFunction, Gradient, State, TerminationReason, TerminationStatus};

use super::traits::{Objective, OptimizeOutcome};
use crate::error::{MhetsError, Result};

type ArgminResult<T> = std::result::Result<T, argmin::core::Error>;

/// Evaluation state of one argmin run.
///
/// argmin evaluates through `&self`, so the objective sits behind a
/// `RefCell`. The first cost error is kept so the caller gets it back
/// unchanged instead of argmin's stringly error.
pub(crate) struct Tracked<F> {
    objective: RefCell<Objective<F>>,
    failure: RefCell<Option<MhetsError>>,
}

impl<F> Tracked<F>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    pub(crate) fn new(cost: F) -> Self {
        Self {
            objective: RefCell::new(Objective::new(cost)),
            failure: RefCell::new(None),
        }
    }

    pub(crate) fn evaluations(&self) -> usize {
        self.objective.borrow().evaluations
    }

    fn eval(&self, x: &[f64]) -> ArgminResult<f64> {
        let value = self.objective.borrow_mut().call(x);
        value.map_err(|e| {
            let message = argmin::core::Error::msg(e.to_string());
            self.failure.borrow_mut().get_or_insert(e);
            message
        })
    }

    /// Problem view handed to an argmin `Executor`.
    pub(crate) fn problem(&self, fd_step: f64) -> ArgminProblem<'_, F> {
        ArgminProblem { tracked: self, fd_step }
    }

    /// One evaluation at `x` with nothing to optimize.
    pub(crate) fn fixed_point(self, x: &[f64]) -> Result<OptimizeOutcome> {
        let cost = self.objective.borrow_mut().call(x)?;
        Ok(OptimizeOutcome {
            parameters: x.to_vec(),
            cost,
            n_evaluations: self.evaluations(),
            converged: true,
            message: "no free parameters".to_string(),
        })
    }

    /// Best point of a finished run.
    pub(crate) fn outcome<S>(&self, state: &S) -> Result<OptimizeOutcome>
    where
        S: State<Param = Vec<f64>, Float = f64>,
    {
        let parameters = state
            .get_best_param()
            .cloned()
            .ok_or_else(|| MhetsError::Solver("no best parameters recorded".to_string()))?;
        let termination = state.get_termination_status();
        let converged = matches!(
            termination,
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
                | TerminationStatus::Terminated(TerminationReason::TargetCostReached)
        );
        Ok(OptimizeOutcome {
            parameters,
            cost: state.get_best_cost(),
            n_evaluations: self.evaluations(),
            converged,
            message: format!("{} after {} iterations", termination, state.get_iter()),
        })
    }

    /// Error of a failed run: the cost error if one stopped it.
    pub(crate) fn into_error(self, solver: argmin::core::Error) -> MhetsError {
        self.failure
            .into_inner()
            .unwrap_or_else(|| MhetsError::Solver(solver.to_string()))
    }
}

pub(crate) struct ArgminProblem<'a, F> {
    tracked: &'a Tracked<F>,
    /// Central-difference step for `Gradient`
    fd_step: f64,
}

impl<F> CostFunction for ArgminProblem<'_, F>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> ArgminResult<Self::Output> {
        self.tracked.eval(params)
    }
}

impl<F> Gradient for ArgminProblem<'_, F>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    /// Central differences. Every shifted point counts as an evaluation.
    fn gradient(&self, params: &Self::Param) -> ArgminResult<Self::Gradient> {
        let h = self.fd_step;
        let mut shifted = params.clone();
        let mut grad = vec![0.0; params.len()];
        for i in 0..params.len() {
            shifted[i] = params[i] + h;
            let plus = self.tracked.eval(&shifted)?;
            shifted[i] = params[i] - h;
            let minus = self.tracked.eval(&shifted)?;
            shifted[i] = params[i];
            grad[i] = (plus - minus) / (2.0 * h);
        }
        Ok(grad)
    }
}
