//! Finite-difference L-BFGS with a More-Thuente line search (argmin).

use argmin::core::Executor;
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;

use super::problem::Tracked;
use super::traits::{OptimizeOutcome, Optimizer};
use crate::error::{MhetsError, Result};

/// Quasi-Newton descent on a central-difference gradient. Each gradient
/// costs `2n` evaluations on top of the line-search trials.
#[derive(Clone, Debug)]
pub struct Lbfgs {
    /// Central-difference step
    pub fd_step: f64,
    /// Stored correction pairs
    pub memory: usize,
}

impl Default for Lbfgs {
    fn default() -> Self {
        Self { fd_step: 1e-4, memory: 10 }
    }
}

impl Lbfgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the finite-difference step.
    pub fn with_fd_step(mut self, h: f64) -> Self {
        self.fd_step = h;
        self
    }

    pub fn with_memory(mut self, m: usize) -> Self {
        self.memory = m;
        self
    }
}

impl Optimizer for Lbfgs {
    /// Stops when the gradient norm drops below `tolerance` or the cost
    /// changes by less than a tenth of it.
    fn minimize<F>(
        &self,
        cost: F,
        initial: &[f64],
        max_iterations: usize,
        tolerance: f64,
    ) -> Result<OptimizeOutcome>
    where
        F: FnMut(&[f64]) -> Result<f64>,
    {
        let tracked = Tracked::new(cost);
        if initial.is_empty() {
            return tracked.fixed_point(initial);
        }

        let invalid = |e: argmin::core::Error| {
            MhetsError::Configuration(format!("invalid L-BFGS settings: {}", e))
        };
        let tol_cost = if tolerance == 0.0 { 0.0 } else { (0.1 * tolerance).max(1e-12) };
        let solver = LBFGS::new(MoreThuenteLineSearch::new(), self.memory)
            .with_tolerance_grad(tolerance)
            .map_err(invalid)?;
        let solver = solver.with_tolerance_cost(tol_cost).map_err(invalid)?;

        let run = Executor::new(tracked.problem(self.fd_step), solver)
            .configure(|state| state.param(initial.to_vec()).max_iters(max_iterations as u64))
            .run();
        match run {
            Ok(res) => tracked.outcome(res.state()),
            Err(e) => Err(tracked.into_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quadratic_minimum() {
        let outcome = Lbfgs::new()
            .minimize(
                |x: &[f64]| Ok(2.0 * (x[0] - 0.5).powi(2) + (x[1] + 1.0).powi(2)),
                &[0.0, 0.0],
                200,
                1e-10,
            )
            .unwrap();
        assert!(outcome.converged, "{}", outcome.message);
        assert_relative_eq!(outcome.parameters[0], 0.5, epsilon = 1e-4);
        assert_relative_eq!(outcome.parameters[1], -1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_evaluation_count_includes_gradient_points() {
        let mut calls = 0;
        let outcome = Lbfgs::new()
            .minimize(
                |x: &[f64]| {
                    calls += 1;
                    Ok(x[0].cos())
                },
                &[0.3],
                5,
                1e-12,
            )
            .unwrap();
        assert_eq!(outcome.n_evaluations, calls);
        // Cost at the start plus one two-point gradient at least
        assert!(outcome.n_evaluations >= 3);
        assert!(outcome.cost < 0.3f64.cos());
    }

    #[test]
    fn test_cost_error_keeps_its_kind() {
        let result = Lbfgs::new().minimize(
            |x: &[f64]| {
                if x[0] > 0.5 {
                    Err(MhetsError::DimensionMismatch("wrong register".to_string()))
                } else {
                    Ok(-x[0])
                }
            },
            &[0.0],
            50,
            1e-8,
        );
        assert!(matches!(result, Err(MhetsError::DimensionMismatch(_))));
    }
}
