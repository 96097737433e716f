//! Derivative-free Nelder-Mead simplex minimizer (argmin).

use argmin::core::Executor;
use argmin::solver::neldermead::NelderMead as Simplex;

use super::problem::Tracked;
use super::traits::{OptimizeOutcome, Optimizer};
use crate::error::{MhetsError, Result};

/// Nelder-Mead with the standard reflection/expansion/contraction/shrink
/// coefficients. Converges when the standard deviation of the simplex
/// values drops below the tolerance.
#[derive(Clone, Debug)]
pub struct NelderMead {
    /// Initial simplex edge length (radians)
    pub initial_step: f64,
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            initial_step: 0.5,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
        }
    }
}

impl NelderMead {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial simplex edge length.
    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    /// `initial` plus one vertex per axis, `initial_step` away.
    fn simplex(&self, initial: &[f64]) -> Vec<Vec<f64>> {
        let mut vertices = vec![initial.to_vec()];
        for i in 0..initial.len() {
            let mut x = initial.to_vec();
            x[i] += self.initial_step;
            vertices.push(x);
        }
        vertices
    }

    fn solver(&self, initial: &[f64], tolerance: f64) -> Result<Simplex<Vec<f64>, f64>> {
        let invalid = |e: argmin::core::Error| {
            MhetsError::Configuration(format!("invalid Nelder-Mead settings: {}", e))
        };
        Simplex::new(self.simplex(initial))
            .with_sd_tolerance(tolerance)
            .and_then(|s| s.with_alpha(self.reflection))
            .and_then(|s| s.with_gamma(self.expansion))
            .and_then(|s| s.with_rho(self.contraction))
            .and_then(|s| s.with_sigma(self.shrink))
            .map_err(invalid)
    }
}

impl Optimizer for NelderMead {
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
        let solver = self.solver(initial, tolerance)?;

        let run = Executor::new(tracked.problem(0.0), solver)
            .configure(|state| state.max_iters(max_iterations as u64))
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

    fn rosenbrock(x: &[f64]) -> Result<f64> {
        Ok((1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2))
    }

    #[test]
    fn test_quadratic_minimum() {
        let outcome = NelderMead::new()
            .minimize(
                |x: &[f64]| Ok((x[0] - 1.0).powi(2) + (x[1] + 2.0).powi(2)),
                &[0.0, 0.0],
                500,
                1e-12,
            )
            .unwrap();
        assert!(outcome.converged, "{}", outcome.message);
        assert_relative_eq!(outcome.parameters[0], 1.0, epsilon = 1e-4);
        assert_relative_eq!(outcome.parameters[1], -2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_rosenbrock() {
        let outcome = NelderMead::new().minimize(rosenbrock, &[-1.2, 1.0], 5000, 1e-14).unwrap();
        assert!(outcome.cost < 1e-6, "cost {}", outcome.cost);
    }

    #[test]
    fn test_evaluation_count_is_exact() {
        let mut calls = 0;
        let outcome = NelderMead::new()
            .minimize(
                |x: &[f64]| {
                    calls += 1;
                    Ok(x[0] * x[0] + x[1] * x[1] + x[2] * x[2])
                },
                &[1.0, 1.0, 1.0],
                7,
                0.0,
            )
            .unwrap();
        assert_eq!(outcome.n_evaluations, calls);
        assert!(!outcome.converged);
    }

    #[test]
    fn test_cost_error_is_fatal() {
        let mut calls = 0;
        let result = NelderMead::new().minimize(
            |_x: &[f64]| {
                calls += 1;
                if calls > 3 {
                    Err(MhetsError::Configuration("backend gone".to_string()))
                } else {
                    Ok(1.0)
                }
            },
            &[0.0, 0.0, 0.0],
            100,
            0.0,
        );
        assert!(matches!(result, Err(MhetsError::Configuration(_))));
    }

    #[test]
    fn test_non_finite_cost_is_fatal() {
        let result = NelderMead::new().minimize(|_x: &[f64]| Ok(f64::NAN), &[0.0], 10, 1e-6);
        assert!(matches!(result, Err(MhetsError::NumericAnomaly(_))));
    }

    #[test]
    fn test_no_parameters_is_one_evaluation() {
        let outcome = NelderMead::new().minimize(|_x: &[f64]| Ok(2.5), &[], 10, 1e-6).unwrap();
        assert_eq!(outcome.n_evaluations, 1);
        assert_eq!(outcome.cost, 2.5);
        assert!(outcome.converged);
    }
}
