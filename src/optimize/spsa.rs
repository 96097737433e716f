//! Simultaneous perturbation stochastic approximation (SPSA).
//!
//! Every iteration estimates the gradient from two evaluations along a random
//! ±1 direction, with the standard decaying gains
//!
//!   a_k = a / (k + 1 + A)^α,   c_k = c / (k + 1)^γ
//!
//! The gain `a` is calibrated before the main loop from a fixed number of
//! extra perturbation pairs so that the first update has a target magnitude.
//! There is no early stopping: the run always spends the full budget.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::traits::{Objective, OptimizeOutcome, Optimizer};
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct Spsa {
    /// Perturbation size c
    pub perturbation: f64,
    pub alpha: f64,
    pub gamma: f64,
    /// Size of the first parameter update targeted by calibration
    pub target_magnitude: f64,
    /// Perturbation pairs spent on calibration (two evaluations each)
    pub calibration_pairs: usize,
    /// Each run draws its directions from a fresh generator with this seed
    seed: Option<u64>,
}

impl Spsa {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            perturbation: 0.2,
            alpha: 0.602,
            gamma: 0.101,
            target_magnitude: 2.0 * PI / 10.0,
            calibration_pairs: 25,
            seed,
        }
    }

    /// Evaluations spent before the main loop.
    pub fn calibration_evaluations(&self) -> usize {
        2 * self.calibration_pairs
    }

    /// Total evaluations of a run with `max_iterations` iterations.
    pub fn expected_evaluations(&self, max_iterations: usize) -> usize {
        self.calibration_evaluations() + 2 * max_iterations + 1
    }

    fn direction(rng: &mut StdRng, n: usize) -> Vec<f64> {
        (0..n).map(|_| if rng.gen::<bool>() { 1.0 } else { -1.0 }).collect()
    }

    fn shifted(x: &[f64], delta: &[f64], scale: f64) -> Vec<f64> {
        x.iter().zip(delta).map(|(xi, di)| xi + scale * di).collect()
    }
}

impl Optimizer for Spsa {
    fn minimize<F>(
        &self,
        cost: F,
        initial: &[f64],
        max_iterations: usize,
        _tolerance: f64,
    ) -> Result<OptimizeOutcome>
    where
        F: FnMut(&[f64]) -> Result<f64>,
    {
        let mut f = Objective::new(cost);
        let mut rng = match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let n = initial.len();
        let stability = 0.1 * max_iterations as f64;
        let c = self.perturbation;

        // Calibration: average |Δf| / 2c along random directions at x0
        let mut magnitude = 0.0;
        for _ in 0..self.calibration_pairs {
            let delta = Self::direction(&mut rng, n);
            let plus = f.call(&Self::shifted(initial, &delta, c))?;
            let minus = f.call(&Self::shifted(initial, &delta, -c))?;
            magnitude += (plus - minus).abs() / (2.0 * c);
        }
        if self.calibration_pairs > 0 {
            magnitude /= self.calibration_pairs as f64;
        }
        let a = if magnitude > 1e-12 {
            self.target_magnitude / magnitude * (stability + 1.0).powf(self.alpha)
        } else {
            self.target_magnitude
        };
        debug!("SPSA calibrated a = {:.4e} (mean |g| = {:.4e})", a, magnitude);

        let mut x = initial.to_vec();
        for k in 0..max_iterations {
            let a_k = a / (k as f64 + 1.0 + stability).powf(self.alpha);
            let c_k = c / (k as f64 + 1.0).powf(self.gamma);
            let delta = Self::direction(&mut rng, n);
            let plus = f.call(&Self::shifted(&x, &delta, c_k))?;
            let minus = f.call(&Self::shifted(&x, &delta, -c_k))?;
            let g = (plus - minus) / (2.0 * c_k);
            // 1/Δ_i = Δ_i for ±1 perturbations
            for (xi, di) in x.iter_mut().zip(&delta) {
                *xi -= a_k * g * di;
            }
        }

        let value = f.call(&x)?;
        Ok(OptimizeOutcome {
            parameters: x,
            cost: value,
            n_evaluations: f.evaluations,
            converged: true,
            message: format!(
                "{} iterations completed ({} calibration evaluations)",
                max_iterations,
                self.calibration_evaluations()
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_accounting_includes_calibration() {
        let spsa = Spsa::new(Some(42));
        let outcome = spsa
            .minimize(|x: &[f64]| Ok(x.iter().map(|v| v * v).sum()), &[1.0, -1.0], 40, 1e-3)
            .unwrap();
        assert_eq!(outcome.n_evaluations, 50 + 2 * 40 + 1);
        assert_eq!(outcome.n_evaluations, spsa.expected_evaluations(40));
        assert!(outcome.converged);
    }

    #[test]
    fn test_decreases_quadratic() {
        let spsa = Spsa::new(Some(5));
        let start = [1.0, -0.8, 0.6];
        let f0: f64 = start.iter().map(|v| v * v).sum();
        let outcome = spsa
            .minimize(|x: &[f64]| Ok(x.iter().map(|v| v * v).sum()), &start, 300, 0.0)
            .unwrap();
        assert!(outcome.cost < 0.1 * f0, "cost {} from {}", outcome.cost, f0);
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let run = || {
            Spsa::new(Some(9))
                .minimize(|x: &[f64]| Ok((x[0] - 0.3).powi(2)), &[0.0], 20, 0.0)
                .unwrap()
        };
        assert_eq!(run().parameters, run().parameters);
    }

    #[test]
    fn test_reused_minimizer_repeats_its_run() {
        let spsa = Spsa::new(Some(9));
        let run = || spsa.minimize(|x: &[f64]| Ok((x[0] - 0.3).powi(2)), &[0.0], 20, 0.0).unwrap();
        assert_eq!(run().parameters, run().parameters);
    }
}
