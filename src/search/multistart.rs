//! Monte Carlo multi-start search at a single beta.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Uniform;
use rayon::prelude::*;
use tracing::info;

use super::records::{MultiStartResult, OptimizationRecord};
use super::run::{optimize_beta, RunSettings};
use crate::cost::CostFunction;
use crate::error::{MhetsError, Result};

/// Index of the smallest cost; ties go to the lowest index.
pub fn select_best(costs: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &cost) in costs.iter().enumerate() {
        match best {
            Some(b) if costs[b] <= cost => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Runs the optimizer from several starting points and keeps every outcome.
#[derive(Clone, Debug)]
pub struct MultiStartSearch {
    n_starts: usize,
    seed: Option<u64>,
}

impl MultiStartSearch {
    pub fn new(n_starts: usize) -> Self {
        Self { n_starts, seed: None }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_starts(&self) -> usize {
        self.n_starts
    }

    /// `baseline` followed by `n_starts - 1` points drawn uniformly from
    /// `[-π, π]` per coordinate.
    pub fn starting_points(&self, baseline: &[f64], beta: f64) -> Vec<Vec<f64>> {
        let mut rng = match self.seed {
            // Mix beta in so each beta draws its own points
            Some(s) => StdRng::seed_from_u64(s ^ beta.to_bits()),
            None => StdRng::from_entropy(),
        };
        let range = Uniform::new_inclusive(-PI, PI);
        let mut points = Vec::with_capacity(self.n_starts);
        points.push(baseline.to_vec());
        for _ in 1..self.n_starts {
            points.push((0..baseline.len()).map(|_| rng.sample(range)).collect());
        }
        points
    }

    /// Run `runner(start_index, start)` for every starting point in parallel
    /// and select the lowest-cost record.
    pub fn run_with<F>(&self, beta: f64, baseline: &[f64], runner: F) -> Result<MultiStartResult>
    where
        F: Fn(usize, &[f64]) -> Result<OptimizationRecord> + Sync,
    {
        if self.n_starts == 0 {
            return Err(MhetsError::Configuration(
                "multi-start needs at least one start".to_string(),
            ));
        }
        let points = self.starting_points(baseline, beta);
        // Indexed collect keeps start order regardless of completion order
        let records: Vec<OptimizationRecord> = points
            .par_iter()
            .enumerate()
            .map(|(k, start)| runner(k, start))
            .collect::<Result<Vec<_>>>()?;

        let costs: Vec<f64> = records.iter().map(|r| r.cost).collect();
        let best_index = select_best(&costs).unwrap_or(0);
        let result = MultiStartResult { beta, records, best_index };
        let (mean, std) = result.cost_spread();
        info!(
            "beta = {:.4}: best of {} starts is #{} with F = {:.8} (mean {:.6}, std {:.2e})",
            beta,
            self.n_starts,
            best_index,
            result.best().cost,
            mean,
            std
        );
        Ok(result)
    }

    /// Optimize `cost_fn` at `beta` from every starting point.
    pub fn run(
        &self,
        cost_fn: &CostFunction,
        beta: f64,
        baseline: &[f64],
        settings: &RunSettings,
    ) -> Result<MultiStartResult> {
        self.run_with(beta, baseline, |k, start| {
            optimize_beta(cost_fn, beta, start, &settings.for_start(k))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::records::sample_record;
    use crate::search::testing::{sampled_cost_fn, small_cost_fn};
    use crate::evaluator::EvaluationBudget;
    use crate::optimize::OptimizerKind;

    #[test]
    fn test_select_best_first_minimum() {
        assert_eq!(select_best(&[5.0, 2.0, 2.0, 9.0]), Some(1));
        assert_eq!(select_best(&[3.0]), Some(0));
        assert_eq!(select_best(&[]), None);
    }

    #[test]
    fn test_scripted_costs_select_first_of_ties() {
        let costs = [5.0, 2.0, 2.0, 9.0];
        let search = MultiStartSearch::new(4).with_seed(Some(1));
        let result = search
            .run_with(1.0, &[0.0, 0.0], |k, _start| Ok(sample_record(1.0, costs[k])))
            .unwrap();
        assert_eq!(result.best_index, 1);
        assert_eq!(result.best().cost, 2.0);
        assert_eq!(result.costs(), costs.to_vec());
    }

    #[test]
    fn test_starting_points() {
        let baseline = [0.5, -0.5, 0.0];
        let search = MultiStartSearch::new(5).with_seed(Some(7));
        let points = search.starting_points(&baseline, 1.0);
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], baseline.to_vec());
        for p in &points[1..] {
            assert_eq!(p.len(), 3);
            assert!(p.iter().all(|x| (-PI..=PI).contains(x)));
        }
        assert_eq!(points, search.starting_points(&baseline, 1.0));
    }

    #[test]
    fn test_any_failed_start_fails_the_beta() {
        let search = MultiStartSearch::new(3).with_seed(Some(2));
        let result = search.run_with(0.5, &[0.0], |k, _start| {
            if k == 2 {
                Err(MhetsError::OptimizerFailure { beta: 0.5, message: "boom".to_string() })
            } else {
                Ok(sample_record(0.5, 1.0))
            }
        });
        assert!(matches!(result, Err(MhetsError::OptimizerFailure { .. })));
    }

    #[test]
    fn test_best_start_is_no_worse_than_baseline() {
        let f = small_cost_fn(1);
        let settings = RunSettings {
            optimizer: OptimizerKind::NelderMead,
            max_iterations: 200,
            tolerance: 1e-9,
            budget: EvaluationBudget::Exact,
            seed: Some(4),
            record_trace: false,
        };
        let baseline = vec![0.0; f.parameter_count()];
        let search = MultiStartSearch::new(3).with_seed(Some(4));
        let result = search.run(&f, 1.0, &baseline, &settings).unwrap();
        assert_eq!(result.records.len(), 3);
        assert_eq!(result.records[0].starting_parameters, baseline);
        assert!(result.best().cost <= result.records[0].cost);
    }

    #[test]
    fn test_seeded_sampled_starts_repeat_under_parallelism() {
        let f = sampled_cost_fn(1);
        let settings = RunSettings {
            optimizer: OptimizerKind::NelderMead,
            max_iterations: 15,
            tolerance: 0.0,
            budget: EvaluationBudget::Sampled(64),
            seed: Some(5),
            record_trace: false,
        };
        let baseline = vec![0.1; f.parameter_count()];
        let search = MultiStartSearch::new(4).with_seed(Some(5));
        let first = search.run(&f, 0.8, &baseline, &settings).unwrap();
        let second = search.run(&f, 0.8, &baseline, &settings).unwrap();
        assert_eq!(first.costs(), second.costs());
        for (a, b) in first.records.iter().zip(&second.records) {
            assert_eq!(a.optimized_parameters, b.optimized_parameters);
        }
    }
}
