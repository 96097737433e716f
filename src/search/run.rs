//! A single optimization run at one beta.

use std::time::Instant;

use tracing::{debug, info};

use super::records::OptimizationRecord;
use crate::cost::{CostFunction, Trace};
use crate::error::{MhetsError, Result};
use crate::evaluator::EvaluationBudget;
use crate::io::OptimizationOptions;
use crate::optimize::OptimizerKind;

/// Sampled runs keep every tenth trace entry.
const SAMPLED_TRACE_STRIDE: usize = 10;

/// Optimizer settings shared by every run of a sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSettings {
    pub optimizer: OptimizerKind,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub budget: EvaluationBudget,
    pub seed: Option<u64>,
    pub record_trace: bool,
}

impl RunSettings {
    pub fn from_options(options: &OptimizationOptions) -> Self {
        Self {
            optimizer: options.optimizer,
            max_iterations: options.maxiter,
            tolerance: options.tol,
            budget: options.budget(),
            seed: options.seed,
            record_trace: options.record_trace,
        }
    }

    /// Settings for start `index` of a multi-start search.
    pub fn for_start(&self, index: usize) -> Self {
        Self {
            seed: self.seed.map(|s| s.wrapping_add(index as u64)),
            ..self.clone()
        }
    }

    fn new_trace(&self) -> Trace {
        match (self.record_trace, self.budget) {
            (false, _) => Trace::disabled(),
            (true, EvaluationBudget::Exact) => Trace::new(1),
            (true, EvaluationBudget::Sampled(_)) => Trace::new(SAMPLED_TRACE_STRIDE),
        }
    }
}

/// Minimize the cost at `beta` from `start` on a private copy of `cost_fn`.
///
/// The copy's sampling generator is reseeded from `settings.seed`, so a
/// seeded run repeats exactly no matter what other runs do concurrently.
///
/// Any optimizer error becomes `OptimizerFailure` for this beta.
pub fn optimize_beta(
    cost_fn: &CostFunction,
    beta: f64,
    start: &[f64],
    settings: &RunSettings,
) -> Result<OptimizationRecord> {
    let mut cost_fn = cost_fn.clone();
    // Private sampling stream per run, distinct for every beta
    cost_fn.reseed(settings.seed.map(|s| s ^ beta.to_bits()));
    let mut trace = settings.new_trace();
    let budget = settings.budget;
    debug!("Optimizing beta = {} with {}", beta, settings.optimizer);

    let timer = Instant::now();
    let outcome = settings
        .optimizer
        .minimize(
            |x: &[f64]| cost_fn.evaluate_traced(x, beta, budget, &mut trace),
            start,
            settings.max_iterations,
            settings.tolerance,
            settings.seed,
        )
        .map_err(|e| MhetsError::OptimizerFailure { beta, message: e.to_string() })?;
    let duration_secs = timer.elapsed().as_secs_f64();

    info!(
        "beta = {:.4}: F = {:.8} after {} evaluations in {:.2}s ({})",
        beta, outcome.cost, outcome.n_evaluations, duration_secs, outcome.message
    );

    Ok(OptimizationRecord {
        beta,
        starting_parameters: start.to_vec(),
        optimized_parameters: outcome.parameters,
        cost: outcome.cost,
        n_evaluations: outcome.n_evaluations,
        duration_secs,
        converged: outcome.converged,
        message: outcome.message,
        trace: settings.record_trace.then(|| trace.into_entries()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::testing::small_cost_fn;
    use approx::assert_relative_eq;

    fn settings() -> RunSettings {
        RunSettings {
            optimizer: OptimizerKind::NelderMead,
            max_iterations: 400,
            tolerance: 1e-10,
            budget: EvaluationBudget::Exact,
            seed: None,
            record_trace: true,
        }
    }

    #[test]
    fn test_single_qubit_reaches_gibbs_free_energy() {
        let f = small_cost_fn(1);
        let start = vec![0.1; f.parameter_count()];
        let record = optimize_beta(&f, 1.0, &start, &settings()).unwrap();
        let exact = f.model().free_energy(1.0);
        assert_relative_eq!(record.cost, exact, epsilon = 1e-4);
        assert_eq!(record.starting_parameters, start);
        assert_eq!(record.beta, 1.0);
    }

    #[test]
    fn test_trace_counts_every_evaluation() {
        let f = small_cost_fn(1);
        let start = vec![0.0; f.parameter_count()];
        let record = optimize_beta(&f, 0.5, &start, &settings()).unwrap();
        let trace = record.trace.unwrap();
        assert_eq!(trace.len(), record.n_evaluations);
        assert_eq!(trace[0].0, 0);

        let quiet = RunSettings { record_trace: false, ..settings() };
        assert!(optimize_beta(&f, 0.5, &start, &quiet).unwrap().trace.is_none());
    }

    #[test]
    fn test_failure_carries_beta() {
        let f = small_cost_fn(1);
        let result = optimize_beta(&f, 2.5, &[0.0], &settings());
        match result {
            Err(MhetsError::OptimizerFailure { beta, message }) => {
                assert_eq!(beta, 2.5);
                assert!(message.contains("Dimension mismatch"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_start_seeds_differ() {
        let base = RunSettings { seed: Some(10), ..settings() };
        assert_eq!(base.for_start(0).seed, Some(10));
        assert_eq!(base.for_start(3).seed, Some(13));
        assert_eq!(settings().for_start(3).seed, None);
    }
}
