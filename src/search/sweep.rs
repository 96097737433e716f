//! Beta-sweep controller with continuation and persisted, incremental results.

use tracing::{debug, error, info, warn};

use super::merge::{merge_betas, sorted_betas};
use super::multistart::MultiStartSearch;
use super::records::{MultiBetaResult, MultiStartResult, OptimizationRecord};
use super::run::{optimize_beta, RunSettings};
use crate::ansatz::Ansatz;
use crate::cost::CostFunction;
use crate::error::{MhetsError, Result};
use crate::io::{OptimizationOptions, ResultStore};

/// Where a sweep is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SweepState {
    NoPriorData,
    ResumingFromPriorData,
    /// Every computed beta starts from the baseline, or nothing was stored
    SweepingFromScratch,
    /// Stored optima seed the computed betas
    SweepingWithContinuation,
    Persisted,
}

impl SweepState {
    /// Optimizing state for a sweep that found stored data or not.
    fn sweeping(resumed: bool, continuation: bool) -> Self {
        if resumed && continuation {
            SweepState::SweepingWithContinuation
        } else {
            SweepState::SweepingFromScratch
        }
    }
}

/// Which betas a sweep optimized and which it served from storage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SweepReport {
    pub computed: Vec<f64>,
    pub reused: Vec<f64>,
}

#[derive(Clone, Debug)]
pub struct SweepOutcome {
    /// Stored and new records, sorted by beta
    pub result: MultiBetaResult,
    pub report: SweepReport,
    /// Per-start records for every computed beta when multi-start is on
    pub multi_start: Vec<MultiStartResult>,
}

/// Runs the optimization over a list of betas, reusing stored results.
pub struct BetaSweep<S: ResultStore> {
    cost_fn: CostFunction,
    options: OptimizationOptions,
    settings: RunSettings,
    store: S,
    state: SweepState,
    history: Vec<SweepState>,
}

impl<S: ResultStore> BetaSweep<S> {
    /// Fails with `Configuration` if the options are invalid or the cost
    /// function's evaluator cannot serve the configured budget, and with
    /// `DimensionMismatch` if the options' ansatze are not the ones
    /// `cost_fn` was built from.
    pub fn new(cost_fn: CostFunction, options: OptimizationOptions, store: S) -> Result<Self> {
        options.validate()?;
        cost_fn.ensure_budget(options.budget())?;
        let n = cost_fn.model().num_qubits();
        let described = options.ancilla_ansatz.build(n).parameter_count()
            + options.system_ansatz.build(n).parameter_count();
        if described != cost_fn.parameter_count() {
            return Err(MhetsError::DimensionMismatch(format!(
                "options describe {} parameters but the cost function has {}",
                described,
                cost_fn.parameter_count()
            )));
        }
        let settings = RunSettings::from_options(&options);
        Ok(Self {
            cost_fn,
            options,
            settings,
            store,
            state: SweepState::NoPriorData,
            history: Vec::new(),
        })
    }

    pub fn state(&self) -> SweepState {
        self.state
    }

    /// States entered by the last `run`, in order.
    pub fn history(&self) -> &[SweepState] {
        &self.history
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &OptimizationOptions {
        &self.options
    }

    fn transition(&mut self, state: SweepState) {
        debug!("Sweep state {:?} -> {:?}", self.state, state);
        self.state = state;
        self.history.push(state);
    }

    /// Stored records must come from the ansatze this sweep optimizes.
    fn check_compatible(&self, prior: &MultiBetaResult) -> Result<()> {
        prior.check_parameter_count(self.cost_fn.parameter_count())?;
        let stored = prior.options();
        if stored.ancilla_ansatz != self.options.ancilla_ansatz
            || stored.system_ansatz != self.options.system_ansatz
        {
            return Err(MhetsError::Configuration(format!(
                "stored results were produced with ansatze {:?} / {:?}, not {:?} / {:?}",
                stored.ancilla_ansatz,
                stored.system_ansatz,
                self.options.ancilla_ansatz,
                self.options.system_ansatz
            )));
        }
        Ok(())
    }

    fn load_prior(&mut self) -> Result<Option<MultiBetaResult>> {
        match self.store.load() {
            Ok(prior) => {
                self.check_compatible(&prior)?;
                if prior.options() != &self.options {
                    warn!("Stored results were produced with different optimization options");
                }
                if prior.backend() != self.cost_fn.backend() {
                    warn!(
                        "Stored results come from the {} backend, sweeping with {}",
                        prior.backend(),
                        self.cost_fn.backend()
                    );
                }
                self.transition(SweepState::ResumingFromPriorData);
                Ok(Some(prior))
            }
            Err(MhetsError::StorageNotFound(path)) => {
                warn!("No stored results at {}, starting from scratch", path.display());
                self.transition(SweepState::NoPriorData);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn optimize(
        &self,
        beta: f64,
        start: &[f64],
    ) -> Result<(OptimizationRecord, Option<MultiStartResult>)> {
        if self.options.n_starts > 1 {
            let search = MultiStartSearch::new(self.options.n_starts).with_seed(self.options.seed);
            let multi = search.run(&self.cost_fn, beta, start, &self.settings)?;
            Ok((multi.best().clone(), Some(multi)))
        } else {
            Ok((optimize_beta(&self.cost_fn, beta, start, &self.settings)?, None))
        }
    }

    /// Optimize every requested beta not already stored, then persist the
    /// merged result.
    ///
    /// On an optimizer failure the completed betas are still persisted and
    /// the first failure is returned. With continuation on, no beta after a
    /// failed one is attempted.
    pub fn run(&mut self, requested: &[f64]) -> Result<SweepOutcome> {
        if let Some(bad) = requested.iter().find(|b| !(b.is_finite() && **b > 0.0)) {
            return Err(MhetsError::Configuration(format!("beta must be positive, got {}", bad)));
        }

        self.history.clear();
        let prior = self.load_prior()?;
        let betas = match prior {
            Some(ref old) => merge_betas(old.betas(), requested),
            None => sorted_betas(requested),
        };
        self.transition(SweepState::sweeping(prior.is_some(), self.options.continuation));
        info!("Sweeping {} betas: {:?}", betas.len(), betas);

        let baseline = self
            .cost_fn
            .baseline_parameters(self.options.initial_parameters.as_deref());
        let mut result = MultiBetaResult::new(self.options.clone(), self.cost_fn.backend());
        let mut report = SweepReport::default();
        let mut multi_start = Vec::new();
        let mut previous: Option<Vec<f64>> = None;
        let mut failure: Option<MhetsError> = None;

        for &beta in &betas {
            let stored = prior
                .as_ref()
                .and_then(|old| old.position(beta).and_then(|i| old.record(i)));
            if let Some(record) = stored {
                if !self.options.force {
                    debug!("beta = {} served from storage", beta);
                    previous = Some(record.optimized_parameters.clone());
                    result.insert(record);
                    report.reused.push(beta);
                    continue;
                }
            }

            if failure.is_some() && self.options.continuation {
                warn!("Skipping beta = {}: the continuation chain is broken", beta);
                continue;
            }

            let start = match (self.options.continuation, previous.as_ref()) {
                (true, Some(p)) => p.clone(),
                _ => baseline.clone(),
            };
            match self.optimize(beta, &start) {
                Ok((record, multi)) => {
                    previous = Some(record.optimized_parameters.clone());
                    result.insert(record);
                    report.computed.push(beta);
                    multi_start.extend(multi);
                }
                Err(e) => {
                    error!("{}", e);
                    previous = None;
                    failure.get_or_insert(e);
                }
            }
        }

        self.store.save(&result)?;
        if !multi_start.is_empty() {
            self.save_runs(&multi_start)?;
        }
        self.transition(SweepState::Persisted);
        info!(
            "Sweep finished: {} computed, {} reused, {} stored",
            report.computed.len(),
            report.reused.len(),
            result.len()
        );

        match failure {
            Some(e) => Err(e),
            None => Ok(SweepOutcome { result, report, multi_start }),
        }
    }

    fn save_runs(&self, multi_start: &[MultiStartResult]) -> Result<()> {
        for index in 0..self.options.n_starts {
            let mut run = match self.store.load_run(index) {
                Ok(run) => {
                    self.check_compatible(&run)?;
                    run
                }
                Err(MhetsError::StorageNotFound(_)) => {
                    MultiBetaResult::new(self.options.clone(), self.cost_fn.backend())
                }
                Err(e) => return Err(e),
            };
            for multi in multi_start {
                if let Some(record) = multi.records.get(index) {
                    run.insert(record.clone());
                }
            }
            self.store.save_run(index, &run)?;
        }
        Ok(())
    }
}
