//! Helmholtz free-energy cost for an ancilla + system preparation.
//!
//! The ancilla register is prepared by one ansatz, copied onto the system
//! register with a CX per qubit, and the system register is then rotated by a
//! second ansatz. The ancilla marginal fixes the populations (and therefore
//! the entropy) of the system state, while the system ansatz picks its
//! eigenbasis. The cost is
//!
//!   F(θ) = β Tr(ρ_S H) - S(p_ancilla)
//!
//! which is bounded below by `-ln Z` and reaches it at the Gibbs state.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::ansatz::{Ansatz, AnsatzCircuit, AnsatzConfig, Circuit, Gate};
use crate::density::{self, DensityMatrix};
use crate::error::{MhetsError, Result};
use crate::evaluator::{Backend, EvaluationBudget, StateEvaluator};
use crate::model::LmgModel;

/// Largest imaginary part of `Tr(ρ_S H)` treated as round-off.
pub const IMAG_TOLERANCE: f64 = 1e-8;

/// Per-run record of `(evaluation index, cost value)` pairs.
///
/// Owned by a single optimization run; `stride` thins the record so that long
/// sampled runs keep every `stride`-th evaluation only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trace {
    stride: usize,
    counter: usize,
    entries: Vec<(usize, f64)>,
}

impl Trace {
    pub fn new(stride: usize) -> Self {
        Self { stride, counter: 0, entries: Vec::new() }
    }

    /// A trace that counts evaluations but keeps no entries.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn record(&mut self, value: f64) {
        if self.stride > 0 && self.counter % self.stride == 0 {
            self.entries.push((self.counter, value));
        }
        self.counter += 1;
    }

    pub fn evaluations(&self) -> usize {
        self.counter
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<(usize, f64)> {
        self.entries
    }
}

/// Free energy, energy and entropy of a joint ancilla+system state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CostBreakdown {
    pub cost: f64,
    pub energy: f64,
    pub entropy: f64,
    /// Imaginary residual of the energy trace
    pub energy_imag: f64,
}

/// Split `rho` into ancilla marginal entropy and system energy.
pub fn free_energy(
    rho: &DensityMatrix,
    n_ancilla: usize,
    hamiltonian: &DensityMatrix,
    beta: f64,
) -> CostBreakdown {
    let probabilities = density::marginal_probabilities(rho, n_ancilla);
    let entropy = density::shannon_entropy(&probabilities);
    let rho_s = density::trace_out_low(rho, n_ancilla);
    let energy = (&rho_s * hamiltonian).trace();
    CostBreakdown {
        cost: beta * energy.re - entropy,
        energy: energy.re,
        entropy,
        energy_imag: energy.im,
    }
}

/// Free-energy cost bound to one model, two ansatze and an evaluator.
///
/// Each optimization run works on its own clone, so rebinding never leaks
/// between concurrent runs. The clone also owns the generator behind
/// sampled evaluations; `reseed` gives a run its own stream.
#[derive(Clone)]
pub struct CostFunction {
    model: Arc<LmgModel>,
    ancilla: AnsatzCircuit,
    system: AnsatzCircuit,
    evaluator: Arc<dyn StateEvaluator>,
    rng: StdRng,
}

fn sampling_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

impl CostFunction {
    /// Compose the preparation. Both ansatz registers must match the model's
    /// qubit count.
    pub fn new(
        model: Arc<LmgModel>,
        ancilla: AnsatzCircuit,
        system: AnsatzCircuit,
        evaluator: Arc<dyn StateEvaluator>,
    ) -> Result<Self> {
        let n = model.num_qubits();
        if ancilla.num_qubits() != n || system.num_qubits() != n {
            return Err(MhetsError::DimensionMismatch(format!(
                "ancilla ({} qubits) and system ({} qubits) ansatze must both match the {}-qubit model",
                ancilla.num_qubits(),
                system.num_qubits(),
                n
            )));
        }
        Ok(Self {
            model,
            ancilla,
            system,
            evaluator,
            rng: sampling_rng(None),
        })
    }

    /// Build both ansatze from configuration at the model's width.
    pub fn from_configs(
        model: Arc<LmgModel>,
        ancilla: &AnsatzConfig,
        system: &AnsatzConfig,
        evaluator: Arc<dyn StateEvaluator>,
    ) -> Result<Self> {
        let n = model.num_qubits();
        Self::new(model, ancilla.build(n), system.build(n), evaluator)
    }

    /// Restart the sampling generator. `None` draws a fresh seed from
    /// system entropy.
    pub fn reseed(&mut self, seed: Option<u64>) {
        self.rng = sampling_rng(seed);
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.reseed(seed);
        self
    }

    pub fn model(&self) -> &LmgModel {
        &self.model
    }

    pub fn backend(&self) -> Backend {
        self.evaluator.backend()
    }

    pub fn n_ancilla(&self) -> usize {
        self.ancilla.num_qubits()
    }

    pub fn parameter_count(&self) -> usize {
        self.ancilla.parameter_count() + self.system.parameter_count()
    }

    /// Fails with `Configuration` when the evaluator cannot serve `budget`.
    pub fn ensure_budget(&self, budget: EvaluationBudget) -> Result<()> {
        if self.evaluator.supports(budget) {
            Ok(())
        } else {
            Err(MhetsError::Configuration(format!(
                "{} backend is not available for a {:?} budget",
                self.backend(),
                budget
            )))
        }
    }

    /// Baseline starting vector: `initial` if its length fits, zeros
    /// otherwise (with a warning).
    pub fn baseline_parameters(&self, initial: Option<&[f64]>) -> Vec<f64> {
        let n = self.parameter_count();
        match initial {
            Some(p) if p.len() == n => p.to_vec(),
            Some(p) => {
                warn!(
                    "Initial parameter list has {} entries but the ansatze need {}; using zeros",
                    p.len(),
                    n
                );
                vec![0.0; n]
            }
            None => vec![0.0; n],
        }
    }

    /// Bind `parameters`, ancilla block first, system block after it.
    pub fn bind(&mut self, parameters: &[f64]) -> Result<()> {
        let n = self.parameter_count();
        if parameters.len() != n {
            return Err(MhetsError::DimensionMismatch(format!(
                "expected {} parameters, got {}",
                n,
                parameters.len()
            )));
        }
        let (ancilla, system) = parameters.split_at(self.ancilla.parameter_count());
        self.ancilla.bind(ancilla)?;
        self.system.bind(system)
    }

    /// Ancilla ansatz, CX copy onto the system register, system ansatz.
    pub fn build_total_circuit(&self) -> Result<Circuit> {
        let n_a = self.n_ancilla();
        let n = self.model.num_qubits();
        let mut total = Circuit::new(n_a + n);
        total.append(&self.ancilla.build(), 0)?;
        for qubit in 0..n {
            total.push(Gate::Cx { control: qubit, target: qubit + n_a });
        }
        total.append(&self.system.build(), n_a)?;
        Ok(total)
    }

    pub fn joint_state(
        &mut self,
        parameters: &[f64],
        budget: EvaluationBudget,
    ) -> Result<DensityMatrix> {
        self.bind(parameters)?;
        let circuit = self.build_total_circuit()?;
        self.evaluator.evaluate(&circuit, budget, &mut self.rng)
    }

    /// Reduced system state with the ancilla traced out.
    pub fn system_state(
        &mut self,
        parameters: &[f64],
        budget: EvaluationBudget,
    ) -> Result<DensityMatrix> {
        let rho = self.joint_state(parameters, budget)?;
        Ok(density::trace_out_low(&rho, self.n_ancilla()))
    }

    pub fn breakdown(
        &mut self,
        parameters: &[f64],
        beta: f64,
        budget: EvaluationBudget,
    ) -> Result<CostBreakdown> {
        let rho = self.joint_state(parameters, budget)?;
        let parts = free_energy(&rho, self.n_ancilla(), self.model.matrix(), beta);
        if parts.energy_imag.abs() > IMAG_TOLERANCE {
            warn!(
                "{}",
                MhetsError::NumericAnomaly(format!(
                    "energy expectation has imaginary part {:.3e} at beta = {}; using the real part",
                    parts.energy_imag, beta
                ))
            );
        }
        Ok(parts)
    }

    /// `β E - S` for `parameters`.
    pub fn evaluate(
        &mut self,
        parameters: &[f64],
        beta: f64,
        budget: EvaluationBudget,
    ) -> Result<f64> {
        Ok(self.breakdown(parameters, beta, budget)?.cost)
    }

    /// As `evaluate`, appending the value to `trace`.
    pub fn evaluate_traced(
        &mut self,
        parameters: &[f64],
        beta: f64,
        budget: EvaluationBudget,
        trace: &mut Trace,
    ) -> Result<f64> {
        let cost = self.evaluate(parameters, beta, budget)?;
        debug!("eval {}: F = {:.8}", trace.evaluations(), cost);
        trace.record(cost);
        Ok(cost)
    }
}
