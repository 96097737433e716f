//! Offline comparison of stored optima against the exact thermal state.

use std::fmt;

use crate::cost::CostFunction;
use crate::density;
use crate::error::{MhetsError, Result};
use crate::evaluator::EvaluationBudget;
use crate::model::LmgModel;
use crate::search::MultiBetaResult;

/// Variational and exact quantities at one beta.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ValidationRow {
    pub beta: f64,
    /// `Tr(ρ_var H)`
    pub energy: f64,
    /// `Tr(ρ_β H)`
    pub exact_energy: f64,
    /// Uhlmann fidelity between `ρ_var` and `ρ_β`
    pub fidelity: f64,
    /// Diagonal relative entropy `S(ρ_var || ρ_β)`
    pub relative_entropy: f64,
    /// `-ln Z`
    pub exact_free_energy: f64,
    /// Cost stored with the result
    pub cost: f64,
}

impl fmt::Display for ValidationRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "beta = {:8.4}  E = {:12.8} (exact {:12.8})  F = {:12.8} (exact {:12.8})  fidelity = {:.6}",
            self.beta,
            self.energy,
            self.exact_energy,
            self.cost,
            self.exact_free_energy,
            self.fidelity
        )
    }
}

/// Re-prepare every stored optimum exactly, trace out the ancilla and
/// compare with `model`'s Gibbs state.
pub fn validate(
    model: &LmgModel,
    cost_fn: &CostFunction,
    result: &MultiBetaResult,
) -> Result<Vec<ValidationRow>> {
    if model.num_qubits() != cost_fn.model().num_qubits() {
        return Err(MhetsError::DimensionMismatch(format!(
            "model has {} qubits but the cost function prepares {}",
            model.num_qubits(),
            cost_fn.model().num_qubits()
        )));
    }
    let mut cost_fn = cost_fn.clone();
    let h = model.matrix();
    result
        .records()
        .map(|record| {
            let beta = record.beta;
            let rho = cost_fn.system_state(&record.optimized_parameters, EvaluationBudget::Exact)?;
            let exact = model.thermal_state(beta);
            Ok(ValidationRow {
                beta,
                energy: (&rho * h).trace().re,
                exact_energy: model.thermal_average(h, beta),
                fidelity: density::fidelity(&rho, &exact),
                relative_entropy: LmgModel::relative_entropy(&rho, &exact),
                exact_free_energy: model.free_energy(beta),
                cost: record.cost,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::Backend;
    use crate::io::OptimizationOptions;
    use crate::search::testing::small_cost_fn;
    use crate::search::{optimize_beta, RunSettings};
    use crate::optimize::OptimizerKind;
    use approx::assert_relative_eq;

    #[test]
    fn test_converged_single_qubit_matches_gibbs_state() {
        let f = small_cost_fn(1);
        let settings = RunSettings {
            optimizer: OptimizerKind::NelderMead,
            max_iterations: 600,
            tolerance: 1e-12,
            budget: EvaluationBudget::Exact,
            seed: None,
            record_trace: false,
        };
        let mut result = MultiBetaResult::new(OptimizationOptions::default(), Backend::Statevector);
        for beta in [0.5, 2.0] {
            let start = vec![0.1; f.parameter_count()];
            result.insert(optimize_beta(&f, beta, &start, &settings).unwrap());
        }

        let rows = validate(f.model(), &f, &result).unwrap();
        assert_eq!(rows.len(), 2);
        for row in rows {
            assert_relative_eq!(row.fidelity, 1.0, epsilon = 1e-3);
            assert_relative_eq!(row.energy, row.exact_energy, epsilon = 1e-3);
            assert_relative_eq!(row.cost, row.exact_free_energy, epsilon = 1e-4);
            assert!(row.relative_entropy >= -1e-12);
        }
    }

    #[test]
    fn test_model_size_must_match() {
        let f = small_cost_fn(1);
        let other = LmgModel::new(2, 0.0, 0.2).unwrap();
        let result = MultiBetaResult::new(OptimizationOptions::default(), Backend::Statevector);
        assert!(matches!(validate(&other, &f, &result), Err(MhetsError::DimensionMismatch(_))));
    }
}
