//! Result records produced by a sweep.

use serde::{Deserialize, Serialize};

use crate::error::{MhetsError, Result};
use crate::evaluator::Backend;
use crate::io::OptimizationOptions;

/// Outcome of one optimization run at one beta.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRecord {
    pub beta: f64,
    pub starting_parameters: Vec<f64>,
    pub optimized_parameters: Vec<f64>,
    /// Achieved free-energy cost
    pub cost: f64,
    pub n_evaluations: usize,
    /// Wall-clock seconds
    pub duration_secs: f64,
    pub converged: bool,
    pub message: String,
    /// `(evaluation index, cost)` pairs, when tracing was on
    #[serde(default)]
    pub trace: Option<Vec<(usize, f64)>>,
}

/// Records for an ordered list of betas, stored as parallel columns.
///
/// All columns have the length of `betas`, which is strictly increasing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiBetaResult {
    betas: Vec<f64>,
    optimized_parameter_list: Vec<Vec<f64>>,
    helmholtz_energy: Vec<f64>,
    n_eval: Vec<usize>,
    duration: Vec<f64>,
    converged: Vec<bool>,
    message: Vec<String>,
    starting_parameter_list: Vec<Vec<f64>>,
    callback_data: Vec<Option<Vec<(usize, f64)>>>,
    optimization_options: OptimizationOptions,
    backend: Backend,
}

impl MultiBetaResult {
    pub fn new(optimization_options: OptimizationOptions, backend: Backend) -> Self {
        Self {
            betas: Vec::new(),
            optimized_parameter_list: Vec::new(),
            helmholtz_energy: Vec::new(),
            n_eval: Vec::new(),
            duration: Vec::new(),
            converged: Vec::new(),
            message: Vec::new(),
            starting_parameter_list: Vec::new(),
            callback_data: Vec::new(),
            optimization_options,
            backend,
        }
    }

    pub fn betas(&self) -> &[f64] {
        &self.betas
    }

    pub fn len(&self) -> usize {
        self.betas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.betas.is_empty()
    }

    pub fn options(&self) -> &OptimizationOptions {
        &self.optimization_options
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn helmholtz_energies(&self) -> &[f64] {
        &self.helmholtz_energy
    }

    pub fn optimized_parameters(&self, index: usize) -> Option<&[f64]> {
        self.optimized_parameter_list.get(index).map(|p| p.as_slice())
    }

    /// Fails with `DimensionMismatch` unless every stored parameter vector
    /// has `expected` entries.
    pub fn check_parameter_count(&self, expected: usize) -> Result<()> {
        let columns = self.optimized_parameter_list.iter().zip(&self.starting_parameter_list);
        for (beta, (optimized, start)) in self.betas.iter().zip(columns) {
            if optimized.len() != expected || start.len() != expected {
                return Err(MhetsError::DimensionMismatch(format!(
                    "stored parameters at beta = {} have {} entries but the ansatze need {}",
                    beta,
                    optimized.len(),
                    expected
                )));
            }
        }
        Ok(())
    }

    /// Index of `beta`, matched by exact value.
    pub fn position(&self, beta: f64) -> Option<usize> {
        self.betas.iter().position(|&b| b == beta)
    }

    pub fn contains(&self, beta: f64) -> bool {
        self.position(beta).is_some()
    }

    pub fn record(&self, index: usize) -> Option<OptimizationRecord> {
        if index >= self.len() {
            return None;
        }
        Some(OptimizationRecord {
            beta: self.betas[index],
            starting_parameters: self.starting_parameter_list[index].clone(),
            optimized_parameters: self.optimized_parameter_list[index].clone(),
            cost: self.helmholtz_energy[index],
            n_evaluations: self.n_eval[index],
            duration_secs: self.duration[index],
            converged: self.converged[index],
            message: self.message[index].clone(),
            trace: self.callback_data[index].clone(),
        })
    }

    pub fn records(&self) -> impl Iterator<Item = OptimizationRecord> + '_ {
        (0..self.len()).filter_map(move |i| self.record(i))
    }

    /// Insert `record` at its sorted position, replacing any record with
    /// the same beta.
    pub fn insert(&mut self, record: OptimizationRecord) {
        let index = self.betas.partition_point(|&b| b < record.beta);
        if index < self.len() && self.betas[index] == record.beta {
            self.remove(index);
        }
        self.betas.insert(index, record.beta);
        self.optimized_parameter_list.insert(index, record.optimized_parameters);
        self.helmholtz_energy.insert(index, record.cost);
        self.n_eval.insert(index, record.n_evaluations);
        self.duration.insert(index, record.duration_secs);
        self.converged.insert(index, record.converged);
        self.message.insert(index, record.message);
        self.starting_parameter_list.insert(index, record.starting_parameters);
        self.callback_data.insert(index, record.trace);
    }

    fn remove(&mut self, index: usize) {
        self.betas.remove(index);
        self.optimized_parameter_list.remove(index);
        self.helmholtz_energy.remove(index);
        self.n_eval.remove(index);
        self.duration.remove(index);
        self.converged.remove(index);
        self.message.remove(index);
        self.starting_parameter_list.remove(index);
        self.callback_data.remove(index);
    }

    /// Check column lengths and beta ordering, e.g. after loading.
    pub fn validate(&self) -> Result<()> {
        let n = self.betas.len();
        let lengths = [
            self.optimized_parameter_list.len(),
            self.helmholtz_energy.len(),
            self.n_eval.len(),
            self.duration.len(),
            self.converged.len(),
            self.message.len(),
            self.starting_parameter_list.len(),
            self.callback_data.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(MhetsError::Serialization(format!(
                "result columns {:?} do not match {} betas",
                lengths, n
            )));
        }
        if self.betas.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(MhetsError::Serialization(
                "stored betas are not strictly increasing".to_string(),
            ));
        }
        Ok(())
    }
}

/// Every start's record for one beta, with the selected best.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiStartResult {
    pub beta: f64,
    /// One record per start, in start-index order
    pub records: Vec<OptimizationRecord>,
    pub best_index: usize,
}

impl MultiStartResult {
    pub fn best(&self) -> &OptimizationRecord {
        &self.records[self.best_index]
    }

    pub fn costs(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.cost).collect()
    }

    /// Sample mean and standard deviation of the achieved costs.
    pub fn cost_spread(&self) -> (f64, f64) {
        let costs = self.costs();
        let n = costs.len() as f64;
        if costs.is_empty() {
            return (f64::NAN, f64::NAN);
        }
        let mean = costs.iter().sum::<f64>() / n;
        let var = if costs.len() > 1 {
            costs.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };
        (mean, var.sqrt())
    }
}

#[cfg(test)]
pub(crate) fn sample_record(beta: f64, cost: f64) -> OptimizationRecord {
    OptimizationRecord {
        beta,
        starting_parameters: vec![0.0, 0.0],
        optimized_parameters: vec![beta, -beta],
        cost,
        n_evaluations: 12,
        duration_secs: 0.25,
        converged: true,
        message: "ok".to_string(),
        trace: Some(vec![(0, cost + 1.0), (1, cost)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parameter_count_check() {
        let mut result = MultiBetaResult::new(OptimizationOptions::default(), Backend::Statevector);
        assert!(result.check_parameter_count(7).is_ok());
        result.insert(sample_record(0.5, -1.0));
        assert!(result.check_parameter_count(2).is_ok());
        assert!(matches!(result.check_parameter_count(3), Err(MhetsError::DimensionMismatch(_))));
    }

    #[test]
    fn test_insert_keeps_order_and_alignment() {
        let mut result = MultiBetaResult::new(OptimizationOptions::default(), Backend::Statevector);
        result.insert(sample_record(5.0, -3.0));
        result.insert(sample_record(0.2, -1.0));
        result.insert(sample_record(2.6, -2.0));
        assert_eq!(result.betas(), &[0.2, 2.6, 5.0]);
        assert!(result.validate().is_ok());

        let middle = result.record(1).unwrap();
        assert_eq!(middle, sample_record(2.6, -2.0));
        assert_eq!(result.optimized_parameters(2).unwrap(), &[5.0, -5.0]);
        assert!(result.record(3).is_none());
    }

    #[test]
    fn test_insert_replaces_same_beta() {
        let mut result = MultiBetaResult::new(OptimizationOptions::default(), Backend::Statevector);
        result.insert(sample_record(1.0, -1.0));
        result.insert(sample_record(1.0, -1.5));
        assert_eq!(result.len(), 1);
        assert_eq!(result.helmholtz_energies(), &[-1.5]);
    }

    #[test]
    fn test_json_round_trip_is_lossless() {
        let mut result = MultiBetaResult::new(OptimizationOptions::default(), Backend::Tomography);
        result.insert(sample_record(0.1 + 0.2, 1.0 / 3.0));
        result.insert(sample_record(std::f64::consts::PI, -2.0f64.sqrt()));
        let text = serde_json::to_string(&result).unwrap();
        let back: MultiBetaResult = serde_json::from_str(&text).unwrap();
        assert_eq!(back, result);
        assert!(text.contains("\"optimized_parameter_list\""));
        assert!(text.contains("\"optimization_options\""));
    }

    #[test]
    fn test_validate_rejects_ragged_columns() {
        let mut result = MultiBetaResult::new(OptimizationOptions::default(), Backend::Statevector);
        result.insert(sample_record(1.0, 0.0));
        result.n_eval.push(3);
        assert!(matches!(result.validate(), Err(MhetsError::Serialization(_))));
    }

    #[test]
    fn test_cost_spread() {
        let multi = MultiStartResult {
            beta: 1.0,
            records: vec![sample_record(1.0, 1.0), sample_record(1.0, 3.0)],
            best_index: 0,
        };
        let (mean, std) = multi.cost_spread();
        assert_relative_eq!(mean, 2.0);
        assert_relative_eq!(std, 2.0f64.sqrt(), epsilon = 1e-12);
        assert_eq!(multi.best().cost, 1.0);
    }
}
