//! Parity-preserving ansatz built from RXY/RYX blocks.
//!
//! Each coupled pair gets `RXY(θ)` followed by `RYX(φ)`. Both gates only mix
//! basis states of equal parity, so the prepared state stays inside the
//! parity sector of the LMG Hamiltonian.

use super::circuit::{Circuit, Entanglement, Gate};
use super::traits::{check_parameter_len, Ansatz};
use crate::error::Result;

#[derive(Clone, Debug, PartialEq)]
pub struct ParityPreserving {
    num_qubits: usize,
    architecture: Entanglement,
    reps: usize,
    params: Vec<f64>,
}

impl ParityPreserving {
    /// New ansatz with `reps + 1` layers, parameters bound to zero.
    pub fn new(num_qubits: usize, architecture: Entanglement, reps: usize) -> Self {
        let n_params = 2 * architecture.pairs(num_qubits).len() * (reps + 1);
        Self {
            num_qubits,
            architecture,
            reps,
            params: vec![0.0; n_params],
        }
    }

    pub fn reps(&self) -> usize {
        self.reps
    }

    pub fn architecture(&self) -> Entanglement {
        self.architecture
    }
}

impl Ansatz for ParityPreserving {
    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn parameter_count(&self) -> usize {
        self.params.len()
    }

    fn parameters(&self) -> &[f64] {
        &self.params
    }

    fn bind(&mut self, parameters: &[f64]) -> Result<()> {
        check_parameter_len("parity", self.params.len(), parameters.len())?;
        self.params.copy_from_slice(parameters);
        Ok(())
    }

    fn build(&self) -> Circuit {
        let pairs = self.architecture.pairs(self.num_qubits);
        let mut circuit = Circuit::new(self.num_qubits);
        let mut theta = self.params.iter();
        for _ in 0..=self.reps {
            for &(first, second) in &pairs {
                if let (Some(&a), Some(&b)) = (theta.next(), theta.next()) {
                    circuit.push(Gate::Rxy { first, second, theta: a });
                    circuit.push(Gate::Ryx { first, second, theta: b });
                }
            }
        }
        circuit
    }
}
