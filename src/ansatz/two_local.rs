//! Generic layered rotation/entanglement ansatz.

use super::circuit::{Circuit, Entanglement, Gate, Rotation};
use super::traits::{check_parameter_len, Ansatz};
use crate::error::Result;

/// Two-local ansatz: `reps` blocks of (rotation layer, CX entanglement
/// layer) followed by a final rotation layer.
///
/// Every rotation layer applies each configured rotation on every qubit, so
/// the parameter count is `num_qubits * rotation_blocks.len() * (reps + 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct TwoLocal {
    num_qubits: usize,
    rotation_blocks: Vec<Rotation>,
    entanglement: Entanglement,
    reps: usize,
    params: Vec<f64>,
}

impl TwoLocal {
    /// New ansatz with all parameters bound to zero.
    pub fn new(
        num_qubits: usize,
        rotation_blocks: Vec<Rotation>,
        entanglement: Entanglement,
        reps: usize,
    ) -> Self {
        let n_params = num_qubits * rotation_blocks.len() * (reps + 1);
        Self {
            num_qubits,
            rotation_blocks,
            entanglement,
            reps,
            params: vec![0.0; n_params],
        }
    }

    pub fn reps(&self) -> usize {
        self.reps
    }

    pub fn entanglement(&self) -> Entanglement {
        self.entanglement
    }

    pub fn rotation_blocks(&self) -> &[Rotation] {
        &self.rotation_blocks
    }

    fn layer_size(&self) -> usize {
        self.num_qubits * self.rotation_blocks.len()
    }

    fn add_rotation_layer(&self, circuit: &mut Circuit, layer: usize) {
        let params = &self.params[layer * self.layer_size()..(layer + 1) * self.layer_size()];
        let n_blocks = self.rotation_blocks.len();
        for qubit in 0..self.num_qubits {
            for (g, &axis) in self.rotation_blocks.iter().enumerate() {
                circuit.push(Gate::rotation(axis, qubit, params[qubit * n_blocks + g]));
            }
        }
    }

    fn add_entanglement_layer(&self, circuit: &mut Circuit) {
        for (control, target) in self.entanglement.pairs(self.num_qubits) {
            circuit.push(Gate::Cx { control, target });
        }
    }
}

impl Ansatz for TwoLocal {
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
        check_parameter_len("two_local", self.params.len(), parameters.len())?;
        self.params.copy_from_slice(parameters);
        Ok(())
    }

    fn build(&self) -> Circuit {
        let mut circuit = Circuit::new(self.num_qubits);
        for rep in 0..self.reps {
            self.add_rotation_layer(&mut circuit, rep);
            self.add_entanglement_layer(&mut circuit);
        }
        self.add_rotation_layer(&mut circuit, self.reps);
        circuit
    }
}
