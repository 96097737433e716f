//! Gate-level preparation descriptions.

use serde::{Deserialize, Serialize};

use crate::error::{MhetsError, Result};

/// Single-qubit rotation axis used by rotation layers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    Rx,
    Ry,
    Rz,
}

/// Which qubit pairs an entangling layer couples.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entanglement {
    /// Nearest neighbours `(q, q+1)`
    #[default]
    Linear,
    /// Every pair `(q, r)` with `q < r`
    #[serde(alias = "all")]
    Full,
}

impl Entanglement {
    /// Ordered qubit pairs coupled on `num_qubits` qubits.
    pub fn pairs(self, num_qubits: usize) -> Vec<(usize, usize)> {
        match self {
            Entanglement::Linear => (1..num_qubits).map(|q| (q - 1, q)).collect(),
            Entanglement::Full => (0..num_qubits)
                .flat_map(|q| ((q + 1)..num_qubits).map(move |r| (q, r)))
                .collect(),
        }
    }
}

/// A gate acting on absolute qubit indices.
///
/// `Rxy` / `Ryx` are the parity-preserving two-qubit rotations
/// `exp(-iθ/2 · X⊗Y)`-type blocks; `first` is the low bit of their 4x4
/// matrix index.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Gate {
    Rx { qubit: usize, theta: f64 },
    Ry { qubit: usize, theta: f64 },
    Rz { qubit: usize, theta: f64 },
    Cx { control: usize, target: usize },
    Rxy { first: usize, second: usize, theta: f64 },
    Ryx { first: usize, second: usize, theta: f64 },
}

impl Gate {
    pub fn rotation(axis: Rotation, qubit: usize, theta: f64) -> Self {
        match axis {
            Rotation::Rx => Gate::Rx { qubit, theta },
            Rotation::Ry => Gate::Ry { qubit, theta },
            Rotation::Rz => Gate::Rz { qubit, theta },
        }
    }

    /// Highest qubit index touched.
    pub fn max_qubit(&self) -> usize {
        match *self {
            Gate::Rx { qubit, .. } | Gate::Ry { qubit, .. } | Gate::Rz { qubit, .. } => qubit,
            Gate::Cx { control, target } => control.max(target),
            Gate::Rxy { first, second, .. } | Gate::Ryx { first, second, .. } => first.max(second),
        }
    }

    /// Same gate with every qubit index moved up by `offset`.
    pub fn shifted(self, offset: usize) -> Self {
        match self {
            Gate::Rx { qubit, theta } => Gate::Rx { qubit: qubit + offset, theta },
            Gate::Ry { qubit, theta } => Gate::Ry { qubit: qubit + offset, theta },
            Gate::Rz { qubit, theta } => Gate::Rz { qubit: qubit + offset, theta },
            Gate::Cx { control, target } => Gate::Cx {
                control: control + offset,
                target: target + offset,
            },
            Gate::Rxy { first, second, theta } => Gate::Rxy {
                first: first + offset,
                second: second + offset,
                theta,
            },
            Gate::Ryx { first, second, theta } => Gate::Ryx {
                first: first + offset,
                second: second + offset,
                theta,
            },
        }
    }
}

/// Ordered gate list on a fixed register, starting from `|0...0>`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Circuit {
    num_qubits: usize,
    gates: Vec<Gate>,
}

impl Circuit {
    pub fn new(num_qubits: usize) -> Self {
        Self { num_qubits, gates: Vec::new() }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    pub fn push(&mut self, gate: Gate) {
        debug_assert!(gate.max_qubit() < self.num_qubits);
        self.gates.push(gate);
    }

    /// Append `other` onto qubits `offset..offset + other.num_qubits()`.
    pub fn append(&mut self, other: &Circuit, offset: usize) -> Result<()> {
        if offset + other.num_qubits > self.num_qubits {
            return Err(MhetsError::DimensionMismatch(format!(
                "cannot place a {}-qubit circuit at offset {} of a {}-qubit register",
                other.num_qubits, offset, self.num_qubits
            )));
        }
        self.gates
            .extend(other.gates.iter().map(|g| g.shifted(offset)));
        Ok(())
    }
}
