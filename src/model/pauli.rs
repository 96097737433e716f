//! Pauli strings and weighted sums of them.

use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::density::DensityMatrix;

/// Single-qubit Pauli operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pauli {
    I,
    X,
    Y,
    Z,
}

impl Pauli {
    pub const ALL: [Pauli; 4] = [Pauli::I, Pauli::X, Pauli::Y, Pauli::Z];

    /// Whether this operator flips the computational-basis bit.
    fn flips(self) -> bool {
        matches!(self, Pauli::X | Pauli::Y)
    }

    /// Phase picked up by basis state `|bit>` (before the flip).
    fn phase(self, bit: bool) -> Complex64 {
        match (self, bit) {
            (Pauli::I, _) | (Pauli::X, _) | (Pauli::Z, false) => Complex64::new(1.0, 0.0),
            (Pauli::Z, true) => Complex64::new(-1.0, 0.0),
            (Pauli::Y, false) => Complex64::new(0.0, 1.0),
            (Pauli::Y, true) => Complex64::new(0.0, -1.0),
        }
    }
}

/// Tensor product of Paulis; `paulis[k]` acts on qubit `k`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PauliString {
    paulis: Vec<Pauli>,
}

impl PauliString {
    pub fn identity(num_qubits: usize) -> Self {
        Self { paulis: vec![Pauli::I; num_qubits] }
    }

    pub fn from_paulis(paulis: Vec<Pauli>) -> Self {
        Self { paulis }
    }

    /// Replace the operator on one qubit.
    pub fn with(mut self, qubit: usize, pauli: Pauli) -> Self {
        self.paulis[qubit] = pauli;
        self
    }

    pub fn num_qubits(&self) -> usize {
        self.paulis.len()
    }

    pub fn is_identity(&self) -> bool {
        self.paulis.iter().all(|&p| p == Pauli::I)
    }

    /// Every Pauli string on `num_qubits` qubits (4^n of them).
    pub fn all(num_qubits: usize) -> Vec<PauliString> {
        let mut strings = vec![PauliString::identity(0)];
        for _ in 0..num_qubits {
            strings = strings
                .into_iter()
                .flat_map(|s| {
                    Pauli::ALL.into_iter().map(move |p| {
                        let mut paulis = s.paulis.clone();
                        paulis.push(p);
                        PauliString { paulis }
                    })
                })
                .collect();
        }
        strings
    }

    /// Bit mask of the qubits this string flips.
    pub fn flip_mask(&self) -> usize {
        self.paulis
            .iter()
            .enumerate()
            .filter(|(_, p)| p.flips())
            .fold(0, |mask, (k, _)| mask | (1 << k))
    }

    /// Action on a basis state: `P|j> = phase |j ^ mask>`.
    pub fn apply_to_basis(&self, j: usize) -> (usize, Complex64) {
        let phase = self
            .paulis
            .iter()
            .enumerate()
            .map(|(k, p)| p.phase(j & (1 << k) != 0))
            .product();
        (j ^ self.flip_mask(), phase)
    }

    pub fn to_matrix(&self) -> DensityMatrix {
        let dim = 1usize << self.num_qubits();
        let mut m = DMatrix::zeros(dim, dim);
        for j in 0..dim {
            let (row, phase) = self.apply_to_basis(j);
            m[(row, j)] = phase;
        }
        m
    }

    /// `Tr(P ρ)`, using the one-nonzero-per-column structure of `P`.
    pub fn expectation(&self, rho: &DensityMatrix) -> Complex64 {
        (0..rho.nrows())
            .map(|k| {
                let (row, phase) = self.apply_to_basis(k);
                phase * rho[(k, row)]
            })
            .sum()
    }
}

/// Weighted sum `Σ c_i P_i` with real weights.
#[derive(Clone, Debug, PartialEq)]
pub struct PauliSum {
    num_qubits: usize,
    terms: Vec<(f64, PauliString)>,
}

impl PauliSum {
    pub fn new(num_qubits: usize) -> Self {
        Self { num_qubits, terms: Vec::new() }
    }

    pub fn push(&mut self, coeff: f64, string: PauliString) {
        debug_assert_eq!(string.num_qubits(), self.num_qubits);
        self.terms.push((coeff, string));
    }

    pub fn terms(&self) -> &[(f64, PauliString)] {
        &self.terms
    }

    pub fn to_matrix(&self) -> DensityMatrix {
        let dim = 1usize << self.num_qubits;
        let mut m = DMatrix::zeros(dim, dim);
        for (coeff, string) in &self.terms {
            for j in 0..dim {
                let (row, phase) = string.apply_to_basis(j);
                m[(row, j)] += phase * *coeff;
            }
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_qubit_matrices() {
        let y = PauliString::identity(1).with(0, Pauli::Y).to_matrix();
        // Y = [[0, -i], [i, 0]]
        assert_relative_eq!(y[(0, 1)].im, -1.0);
        assert_relative_eq!(y[(1, 0)].im, 1.0);
        assert_relative_eq!(y[(0, 0)].norm(), 0.0);

        let z = PauliString::identity(1).with(0, Pauli::Z).to_matrix();
        assert_relative_eq!(z[(0, 0)].re, 1.0);
        assert_relative_eq!(z[(1, 1)].re, -1.0);
    }

    #[test]
    fn test_qubit_ordering_is_little_endian() {
        // X on qubit 1 of two qubits maps |00> (0) to |10> (2)
        let x1 = PauliString::identity(2).with(1, Pauli::X);
        let (row, phase) = x1.apply_to_basis(0);
        assert_eq!(row, 2);
        assert_relative_eq!(phase.re, 1.0);
    }

    #[test]
    fn test_all_strings_count() {
        assert_eq!(PauliString::all(0).len(), 1);
        assert_eq!(PauliString::all(2).len(), 16);
        assert!(PauliString::all(2)[0].is_identity());
    }

    #[test]
    fn test_expectation_matches_dense_trace() {
        let string = PauliString::identity(2).with(0, Pauli::Y).with(1, Pauli::X);
        let rho = DMatrix::from_fn(4, 4, |r, c| {
            Complex64::new((r + 2 * c) as f64 * 0.1, (r as f64 - c as f64) * 0.05)
        });
        let dense = (string.to_matrix() * &rho).trace();
        let fast = string.expectation(&rho);
        assert_relative_eq!(dense.re, fast.re, epsilon = 1e-12);
        assert_relative_eq!(dense.im, fast.im, epsilon = 1e-12);
    }
}
