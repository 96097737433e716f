//! Lipkin-Meshkov-Glick (LMG) spin model.
//!
//! The Hamiltonian on `N` spins is
//!
//!   H = -B Σ_i Z_i - (1/N) Σ_{i<j} X_i X_j - (γ/N) Σ_{i<j} Y_i Y_j
//!
//! Field terms are left out entirely when `B == 0`, and the YY interaction
//! when `γ == 0`. The exact spectrum and thermal state are only used to
//! validate variational results, never while optimizing.

use std::fmt;

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::pauli::{Pauli, PauliString, PauliSum};
use crate::density::{self, DensityMatrix};
use crate::error::{MhetsError, Result};

/// Physical parameters of the LMG model.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Number of spins (qubits)
    pub n: usize,
    /// Anisotropy γ of the YY coupling
    pub gy: f64,
    /// Transverse field B
    pub b: f64,
}

impl fmt::Display for ModelParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N={}, gy={}, B={}", self.n, self.gy, self.b)
    }
}

/// LMG Hamiltonian with its dense matrix cached.
#[derive(Clone, Debug)]
pub struct LmgModel {
    params: ModelParameters,
    hamiltonian: PauliSum,
    matrix: DensityMatrix,
}

impl LmgModel {
    pub fn new(n: usize, gy: f64, b: f64) -> Result<Self> {
        Self::from_params(ModelParameters { n, gy, b })
    }

    pub fn from_params(params: ModelParameters) -> Result<Self> {
        if params.n == 0 {
            return Err(MhetsError::Configuration(
                "LMG model needs at least one spin".to_string(),
            ));
        }
        let hamiltonian = Self::build_terms(&params);
        let matrix = hamiltonian.to_matrix();
        debug!(
            "Built LMG Hamiltonian ({}) with {} terms",
            params,
            hamiltonian.terms().len()
        );
        Ok(Self { params, hamiltonian, matrix })
    }

    fn build_terms(params: &ModelParameters) -> PauliSum {
        let n = params.n;
        let mut h = PauliSum::new(n);

        if params.b != 0.0 {
            for i in 0..n {
                h.push(-params.b, PauliString::identity(n).with(i, Pauli::Z));
            }
        }
        for i in 0..n {
            for j in (i + 1)..n {
                h.push(
                    -1.0 / n as f64,
                    PauliString::identity(n).with(i, Pauli::X).with(j, Pauli::X),
                );
            }
        }
        if params.gy != 0.0 {
            for i in 0..n {
                for j in (i + 1)..n {
                    h.push(
                        -params.gy / n as f64,
                        PauliString::identity(n).with(i, Pauli::Y).with(j, Pauli::Y),
                    );
                }
            }
        }
        h
    }

    pub fn params(&self) -> ModelParameters {
        self.params
    }

    pub fn num_qubits(&self) -> usize {
        self.params.n
    }

    pub fn terms(&self) -> &PauliSum {
        &self.hamiltonian
    }

    pub fn matrix(&self) -> &DensityMatrix {
        &self.matrix
    }

    /// Eigenvalues (ascending) with their eigenvectors.
    pub fn eigenstates(&self) -> (Vec<f64>, Vec<DVector<Complex64>>) {
        let (values, vectors) = density::hermitian_eigen(&self.matrix);
        let states = (0..values.len())
            .map(|c| vectors.column(c).into_owned())
            .collect();
        (values, states)
    }

    pub fn ground_state(&self) -> (f64, DVector<Complex64>) {
        let (values, mut states) = self.eigenstates();
        (values[0], states.swap_remove(0))
    }

    /// Exact partition function and thermal density operator at `beta`.
    pub fn thermalize(&self, beta: f64) -> (f64, DensityMatrix) {
        let (values, states) = self.eigenstates();
        let dim = self.matrix.nrows();
        // Boltzmann weights relative to the ground energy keep exp() in range.
        let e0 = values[0];
        let weights: Vec<f64> = values.iter().map(|e| (-beta * (e - e0)).exp()).collect();
        let shifted_z: f64 = weights.iter().sum();

        let mut rho = DMatrix::zeros(dim, dim);
        for (w, psi) in weights.iter().zip(states.iter()) {
            rho += psi * psi.adjoint() * Complex64::new(w / shifted_z, 0.0);
        }
        let z = shifted_z * (-beta * e0).exp();
        (z, rho)
    }

    pub fn partition_function(&self, beta: f64) -> f64 {
        self.thermalize(beta).0
    }

    pub fn thermal_state(&self, beta: f64) -> DensityMatrix {
        self.thermalize(beta).1
    }

    /// `Tr(op ρ_β)`, real part.
    pub fn thermal_average(&self, op: &DensityMatrix, beta: f64) -> f64 {
        (op * self.thermal_state(beta)).trace().re
    }

    /// Exact minimum of the free-energy cost, `β⟨H⟩_β - S(ρ_β)`.
    pub fn free_energy(&self, beta: f64) -> f64 {
        let rho = self.thermal_state(beta);
        let energy = (&self.matrix * &rho).trace().re;
        beta * energy - density::von_neumann_entropy(&rho)
    }

    /// Classical relative entropy `Σ_i p_i ln(p_i / q_i)` between the
    /// diagonals of two density operators. Terms with `p_i == 0` or
    /// `q_i == 0` are skipped.
    pub fn relative_entropy(first: &DensityMatrix, second: &DensityMatrix) -> f64 {
        (0..first.nrows())
            .map(|i| (first[(i, i)].re, second[(i, i)].re))
            .filter(|&(p, q)| p > 0.0 && q > 0.0)
            .map(|(p, q)| p * (p.ln() - q.ln()))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_couplings_drop_terms() {
        let model = LmgModel::new(3, 0.0, 0.0).unwrap();
        // only the three XX pairs survive
        assert_eq!(model.terms().terms().len(), 3);

        let model = LmgModel::new(3, 0.5, 0.2).unwrap();
        assert_eq!(model.terms().terms().len(), 3 + 3 + 3);
    }

    #[test]
    fn test_zero_spins_rejected() {
        assert!(matches!(
            LmgModel::new(0, 0.0, 1.0),
            Err(MhetsError::Configuration(_))
        ));
    }

    #[test]
    fn test_hamiltonian_is_hermitian() {
        for &(n, gy, b) in &[(1, 0.0, 0.3), (2, 0.6, 0.15), (3, 0.1, 0.0), (4, 0.0, 0.2)] {
            let model = LmgModel::new(n, gy, b).unwrap();
            let h = model.matrix();
            let diff = h - h.adjoint();
            assert!(diff.norm() < 1e-12, "H not Hermitian for N={}", n);
        }
    }

    #[test]
    fn test_ground_state_is_minimum_eigenvalue() {
        let model = LmgModel::new(3, 0.6, 0.15).unwrap();
        let (values, states) = model.eigenstates();
        assert_eq!(values.len(), 8);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));

        let (e0, psi0) = model.ground_state();
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        assert_relative_eq!(e0, min, epsilon = 1e-12);

        // <psi0|H|psi0> = e0
        let energy = (psi0.adjoint() * model.matrix() * &psi0)[(0, 0)];
        assert_relative_eq!(energy.re, e0, epsilon = 1e-10);
        assert_relative_eq!(states[0].norm(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_single_spin_field_only() {
        // H = -B Z: eigenvalues -B, +B
        let model = LmgModel::new(1, 0.0, 0.5).unwrap();
        let (values, _) = model.eigenstates();
        assert_relative_eq!(values[0], -0.5, epsilon = 1e-12);
        assert_relative_eq!(values[1], 0.5, epsilon = 1e-12);

        let beta = 2.0;
        let (z, rho) = model.thermalize(beta);
        assert_relative_eq!(z, (beta * 0.5f64).exp() + (-beta * 0.5f64).exp(), epsilon = 1e-10);
        assert_relative_eq!(rho.trace().re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(rho[(0, 0)].re, (beta * 0.5f64).exp() / z, epsilon = 1e-10);
    }

    #[test]
    fn test_free_energy_matches_log_partition_function() {
        // β⟨H⟩ - S = -ln Z at the thermal state
        let model = LmgModel::new(2, 0.3, 0.2).unwrap();
        for &beta in &[0.2, 1.0, 5.0] {
            let z = model.partition_function(beta);
            assert_relative_eq!(model.free_energy(beta), -z.ln(), epsilon = 1e-8);
        }
    }

    #[test]
    fn test_relative_entropy_of_identical_states_vanishes() {
        let model = LmgModel::new(2, 0.0, 0.1).unwrap();
        let rho = model.thermal_state(1.0);
        assert_relative_eq!(LmgModel::relative_entropy(&rho, &rho), 0.0, epsilon = 1e-12);
    }
}
