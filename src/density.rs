//! Density-matrix helpers shared by the cost function, the model and the
//! offline analysis.
//!
//! Qubit `k` is bit `k` of a computational-basis index, so the low qubits of
//! a joint register form the fast-varying part of the index.

use nalgebra::DMatrix;
use num_complex::Complex64;

/// Dense complex density operator.
pub type DensityMatrix = DMatrix<Complex64>;

/// Shannon entropy (natural log) of a probability distribution.
///
/// Outcomes with zero (or estimator-negative) probability contribute nothing,
/// so the logarithm is never taken at zero.
pub fn shannon_entropy(probabilities: &[f64]) -> f64 {
    probabilities
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.ln())
        .sum()
}

/// Marginal distribution over the lowest `n_low` qubits of `rho`.
pub fn marginal_probabilities(rho: &DensityMatrix, n_low: usize) -> Vec<f64> {
    let dim_low = 1usize << n_low;
    let dim_high = rho.nrows() / dim_low;
    (0..dim_low)
        .map(|a| {
            (0..dim_high)
                .map(|s| rho[(a + dim_low * s, a + dim_low * s)].re)
                .sum::<f64>()
        })
        .collect()
}

/// Trace out the lowest `n_low` qubits, keeping the high register.
pub fn trace_out_low(rho: &DensityMatrix, n_low: usize) -> DensityMatrix {
    let dim_low = 1usize << n_low;
    let dim_high = rho.nrows() / dim_low;
    DMatrix::from_fn(dim_high, dim_high, |s, t| {
        (0..dim_low)
            .map(|a| rho[(a + dim_low * s, a + dim_low * t)])
            .sum::<Complex64>()
    })
}

/// Eigenvalues and eigenvectors of a Hermitian matrix, ascending.
pub fn hermitian_eigen(op: &DensityMatrix) -> (Vec<f64>, DensityMatrix) {
    let eig = op.clone().symmetric_eigen();
    let mut order: Vec<usize> = (0..eig.eigenvalues.len()).collect();
    order.sort_by(|&i, &j| eig.eigenvalues[i].total_cmp(&eig.eigenvalues[j]));

    let values = order.iter().map(|&i| eig.eigenvalues[i]).collect();
    let vectors = DMatrix::from_fn(op.nrows(), order.len(), |r, c| {
        eig.eigenvectors[(r, order[c])]
    });
    (values, vectors)
}

/// Von Neumann entropy `-Tr ρ ln ρ`.
pub fn von_neumann_entropy(rho: &DensityMatrix) -> f64 {
    let (values, _) = hermitian_eigen(rho);
    shannon_entropy(&values)
}

/// Principal square root of a positive semidefinite Hermitian matrix.
/// Negative eigenvalues from round-off are clamped to zero.
pub fn sqrt_psd(op: &DensityMatrix) -> DensityMatrix {
    let (values, vectors) = hermitian_eigen(op);
    let mut scaled = vectors.clone();
    for (c, &v) in values.iter().enumerate() {
        let root = v.max(0.0).sqrt();
        for r in 0..scaled.nrows() {
            scaled[(r, c)] *= root;
        }
    }
    &scaled * vectors.adjoint()
}

/// Uhlmann fidelity `(Tr √(√ρ σ √ρ))²`.
pub fn fidelity(rho: &DensityMatrix, sigma: &DensityMatrix) -> f64 {
    let root = sqrt_psd(rho);
    let inner = &root * sigma * &root;
    let (values, _) = hermitian_eigen(&inner);
    let trace: f64 = values.iter().map(|v| v.max(0.0).sqrt()).sum();
    trace * trace
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn diag(values: &[f64]) -> DensityMatrix {
        DMatrix::from_fn(values.len(), values.len(), |r, c| {
            if r == c {
                Complex64::new(values[r], 0.0)
            } else {
                Complex64::new(0.0, 0.0)
            }
        })
    }

    #[test]
    fn test_entropy_with_zero_outcomes_is_finite() {
        let s = shannon_entropy(&[0.5, 0.0, 0.5, 0.0]);
        assert!(s.is_finite());
        assert_relative_eq!(s, 2f64.ln(), epsilon = 1e-12);

        assert_eq!(shannon_entropy(&[1.0, 0.0]), 0.0);
        assert!(shannon_entropy(&[0.0, 0.0, -1e-17, 1.0]).is_finite());
    }

    #[test]
    fn test_marginal_and_partial_trace() {
        // |ancilla=1, system=0> on one ancilla and one system qubit: index 1
        let rho = diag(&[0.0, 0.7, 0.3, 0.0]);
        let p = marginal_probabilities(&rho, 1);
        assert_relative_eq!(p[0], 0.3, epsilon = 1e-12);
        assert_relative_eq!(p[1], 0.7, epsilon = 1e-12);

        let rho_s = trace_out_low(&rho, 1);
        assert_eq!(rho_s.nrows(), 2);
        assert_relative_eq!(rho_s[(0, 0)].re, 0.7, epsilon = 1e-12);
        assert_relative_eq!(rho_s[(1, 1)].re, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_eigen_sorted_ascending() {
        let (values, _) = hermitian_eigen(&diag(&[3.0, -1.0, 2.0]));
        assert_eq!(values.len(), 3);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_relative_eq!(values[0], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fidelity_of_identical_states_is_one() {
        let rho = diag(&[0.25, 0.25, 0.5, 0.0]);
        assert_relative_eq!(fidelity(&rho, &rho), 1.0, epsilon = 1e-8);

        let orthogonal = diag(&[0.0, 0.0, 0.0, 1.0]);
        assert_relative_eq!(fidelity(&rho, &orthogonal), 0.0, epsilon = 1e-8);
    }
}
