//! Exact statevector evaluation of preparation circuits.

use nalgebra::DVector;
use num_complex::Complex64;
use rand::rngs::StdRng;

use super::traits::{Backend, EvaluationBudget, StateEvaluator};
use crate::ansatz::{Circuit, Gate};
use crate::density::DensityMatrix;
use crate::error::{MhetsError, Result};

type Gate1 = [[Complex64; 2]; 2];

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

fn rx(theta: f64) -> Gate1 {
    let (s, co) = (theta / 2.0).sin_cos();
    [[c(co, 0.0), c(0.0, -s)], [c(0.0, -s), c(co, 0.0)]]
}

fn ry(theta: f64) -> Gate1 {
    let (s, co) = (theta / 2.0).sin_cos();
    [[c(co, 0.0), c(-s, 0.0)], [c(s, 0.0), c(co, 0.0)]]
}

fn rz(theta: f64) -> Gate1 {
    let (s, co) = (theta / 2.0).sin_cos();
    [[c(co, -s), c(0.0, 0.0)], [c(0.0, 0.0), c(co, s)]]
}

/// RXY on (first, second); index of the 4x4 block is `b_first + 2 b_second`.
fn rxy(theta: f64) -> [[f64; 4]; 4] {
    let (s, co) = (theta / 2.0).sin_cos();
    [
        [co, 0.0, 0.0, -s],
        [0.0, co, -s, 0.0],
        [0.0, s, co, 0.0],
        [s, 0.0, 0.0, co],
    ]
}

fn ryx(theta: f64) -> [[f64; 4]; 4] {
    let (s, co) = (theta / 2.0).sin_cos();
    [
        [co, 0.0, 0.0, -s],
        [0.0, co, s, 0.0],
        [0.0, -s, co, 0.0],
        [s, 0.0, 0.0, co],
    ]
}

fn apply_single(state: &mut [Complex64], qubit: usize, m: &Gate1) {
    let mask = 1usize << qubit;
    for i in 0..state.len() {
        if i & mask == 0 {
            let j = i | mask;
            let (a, b) = (state[i], state[j]);
            state[i] = m[0][0] * a + m[0][1] * b;
            state[j] = m[1][0] * a + m[1][1] * b;
        }
    }
}

fn apply_cx(state: &mut [Complex64], control: usize, target: usize) {
    let (cm, tm) = (1usize << control, 1usize << target);
    for i in 0..state.len() {
        if i & cm != 0 && i & tm == 0 {
            state.swap(i, i | tm);
        }
    }
}

fn apply_two(state: &mut [Complex64], first: usize, second: usize, m: &[[f64; 4]; 4]) {
    let (fm, sm) = (1usize << first, 1usize << second);
    for i in 0..state.len() {
        if i & fm == 0 && i & sm == 0 {
            let idx = [i, i | fm, i | sm, i | fm | sm];
            let amps = idx.map(|k| state[k]);
            for (r, &k) in idx.iter().enumerate() {
                state[k] = (0..4).map(|col| amps[col] * m[r][col]).sum();
            }
        }
    }
}

/// Run `circuit` on `|0...0>` and return the final statevector.
pub fn simulate(circuit: &Circuit) -> DVector<Complex64> {
    let dim = 1usize << circuit.num_qubits();
    let mut state = vec![c(0.0, 0.0); dim];
    state[0] = c(1.0, 0.0);

    for gate in circuit.gates() {
        match *gate {
            Gate::Rx { qubit, theta } => apply_single(&mut state, qubit, &rx(theta)),
            Gate::Ry { qubit, theta } => apply_single(&mut state, qubit, &ry(theta)),
            Gate::Rz { qubit, theta } => apply_single(&mut state, qubit, &rz(theta)),
            Gate::Cx { control, target } => apply_cx(&mut state, control, target),
            Gate::Rxy { first, second, theta } => apply_two(&mut state, first, second, &rxy(theta)),
            Gate::Ryx { first, second, theta } => apply_two(&mut state, first, second, &ryx(theta)),
        }
    }
    DVector::from_vec(state)
}

/// Exact density matrix `|ψ><ψ|` of a circuit's output.
pub fn exact_density(circuit: &Circuit) -> DensityMatrix {
    let psi = simulate(circuit);
    &psi * psi.adjoint()
}

/// Closed-form evaluator. Has no sampling resource, so a `Sampled` budget is
/// a configuration error.
#[derive(Copy, Clone, Debug, Default)]
pub struct StatevectorEvaluator;

impl StateEvaluator for StatevectorEvaluator {
    fn backend(&self) -> Backend {
        Backend::Statevector
    }

    fn supports(&self, budget: EvaluationBudget) -> bool {
        budget == EvaluationBudget::Exact
    }

    fn evaluate(
        &self,
        preparation: &Circuit,
        budget: EvaluationBudget,
        _rng: &mut StdRng,
    ) -> Result<DensityMatrix> {
        if !self.supports(budget) {
            return Err(MhetsError::Configuration(format!(
                "statevector backend cannot serve a {:?} budget; configure the tomography backend",
                budget
            )));
        }
        Ok(exact_density(preparation))
    }
}
