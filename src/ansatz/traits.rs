//! Ansatz capability shared by every preparation family.

use super::circuit::Circuit;
use crate::error::Result;

/// A parameterized state preparation on a fixed number of qubits.
///
/// The optimizer sees only a flat parameter vector; `build` turns the
/// currently bound vector into a gate list.
pub trait Ansatz {
    /// Width of the register the ansatz prepares.
    fn num_qubits(&self) -> usize;

    /// Number of variational parameters.
    fn parameter_count(&self) -> usize;

    /// Currently bound parameter values.
    fn parameters(&self) -> &[f64];

    /// Rebind the parameters. Fails with `DimensionMismatch` when the length
    /// differs from `parameter_count()`.
    fn bind(&mut self, parameters: &[f64]) -> Result<()>;

    /// Gate list for the bound parameters, on qubits `0..num_qubits()`.
    fn build(&self) -> Circuit;
}

/// Length check shared by the `bind` implementations.
pub(crate) fn check_parameter_len(family: &str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(crate::error::MhetsError::DimensionMismatch(format!(
            "{} ansatz expects {} parameters, got {}",
            family, expected, got
        )));
    }
    Ok(())
}
