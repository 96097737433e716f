//! Tag-selected ansatz families and their configuration.

use serde::{Deserialize, Serialize};

use super::circuit::{Circuit, Entanglement, Rotation};
use super::parity::ParityPreserving;
use super::traits::Ansatz;
use super::two_local::TwoLocal;
use crate::error::Result;

/// Ansatz family tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnsatzFamily {
    TwoLocal,
    #[serde(alias = "pma")]
    Parity,
}

fn default_rotation_blocks() -> Vec<Rotation> {
    vec![Rotation::Ry]
}

fn default_reps() -> usize {
    1
}

/// Everything needed to rebuild an ansatz for a given register width.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnsatzConfig {
    pub family: AnsatzFamily,
    #[serde(default = "default_reps")]
    pub reps: usize,
    #[serde(default)]
    pub entanglement: Entanglement,
    /// Only used by `two_local`
    #[serde(default = "default_rotation_blocks")]
    pub rotation_blocks: Vec<Rotation>,
}

impl AnsatzConfig {
    pub fn two_local(reps: usize, entanglement: Entanglement) -> Self {
        Self {
            family: AnsatzFamily::TwoLocal,
            reps,
            entanglement,
            rotation_blocks: default_rotation_blocks(),
        }
    }

    pub fn parity(reps: usize, entanglement: Entanglement) -> Self {
        Self {
            family: AnsatzFamily::Parity,
            reps,
            entanglement,
            rotation_blocks: default_rotation_blocks(),
        }
    }

    pub fn build(&self, num_qubits: usize) -> AnsatzCircuit {
        match self.family {
            AnsatzFamily::TwoLocal => AnsatzCircuit::TwoLocal(TwoLocal::new(
                num_qubits,
                self.rotation_blocks.clone(),
                self.entanglement,
                self.reps,
            )),
            AnsatzFamily::Parity => AnsatzCircuit::Parity(ParityPreserving::new(
                num_qubits,
                self.entanglement,
                self.reps,
            )),
        }
    }
}

/// One of the supported ansatz families, dispatched by tag.
#[derive(Clone, Debug, PartialEq)]
pub enum AnsatzCircuit {
    TwoLocal(TwoLocal),
    Parity(ParityPreserving),
}

impl AnsatzCircuit {
    pub fn family(&self) -> AnsatzFamily {
        match self {
            AnsatzCircuit::TwoLocal(_) => AnsatzFamily::TwoLocal,
            AnsatzCircuit::Parity(_) => AnsatzFamily::Parity,
        }
    }

    fn inner(&self) -> &dyn Ansatz {
        match self {
            AnsatzCircuit::TwoLocal(a) => a,
            AnsatzCircuit::Parity(a) => a,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Ansatz {
        match self {
            AnsatzCircuit::TwoLocal(a) => a,
            AnsatzCircuit::Parity(a) => a,
        }
    }
}

impl Ansatz for AnsatzCircuit {
    fn num_qubits(&self) -> usize {
        self.inner().num_qubits()
    }

    fn parameter_count(&self) -> usize {
        self.inner().parameter_count()
    }

    fn parameters(&self) -> &[f64] {
        self.inner().parameters()
    }

    fn bind(&mut self, parameters: &[f64]) -> Result<()> {
        self.inner_mut().bind(parameters)
    }

    fn build(&self) -> Circuit {
        self.inner().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_yaml_defaults() {
        let cfg: AnsatzConfig = serde_yaml::from_str("family: two_local\nreps: 2\n").unwrap();
        assert_eq!(cfg.family, AnsatzFamily::TwoLocal);
        assert_eq!(cfg.entanglement, Entanglement::Linear);
        assert_eq!(cfg.rotation_blocks, vec![Rotation::Ry]);
        assert_eq!(cfg.build(3).parameter_count(), 9);
    }

    #[test]
    fn test_families_share_contract() {
        for cfg in [
            AnsatzConfig::two_local(1, Entanglement::Linear),
            AnsatzConfig::parity(1, Entanglement::Full),
        ] {
            let mut a = cfg.build(3);
            assert_eq!(a.family(), cfg.family);
            assert_eq!(a.num_qubits(), 3);
            let params: Vec<f64> = (0..a.parameter_count()).map(|i| i as f64 * 0.1).collect();
            a.bind(&params).unwrap();
            assert_eq!(a.parameters(), params.as_slice());
            assert!(!a.build().is_empty());
            assert!(a.bind(&[]).is_err());
        }
    }
}
