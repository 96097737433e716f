//! YAML run configuration.
//!
//! Example:
//!
//! ```yaml
//! model: { n: 2, gy: 0.0, b: 0.2 }
//! betas: { first: 0.2, last: 5.0, points: 4 }
//! backend: statevector
//! options:
//!   ancilla_ansatz: { family: two_local, reps: 1, entanglement: linear }
//!   system_ansatz: { family: two_local, reps: 2, entanglement: linear }
//!   optimizer: nelder-mead
//!   maxiter: 1000
//!   tol: 1.0e-6
//!   n_starts: 1
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ansatz::{AnsatzConfig, Entanglement};
use crate::error::{MhetsError, Result};
use crate::evaluator::{Backend, EvaluationBudget};
use crate::model::ModelParameters;
use crate::optimize::OptimizerKind;

fn default_true() -> bool {
    true
}

fn default_n_starts() -> usize {
    1
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./MHETS_data")
}

/// Complete set of options needed to reproduce a sweep. Stored verbatim
/// with every result file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOptions {
    pub ancilla_ansatz: AnsatzConfig,
    pub system_ansatz: AnsatzConfig,
    pub optimizer: OptimizerKind,
    pub maxiter: usize,
    pub tol: f64,
    /// Samples per measurement setting; absent means exact evaluation
    #[serde(default)]
    pub shots: Option<usize>,
    /// Warm-start each beta from the previous beta's optimum
    #[serde(default = "default_true")]
    pub continuation: bool,
    /// Starting points per beta; 1 disables multi-start
    #[serde(default = "default_n_starts")]
    pub n_starts: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Baseline starting vector; zeros when absent or of the wrong length
    #[serde(default)]
    pub initial_parameters: Option<Vec<f64>>,
    /// Re-optimize betas that are already stored
    #[serde(default)]
    pub force: bool,
    /// Keep the per-evaluation cost trace in the results
    #[serde(default = "default_true")]
    pub record_trace: bool,
}

impl Default for OptimizationOptions {
    fn default() -> Self {
        Self {
            ancilla_ansatz: AnsatzConfig::two_local(1, Entanglement::Linear),
            system_ansatz: AnsatzConfig::two_local(2, Entanglement::Linear),
            optimizer: OptimizerKind::NelderMead,
            maxiter: 1000,
            tol: 1e-6,
            shots: None,
            continuation: true,
            n_starts: 1,
            seed: None,
            initial_parameters: None,
            force: false,
            record_trace: true,
        }
    }
}

impl OptimizationOptions {
    pub fn budget(&self) -> EvaluationBudget {
        EvaluationBudget::from_shots(self.shots)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_starts == 0 {
            return Err(MhetsError::Configuration("n_starts must be at least 1".to_string()));
        }
        if self.shots == Some(0) {
            return Err(MhetsError::Configuration("shots must be positive".to_string()));
        }
        if !(self.tol >= 0.0) {
            return Err(MhetsError::Configuration(format!("invalid tolerance {}", self.tol)));
        }
        Ok(())
    }
}

/// Inverse temperatures to sweep: an explicit list or an evenly spaced grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BetaGrid {
    List(Vec<f64>),
    Linspace { first: f64, last: f64, points: usize },
}

impl BetaGrid {
    pub fn values(&self) -> Vec<f64> {
        match *self {
            BetaGrid::List(ref betas) => betas.clone(),
            BetaGrid::Linspace { first, last, points } => match points {
                0 => Vec::new(),
                1 => vec![first],
                _ => {
                    let step = (last - first) / (points - 1) as f64;
                    let mut betas: Vec<f64> =
                        (0..points).map(|i| first + step * i as f64).collect();
                    // Exact endpoint, so it matches a stored `last` under exact-equality merge
                    betas[points - 1] = last;
                    betas
                }
            },
        }
    }
}

/// Top-level run file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub model: ModelParameters,
    pub betas: BetaGrid,
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub options: OptimizationOptions,
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
}

/// Read a run configuration from a YAML file.
pub fn read_run_config<P: AsRef<Path>>(filename: P) -> Result<RunConfig> {
    let file = std::fs::File::open(filename.as_ref())?;
    let reader = std::io::BufReader::new(file);
    let config: RunConfig = serde_yaml::from_reader(reader)?;
    config.options.validate()?;
    Ok(config)
}
