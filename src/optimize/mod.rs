//! Optimize module - interchangeable cost minimizers.

mod lbfgs;
mod nelder_mead;
mod problem;
mod spsa;
mod traits;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MhetsError, Result};

pub use lbfgs::Lbfgs;
pub use nelder_mead::NelderMead;
pub use spsa::Spsa;
pub use traits::{OptimizeOutcome, Optimizer};

/// Optimizer selected by name in the run configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizerKind {
    NelderMead,
    #[serde(alias = "l-bfgs")]
    Lbfgs,
    Spsa,
}

impl OptimizerKind {
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerKind::NelderMead => "nelder-mead",
            OptimizerKind::Lbfgs => "lbfgs",
            OptimizerKind::Spsa => "spsa",
        }
    }

    /// Run the selected strategy. `seed` only affects SPSA.
    pub fn minimize<F>(
        &self,
        cost: F,
        initial: &[f64],
        max_iterations: usize,
        tolerance: f64,
        seed: Option<u64>,
    ) -> Result<OptimizeOutcome>
    where
        F: FnMut(&[f64]) -> Result<f64>,
    {
        match self {
            OptimizerKind::NelderMead => {
                NelderMead::new().minimize(cost, initial, max_iterations, tolerance)
            }
            OptimizerKind::Lbfgs => Lbfgs::new().minimize(cost, initial, max_iterations, tolerance),
            OptimizerKind::Spsa => {
                Spsa::new(seed).minimize(cost, initial, max_iterations, tolerance)
            }
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OptimizerKind {
    type Err = MhetsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "nelder-mead" | "neldermead" => Ok(OptimizerKind::NelderMead),
            "lbfgs" | "l-bfgs" => Ok(OptimizerKind::Lbfgs),
            "spsa" => Ok(OptimizerKind::Spsa),
            other => Err(MhetsError::Configuration(format!("unknown optimizer '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("Nelder-Mead".parse::<OptimizerKind>().unwrap(), OptimizerKind::NelderMead);
        assert_eq!("L_BFGS".parse::<OptimizerKind>().unwrap(), OptimizerKind::Lbfgs);
        assert_eq!("SPSA".parse::<OptimizerKind>().unwrap(), OptimizerKind::Spsa);
        assert!(matches!("cobyla".parse::<OptimizerKind>(), Err(MhetsError::Configuration(_))));
    }

    #[test]
    fn test_serde_names_match_display() {
        for kind in [OptimizerKind::NelderMead, OptimizerKind::Lbfgs, OptimizerKind::Spsa] {
            let yaml = serde_yaml::to_string(&kind).unwrap();
            assert_eq!(yaml.trim(), kind.name());
        }
    }

    #[test]
    fn test_strategies_share_contract() {
        for kind in [OptimizerKind::NelderMead, OptimizerKind::Lbfgs, OptimizerKind::Spsa] {
            let outcome = kind
                .minimize(|x: &[f64]| Ok((x[0] - 0.2).powi(2) + 1.0), &[1.0], 100, 1e-8, Some(1))
                .unwrap();
            assert!(outcome.cost < 1.5, "{} cost {}", kind, outcome.cost);
            assert!(outcome.n_evaluations > 0);
            assert_eq!(outcome.parameters.len(), 1);
        }
    }
}
