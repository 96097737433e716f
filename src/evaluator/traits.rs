//! Traits for joint-state evaluation backends.

use std::fmt;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::ansatz::Circuit;
use crate::density::DensityMatrix;
use crate::error::Result;

/// How much effort an evaluation may spend.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EvaluationBudget {
    /// Closed-form density matrix
    Exact,
    /// Estimate from this many repeated samples per measurement setting
    Sampled(usize),
}

impl EvaluationBudget {
    /// `None` shots means exact evaluation.
    pub fn from_shots(shots: Option<usize>) -> Self {
        match shots {
            Some(n) => EvaluationBudget::Sampled(n),
            None => EvaluationBudget::Exact,
        }
    }

    pub fn shots(&self) -> Option<usize> {
        match *self {
            EvaluationBudget::Exact => None,
            EvaluationBudget::Sampled(n) => Some(n),
        }
    }
}

/// Identity tag of an evaluation backend, stored alongside results.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Statevector,
    Tomography,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Statevector => write!(f, "statevector"),
            Backend::Tomography => write!(f, "tomography"),
        }
    }
}

/// Produces a density-matrix estimate for a preparation circuit.
///
/// Sampled estimates are noisy; callers must not assume exact equality
/// between repeated evaluations. Evaluators hold no sampling state: the
/// caller passes the generator of its own run, so concurrent runs never
/// share one.
pub trait StateEvaluator: Send + Sync {
    fn backend(&self) -> Backend;

    /// Whether this evaluator can honour `budget`.
    fn supports(&self, budget: EvaluationBudget) -> bool;

    fn evaluate(
        &self,
        preparation: &Circuit,
        budget: EvaluationBudget,
        rng: &mut StdRng,
    ) -> Result<DensityMatrix>;
}
