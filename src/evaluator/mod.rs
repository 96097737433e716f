//! Evaluator module - joint-state estimation backends.

mod statevector;
mod tomography;
mod traits;

use std::sync::Arc;

pub use statevector::{exact_density, simulate, StatevectorEvaluator};
pub use tomography::TomographyEvaluator;
pub use traits::{Backend, EvaluationBudget, StateEvaluator};

/// Evaluator for a backend tag.
pub fn evaluator_for(backend: Backend) -> Arc<dyn StateEvaluator> {
    match backend {
        Backend::Statevector => Arc::new(StatevectorEvaluator),
        Backend::Tomography => Arc::new(TomographyEvaluator),
    }
}
