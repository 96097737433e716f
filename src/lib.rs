//! Rust MHETS - variational Gibbs-state search by Helmholtz energy minimization
//!
//! This crate prepares thermal states of the Lipkin-Meshkov-Glick model with
//! an ancilla + system ansatz, minimizing `β E - S` over a sweep of inverse
//! temperatures. Results are persisted per model and extended incrementally.

pub mod analysis;
pub mod ansatz;
pub mod cost;
pub mod density;
pub mod error;
pub mod evaluator;
pub mod io;
pub mod model;
pub mod optimize;
pub mod search;

// Re-export commonly used types at crate root
pub use analysis::{validate, ValidationRow};
pub use ansatz::{
    Ansatz, AnsatzCircuit, AnsatzConfig, AnsatzFamily, Circuit, Entanglement, Gate, Rotation,
};
pub use cost::{CostBreakdown, CostFunction, Trace};
pub use error::{MhetsError, Result};
pub use evaluator::{
    evaluator_for, Backend, EvaluationBudget, StateEvaluator, StatevectorEvaluator,
    TomographyEvaluator,
};
pub use io::{read_run_config, BetaGrid, JsonStore, OptimizationOptions, ResultStore, RunConfig};
pub use model::{LmgModel, ModelParameters};
pub use optimize::{OptimizeOutcome, Optimizer, OptimizerKind};
pub use search::{
    merge_betas, BetaSweep, MultiBetaResult, MultiStartResult, MultiStartSearch, OptimizationRecord,
    SweepOutcome, SweepReport, SweepState,
};
