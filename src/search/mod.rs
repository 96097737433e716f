//! Search module - per-beta optimization, multi-start search and the beta
//! sweep controller.

mod merge;
mod multistart;
mod records;
mod run;
mod sweep;

pub use merge::{merge_betas, sorted_betas};
pub use multistart::{select_best, MultiStartSearch};
pub use records::{MultiBetaResult, MultiStartResult, OptimizationRecord};
pub use run::{optimize_beta, RunSettings};
pub use sweep::{BetaSweep, SweepOutcome, SweepReport, SweepState};
