//! IO module - run configuration and result storage.

mod config;
mod storage;

pub use config::{read_run_config, BetaGrid, OptimizationOptions, RunConfig};
pub use storage::{file_stem, JsonStore, ResultStore};
