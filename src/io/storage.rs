//! JSON persistence of sweep results.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MhetsError, Result};
use crate::evaluator::{Backend, EvaluationBudget};
use crate::model::ModelParameters;
use crate::search::MultiBetaResult;

/// Storage for one model/backend combination: the merged sweep result plus
/// one result per multi-start index.
pub trait ResultStore {
    /// Load the stored result, or `StorageNotFound`.
    fn load(&self) -> Result<MultiBetaResult>;

    fn save(&self, result: &MultiBetaResult) -> Result<()>;

    /// Load the result of start `index`, or `StorageNotFound`.
    fn load_run(&self, index: usize) -> Result<MultiBetaResult>;

    fn save_run(&self, index: usize, result: &MultiBetaResult) -> Result<()>;
}

fn compact(value: f64) -> String {
    value.to_string().replace('.', "")
}

/// File stem `MHETS_{N}at_gy{γ}_B{B}`, with a shots suffix for sampled
/// tomography runs.
pub fn file_stem(model: &ModelParameters, backend: Backend, budget: EvaluationBudget) -> String {
    let mut stem = format!("MHETS_{}at_gy{}_B{}", model.n, compact(model.gy), compact(model.b));
    if let (Backend::Tomography, EvaluationBudget::Sampled(shots)) = (backend, budget) {
        stem.push_str(&format!("_tomography_shots{}", shots));
    }
    stem
}

/// One JSON file per result under `dir`.
#[derive(Clone, Debug)]
pub struct JsonStore {
    dir: PathBuf,
    stem: String,
}

impl JsonStore {
    pub fn new<P: AsRef<Path>>(dir: P, stem: impl Into<String>) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), stem: stem.into() }
    }

    pub fn for_model<P: AsRef<Path>>(
        dir: P,
        model: &ModelParameters,
        backend: Backend,
        budget: EvaluationBudget,
    ) -> Self {
        Self::new(dir, file_stem(model, backend, budget))
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.stem))
    }

    pub fn run_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}_run{}.json", self.stem, index))
    }

    fn read(path: &Path) -> Result<MultiBetaResult> {
        if !path.exists() {
            return Err(MhetsError::StorageNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let result: MultiBetaResult = serde_json::from_str(&text)?;
        result.validate()?;
        debug!("Loaded {} betas from {}", result.len(), path.display());
        Ok(result)
    }

    fn write(&self, path: &Path, result: &MultiBetaResult) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let text = serde_json::to_string_pretty(result)?;
        fs::write(path, text)?;
        debug!("Wrote {} betas to {}", result.len(), path.display());
        Ok(())
    }
}

impl ResultStore for JsonStore {
    fn load(&self) -> Result<MultiBetaResult> {
        Self::read(&self.path())
    }

    fn save(&self, result: &MultiBetaResult) -> Result<()> {
        self.write(&self.path(), result)
    }

    fn load_run(&self, index: usize) -> Result<MultiBetaResult> {
        Self::read(&self.run_path(index))
    }

    fn save_run(&self, index: usize, result: &MultiBetaResult) -> Result<()> {
        self.write(&self.run_path(index), result)
    }
}
