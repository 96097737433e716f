//! Model module - physical Hamiltonians for thermal-state searches.

mod lmg;
mod pauli;

pub use lmg::{LmgModel, ModelParameters};
pub use pauli::{Pauli, PauliString, PauliSum};
