//! Ansatz module - parameterized state preparations and their gate lists.

mod circuit;
mod family;
mod parity;
mod traits;
mod two_local;

pub use circuit::{Circuit, Entanglement, Gate, Rotation};
pub use family::{AnsatzCircuit, AnsatzConfig, AnsatzFamily};
pub use parity::ParityPreserving;
pub use traits::Ansatz;
pub use two_local::TwoLocal;
