//! Propagation of measurement uncertainty through a chain of arithmetic
//! operations, with results rounded to the significant figures the
//! uncertainty supports.

mod chain;
mod element;
mod error;
mod operation;
mod pair;
pub mod rounding;
pub mod sigfigs;

pub use chain::{DEFAULT_CAPACITY, UncertaintyChain};
pub use element::UncertaintyElement;
pub use error::UasfError;
pub use operation::OperationKind;
pub use pair::NumberPair;
pub use rounding::simplify;
