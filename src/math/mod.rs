//! Mathematical utilities: regression basis functions and damped least squares.

pub mod basis;
pub mod ols;

pub use basis::*;
pub use ols::*;
