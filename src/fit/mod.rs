//! Forecast fitting orchestration.
//!
//! Responsibilities:
//!
//! - infer the sampling frequency of the input series
//! - fit each candidate seasonal structure (parallel)
//! - select the best structure using BIC + guardrails
//! - evaluate the fitted model over history plus the future horizon

pub mod fitter;
pub mod frequency;
pub mod horizon;
pub mod selection;

pub use fitter::*;
pub use frequency::*;
pub use horizon::*;
pub use selection::*;
