//! Input/output: CSV ingest and CSV export.

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
