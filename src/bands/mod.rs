//! Credible bands over posterior draws.
//!
//! Responsibilities:
//!
//! - assemble and evaluate every draw (parallel)
//! - reduce the resulting curve matrix to 16/50/84 percentiles per bin

pub mod estimator;

pub use estimator::*;
