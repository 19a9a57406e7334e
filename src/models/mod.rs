//! Profile model implementations.
//!
//! The band estimator only needs a closure `(FullParameterVector, SpectralGrid) -> flux`;
//! this module provides a reference Lyman-alpha evaluator to plug in.

pub mod lya;

pub use lya::*;
