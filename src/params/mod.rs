//! Mapping between sampler draws and full model parameter vectors.

pub mod assemble;

pub use assemble::*;
