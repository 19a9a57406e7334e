//! Sampler output handling and synthetic data.

pub mod chain;
pub mod synthetic;

pub use chain::{Chain, ChainFile, subsample};
pub use synthetic::{SyntheticChainConfig, generate_chain, synthetic_spectrum};
