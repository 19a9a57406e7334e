//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - parameter configuration (`ParameterSpec`, `ParameterSet`, `LyaParameter`, `ProfileConfig`)
//! - sampler draws and assembled vectors (`PosteriorSample`, `FullParameterVector`)
//! - observed data and derived bands (`SpectralGrid`, `CredibleBand`)
//! - the run configuration built from CLI flags (`RunConfig`)

pub mod types;

pub use types::*;
