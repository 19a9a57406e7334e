//! Numerical utilities: percentiles, evenly spaced grids, interpolation, histograms.

pub mod grid;
pub mod histogram;
pub mod percentile;

pub use grid::*;
pub use histogram::*;
pub use percentile::*;
