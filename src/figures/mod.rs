//! Figure data for the three diagnostic plots.
//!
//! These builders return plain data (series, labels, histograms); drawing is
//! left to whatever plotting front-end consumes them.

pub mod corner;
pub mod profile;
pub mod walkers;

pub use corner::*;
pub use profile::*;
pub use walkers::*;
