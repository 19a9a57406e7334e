//! Input/output helpers.
//!
//! - spectrum CSV, config JSON and chain JSON loading (`ingest`)
//! - profile/trace CSV exports (`export`)
//! - band JSON read/write (`band`)

pub mod band;
pub mod export;
pub mod ingest;

pub use band::*;
pub use export::*;
pub use ingest::*;
