//! `lya-plot` library crate.
//!
//! Posterior plotting helpers for Lyman-alpha MCMC fits: mapping sampler draws
//! to full parameter vectors, 1-sigma credible bands of the model profile,
//! and the data behind walker, corner and profile figures.
//!
//! The binary (`lyaplot`) is a thin wrapper around this library so the core
//! logic is testable without spawning processes.

pub mod app;
pub mod bands;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod figures;
pub mod io;
pub mod math;
pub mod models;
pub mod params;
pub mod report;
