//! Synthetic chains and spectra for demos and tests.
//!
//! Everything here is seeded so a given config always yields the same data.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::chain::Chain;
use crate::domain::{FullParameterVector, SpectralGrid};
use crate::error::AppError;
use crate::math::linspace;

/// Gaussian walker ensemble around a centre point.
#[derive(Debug, Clone)]
pub struct SyntheticChainConfig {
    pub walkers: usize,
    pub steps: usize,
    pub seed: u64,
    /// Posterior centre, one entry per free parameter.
    pub center: Vec<f64>,
    /// Posterior standard deviation, one entry per free parameter.
    pub scatter: Vec<f64>,
    /// Initial offset of every walker from `center`, in units of `scatter`.
    /// It decays geometrically, so early steps look like burn-in.
    pub start_offset: f64,
}

/// Generate an ensemble chain.
///
/// Each walker follows `x_s = center + offset · 0.9^s + scatter · ε`,
/// `ε ~ N(0, 1)`, which gives a visible burn-in followed by a stationary cloud.
pub fn generate_chain(config: &SyntheticChainConfig) -> Result<Chain, AppError> {
    if config.walkers == 0 || config.steps == 0 {
        return Err(AppError::invalid_input("Synthetic chain needs walkers > 0 and steps > 0."));
    }
    if config.center.is_empty() || config.center.len() != config.scatter.len() {
        return Err(AppError::invalid_input(format!(
            "Centre and scatter must be non-empty and equal length (got {} and {}).",
            config.center.len(),
            config.scatter.len()
        )));
    }
    if config.scatter.iter().any(|s| !s.is_finite() || *s < 0.0) {
        return Err(AppError::invalid_input("Scatter values must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::<f64>::new(0.0, 1.0)
        .map_err(|e| AppError::invalid_input(format!("Noise distribution error: {e}")))?;

    let ndim = config.center.len();
    let mut nested = Vec::with_capacity(config.walkers);
    for _ in 0..config.walkers {
        let direction: Vec<f64> = (0..ndim).map(|_| normal.sample(&mut rng).signum()).collect();
        let mut walker = Vec::with_capacity(config.steps);
        let mut decay = 1.0;
        for _ in 0..config.steps {
            let position = (0..ndim)
                .map(|p| {
                    let offset = direction[p] * config.start_offset * config.scatter[p] * decay;
                    config.center[p] + offset + config.scatter[p] * normal.sample(&mut rng)
                })
                .collect();
            walker.push(position);
            decay *= 0.9;
        }
        nested.push(walker);
    }

    Chain::from_nested(nested)
}

/// Observed spectrum: `model(truth)` on an evenly spaced grid plus Gaussian noise.
///
/// `noise_fraction` sets the per-bin error as a fraction of the model peak.
pub fn synthetic_spectrum<F>(
    model: F,
    truth: &FullParameterVector,
    wavelength_range: (f64, f64),
    bins: usize,
    resolution: f64,
    noise_fraction: f64,
    seed: u64,
) -> Result<SpectralGrid, AppError>
where
    F: Fn(&FullParameterVector, &SpectralGrid) -> Result<Vec<f64>, AppError>,
{
    if bins < 2 {
        return Err(AppError::invalid_input("Synthetic spectrum needs at least 2 bins."));
    }
    let wavelength = linspace(wavelength_range.0, wavelength_range.1, bins);
    let placeholder = SpectralGrid::new(wavelength, vec![0.0; bins], vec![0.0; bins], resolution)?;
    let clean = model(truth, &placeholder)?;

    let peak = clean.iter().copied().fold(0.0_f64, f64::max);
    let sigma = (peak * noise_fraction.max(0.0)).max(f64::MIN_POSITIVE);
    let normal = Normal::new(0.0, sigma)
        .map_err(|e| AppError::invalid_input(format!("Noise distribution error: {e}")))?;
    let mut rng = StdRng::seed_from_u64(seed);

    let flux = clean.iter().map(|f| f + normal.sample(&mut rng)).collect();
    SpectralGrid::new(placeholder.wavelength, flux, vec![sigma; bins], resolution)
}
