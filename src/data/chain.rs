//! Ensemble-sampler chains.
//!
//! A chain holds `walkers × steps × ndim` values, where `ndim` is the number of
//! free parameters. Plotting code needs two views of it:
//!
//! - per-walker traces (walker plots)
//! - a flat list of posterior draws (corner data, credible bands)

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::domain::PosteriorSample;
use crate::error::AppError;

/// Rectangular sampler output, stored walker-major then step.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    walkers: usize,
    steps: usize,
    ndim: usize,
    values: Vec<f64>,
}

/// On-disk chain layout: `chain[walker][step][param]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainFile {
    pub chain: Vec<Vec<Vec<f64>>>,
}

impl Chain {
    pub fn from_nested(nested: Vec<Vec<Vec<f64>>>) -> Result<Self, AppError> {
        let walkers = nested.len();
        let steps = nested.first().map(|w| w.len()).unwrap_or(0);
        let ndim = nested
            .first()
            .and_then(|w| w.first())
            .map(|s| s.len())
            .unwrap_or(0);
        if walkers == 0 || steps == 0 || ndim == 0 {
            return Err(AppError::invalid_input(format!(
                "Chain must be non-empty (walkers={walkers}, steps={steps}, ndim={ndim})."
            )));
        }

        let mut values = Vec::with_capacity(walkers * steps * ndim);
        for (w, walker) in nested.into_iter().enumerate() {
            if walker.len() != steps {
                return Err(AppError::invalid_input(format!(
                    "Walker {w} has {} steps, expected {steps}.",
                    walker.len()
                )));
            }
            for (s, step) in walker.into_iter().enumerate() {
                if step.len() != ndim {
                    return Err(AppError::invalid_input(format!(
                        "Walker {w} step {s} has {} values, expected {ndim}.",
                        step.len()
                    )));
                }
                values.extend(step);
            }
        }

        Ok(Self {
            walkers,
            steps,
            ndim,
            values,
        })
    }

    pub fn walkers(&self) -> usize {
        self.walkers
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of free parameters per position.
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn get(&self, walker: usize, step: usize, param: usize) -> f64 {
        self.values[(walker * self.steps + step) * self.ndim + param]
    }

    pub fn position(&self, walker: usize, step: usize) -> &[f64] {
        let start = (walker * self.steps + step) * self.ndim;
        &self.values[start..start + self.ndim]
    }

    /// Values of one parameter along one walker.
    pub fn trace(&self, walker: usize, param: usize) -> Vec<f64> {
        (0..self.steps).map(|s| self.get(walker, s, param)).collect()
    }

    /// Posterior draws after dropping `burn_in` steps and keeping every `thin`-th step.
    pub fn flatten(&self, burn_in: usize, thin: usize) -> Result<Vec<PosteriorSample>, AppError> {
        if thin == 0 {
            return Err(AppError::invalid_input("Thinning factor must be >= 1."));
        }
        if burn_in >= self.steps {
            return Err(AppError::InsufficientSamples);
        }
        let mut out = Vec::with_capacity(self.walkers * (self.steps - burn_in).div_ceil(thin));
        for w in 0..self.walkers {
            for s in (burn_in..self.steps).step_by(thin) {
                out.push(self.position(w, s).to_vec());
            }
        }
        Ok(out)
    }

    pub fn to_file(&self) -> ChainFile {
        let chain = (0..self.walkers)
            .map(|w| (0..self.steps).map(|s| self.position(w, s).to_vec()).collect())
            .collect();
        ChainFile { chain }
    }
}

impl TryFrom<ChainFile> for Chain {
    type Error = AppError;

    fn try_from(file: ChainFile) -> Result<Self, Self::Error> {
        Chain::from_nested(file.chain)
    }
}

/// Pick `n` distinct draws with a seeded RNG, preserving their original order.
///
/// Returns every draw when `n >= samples.len()`.
pub fn subsample(samples: &[PosteriorSample], n: usize, seed: u64) -> Vec<PosteriorSample> {
    if n >= samples.len() {
        return samples.to_vec();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = index::sample(&mut rng, samples.len(), n).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| samples[i].clone()).collect()
}
