//! Posterior credible bands.
//!
//! Given posterior draws and a model evaluator:
//!
//! 1. assemble each draw into a full parameter vector and evaluate the model
//!    over the wavelength grid (parallel; draws are exchangeable)
//! 2. stack the curves into a `draws × bins` matrix
//! 3. take the 16th/50th/84th percentile down each column
//!
//! Percentiles use linear interpolation between order statistics
//! (see `math::percentile`).

use log::debug;
use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::domain::{CredibleBand, FullParameterVector, ParameterSet, SpectralGrid};
use crate::error::AppError;
use crate::math::sigma_interval_mut;
use crate::params::assemble;

/// Evaluate the model for every draw and reduce to a per-bin credible band.
///
/// Errors from `evaluate` are returned untouched; the estimator's own
/// failures are converted into the caller's error type.
pub fn estimate_bands<F, E>(
    samples: &[Vec<f64>],
    set: &ParameterSet,
    grid: &SpectralGrid,
    evaluate: F,
) -> Result<CredibleBand, E>
where
    F: Fn(&FullParameterVector, &SpectralGrid) -> Result<Vec<f64>, E> + Sync,
    E: From<AppError> + Send,
{
    let curves = evaluate_draws(samples, set, grid, evaluate)?;
    let band = band_from_curves(&curves)?;
    debug!(
        "Credible band over {} draws x {} bins",
        curves.nrows(),
        curves.ncols()
    );
    Ok(band)
}

/// Model curves for every draw, one row per draw.
pub fn evaluate_draws<F, E>(
    samples: &[Vec<f64>],
    set: &ParameterSet,
    grid: &SpectralGrid,
    evaluate: F,
) -> Result<DMatrix<f64>, E>
where
    F: Fn(&FullParameterVector, &SpectralGrid) -> Result<Vec<f64>, E> + Sync,
    E: From<AppError> + Send,
{
    if samples.is_empty() {
        return Err(AppError::InsufficientSamples.into());
    }

    let n_bins = grid.len();
    let rows: Vec<Vec<f64>> = samples
        .par_iter()
        .enumerate()
        .map(|(draw, sample)| -> Result<Vec<f64>, E> {
            let full = assemble(set, sample)?;
            let curve = evaluate(&full, grid)?;
            if curve.len() != n_bins {
                return Err(AppError::CurveLength {
                    draw,
                    expected: n_bins,
                    actual: curve.len(),
                }
                .into());
            }
            Ok(curve)
        })
        .collect::<Result<_, _>>()?;

    Ok(DMatrix::from_fn(rows.len(), n_bins, |i, j| rows[i][j]))
}

/// Reduce a `draws × bins` matrix to per-bin 16/50/84 percentiles.
pub fn band_from_curves(curves: &DMatrix<f64>) -> Result<CredibleBand, AppError> {
    if curves.nrows() == 0 {
        return Err(AppError::InsufficientSamples);
    }

    let n_bins = curves.ncols();
    let mut low = Vec::with_capacity(n_bins);
    let mut mid = Vec::with_capacity(n_bins);
    let mut high = Vec::with_capacity(n_bins);

    let mut column = vec![0.0; curves.nrows()];
    for j in 0..n_bins {
        column
            .iter_mut()
            .zip(curves.column(j).iter())
            .for_each(|(dst, &v)| *dst = v);
        let [l, m, h] = sigma_interval_mut(&mut column).ok_or(AppError::InsufficientSamples)?;
        low.push(l);
        mid.push(m);
        high.push(h);
    }

    Ok(CredibleBand { low, mid, high })
}
