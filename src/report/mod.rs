//! Reporting utilities: posterior summaries, fit quality, and formatted output.

pub mod format;

pub use format::*;

use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{FullParameterVector, ParameterSet, PosteriorSample, SpectralGrid};
use crate::error::AppError;
use crate::math::{median, sigma_interval_mut};
use crate::params::assemble;

/// Median and asymmetric 1-sigma errors of one free parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSummary {
    pub name: String,
    pub label: String,
    pub median: f64,
    /// `p84 - p50`
    pub plus: f64,
    /// `p50 - p16`
    pub minus: f64,
}

/// Chi-square of a model against the observed spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitQuality {
    pub chi2: f64,
    pub dof: usize,
    pub chi2_nu: f64,
    /// Bins that entered the sum.
    pub n_used: usize,
}

/// Per-parameter median of the draws.
pub fn posterior_median(samples: &[PosteriorSample]) -> Result<Vec<f64>, AppError> {
    let Some(first) = samples.first() else {
        return Err(AppError::InsufficientSamples);
    };
    let ndim = first.len();
    (0..ndim)
        .map(|p| {
            let column = column_of(samples, p, ndim)?;
            median(&column).ok_or(AppError::InsufficientSamples)
        })
        .collect()
}

/// Full parameter vector at the posterior median of every free parameter.
pub fn median_parameter_vector(
    set: &ParameterSet,
    samples: &[PosteriorSample],
) -> Result<FullParameterVector, AppError> {
    assemble(set, &posterior_median(samples)?)
}

/// Summaries for every free parameter, in canonical order.
pub fn summarize_parameters(
    set: &ParameterSet,
    samples: &[PosteriorSample],
) -> Result<Vec<ParameterSummary>, AppError> {
    if samples.is_empty() {
        return Err(AppError::InsufficientSamples);
    }
    let ndim = set.free_count();
    set.free_specs()
        .enumerate()
        .map(|(p, spec)| {
            let mut column = column_of(samples, p, ndim)?;
            let [lo, mid, hi] = sigma_interval_mut(&mut column).ok_or(AppError::InsufficientSamples)?;
            Ok(ParameterSummary {
                name: spec.name.clone(),
                label: spec.label().to_string(),
                median: mid,
                plus: hi - mid,
                minus: mid - lo,
            })
        })
        .collect()
}

/// Median and asymmetric errors of a derived quantity (e.g. the integrated
/// intrinsic line flux), computed per draw with `derive`.
pub fn summarize_derived<F>(
    name: &str,
    label: &str,
    set: &ParameterSet,
    samples: &[PosteriorSample],
    derive: F,
) -> Result<ParameterSummary, AppError>
where
    F: Fn(&FullParameterVector) -> Result<f64, AppError> + Sync,
{
    if samples.is_empty() {
        return Err(AppError::InsufficientSamples);
    }
    let mut values: Vec<f64> = samples
        .par_iter()
        .map(|sample| -> Result<f64, AppError> { derive(&assemble(set, sample)?) })
        .collect::<Result<_, _>>()?;
    let [lo, mid, hi] = sigma_interval_mut(&mut values).ok_or(AppError::InsufficientSamples)?;
    Ok(ParameterSummary {
        name: name.to_string(),
        label: label.to_string(),
        median: mid,
        plus: hi - mid,
        minus: mid - lo,
    })
}

/// Chi-square of `model` against `grid`, skipping bins where `mask` is true.
///
/// `dof = n_used - n_free - 1`.
pub fn fit_quality(
    grid: &SpectralGrid,
    model: &[f64],
    n_free: usize,
    mask: Option<&[bool]>,
) -> Result<FitQuality, AppError> {
    if model.len() != grid.len() {
        return Err(AppError::invalid_input(format!(
            "Model has {} bins, spectrum has {}.",
            model.len(),
            grid.len()
        )));
    }
    if let Some(m) = mask {
        if m.len() != grid.len() {
            return Err(AppError::invalid_input(format!(
                "Mask has {} bins, spectrum has {}.",
                m.len(),
                grid.len()
            )));
        }
    }

    let mut chi2 = 0.0;
    let mut n_used = 0usize;
    for i in 0..grid.len() {
        if mask.is_some_and(|m| m[i]) {
            continue;
        }
        let r = (grid.flux[i] - model[i]) / grid.flux_error[i];
        chi2 += r * r;
        n_used += 1;
    }

    let dof = n_used.checked_sub(n_free + 1).filter(|&d| d > 0).ok_or_else(|| {
        AppError::invalid_input(format!(
            "Not enough unmasked bins ({n_used}) for {n_free} free parameters."
        ))
    })?;

    Ok(FitQuality {
        chi2,
        dof,
        chi2_nu: chi2 / dof as f64,
        n_used,
    })
}

/// Mask bins whose wavelength falls in any `[start, end]` window.
pub fn wavelength_mask(wavelength: &[f64], windows: &[(f64, f64)]) -> Vec<bool> {
    wavelength
        .iter()
        .map(|&w| windows.iter().any(|&(a, b)| w >= a.min(b) && w <= a.max(b)))
        .collect()
}

fn column_of(samples: &[PosteriorSample], p: usize, ndim: usize) -> Result<Vec<f64>, AppError> {
    samples
        .iter()
        .map(|s| {
            if s.len() != ndim {
                return Err(AppError::InvalidParameterCount {
                    expected: ndim,
                    actual: s.len(),
                });
            }
            Ok(s[p])
        })
        .collect()
}
