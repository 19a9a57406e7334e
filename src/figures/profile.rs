//! Best-fit profile figure data.
//!
//! Collects every series a profile plot draws: the observed spectrum, a
//! coarse set of error bars, the best-fit and intrinsic model curves, and the
//! optional credible band.

use serde::Serialize;

use crate::domain::{CredibleBand, SpectralGrid};
use crate::error::AppError;
use crate::math::{interp, linspace};

/// Number of error bars drawn across the spectrum.
pub const COARSE_ERROR_BARS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorBar {
    pub wavelength: f64,
    pub flux: f64,
    pub error: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileFigure {
    pub wavelength: Vec<f64>,
    pub flux: Vec<f64>,
    pub error_bars: Vec<ErrorBar>,
    pub best_fit: Vec<f64>,
    pub intrinsic: Vec<f64>,
    pub band: Option<CredibleBand>,
}

pub fn profile_figure(
    grid: &SpectralGrid,
    best_fit: Vec<f64>,
    intrinsic: Vec<f64>,
    band: Option<CredibleBand>,
) -> Result<ProfileFigure, AppError> {
    let n = grid.len();
    let mismatch = |what: &str, len: usize| {
        AppError::invalid_input(format!("{what} has {len} bins, spectrum has {n}."))
    };
    if best_fit.len() != n {
        return Err(mismatch("Best-fit profile", best_fit.len()));
    }
    if intrinsic.len() != n {
        return Err(mismatch("Intrinsic profile", intrinsic.len()));
    }
    if let Some(b) = &band {
        let lens = [b.low.len(), b.mid.len(), b.high.len()];
        if let Some(&len) = lens.iter().find(|&&len| len != n) {
            return Err(mismatch("Credible band", len));
        }
    }

    Ok(ProfileFigure {
        wavelength: grid.wavelength.clone(),
        flux: grid.flux.clone(),
        error_bars: coarse_error_bars(grid, COARSE_ERROR_BARS)?,
        best_fit,
        intrinsic,
        band,
    })
}

/// `count` error bars evenly spaced between the first and last wavelength,
/// with flux and error linearly interpolated from the spectrum.
pub fn coarse_error_bars(grid: &SpectralGrid, count: usize) -> Result<Vec<ErrorBar>, AppError> {
    let (Some(&first), Some(&last)) = (grid.wavelength.first(), grid.wavelength.last()) else {
        return Ok(Vec::new());
    };
    linspace(first, last, count)
        .into_iter()
        .map(|w| {
            let flux = interp(w, &grid.wavelength, &grid.flux);
            let error = interp(w, &grid.wavelength, &grid.flux_error);
            match (flux, error) {
                (Some(flux), Some(error)) => Ok(ErrorBar {
                    wavelength: w,
                    flux,
                    error,
                }),
                _ => Err(AppError::invalid_input("Cannot interpolate error bars.")),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> SpectralGrid {
        let wave = linspace(1215.0, 1216.0, n);
        let flux = wave.iter().map(|w| (w - 1215.0) * 10.0).collect();
        let err = vec![0.5; n];
        SpectralGrid::new(wave, flux, err, 10_000.0).unwrap()
    }

    #[test]
    fn error_bars_span_grid_and_interpolate() {
        let bars = coarse_error_bars(&ramp(101), COARSE_ERROR_BARS).unwrap();
        assert_eq!(bars.len(), 25);
        assert_eq!(bars[0].wavelength, 1215.0);
        assert_eq!(bars[24].wavelength, 1216.0);
        for b in &bars {
            assert!((b.flux - (b.wavelength - 1215.0) * 10.0).abs() < 1e-9);
            assert!((b.error - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn series_lengths_are_checked() {
        let grid = ramp(10);
        assert!(profile_figure(&grid, vec![0.0; 9], vec![0.0; 10], None).is_err());
        let band = CredibleBand {
            low: vec![0.0; 10],
            mid: vec![0.0; 10],
            high: vec![0.0; 3],
        };
        assert!(profile_figure(&grid, vec![0.0; 10], vec![0.0; 10], Some(band)).is_err());
        let fig = profile_figure(&grid, vec![1.0; 10], vec![2.0; 10], None).unwrap();
        assert_eq!(fig.error_bars.len(), COARSE_ERROR_BARS);
    }
}
