//! Read/write band JSON files.
//!
//! Band JSON is the portable result of a run:
//! - run metadata (timestamp, draw count, percentiles used)
//! - the parameter set and the median parameter vector
//! - wavelength grid plus best-fit and credible band
//!
//! It can be reloaded later to redraw a profile without re-evaluating draws.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CredibleBand, FullParameterVector, ParameterSet};
use crate::error::AppError;
use crate::math::SIGMA_PERCENTILES;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub n_draws: usize,
    pub percentiles: [f64; 3],
    pub parameters: ParameterSet,
    pub median_parameters: FullParameterVector,
    pub wavelength: Vec<f64>,
    pub best_fit: Vec<f64>,
    pub band: CredibleBand,
}

impl BandFile {
    pub fn new(
        parameters: ParameterSet,
        median_parameters: FullParameterVector,
        wavelength: Vec<f64>,
        best_fit: Vec<f64>,
        band: CredibleBand,
        n_draws: usize,
    ) -> Self {
        Self {
            tool: format!("lyaplot {}", env!("CARGO_PKG_VERSION")),
            generated_at: Utc::now(),
            n_draws,
            percentiles: SIGMA_PERCENTILES,
            parameters,
            median_parameters,
            wavelength,
            best_fit,
            band,
        }
    }
}

pub fn write_band_json(path: &Path, band: &BandFile) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::invalid_input(format!("Failed to create band JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, band)?;
    Ok(())
}

pub fn read_band_json(path: &Path) -> Result<BandFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::invalid_input(format!("Failed to open band JSON '{}': {e}", path.display()))
    })?;
    let band: BandFile = serde_json::from_reader(file)?;
    if band.band.len() != band.wavelength.len() || band.best_fit.len() != band.wavelength.len() {
        return Err(AppError::invalid_input(
            "Band JSON arrays differ in length from the wavelength grid.",
        ));
    }
    Ok(band)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_file_survives_json() {
        let file = BandFile::new(
            ParameterSet::lya_default(),
            FullParameterVector { values: vec![0.0; 10] },
            vec![1215.0, 1216.0],
            vec![1.0, 2.0],
            CredibleBand {
                low: vec![0.5, 1.5],
                mid: vec![1.0, 2.0],
                high: vec![1.5, 2.5],
            },
            500,
        );
        let json = serde_json::to_string(&file).unwrap();
        let back: BandFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, file);
        assert_eq!(back.percentiles, [16.0, 50.0, 84.0]);
        assert!(back.tool.starts_with("lyaplot"));
    }

    #[test]
    fn write_then_read_from_disk() {
        let path = std::env::temp_dir().join(format!("lyaplot_band_{}.json", std::process::id()));
        let file = BandFile::new(
            ParameterSet::lya_default(),
            FullParameterVector { values: vec![1.0; 10] },
            vec![1215.0],
            vec![3.0],
            CredibleBand {
                low: vec![2.0],
                mid: vec![3.0],
                high: vec![4.0],
            },
            1,
        );
        write_band_json(&path, &file).unwrap();
        let back = read_band_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back.n_draws, 1);
        assert_eq!(back.band.mid, vec![3.0]);
    }
}
