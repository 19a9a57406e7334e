//! Export band, trace and histogram tables to CSV, plus the input files the
//! demo command writes (spectrum CSV, chain JSON, config JSON).
//!
//! The exports are meant to be easy to consume in spreadsheets or plotting scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::data::Chain;
use crate::domain::{ProfileConfig, SpectralGrid};
use crate::error::AppError;
use crate::figures::{CornerData, ProfileFigure, WalkerTraces};

fn create(path: &Path, what: &str) -> Result<File, AppError> {
    File::create(path).map_err(|e| {
        AppError::invalid_input(format!("Failed to create {what} '{}': {e}", path.display()))
    })
}

/// Write the profile figure series (observed, model, band) as one CSV row per bin.
pub fn write_profile_csv(path: &Path, figure: &ProfileFigure) -> Result<(), AppError> {
    write_profile(create(path, "export CSV")?, figure)
}

pub fn write_profile<W: Write>(writer: W, figure: &ProfileFigure) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "wavelength",
        "flux",
        "best_fit",
        "intrinsic",
        "low",
        "mid",
        "high",
    ])?;

    let band = figure.band.as_ref();
    for i in 0..figure.wavelength.len() {
        // Blank cells when no draws were supplied.
        let band_cell = |values: Option<&Vec<f64>>| {
            values.map(|v| format!("{:.6e}", v[i])).unwrap_or_default()
        };
        wtr.write_record([
            format!("{:.6}", figure.wavelength[i]),
            format!("{:.6e}", figure.flux[i]),
            format!("{:.6e}", figure.best_fit[i]),
            format!("{:.6e}", figure.intrinsic[i]),
            band_cell(band.map(|b| &b.low)),
            band_cell(band.map(|b| &b.mid)),
            band_cell(band.map(|b| &b.high)),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write walker traces in long form: `parameter,walker,step,value`.
pub fn write_traces_csv(path: &Path, traces: &WalkerTraces) -> Result<(), AppError> {
    write_traces(create(path, "traces CSV")?, traces)
}

pub fn write_traces<W: Write>(writer: W, traces: &WalkerTraces) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["parameter", "walker", "step", "value"])?;
    for panel in &traces.panels {
        for (walker, series) in panel.series.iter().enumerate() {
            for (&step, value) in traces.step_indices.iter().zip(series) {
                wtr.write_record([
                    panel.label.clone(),
                    walker.to_string(),
                    step.to_string(),
                    value.to_string(),
                ])?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Diagonal corner histograms: `parameter,bin_low,bin_high,count`.
pub fn write_corner_csv(path: &Path, corner: &CornerData) -> Result<(), AppError> {
    write_corner(create(path, "corner CSV")?, corner)
}

pub fn write_corner<W: Write>(writer: W, corner: &CornerData) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["parameter", "bin_low", "bin_high", "count"])?;
    for panel in &corner.diagonal {
        let edges = &panel.histogram.edges;
        for (i, count) in panel.histogram.counts.iter().enumerate() {
            wtr.write_record([
                panel.label.clone(),
                edges[i].to_string(),
                edges[i + 1].to_string(),
                count.to_string(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Spectrum in the same `wavelength,flux,error` layout the loader reads.
pub fn write_spectrum_csv(path: &Path, grid: &SpectralGrid) -> Result<(), AppError> {
    write_spectrum(create(path, "spectrum CSV")?, grid)
}

pub fn write_spectrum<W: Write>(writer: W, grid: &SpectralGrid) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["wavelength", "flux", "error"])?;
    for i in 0..grid.len() {
        wtr.write_record([
            grid.wavelength[i].to_string(),
            grid.flux[i].to_string(),
            grid.flux_error[i].to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_chain_json(path: &Path, chain: &Chain) -> Result<(), AppError> {
    serde_json::to_writer(create(path, "chain JSON")?, &chain.to_file())?;
    Ok(())
}

pub fn write_profile_config(path: &Path, config: &ProfileConfig) -> Result<(), AppError> {
    serde_json::to_writer_pretty(create(path, "config JSON")?, config)?;
    Ok(())
}
