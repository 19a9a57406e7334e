//! Input loading: spectra (CSV), fit configuration (JSON), sampler chains (JSON).
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors, exit code 2)
//! - **Row-level validation** with line numbers in error messages
//! - **No computation here**: loaders only parse and validate shape

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::{debug, info};

use crate::data::{Chain, ChainFile};
use crate::domain::{ProfileConfig, SpectralGrid};
use crate::error::AppError;

const WAVELENGTH_COLUMNS: &[&str] = &["wavelength", "wave", "lambda"];
const FLUX_COLUMNS: &[&str] = &["flux"];
const ERROR_COLUMNS: &[&str] = &["error", "flux_error", "err", "sigma"];

/// Load a spectrum CSV with `wavelength`, `flux`, `error` columns.
pub fn load_spectrum_csv(path: &Path, resolution: f64) -> Result<SpectralGrid, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::invalid_input(format!("Failed to open spectrum CSV '{}': {e}", path.display()))
    })?;
    let grid = read_spectrum_csv(file, resolution)?;
    info!(
        "Loaded spectrum '{}' ({} bins, {:.3}..{:.3} Å)",
        path.display(),
        grid.len(),
        grid.wavelength[0],
        grid.wavelength[grid.len() - 1]
    );
    Ok(grid)
}

pub fn read_spectrum_csv<R: Read>(mut reader: R, resolution: f64) -> Result<SpectralGrid, AppError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    // The csv reader drops `#` comments and blank lines without reporting
    // where records start, so keep the file line of every header/record.
    let row_lines = row_line_numbers(&text);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);
    let wave_idx = find_column(&header_map, WAVELENGTH_COLUMNS)?;
    let flux_idx = find_column(&header_map, FLUX_COLUMNS)?;
    let err_idx = find_column(&header_map, ERROR_COLUMNS)?;

    let mut wavelength = Vec::new();
    let mut flux = Vec::new();
    let mut flux_error = Vec::new();
    let mut lines = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        // row_lines[0] is the header
        let line = row_lines.get(idx + 1).copied().unwrap_or(idx + 2);
        wavelength.push(parse_field(&record, wave_idx, line, "wavelength")?);
        flux.push(parse_field(&record, flux_idx, line, "flux")?);
        flux_error.push(parse_field(&record, err_idx, line, "error")?);
        lines.push(line);
    }

    if let Some(i) = wavelength.windows(2).position(|w| w[1] <= w[0]) {
        return Err(AppError::invalid_input(format!(
            "Wavelength column must be strictly increasing (line {}).",
            lines[i + 1]
        )));
    }
    if let Some(i) = flux_error.iter().position(|e| *e <= 0.0) {
        return Err(AppError::invalid_input(format!(
            "Flux error must be > 0 (line {}).",
            lines[i]
        )));
    }

    SpectralGrid::new(wavelength, flux, flux_error, resolution)
}

/// Load a `ProfileConfig` JSON file.
pub fn load_profile_config(path: &Path) -> Result<ProfileConfig, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::invalid_input(format!("Failed to open config '{}': {e}", path.display()))
    })?;
    let config: ProfileConfig = serde_json::from_reader(file)?;
    config.validate()?;
    debug!(
        "Loaded config '{}' ({} parameters, {} free)",
        path.display(),
        config.parameters.len(),
        config.parameters.free_count()
    );
    Ok(config)
}

/// Load a chain JSON file (`{"chain": [[[...]]]}`).
pub fn load_chain_json(path: &Path) -> Result<Chain, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::invalid_input(format!("Failed to open chain '{}': {e}", path.display()))
    })?;
    let chain = read_chain_json(file)?;
    info!(
        "Loaded chain '{}' ({} walkers x {} steps x {} params)",
        path.display(),
        chain.walkers(),
        chain.steps(),
        chain.ndim()
    );
    Ok(chain)
}

pub fn read_chain_json<R: Read>(reader: R) -> Result<Chain, AppError> {
    let file: ChainFile = serde_json::from_reader(reader)?;
    Chain::try_from(file)
}

/// 1-based line numbers of the lines the csv reader turns into rows.
fn row_line_numbers(text: &str) -> Vec<usize> {
    text.lines()
        .enumerate()
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
        .map(|(i, _)| i + 1)
        .collect()
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, aliases: &[&str]) -> Result<usize, AppError> {
    aliases
        .iter()
        .find_map(|a| header_map.get(*a).copied())
        .ok_or_else(|| {
            AppError::invalid_input(format!(
                "Missing required column: one of `{}`",
                aliases.join("`, `")
            ))
        })
}

fn parse_field(record: &StringRecord, idx: usize, line: usize, what: &str) -> Result<f64, AppError> {
    let raw = record
        .get(idx)
        .ok_or_else(|| AppError::invalid_input(format!("Line {line}: missing {what} value.")))?;
    let value = raw
        .parse::<f64>()
        .map_err(|e| AppError::invalid_input(format!("Line {line}: invalid {what} '{raw}': {e}")))?;
    if !value.is_finite() {
        return Err(AppError::invalid_input(format!(
            "Line {line}: {what} must be finite, got '{raw}'."
        )));
    }
    Ok(value)
}
