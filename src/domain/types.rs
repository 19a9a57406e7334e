//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - loaded from fit configuration / sampler output files
//! - passed through the assembler and band estimator
//! - exported to JSON/CSV for plotting elsewhere

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The ten Lyman-alpha profile parameters, in the positional order the
/// profile model expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LyaParameter {
    /// Narrow-component velocity shift (km/s).
    VsN,
    /// Narrow-component amplitude (log10).
    AmN,
    /// Narrow-component FWHM (km/s).
    FwN,
    /// Broad-component velocity shift (km/s).
    VsB,
    /// Broad-component amplitude (log10).
    AmB,
    /// Broad-component FWHM (km/s).
    FwB,
    /// H I column density (log10 cm^-2).
    H1Col,
    /// H I Doppler parameter b (km/s).
    H1B,
    /// H I velocity (km/s).
    H1Vel,
    /// D/H ratio.
    D2h,
}

impl LyaParameter {
    pub const ALL: [LyaParameter; 10] = [
        LyaParameter::VsN,
        LyaParameter::AmN,
        LyaParameter::FwN,
        LyaParameter::VsB,
        LyaParameter::AmB,
        LyaParameter::FwB,
        LyaParameter::H1Col,
        LyaParameter::H1B,
        LyaParameter::H1Vel,
        LyaParameter::D2h,
    ];

    /// Position in the canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            LyaParameter::VsN => "vs_n",
            LyaParameter::AmN => "am_n",
            LyaParameter::FwN => "fw_n",
            LyaParameter::VsB => "vs_b",
            LyaParameter::AmB => "am_b",
            LyaParameter::FwB => "fw_b",
            LyaParameter::H1Col => "h1_col",
            LyaParameter::H1B => "h1_b",
            LyaParameter::H1Vel => "h1_vel",
            LyaParameter::D2h => "d2h",
        }
    }

    pub fn display_label(self) -> &'static str {
        match self {
            LyaParameter::VsN => "v_n",
            LyaParameter::AmN => "log A_n",
            LyaParameter::FwN => "FW_n",
            LyaParameter::VsB => "v_b",
            LyaParameter::AmB => "log A_b",
            LyaParameter::FwB => "FW_b",
            LyaParameter::H1Col => "log N(HI)",
            LyaParameter::H1B => "b",
            LyaParameter::H1Vel => "v_HI",
            LyaParameter::D2h => "D/H",
        }
    }

    /// Value used when the parameter is held fixed and the config does not say otherwise.
    pub fn default_value(self) -> f64 {
        match self {
            LyaParameter::VsN => 30.0,
            LyaParameter::AmN => -13.0,
            LyaParameter::FwN => 100.0,
            LyaParameter::VsB => 30.0,
            LyaParameter::AmB => -13.8,
            LyaParameter::FwB => 400.0,
            LyaParameter::H1Col => 18.0,
            LyaParameter::H1B => 12.0,
            LyaParameter::H1Vel => 10.0,
            LyaParameter::D2h => 1.5e-5,
        }
    }
}

/// One named physical parameter and whether the sampler estimates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub vary: bool,
    /// Used only when `vary` is false.
    #[serde(default)]
    pub fixed_value: f64,
    #[serde(default)]
    pub display_label: String,
}

impl ParameterSpec {
    pub fn free(name: impl Into<String>, display_label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vary: true,
            fixed_value: 0.0,
            display_label: display_label.into(),
        }
    }

    pub fn fixed(name: impl Into<String>, value: f64, display_label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vary: false,
            fixed_value: value,
            display_label: display_label.into(),
        }
    }

    /// Label for figures, falling back to the parameter name.
    pub fn label(&self) -> &str {
        if self.display_label.is_empty() {
            &self.name
        } else {
            &self.display_label
        }
    }
}

/// Parameters in canonical order.
///
/// The `vary = true` subset, in this order, lines up one-to-one with the
/// entries of every posterior sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ParameterSpec>", into = "Vec<ParameterSpec>")]
pub struct ParameterSet {
    specs: Vec<ParameterSpec>,
}

impl ParameterSet {
    pub fn new(specs: Vec<ParameterSpec>) -> Result<Self, AppError> {
        let mut seen = HashSet::new();
        for spec in &specs {
            if spec.name.trim().is_empty() {
                return Err(AppError::invalid_input("Parameter names must not be empty."));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(AppError::invalid_input(format!(
                    "Duplicate parameter name: `{}`",
                    spec.name
                )));
            }
        }
        Ok(Self { specs })
    }

    /// The Lyman-alpha parameter set with D/H fixed and everything else free.
    pub fn lya_default() -> Self {
        let specs = LyaParameter::ALL
            .iter()
            .map(|&p| {
                if p == LyaParameter::D2h {
                    ParameterSpec::fixed(p.name(), p.default_value(), p.display_label())
                } else {
                    ParameterSpec {
                        fixed_value: p.default_value(),
                        ..ParameterSpec::free(p.name(), p.display_label())
                    }
                }
            })
            .collect();
        Self { specs }
    }

    pub fn specs(&self) -> &[ParameterSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn free_count(&self) -> usize {
        self.specs.iter().filter(|s| s.vary).count()
    }

    pub fn free_specs(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.specs.iter().filter(|s| s.vary)
    }

    pub fn free_labels(&self) -> Vec<String> {
        self.free_specs().map(|s| s.label().to_string()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Hold `name` fixed at `value`.
    pub fn fix(&mut self, name: &str, value: f64) -> Result<(), AppError> {
        let spec = self.get_mut(name)?;
        spec.vary = false;
        spec.fixed_value = value;
        Ok(())
    }

    /// Let the sampler estimate `name`.
    pub fn free(&mut self, name: &str) -> Result<(), AppError> {
        self.get_mut(name)?.vary = true;
        Ok(())
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut ParameterSpec, AppError> {
        self.specs
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| AppError::invalid_input(format!("Unknown parameter: `{name}`")))
    }

    /// Check that the set names exactly the Lyman-alpha parameters, in model order.
    pub fn ensure_lya_order(&self) -> Result<(), AppError> {
        let expected: Vec<&str> = LyaParameter::ALL.iter().map(|p| p.name()).collect();
        let actual: Vec<&str> = self.specs.iter().map(|s| s.name.as_str()).collect();
        if expected != actual {
            return Err(AppError::invalid_input(format!(
                "Parameter order must be [{}], got [{}].",
                expected.join(", "),
                actual.join(", ")
            )));
        }
        Ok(())
    }
}

impl TryFrom<Vec<ParameterSpec>> for ParameterSet {
    type Error = AppError;

    fn try_from(specs: Vec<ParameterSpec>) -> Result<Self, Self::Error> {
        ParameterSet::new(specs)
    }
}

impl From<ParameterSet> for Vec<ParameterSpec> {
    fn from(set: ParameterSet) -> Self {
        set.specs
    }
}

/// One draw from the sampler: values of the free parameters, in canonical order.
pub type PosteriorSample = Vec<f64>;

/// Every parameter value in canonical order, ready for the profile model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullParameterVector {
    pub values: Vec<f64>,
}

impl FullParameterVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, idx: usize) -> Option<f64> {
        self.values.get(idx).copied()
    }

    /// Look a value up by name through the set that produced this vector.
    pub fn value_of(&self, set: &ParameterSet, name: &str) -> Option<f64> {
        set.position(name).and_then(|i| self.get(i))
    }
}

/// Observed spectrum and its coordinate axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralGrid {
    pub wavelength: Vec<f64>,
    pub flux: Vec<f64>,
    pub flux_error: Vec<f64>,
    /// Instrument resolving power `λ / Δλ`.
    pub resolution: f64,
}

impl SpectralGrid {
    pub fn new(
        wavelength: Vec<f64>,
        flux: Vec<f64>,
        flux_error: Vec<f64>,
        resolution: f64,
    ) -> Result<Self, AppError> {
        if wavelength.is_empty() {
            return Err(AppError::invalid_input("Spectral grid has no wavelength bins."));
        }
        if flux.len() != wavelength.len() || flux_error.len() != wavelength.len() {
            return Err(AppError::invalid_input(format!(
                "Spectral arrays differ in length: wavelength={}, flux={}, error={}.",
                wavelength.len(),
                flux.len(),
                flux_error.len()
            )));
        }
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(AppError::invalid_input(format!(
                "Resolution must be finite and > 0, got {resolution}."
            )));
        }
        Ok(Self {
            wavelength,
            flux,
            flux_error,
            resolution,
        })
    }

    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }
}

/// Per-bin 16th/50th/84th percentiles of the model across posterior draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredibleBand {
    pub low: Vec<f64>,
    pub mid: Vec<f64>,
    pub high: Vec<f64>,
}

impl CredibleBand {
    pub fn len(&self) -> usize {
        self.mid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mid.is_empty()
    }

    /// `high - low` per bin.
    pub fn widths(&self) -> Vec<f64> {
        self.high.iter().zip(&self.low).map(|(h, l)| h - l).collect()
    }
}

/// Fit configuration file: parameter set plus model switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub parameters: ParameterSet,
    /// Drop the broad emission component.
    #[serde(default)]
    pub single_component_flux: bool,
    /// Multiplier applied to model output, e.g. `1e-14` when amplitudes were
    /// sampled in units of 1e-14 erg s^-1 cm^-2 Å^-1.
    #[serde(default = "default_flux_scale")]
    pub flux_scale: f64,
}

fn default_flux_scale() -> f64 {
    1.0
}

impl ProfileConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.flux_scale.is_finite() && self.flux_scale > 0.0) {
            return Err(AppError::invalid_input(format!(
                "flux_scale must be finite and > 0, got {}.",
                self.flux_scale
            )));
        }
        Ok(())
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            parameters: ParameterSet::lya_default(),
            single_component_flux: false,
            flux_scale: default_flux_scale(),
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// JSON `ProfileConfig`; `None` uses the default Lyman-alpha set.
    pub config_path: Option<PathBuf>,
    pub chain_path: PathBuf,
    pub spectrum_path: PathBuf,
    pub resolution: f64,

    pub burn_in: usize,
    pub thin: usize,
    /// Cap on the number of draws used for the band (seeded subsample).
    pub max_draws: Option<usize>,
    pub seed: u64,

    /// Wavelength windows `[start, end]` excluded from chi-square.
    pub mask: Vec<(f64, f64)>,

    pub export_band: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lya_default_matches_canonical_order() {
        let set = ParameterSet::lya_default();
        assert_eq!(set.len(), 10);
        assert_eq!(set.free_count(), 9);
        set.ensure_lya_order().unwrap();
        let d2h = set.get("d2h").unwrap();
        assert!(!d2h.vary);
        assert_eq!(d2h.fixed_value, 1.5e-5);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let specs = vec![ParameterSpec::free("a", "A"), ParameterSpec::fixed("a", 1.0, "A")];
        assert!(ParameterSet::new(specs).is_err());
    }

    #[test]
    fn fix_and_free_toggle_vary() {
        let mut set = ParameterSet::lya_default();
        set.fix("fw_b", 350.0).unwrap();
        assert_eq!(set.free_count(), 8);
        assert_eq!(set.get("fw_b").unwrap().fixed_value, 350.0);
        set.free("d2h").unwrap();
        assert_eq!(set.free_count(), 9);
        assert!(set.fix("nope", 1.0).is_err());
    }

    #[test]
    fn parameter_set_deserializes_from_plain_list() {
        let json = r#"[
            {"name": "x", "vary": true, "display_label": "X"},
            {"name": "y", "vary": false, "fixed_value": 2.5}
        ]"#;
        let set: ParameterSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.free_count(), 1);
        assert_eq!(set.specs()[1].label(), "y");

        let dup = r#"[{"name": "x", "vary": true}, {"name": "x", "vary": true}]"#;
        assert!(serde_json::from_str::<ParameterSet>(dup).is_err());
    }

    #[test]
    fn spectral_grid_rejects_ragged_arrays() {
        let err = SpectralGrid::new(vec![1.0, 2.0], vec![1.0], vec![1.0, 1.0], 1000.0);
        assert!(err.is_err());
        let err = SpectralGrid::new(vec![1.0], vec![1.0], vec![1.0], 0.0);
        assert!(err.is_err());
    }

    #[test]
    fn profile_config_reads_flux_scale() {
        let json = r#"{"parameters": [{"name": "a", "vary": true}], "flux_scale": 1e-14}"#;
        let config: ProfileConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.flux_scale, 1e-14);
        config.validate().unwrap();

        let bad = ProfileConfig {
            flux_scale: 0.0,
            ..ProfileConfig::default()
        };
        assert_eq!(bad.validate().unwrap_err().exit_code(), 2);
    }
}
