//! Reference Lyman-alpha profile model.
//!
//! The observed profile is built in three steps:
//!
//! 1. intrinsic emission: narrow + broad Gaussians in velocity space
//!    (`single_component_flux` drops the broad one)
//! 2. interstellar attenuation: `exp(-τ_HI - τ_DI)` with Gaussian (Doppler)
//!    optical-depth profiles; D I sits at its own rest wavelength with
//!    `N(D I) = D/H · N(H I)` and `b_D = b_H / √2`
//! 3. instrumental broadening: Gaussian kernel with `FWHM = λ / R`
//!
//! Amplitudes (erg s^-1 cm^-2 Å^-1) and column densities are sampled in
//! `log10`. The result is multiplied by `flux_scale`.

use crate::domain::{FullParameterVector, LyaParameter, ProfileConfig, SpectralGrid};
use crate::error::AppError;

/// Rest wavelength of H I Lyman-alpha (Å).
pub const LYA_REST_HI: f64 = 1215.67;
/// Rest wavelength of D I Lyman-alpha (Å).
pub const LYA_REST_DI: f64 = 1215.3394;
/// Speed of light (km/s).
pub const C_KMS: f64 = 2.997_924_58e5;
/// Lyman-alpha oscillator strength.
pub const LYA_OSCILLATOR: f64 = 0.4164;

/// `τ0 = OPTICAL_DEPTH_COEFF · N f λ0 / b` with `N` in cm^-2, `λ0` in Å, `b` in km/s.
const OPTICAL_DEPTH_COEFF: f64 = 1.497e-15;
const FWHM_TO_SIGMA: f64 = 2.354_820_045_030_949_4;

/// Kernel half-width in units of sigma.
const KERNEL_SIGMAS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LyaProfileModel {
    pub single_component_flux: bool,
    pub flux_scale: f64,
}

impl Default for LyaProfileModel {
    fn default() -> Self {
        Self {
            single_component_flux: false,
            flux_scale: 1.0,
        }
    }
}

/// Parameter values unpacked from canonical order.
#[derive(Debug, Clone, Copy)]
struct LyaValues {
    vs_n: f64,
    am_n: f64,
    fw_n: f64,
    vs_b: f64,
    am_b: f64,
    fw_b: f64,
    h1_col: f64,
    h1_b: f64,
    h1_vel: f64,
    d2h: f64,
}

impl LyaValues {
    fn from_vector(params: &FullParameterVector) -> Result<Self, AppError> {
        let v = params.as_slice();
        if v.len() != LyaParameter::ALL.len() {
            return Err(AppError::InvalidParameterCount {
                expected: LyaParameter::ALL.len(),
                actual: v.len(),
            });
        }
        let at = |p: LyaParameter| v[p.index()];
        Ok(Self {
            vs_n: at(LyaParameter::VsN),
            am_n: at(LyaParameter::AmN),
            fw_n: at(LyaParameter::FwN),
            vs_b: at(LyaParameter::VsB),
            am_b: at(LyaParameter::AmB),
            fw_b: at(LyaParameter::FwB),
            h1_col: at(LyaParameter::H1Col),
            h1_b: at(LyaParameter::H1B),
            h1_vel: at(LyaParameter::H1Vel),
            d2h: at(LyaParameter::D2h),
        })
    }
}

impl LyaProfileModel {
    pub fn new(single_component_flux: bool) -> Self {
        Self {
            single_component_flux,
            ..Self::default()
        }
    }

    /// Model switches taken from a fit configuration file.
    pub fn from_config(config: &ProfileConfig) -> Self {
        Self {
            single_component_flux: config.single_component_flux,
            flux_scale: config.flux_scale,
        }
    }

    /// Observed (attenuated, convolved) profile over `grid.wavelength`.
    pub fn evaluate(&self, params: &FullParameterVector, grid: &SpectralGrid) -> Result<Vec<f64>, AppError> {
        let p = LyaValues::from_vector(params)?;
        let attenuated: Vec<f64> = grid
            .wavelength
            .iter()
            .map(|&w| self.emission_at(&p, w) * transmission_at(&p, w))
            .collect();
        let out: Vec<f64> = convolve_resolution(&grid.wavelength, &attenuated, grid.resolution)
            .into_iter()
            .map(|f| f * self.flux_scale)
            .collect();
        ensure_finite(&out)?;
        Ok(out)
    }

    /// Unattenuated emission profile (no ISM, no instrument).
    pub fn intrinsic(&self, params: &FullParameterVector, grid: &SpectralGrid) -> Result<Vec<f64>, AppError> {
        let p = LyaValues::from_vector(params)?;
        let out: Vec<f64> = grid
            .wavelength
            .iter()
            .map(|&w| self.emission_at(&p, w) * self.flux_scale)
            .collect();
        ensure_finite(&out)?;
        Ok(out)
    }

    /// Integrated intrinsic line flux (erg s^-1 cm^-2 when the profile is in
    /// erg s^-1 cm^-2 Å^-1): the Gaussian areas, not limited to any grid.
    pub fn intrinsic_flux(&self, params: &FullParameterVector) -> Result<f64, AppError> {
        let p = LyaValues::from_vector(params)?;
        let mut total = gaussian_area(10f64.powf(p.am_n), p.fw_n);
        if !self.single_component_flux {
            total += gaussian_area(10f64.powf(p.am_b), p.fw_b);
        }
        let total = total * self.flux_scale;
        ensure_finite(&[total])?;
        Ok(total)
    }

    fn emission_at(&self, p: &LyaValues, wavelength: f64) -> f64 {
        let narrow = gaussian_line(wavelength, 10f64.powf(p.am_n), p.vs_n, p.fw_n);
        if self.single_component_flux {
            return narrow;
        }
        narrow + gaussian_line(wavelength, 10f64.powf(p.am_b), p.vs_b, p.fw_b)
    }
}

/// Gaussian emission line centred at `LYA_REST_HI` shifted by `velocity`, width given as FWHM in km/s.
fn gaussian_line(wavelength: f64, amplitude: f64, velocity: f64, fwhm_kms: f64) -> f64 {
    let center = LYA_REST_HI * (1.0 + velocity / C_KMS);
    let sigma = LYA_REST_HI * fwhm_kms / C_KMS / FWHM_TO_SIGMA;
    let z = (wavelength - center) / sigma;
    amplitude * (-0.5 * z * z).exp()
}

fn gaussian_area(amplitude: f64, fwhm_kms: f64) -> f64 {
    let sigma = LYA_REST_HI * fwhm_kms / C_KMS / FWHM_TO_SIGMA;
    amplitude * sigma * (2.0 * std::f64::consts::PI).sqrt()
}

fn transmission_at(p: &LyaValues, wavelength: f64) -> f64 {
    let n_h = 10f64.powf(p.h1_col);
    let tau_h = doppler_tau(wavelength, LYA_REST_HI, n_h, p.h1_b, p.h1_vel);
    let tau_d = doppler_tau(
        wavelength,
        LYA_REST_DI,
        n_h * p.d2h,
        p.h1_b / std::f64::consts::SQRT_2,
        p.h1_vel,
    );
    (-(tau_h + tau_d)).exp()
}

fn doppler_tau(wavelength: f64, rest: f64, column: f64, b_kms: f64, velocity: f64) -> f64 {
    let tau0 = OPTICAL_DEPTH_COEFF * column * LYA_OSCILLATOR * rest / b_kms;
    let center = rest * (1.0 + velocity / C_KMS);
    let width = rest * b_kms / C_KMS;
    let z = (wavelength - center) / width;
    tau0 * (-z * z).exp()
}

/// Gaussian instrumental broadening on a (possibly non-uniform) grid.
///
/// Each output bin is the kernel-weighted mean of the input bins within
/// `KERNEL_SIGMAS` sigma, using `FWHM = λ / R` at that bin.
fn convolve_resolution(wavelength: &[f64], flux: &[f64], resolution: f64) -> Vec<f64> {
    wavelength
        .iter()
        .map(|&w0| {
            let sigma = w0 / resolution / FWHM_TO_SIGMA;
            let reach = KERNEL_SIGMAS * sigma;
            let mut num = 0.0;
            let mut den = 0.0;
            for (&w, &f) in wavelength.iter().zip(flux) {
                if (w - w0).abs() > reach {
                    continue;
                }
                let z = (w - w0) / sigma;
                let k = (-0.5 * z * z).exp();
                num += k * f;
                den += k;
            }
            if den > 0.0 { num / den } else { f64::NAN }
        })
        .collect()
}

fn ensure_finite(values: &[f64]) -> Result<(), AppError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(AppError::ModelEvaluation(format!(
            "non-finite flux at bin {i} (value {})",
            values[i]
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LyaParameter, ParameterSet};
    use crate::math::linspace;
    use crate::params::assemble;

    fn default_vector() -> FullParameterVector {
        let set = ParameterSet::lya_default();
        let free: Vec<f64> = set.free_specs().map(|s| s.fixed_value).collect();
        assemble(&set, &free).unwrap()
    }

    fn grid(n: usize) -> SpectralGrid {
        let wave = linspace(1214.5, 1216.8, n);
        SpectralGrid::new(wave, vec![0.0; n], vec![1.0; n], 20_000.0).unwrap()
    }

    #[test]
    fn profile_is_finite_and_non_negative() {
        let model = LyaProfileModel::default();
        let flux = model.evaluate(&default_vector(), &grid(200)).unwrap();
        assert_eq!(flux.len(), 200);
        assert!(flux.iter().all(|f| f.is_finite() && *f >= 0.0));
    }

    #[test]
    fn absorption_suppresses_line_core() {
        let model = LyaProfileModel::default();
        let params = default_vector();
        let g = grid(400);
        let observed = model.evaluate(&params, &g).unwrap();
        let intrinsic = model.intrinsic(&params, &g).unwrap();

        let core = g
            .wavelength
            .iter()
            .position(|&w| w >= LYA_REST_HI * (1.0 + 10.0 / C_KMS))
            .unwrap();
        assert!(observed[core] < 0.05 * intrinsic[core]);
    }

    #[test]
    fn single_component_drops_broad_wings() {
        let params = default_vector();
        let g = grid(100);
        let both = LyaProfileModel::new(false).intrinsic(&params, &g).unwrap();
        let narrow = LyaProfileModel::new(true).intrinsic(&params, &g).unwrap();
        assert!(both.iter().zip(&narrow).all(|(b, n)| b >= n));
        assert!(both.iter().zip(&narrow).any(|(b, n)| b > n));
    }

    #[test]
    fn wrong_vector_length_is_rejected() {
        let short = FullParameterVector { values: vec![0.0; 9] };
        let err = LyaProfileModel::default().evaluate(&short, &grid(10)).unwrap_err();
        assert!(matches!(err, AppError::InvalidParameterCount { expected: 10, actual: 9 }));
    }

    #[test]
    fn zero_doppler_width_is_a_model_error() {
        let mut params = default_vector();
        params.values[LyaParameter::H1B.index()] = 0.0;
        let err = LyaProfileModel::default().evaluate(&params, &grid(50)).unwrap_err();
        assert!(matches!(err, AppError::ModelEvaluation(_)));
    }

    #[test]
    fn intrinsic_flux_matches_integrated_profile() {
        let params = default_vector();
        let model = LyaProfileModel::default();
        // Wide enough to hold both wings of the broad component.
        let wave = linspace(1205.0, 1226.0, 8000);
        let g = SpectralGrid::new(wave, vec![0.0; 8000], vec![1.0; 8000], 20_000.0).unwrap();
        let profile = model.intrinsic(&params, &g).unwrap();
        let trapezoid: f64 = g
            .wavelength
            .windows(2)
            .zip(profile.windows(2))
            .map(|(w, f)| 0.5 * (f[0] + f[1]) * (w[1] - w[0]))
            .sum();
        let analytic = model.intrinsic_flux(&params).unwrap();
        assert!((trapezoid - analytic).abs() / analytic < 1e-3);

        let narrow = LyaProfileModel::new(true).intrinsic_flux(&params).unwrap();
        assert!(narrow < analytic);
    }

    #[test]
    fn flux_scale_comes_from_config() {
        let config = ProfileConfig {
            flux_scale: 1e-14,
            ..ProfileConfig::default()
        };
        let scaled = LyaProfileModel::from_config(&config);
        let plain = LyaProfileModel::default();
        let params = default_vector();
        let g = grid(60);
        let a = scaled.evaluate(&params, &g).unwrap();
        let b = plain.evaluate(&params, &g).unwrap();
        let expected: Vec<f64> = b.iter().map(|y| y * 1e-14).collect();
        assert_eq!(a, expected);
        let fa = scaled.intrinsic_flux(&params).unwrap();
        let fb = plain.intrinsic_flux(&params).unwrap();
        assert_eq!(fa, fb * 1e-14);
    }

    #[test]
    fn convolution_preserves_a_flat_spectrum() {
        let wave = linspace(1215.0, 1216.0, 50);
        let flat = vec![3.0; 50];
        let out = convolve_resolution(&wave, &flat, 10_000.0);
        assert!(out.iter().all(|v| (v - 3.0).abs() < 1e-12));
    }
}
