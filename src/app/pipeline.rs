//! Shared run pipeline used by every subcommand.
//!
//! load config/chain/spectrum -> flatten -> (subsample) -> median best fit ->
//! credible band -> summaries and fit quality -> profile figure data
//!
//! The command handlers in `app` only decide what to print and export.

use std::path::Path;

use log::{debug, info, warn};

use crate::bands::estimate_bands;
use crate::data::{Chain, SyntheticChainConfig, generate_chain, subsample, synthetic_spectrum};
use crate::domain::{
    CredibleBand, FullParameterVector, LyaParameter, PosteriorSample, ProfileConfig, RunConfig,
    SpectralGrid,
};
use crate::error::AppError;
use crate::figures::{ProfileFigure, profile_figure};
use crate::io::{load_chain_json, load_profile_config, load_spectrum_csv};
use crate::models::LyaProfileModel;
use crate::params::{assemble, free_values};
use crate::report::{
    FitQuality, ParameterSummary, fit_quality, median_parameter_vector, summarize_derived,
    summarize_parameters, wavelength_mask,
};

/// Chain plus the configuration that describes its columns.
#[derive(Debug, Clone)]
pub struct LoadedChain {
    pub config: ProfileConfig,
    pub chain: Chain,
    pub samples: Vec<PosteriorSample>,
}

/// Everything a `bands`/`summary` run computes.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub config: ProfileConfig,
    pub grid: SpectralGrid,
    pub summaries: Vec<ParameterSummary>,
    /// Integrated intrinsic line flux over all draws.
    pub intrinsic_flux: ParameterSummary,
    pub best_fit_parameters: FullParameterVector,
    pub quality: FitQuality,
    pub figure: ProfileFigure,
    /// Draws that went into the band (after subsampling).
    pub n_draws: usize,
}

impl RunOutput {
    pub fn band(&self) -> Option<&CredibleBand> {
        self.figure.band.as_ref()
    }
}

/// Load the config (or the default set) and the chain, then flatten it.
pub fn load_chain(
    config_path: Option<&Path>,
    chain_path: &Path,
    burn_in: usize,
    thin: usize,
) -> Result<LoadedChain, AppError> {
    let config = match config_path {
        Some(path) => load_profile_config(path)?,
        None => ProfileConfig::default(),
    };
    let chain = load_chain_json(chain_path)?;
    if chain.ndim() != config.parameters.free_count() {
        return Err(AppError::InvalidParameterCount {
            expected: config.parameters.free_count(),
            actual: chain.ndim(),
        });
    }
    let samples = chain.flatten(burn_in, thin)?;
    info!(
        "Flattened chain: {} draws (burn-in {burn_in}, thin {thin})",
        samples.len()
    );
    Ok(LoadedChain {
        config,
        chain,
        samples,
    })
}

/// Full run: summaries, fit quality and, when `with_band`, the credible band.
pub fn run(config: &RunConfig, with_band: bool) -> Result<RunOutput, AppError> {
    let loaded = load_chain(
        config.config_path.as_deref(),
        &config.chain_path,
        config.burn_in,
        config.thin,
    )?;
    let grid = load_spectrum_csv(&config.spectrum_path, config.resolution)?;
    run_with_data(config, loaded, grid, with_band)
}

/// Same as `run`, with the chain and spectrum already in memory.
pub fn run_with_data(
    config: &RunConfig,
    loaded: LoadedChain,
    grid: SpectralGrid,
    with_band: bool,
) -> Result<RunOutput, AppError> {
    let LoadedChain {
        config: profile,
        samples,
        ..
    } = loaded;
    let set = &profile.parameters;
    set.ensure_lya_order()?;
    let model = LyaProfileModel::from_config(&profile);

    let summaries = summarize_parameters(set, &samples)?;
    let intrinsic_flux = summarize_derived("lya_flux", "Intrinsic Lya flux", set, &samples, |p| {
        model.intrinsic_flux(p)
    })?;
    let best_fit_parameters = median_parameter_vector(set, &samples)?;
    let best_fit = model.evaluate(&best_fit_parameters, &grid)?;
    let intrinsic = model.intrinsic(&best_fit_parameters, &grid)?;

    let mask = wavelength_mask(&grid.wavelength, &config.mask);
    let masked = mask.iter().filter(|m| **m).count();
    if masked > 0 {
        debug!("Masking {masked} bins from chi-square");
    }
    let quality = fit_quality(&grid, &best_fit, set.free_count(), Some(&mask))?;
    info!(
        "Best fit at posterior median: reduced chi2 = {:.2} ({} dof)",
        quality.chi2_nu, quality.dof
    );

    let draws = match config.max_draws {
        Some(n) if n < samples.len() => {
            info!("Subsampling {n} of {} draws (seed {})", samples.len(), config.seed);
            subsample(&samples, n, config.seed)
        }
        _ => samples,
    };

    let band = if with_band {
        if draws.len() > 20_000 {
            warn!(
                "Evaluating {} draws; consider --max-draws to bound run time",
                draws.len()
            );
        }
        let band = estimate_bands(&draws, set, &grid, |params, grid| model.evaluate(params, grid))?;
        info!("Credible band from {} draws over {} bins", draws.len(), band.len());
        Some(band)
    } else {
        None
    };

    let figure = profile_figure(&grid, best_fit, intrinsic, band)?;
    Ok(RunOutput {
        config: profile,
        grid,
        summaries,
        intrinsic_flux,
        best_fit_parameters,
        quality,
        figure,
        n_draws: draws.len(),
    })
}

/// Demo inputs written to disk by `lyaplot demo`.
#[derive(Debug, Clone)]
pub struct DemoData {
    pub config: ProfileConfig,
    pub truth: FullParameterVector,
    pub chain: Chain,
    pub grid: SpectralGrid,
}

/// Synthetic posterior around the default Lyman-alpha parameters, and a noisy
/// spectrum drawn from the same truth.
pub fn demo_data(
    seed: u64,
    walkers: usize,
    steps: usize,
    bins: usize,
    resolution: f64,
) -> Result<DemoData, AppError> {
    let config = ProfileConfig::default();
    let set = &config.parameters;
    let truth = assemble(
        set,
        &set.free_specs().map(|s| s.fixed_value).collect::<Vec<_>>(),
    )?;
    let center = free_values(set, &truth)?;
    let scatter = set
        .free_specs()
        .map(|s| demo_scatter(&s.name))
        .collect::<Vec<_>>();

    let chain = generate_chain(&SyntheticChainConfig {
        walkers,
        steps,
        seed,
        center,
        scatter,
        start_offset: 4.0,
    })?;

    let model = LyaProfileModel::from_config(&config);
    let grid = synthetic_spectrum(
        |p, g| model.evaluate(p, g),
        &truth,
        (1214.5, 1216.8),
        bins,
        resolution,
        0.03,
        seed.wrapping_add(1),
    )?;
    info!(
        "Generated demo chain ({walkers} walkers x {steps} steps) and spectrum ({bins} bins)"
    );

    Ok(DemoData {
        config,
        truth,
        chain,
        grid,
    })
}

/// Posterior width used for each demo parameter.
fn demo_scatter(name: &str) -> f64 {
    let param = LyaParameter::ALL.iter().copied().find(|p| p.name() == name);
    match param {
        Some(LyaParameter::VsN | LyaParameter::VsB | LyaParameter::H1Vel) => 1.5,
        Some(LyaParameter::AmN | LyaParameter::AmB) => 0.02,
        Some(LyaParameter::FwN) => 4.0,
        Some(LyaParameter::FwB) => 15.0,
        Some(LyaParameter::H1Col) => 0.03,
        Some(LyaParameter::H1B) => 0.4,
        Some(LyaParameter::D2h) => 1e-6,
        None => 0.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_config() -> RunConfig {
        RunConfig {
            config_path: None,
            chain_path: "unused.json".into(),
            spectrum_path: "unused.csv".into(),
            resolution: 12_200.0,
            burn_in: 50,
            thin: 1,
            max_draws: Some(60),
            seed: 3,
            mask: vec![(1215.60, 1215.75)],
            export_band: None,
            export_json: None,
        }
    }

    fn loaded(demo: &DemoData, config: &RunConfig) -> LoadedChain {
        LoadedChain {
            config: demo.config.clone(),
            chain: demo.chain.clone(),
            samples: demo.chain.flatten(config.burn_in, config.thin).unwrap(),
        }
    }

    #[test]
    fn demo_run_brackets_best_fit() {
        let demo = demo_data(5, 8, 150, 120, 12_200.0).unwrap();
        let config = run_config();
        let out = run_with_data(&config, loaded(&demo, &config), demo.grid.clone(), true).unwrap();

        assert_eq!(out.n_draws, 60);
        assert_eq!(out.summaries.len(), 9);
        let band = out.band().unwrap();
        assert_eq!(band.len(), demo.grid.len());
        for i in 0..band.len() {
            assert!(band.low[i] <= band.mid[i] && band.mid[i] <= band.high[i]);
        }
        assert!(out.quality.n_used < demo.grid.len());
        assert!(out.quality.chi2_nu.is_finite());
        let flux = &out.intrinsic_flux;
        assert!(flux.median > 0.0 && flux.plus >= 0.0 && flux.minus >= 0.0);
    }

    #[test]
    fn summary_run_skips_band() {
        let demo = demo_data(9, 6, 120, 80, 12_200.0).unwrap();
        let config = run_config();
        let out = run_with_data(&config, loaded(&demo, &config), demo.grid.clone(), false).unwrap();
        assert!(out.band().is_none());
        let vs_n = &out.summaries[0];
        assert_eq!(vs_n.name, "vs_n");
        assert!((vs_n.median - 30.0).abs() < 1.0);
    }

    #[test]
    fn demo_truth_keeps_fixed_d2h() {
        let demo = demo_data(1, 4, 20, 50, 12_200.0).unwrap();
        assert_eq!(demo.truth.len(), 10);
        assert_eq!(demo.truth.value_of(&demo.config.parameters, "d2h"), Some(1.5e-5));
        assert_eq!(demo.chain.ndim(), 9);
    }
}
