//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - initialises logging
//! - parses CLI arguments
//! - runs the shared pipeline
//! - prints reports and writes optional exports

use std::fs;

use clap::Parser;
use log::info;

use crate::cli::{ChainArgs, Cli, Command, CornerArgs, DemoArgs, RunArgs, WalkerArgs};
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::figures::{corner_data, walker_traces};
use crate::io::{BandFile, write_band_json, write_profile_csv};

pub mod pipeline;

/// Entry point for the `lyaplot` binary.
pub fn run() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Bands(args) => handle_run(&run_config_from_args(&args), OutputMode::Bands),
        Command::Summary(args) => handle_run(&run_config_from_args(&args), OutputMode::Summary),
        Command::Walkers(args) => handle_walkers(args),
        Command::Corner(args) => handle_corner(args),
        Command::Demo(args) => handle_demo(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Bands,
    Summary,
}

fn handle_run(config: &RunConfig, mode: OutputMode) -> Result<(), AppError> {
    let run = pipeline::run(config, mode == OutputMode::Bands)?;
    print_run(&run);
    write_exports(config, &run)
}

fn print_run(run: &pipeline::RunOutput) {
    println!("{}", crate::report::format_parameter_table(&run.summaries));
    let fixed = crate::report::format_fixed_parameters(&run.config.parameters);
    if !fixed.is_empty() {
        print!("{fixed}");
    }
    println!("{}", crate::report::format_scaled_summary(&run.intrinsic_flux));
    println!("{}", crate::report::format_fit_quality(&run.quality));
    if let Some(band) = run.band() {
        println!("{}", crate::report::format_band_summary(band, run.n_draws));
    }
}

fn write_exports(config: &RunConfig, run: &pipeline::RunOutput) -> Result<(), AppError> {
    if let Some(path) = &config.export_band {
        write_profile_csv(path, &run.figure)?;
        info!("Wrote profile CSV '{}'", path.display());
    }
    if let Some(path) = &config.export_json {
        let Some(band) = run.band() else {
            return Err(AppError::invalid_input(
                "JSON export needs a credible band; use `bands` instead of `summary`.",
            ));
        };
        let file = BandFile::new(
            run.config.parameters.clone(),
            run.best_fit_parameters.clone(),
            run.grid.wavelength.clone(),
            run.figure.best_fit.clone(),
            band.clone(),
            run.n_draws,
        );
        write_band_json(path, &file)?;
        info!("Wrote band JSON '{}'", path.display());
    }
    Ok(())
}

fn handle_walkers(args: WalkerArgs) -> Result<(), AppError> {
    let loaded = load(&args.chain)?;
    let traces = walker_traces(&loaded.chain, &loaded.config.parameters, !args.all_steps)?;
    println!(
        "{} panels x {} walkers, {} points each ({})",
        traces.panels.len(),
        loaded.chain.walkers(),
        traces.step_indices.len(),
        traces.x_label
    );
    if let Some(path) = &args.export {
        crate::io::write_traces_csv(path, &traces)?;
        info!("Wrote traces CSV '{}'", path.display());
    }
    Ok(())
}

fn handle_corner(args: CornerArgs) -> Result<(), AppError> {
    let loaded = load(&args.chain)?;
    let corner = corner_data(&loaded.samples, &loaded.config.parameters, args.bins)?;
    let width = corner.labels().iter().map(|l| l.len()).max().unwrap_or(0);
    for panel in &corner.diagonal {
        let [lo, mid, hi] = panel.quantiles;
        println!(
            "{:<width$}  {mid:.5} +{:.5} -{:.5}",
            panel.label,
            hi - mid,
            mid - lo
        );
    }
    println!(
        "{} 1-D and {} 2-D histograms ({} bins per axis)",
        corner.diagonal.len(),
        corner.pairs.len(),
        args.bins
    );
    if let Some(path) = &args.export {
        crate::io::write_corner_csv(path, &corner)?;
        info!("Wrote corner CSV '{}'", path.display());
    }
    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let resolution = 12_200.0;
    let demo = pipeline::demo_data(args.seed, args.walkers, args.steps, args.bins, resolution)?;

    fs::create_dir_all(&args.out_dir)?;
    let chain_path = args.out_dir.join("chain.json");
    let spectrum_path = args.out_dir.join("spectrum.csv");
    let config_path = args.out_dir.join("config.json");
    crate::io::write_chain_json(&chain_path, &demo.chain)?;
    crate::io::write_spectrum_csv(&spectrum_path, &demo.grid)?;
    crate::io::write_profile_config(&config_path, &demo.config)?;
    info!("Wrote demo inputs to '{}'", args.out_dir.display());

    let config = RunConfig {
        config_path: Some(config_path),
        chain_path,
        spectrum_path,
        resolution,
        burn_in: args.burn_in,
        thin: 1,
        max_draws: Some(args.max_draws),
        seed: args.seed,
        mask: Vec::new(),
        export_band: Some(args.out_dir.join("profile.csv")),
        export_json: Some(args.out_dir.join("band.json")),
    };
    handle_run(&config, OutputMode::Bands)
}

fn load(args: &ChainArgs) -> Result<pipeline::LoadedChain, AppError> {
    pipeline::load_chain(args.config.as_deref(), &args.chain, args.burn_in, args.thin)
}

pub fn run_config_from_args(args: &RunArgs) -> RunConfig {
    RunConfig {
        config_path: args.chain.config.clone(),
        chain_path: args.chain.chain.clone(),
        spectrum_path: args.spectrum.clone(),
        resolution: args.resolution,
        burn_in: args.chain.burn_in,
        thin: args.chain.thin,
        max_draws: args.max_draws,
        seed: args.seed,
        mask: args.mask.clone(),
        export_band: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_config_copies_flags() {
        let cli = Cli::try_parse_from([
            "lyaplot",
            "summary",
            "--chain",
            "c.json",
            "--config",
            "cfg.json",
            "--spectrum",
            "s.csv",
            "--thin",
            "5",
            "--max-draws",
            "200",
            "--export-json",
            "out.json",
        ])
        .unwrap();
        let Command::Summary(args) = cli.command else {
            panic!("expected summary");
        };
        let config = run_config_from_args(&args);
        assert_eq!(config.thin, 5);
        assert_eq!(config.max_draws, Some(200));
        assert_eq!(config.config_path.as_deref(), Some(std::path::Path::new("cfg.json")));
        assert_eq!(config.resolution, 12_200.0);
        assert!(config.export_band.is_none());
        assert!(config.export_json.is_some());
    }
}
