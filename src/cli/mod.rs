//! Command-line parsing for the Lyman-alpha MCMC plotting tool.
//!
//! Argument parsing and command dispatch stay separate from the numerical code;
//! `app` turns these structs into a `RunConfig`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "lyaplot", version, about = "Posterior plots and credible bands for Lyman-alpha MCMC fits")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate the model over posterior draws and report the 1-sigma band.
    Bands(RunArgs),
    /// Print posterior medians, errors and fit quality.
    Summary(RunArgs),
    /// Build walker trace panels from a chain.
    Walkers(WalkerArgs),
    /// Build corner histograms and quantiles from a chain.
    Corner(CornerArgs),
    /// Generate a synthetic chain and spectrum, then run `bands` on them.
    Demo(DemoArgs),
}

/// Chain location and flattening options shared by every chain command.
#[derive(Debug, Args, Clone)]
pub struct ChainArgs {
    /// Chain JSON (`{"chain": [[[...]]]}`, walkers x steps x free parameters).
    #[arg(long, value_name = "JSON")]
    pub chain: PathBuf,

    /// Parameter config JSON. Defaults to the Lyman-alpha set with D/H fixed.
    #[arg(long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Leading steps discarded from every walker.
    #[arg(long, default_value_t = 0)]
    pub burn_in: usize,

    /// Keep every n-th step after burn-in.
    #[arg(long, default_value_t = 1)]
    pub thin: usize,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub chain: ChainArgs,

    /// Observed spectrum CSV (`wavelength,flux,error`).
    #[arg(long, value_name = "CSV")]
    pub spectrum: PathBuf,

    /// Spectral resolving power R = λ/Δλ.
    #[arg(long, default_value_t = 12_200.0)]
    pub resolution: f64,

    /// Cap on the number of draws evaluated (seeded random subset).
    #[arg(long)]
    pub max_draws: Option<usize>,

    /// Seed for draw subsampling.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Wavelength window `start:end` excluded from chi-square (repeatable).
    #[arg(long = "mask", value_name = "START:END", value_parser = parse_window)]
    pub mask: Vec<(f64, f64)>,

    /// Export profile series and band to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export band, best fit and median parameters to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct WalkerArgs {
    #[command(flatten)]
    pub chain: ChainArgs,

    /// Keep every step instead of 1000 evenly spaced ones.
    #[arg(long)]
    pub all_steps: bool,

    /// Export traces to CSV (`parameter,walker,step,value`).
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct CornerArgs {
    #[command(flatten)]
    pub chain: ChainArgs,

    /// Histogram bins per axis.
    #[arg(long, default_value_t = crate::figures::DEFAULT_CORNER_BINS)]
    pub bins: usize,

    /// Export diagonal histograms to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Directory receiving `chain.json`, `spectrum.csv`, `config.json` and exports.
    #[arg(long, default_value = "lyaplot-demo")]
    pub out_dir: PathBuf,

    #[arg(long, default_value_t = 7)]
    pub seed: u64,

    #[arg(long, default_value_t = 32)]
    pub walkers: usize,

    #[arg(long, default_value_t = 2000)]
    pub steps: usize,

    /// Spectrum bins.
    #[arg(long, default_value_t = 400)]
    pub bins: usize,

    #[arg(long, default_value_t = 500)]
    pub burn_in: usize,

    #[arg(long, default_value_t = 500)]
    pub max_draws: usize,
}

/// Parse `start:end` into a wavelength window.
pub fn parse_window(raw: &str) -> Result<(f64, f64), String> {
    let (a, b) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{raw}'"))?;
    let start = a.trim().parse::<f64>().map_err(|e| format!("bad start '{a}': {e}"))?;
    let end = b.trim().parse::<f64>().map_err(|e| format!("bad end '{b}': {e}"))?;
    if !(start.is_finite() && end.is_finite()) {
        return Err(format!("window bounds must be finite: '{raw}'"));
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_parse() {
        assert_eq!(parse_window("1215.5:1215.9").unwrap(), (1215.5, 1215.9));
        assert!(parse_window("1215.5").is_err());
        assert!(parse_window("a:1").is_err());
    }

    #[test]
    fn bands_command_parses_flags() {
        let cli = Cli::try_parse_from([
            "lyaplot",
            "bands",
            "--chain",
            "c.json",
            "--spectrum",
            "s.csv",
            "--burn-in",
            "100",
            "--mask",
            "1215.5:1215.9",
            "--mask",
            "1216.1:1216.2",
        ])
        .unwrap();
        let Command::Bands(args) = cli.command else {
            panic!("expected bands");
        };
        assert_eq!(args.chain.burn_in, 100);
        assert_eq!(args.chain.thin, 1);
        assert_eq!(args.mask.len(), 2);
        assert!(args.max_draws.is_none());
    }
}
