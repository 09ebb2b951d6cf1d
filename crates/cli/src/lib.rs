// Copyright 2025 AMX Perf Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI for AMX Perf.
//!
//! This crate provides the `amx-perf` command. Without arguments it analyzes
//! the `results/` directory, prints the ranked table, renders the charts and
//! writes `amx_results.csv`.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;

use crate::config::AnalysisConfig;
use amx_perf_benchmarks::{analyze, collector};
use amx_perf_visualizer::RenderedPlots;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// AMX Perf CLI.
#[derive(Parser, Debug)]
#[command(name = "amx-perf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (default: run).
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (default: amx-perf.toml when present).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze benchmark results.
    ///
    /// Parses every times_MxKxN.ssv file of the results directory, prints
    /// the ranked performance table, renders the charts and exports the CSV
    /// summary.
    Run(RunArgs),

    /// Show the effective configuration.
    Status {
        /// Also list the timing files that would be analyzed.
        #[arg(short, long)]
        detailed: bool,
    },
}

/// Overrides for an analysis run.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Directory holding the timing files.
    #[arg(short, long)]
    pub results_dir: Option<PathBuf>,

    /// CSV summary output path.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Base path of the chart images, without extension.
    #[arg(long)]
    pub plot_base: Option<PathBuf>,

    /// Skip chart rendering.
    #[arg(long)]
    pub no_plot: bool,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RunArgs {
    /// Apply flag overrides on top of a loaded configuration.
    pub fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(dir) = &self.results_dir {
            config.results_dir = dir.clone();
        }
        if let Some(csv) = &self.csv {
            config.csv_path = csv.clone();
        }
        if let Some(base) = &self.plot_base {
            config.plot_base_name = base.clone();
        }
        if self.no_plot {
            config.plot = false;
        }
        if self.verbose {
            config.log_level = "debug".to_string();
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records analyzed
    pub records: usize,
    /// Whether the CSV summary was written
    pub csv_written: bool,
    /// Chart files, when rendered
    pub plots: Option<RenderedPlots>,
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Analyze the configured results directory.
///
/// The ranked table goes to `out`; everything else is logged. An empty
/// batch is not an error: nothing is written and an empty summary returned.
pub fn run_analysis<W: Write>(config: &AnalysisConfig, out: &mut W) -> anyhow::Result<RunSummary> {
    info!("Analyzing Intel AMX benchmark results...");

    let analysis = analyze(&config.results_dir);
    if analysis.is_empty() {
        warn!("No valid results found!");
        warn!(
            "Make sure you have .ssv files in the '{}/' directory",
            config.results_dir.display()
        );
        return Ok(RunSummary::default());
    }

    analysis
        .write_table(out)
        .and_then(|_| out.flush())
        .context("failed to write results table")?;

    let plots = if config.plot {
        info!("Generating performance analysis plots...");
        amx_perf_visualizer::plot(&analysis, &config.plot_base_name)
    } else {
        None
    };

    let csv_written = analysis.export_csv(&config.csv_path);

    info!("Analysis complete!");
    if csv_written {
        info!("Check '{}' for detailed data", config.csv_path.display());
    }

    Ok(RunSummary {
        records: analysis.batch.len(),
        csv_written,
        plots,
    })
}

fn print_status(config: &AnalysisConfig, detailed: bool) {
    println!("AMX Perf Benchmark Analysis");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("\nConfiguration:");
    println!("  - results directory: {}", config.results_dir.display());
    println!("  - CSV summary:       {}", config.csv_path.display());
    println!("  - plot base name:    {}", config.plot_base_name.display());
    println!("  - plots enabled:     {}", config.plot);
    println!("  - log level:         {}", config.log_level);

    if detailed {
        match collector::candidate_files(&config.results_dir) {
            Ok(files) => {
                println!("\nTiming files ({}):", files.len());
                for file in files {
                    println!("  - {}", file.display());
                }
            }
            Err(e) => println!("\nCannot list {}: {}", config.results_dir.display(), e),
        }
    }
}

/// Run the CLI with the process arguments.
///
/// # Returns
///
/// Returns `Ok(())` on success, including runs that found no data. Only an
/// unusable configuration or a broken stdout is an error.
pub fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AnalysisConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command.unwrap_or_else(|| Commands::Run(RunArgs::default())) {
        Commands::Run(args) => {
            args.apply(&mut config);
            init_logging(&config.log_level);

            let stdout = io::stdout();
            let mut out = stdout.lock();
            run_analysis(&config, &mut out)?;
            Ok(())
        }
        Commands::Status { detailed } => {
            print_status(&config, detailed);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> AnalysisConfig {
        AnalysisConfig {
            results_dir: dir.path().join("results"),
            csv_path: dir.path().join("amx_results.csv"),
            plot_base_name: dir.path().join("amx_performance_analysis"),
            plot: false,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_no_arguments_means_default_run() {
        let cli = Cli::try_parse_from(["amx-perf"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_run_flags_override_config() {
        let cli = Cli::try_parse_from([
            "amx-perf",
            "run",
            "--results-dir",
            "bench/out",
            "--csv",
            "summary.csv",
            "--no-plot",
        ])
        .unwrap();

        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run command");
        };
        let mut config = AnalysisConfig::default();
        args.apply(&mut config);

        assert_eq!(config.results_dir, PathBuf::from("bench/out"));
        assert_eq!(config.csv_path, PathBuf::from("summary.csv"));
        assert!(!config.plot);
        assert_eq!(config.plot_base_name, PathBuf::from("amx_performance_analysis"));
    }

    #[test]
    fn test_status_parses() {
        let cli = Cli::try_parse_from(["amx-perf", "status", "--detailed"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Status { detailed: true })));
    }

    #[test]
    fn test_run_without_results_is_clean_no_op() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let mut out = Vec::new();
        let summary = run_analysis(&config, &mut out).unwrap();

        assert_eq!(summary, RunSummary::default());
        assert!(out.is_empty());
        assert!(!config.csv_path.exists());
    }

    #[test]
    fn test_run_writes_table_and_csv() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        fs::create_dir(&config.results_dir).unwrap();
        fs::write(config.results_dir.join("times_64x64x64.ssv"), "1.0\n").unwrap();
        fs::write(config.results_dir.join("times_32x32x32.ssv"), "0.5\nbad\n").unwrap();

        let mut out = Vec::new();
        let summary = run_analysis(&config, &mut out).unwrap();

        assert_eq!(summary.records, 2);
        assert!(summary.csv_written);
        assert!(summary.plots.is_none());

        let table = String::from_utf8(out).unwrap();
        assert!(table.contains("DETAILED PERFORMANCE ANALYSIS"));
        assert!(table.contains("64x64x64"));

        let csv = fs::read_to_string(&config.csv_path).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }
}
