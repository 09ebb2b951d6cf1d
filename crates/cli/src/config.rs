// Copyright 2025 AMX Perf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Analysis configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, an
//! optional `amx-perf.toml`, `AMX_PERF_*` environment variables and finally
//! command-line flags.

use amx_perf_benchmarks::io::{CSV_FILE, RESULTS_DIR};
use amx_perf_visualizer::PLOT_BASE_NAME;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "amx-perf.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "AMX_PERF";

/// Settings of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Directory holding `times_MxKxN.ssv` files
    pub results_dir: PathBuf,
    /// CSV summary output
    pub csv_path: PathBuf,
    /// Base path of the chart images, without extension
    pub plot_base_name: PathBuf,
    /// Whether to render charts
    pub plot: bool,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from(RESULTS_DIR),
            csv_path: PathBuf::from(CSV_FILE),
            plot_base_name: PathBuf::from(PLOT_BASE_NAME),
            plot: true,
            log_level: "info".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a file and the process environment.
    ///
    /// An explicit `path` must exist; otherwise `amx-perf.toml` is used
    /// when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, Environment::with_prefix(ENV_PREFIX))
    }

    /// Load configuration from a file and the given environment source.
    pub fn load_with(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(CONFIG_FILE).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}
