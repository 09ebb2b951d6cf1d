// Copyright 2025 AMX Perf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Matrix-multiplication benchmark analysis for AMX Perf.
//!
//! This crate turns a directory of timing files into GFLOP/s metrics, a
//! ranked console table and a CSV summary.
//!
//! # Quick Start
//!
//! ```no_run
//! use amx_perf_benchmarks::{analyze, io};
//!
//! let analysis = analyze(io::RESULTS_DIR);
//! if !analysis.is_empty() {
//!     analysis.write_table(&mut std::io::stdout()).unwrap();
//!     analysis.export_csv(io::CSV_FILE);
//! }
//! ```
//!
//! # Modules
//!
//! - [`parser`] - Parsing of a single `times_MxKxN.ssv` file
//! - [`collector`] - Sorted collection of a results directory
//! - [`metrics`] - FLOPs, GFLOP/s, efficiency and batch statistics
//! - [`report`] - Ranked console table
//! - [`io`] - Default paths and CSV export

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod collector;
pub mod io;
pub mod metrics;
pub mod parser;
pub mod report;

pub use metrics::{BatchSummary, DerivedMetrics, LinearFit};

use amx_perf_core::ResultBatch;
use std::path::Path;

/// A collected batch and everything derived from it.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Records in filename order
    pub batch: ResultBatch,
    /// Metrics, index-aligned with `batch`
    pub metrics: Vec<DerivedMetrics>,
    /// Batch statistics, `None` when the batch is empty
    pub summary: Option<BatchSummary>,
}

impl Analysis {
    /// Derive metrics and statistics for an already collected batch.
    pub fn from_batch(batch: ResultBatch) -> Self {
        let metrics = metrics::derive(&batch);
        let summary = metrics::summarize(&batch, &metrics);
        Self {
            batch,
            metrics,
            summary,
        }
    }

    /// Whether there is nothing to report.
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Write the ranked table.
    pub fn write_table<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<()> {
        report::write_ranked_table(out, &self.batch, &self.metrics)
    }

    /// Export the CSV summary, returning whether it was written.
    pub fn export_csv(&self, path: impl AsRef<Path>) -> bool {
        io::export_csv(path, &self.batch, &self.metrics)
    }
}

/// Collect a results directory and derive its metrics.
///
/// This is the canonical entrypoint of the pipeline. It never fails: a
/// missing directory or unusable files simply produce an empty analysis.
pub fn analyze(results_dir: impl AsRef<Path>) -> Analysis {
    Analysis::from_batch(collector::collect(results_dir.as_ref()))
}
