// Copyright 2025 AMX Perf Contributors
// SPDX-License-Identifier: Apache-2.0

//! I/O operations for analysis outputs.
//!
//! This module provides the default locations used by a run and the
//! delimited export of the summary table.

use crate::metrics::DerivedMetrics;
use amx_perf_core::ResultBatch;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

/// Default directory holding the timing files.
pub const RESULTS_DIR: &str = "results";

/// Default summary export path.
pub const CSV_FILE: &str = "amx_results.csv";

/// Header row of the summary export.
pub const CSV_HEADER: &str =
    "Matrix_Size,M,K,N,Time_ms,GFLOPS,Matrix_Elements,FLOPs,Efficiency_Percent";

/// Write the summary table as CSV.
///
/// Rows follow batch order, not the performance ranking.
pub fn write_csv<W: Write>(
    out: &mut W,
    batch: &ResultBatch,
    metrics: &[DerivedMetrics],
) -> io::Result<()> {
    writeln!(out, "{}", CSV_HEADER)?;

    for (record, m) in batch.iter().zip(metrics) {
        let dims = record.dims();
        writeln!(
            out,
            "{},{},{},{},{:.6},{:.3},{},{},{:.2}",
            dims.label(),
            dims.m(),
            dims.k(),
            dims.n(),
            record.avg_time_ms(),
            m.gflops,
            m.elements,
            m.flops,
            m.efficiency_pct,
        )?;
    }

    Ok(())
}

/// Write the summary CSV to a file.
pub fn write_csv_file(
    path: impl AsRef<Path>,
    batch: &ResultBatch,
    metrics: &[DerivedMetrics],
) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_csv(&mut writer, batch, metrics)?;
    writer.flush()
}

/// Export the summary CSV, logging instead of failing.
///
/// Returns whether the file was written.
pub fn export_csv(path: impl AsRef<Path>, batch: &ResultBatch, metrics: &[DerivedMetrics]) -> bool {
    let path = path.as_ref();
    match write_csv_file(path, batch, metrics) {
        Ok(()) => {
            info!("Detailed results saved to {}", path.display());
            true
        }
        Err(e) => {
            warn!("Error saving CSV to {}: {}", path.display(), e);
            false
        }
    }
}
