// Copyright 2025 AMX Perf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Ranked console table.
//!
//! Records are ranked by GFLOP/s, best first. Ties keep their batch order and
//! still receive distinct ranks.

use crate::metrics::DerivedMetrics;
use amx_perf_core::{BenchmarkRecord, ResultBatch};
use std::io::{self, Write};

const RULE_WIDTH: usize = 90;

/// A record together with its metrics and 1-based rank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedRow {
    /// Position in the performance ranking, starting at 1
    pub rank: usize,
    /// The ranked record
    pub record: BenchmarkRecord,
    /// Its metrics
    pub metrics: DerivedMetrics,
}

/// Order records by GFLOP/s descending.
///
/// The sort is stable, so equal GFLOP/s keep batch order and the earlier
/// record gets the better rank.
pub fn ranked(batch: &ResultBatch, metrics: &[DerivedMetrics]) -> Vec<RankedRow> {
    let mut rows: Vec<(BenchmarkRecord, DerivedMetrics)> =
        batch.iter().copied().zip(metrics.iter().copied()).collect();
    rows.sort_by(|a, b| b.1.gflops.total_cmp(&a.1.gflops));

    rows.into_iter()
        .enumerate()
        .map(|(i, (record, metrics))| RankedRow {
            rank: i + 1,
            record,
            metrics,
        })
        .collect()
}

/// Rank label: medals for the podium, `#n` otherwise.
pub fn rank_label(rank: usize) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("#{}", n),
    }
}

/// Format an integer with `,` thousands separators.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Write the ranked performance table.
///
/// Writes nothing at all for an empty batch.
pub fn write_ranked_table<W: Write>(
    out: &mut W,
    batch: &ResultBatch,
    metrics: &[DerivedMetrics],
) -> io::Result<()> {
    if batch.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "DETAILED PERFORMANCE ANALYSIS")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(
        out,
        "{:<15} {:<12} {:<12} {:<12} {:<12} {:<8}",
        "Matrix", "Time (ms)", "GFLOP/s", "Elements", "Efficiency", "Rank"
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

    for row in ranked(batch, metrics) {
        writeln!(
            out,
            "{:<15} {:<12.3} {:<12.1} {:<12} {:<11.1}% {:<8}",
            row.record.dims().label(),
            row.record.avg_time_ms(),
            row.metrics.gflops,
            group_thousands(row.metrics.elements),
            row.metrics.efficiency_pct,
            rank_label(row.rank),
        )?;
    }

    Ok(())
}
