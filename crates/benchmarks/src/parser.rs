// Copyright 2025 AMX Perf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Parsing of individual timing files.
//!
//! A timing file is named `times_<M>x<K>x<N>.ssv` and holds one execution
//! time in milliseconds per line. Problems are logged and the file is
//! skipped; nothing here aborts a batch.

use amx_perf_core::{BenchmarkRecord, MatrixDims, RecordError, SampleStats};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Suffix shared by all timing files.
pub const TIMING_SUFFIX: &str = ".ssv";

static FILENAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^times_(\d+)x(\d+)x(\d+)\.ssv$").expect("timing filename pattern is valid")
});

/// Reasons a timing file is not turned into a record.
#[derive(Debug, Error)]
pub enum ParseError {
    /// File name does not follow `times_MxKxN.ssv`
    #[error("{0} doesn't match expected pattern times_MxKxN.ssv")]
    MalformedFilename(String),

    /// File name matches but the dimensions are unusable
    #[error("Invalid dimensions in {file}: {source}")]
    InvalidDimensions {
        /// File name
        file: String,
        /// Why the dimensions were rejected
        #[source]
        source: RecordError,
    },

    /// No line parsed as a number
    #[error("No valid times found in {0}")]
    NoValidTimes(String),

    /// Samples average to a time that cannot be used: zero or less, not
    /// finite, or one whose GFLOP/s is infinite or zero
    #[error("Invalid average time in {file}: {source}")]
    InvalidMean {
        /// File path
        file: String,
        /// Why the average was rejected
        #[source]
        source: RecordError,
    },

    /// File could not be read
    #[error("Error reading {file}: {source}")]
    Io {
        /// File path
        file: String,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },
}

/// Result type for parser operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// A sample line that is neither blank nor a finite number.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid time value: {0}")]
pub struct SampleError(pub String);

/// Outcome of a successful parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    /// The record handed to the collector
    pub record: BenchmarkRecord,
    /// Statistics over the valid samples
    pub stats: SampleStats,
    /// Lines that were not blank and failed to parse
    pub skipped_lines: usize,
}

/// Extract `(M, K, N)` from a timing file name.
///
/// Returns `None` unless the whole name matches `times_<M>x<K>x<N>.ssv`
/// and every dimension fits in a `u64`.
pub fn parse_dims(file_name: &str) -> Option<(u64, u64, u64)> {
    let caps = FILENAME_PATTERN.captures(file_name)?;
    let m = caps[1].parse().ok()?;
    let k = caps[2].parse().ok()?;
    let n = caps[3].parse().ok()?;
    Some((m, k, n))
}

/// Parse a single sample line.
///
/// `Ok(None)` for a blank line, `Ok(Some(ms))` for a finite number.
pub fn parse_sample(line: &str) -> std::result::Result<Option<f64>, SampleError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(SampleError(trimmed.to_string())),
    }
}

/// Parse a timing file, returning the error instead of logging it.
///
/// Malformed sample lines are still logged one by one here since they do
/// not stop the file from parsing.
pub fn try_parse(path: &Path) -> Result<ParsedFile> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let (m, k, n) =
        parse_dims(&file_name).ok_or_else(|| ParseError::MalformedFilename(file_name.clone()))?;
    let dims = MatrixDims::new(m, k, n).map_err(|source| ParseError::InvalidDimensions {
        file: file_name.clone(),
        source,
    })?;

    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        file: path.display().to_string(),
        source,
    })?;

    let mut samples = Vec::new();
    let mut skipped_lines = 0;
    for line in content.lines() {
        match parse_sample(line) {
            Ok(Some(value)) => samples.push(value),
            Ok(None) => {}
            Err(err) => {
                warn!("{} in {}", err, path.display());
                skipped_lines += 1;
            }
        }
    }

    let stats = SampleStats::from_samples(&samples)
        .ok_or_else(|| ParseError::NoValidTimes(path.display().to_string()))?;
    let record =
        BenchmarkRecord::new(dims, stats.mean).map_err(|source| ParseError::InvalidMean {
            file: path.display().to_string(),
            source,
        })?;

    info!(
        "{}: {}×{}×{}, {} samples, avg={:.3}ms ±{:.3}ms",
        file_name, m, k, n, stats.count, stats.mean, stats.std_dev
    );

    Ok(ParsedFile {
        record,
        stats,
        skipped_lines,
    })
}

/// Parse a timing file.
///
/// Every failure is logged as a warning and reported as `None`, so callers
/// can keep going with the rest of the batch.
pub fn parse(path: &Path) -> Option<ParsedFile> {
    match try_parse(path) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!("{}", err);
            None
        }
    }
}
