// Copyright 2025 AMX Perf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark record types.
//!
//! This module provides the immutable [`BenchmarkRecord`] produced for every
//! successfully parsed timing file, and the ordered [`ResultBatch`] that
//! collects them for one analysis run.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised when a record would violate its invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    /// One of M, K or N is zero
    #[error("Matrix dimension must be positive: {m}x{k}x{n}")]
    ZeroDimension {
        /// Rows of the left operand
        m: u64,
        /// Shared inner dimension
        k: u64,
        /// Columns of the right operand
        n: u64,
    },

    /// 2*M*K*N does not fit in 64 bits
    #[error("FLOP count overflows for {m}x{k}x{n}")]
    FlopOverflow {
        /// Rows of the left operand
        m: u64,
        /// Shared inner dimension
        k: u64,
        /// Columns of the right operand
        n: u64,
    },

    /// Average time is zero or negative
    #[error("Average time must be positive, got {0} ms")]
    NonPositiveTime(f64),

    /// Average time is infinite or NaN
    #[error("Average time must be finite, got {0} ms")]
    NonFiniteTime(f64),

    /// Average time is so small or so large that GFLOP/s is infinite or zero
    #[error("Average time {avg_time_ms} ms gives no usable GFLOP/s for {dims}")]
    UnusableThroughput {
        /// Matrix shape of the record
        dims: MatrixDims,
        /// Rejected average time
        avg_time_ms: f64,
    },
}

/// Result type for record construction.
pub type Result<T> = std::result::Result<T, RecordError>;

/// Shape of one matrix multiplication: an `MxK` matrix times a `KxN` matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatrixDims {
    m: u64,
    k: u64,
    n: u64,
}

impl MatrixDims {
    /// Create validated dimensions.
    ///
    /// All three must be non-zero and `2*M*K*N` must fit in a `u64`, so
    /// [`flops`](Self::flops) and [`elements`](Self::elements) never overflow.
    pub fn new(m: u64, k: u64, n: u64) -> Result<Self> {
        if m == 0 || k == 0 || n == 0 {
            return Err(RecordError::ZeroDimension { m, k, n });
        }

        m.checked_mul(k)
            .and_then(|mk| mk.checked_mul(n))
            .and_then(|mkn| mkn.checked_mul(2))
            .ok_or(RecordError::FlopOverflow { m, k, n })?;

        Ok(Self { m, k, n })
    }

    /// Rows of the left operand.
    pub fn m(&self) -> u64 {
        self.m
    }

    /// Shared inner dimension.
    pub fn k(&self) -> u64 {
        self.k
    }

    /// Columns of the right operand.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// `M*K*N`, the size measure used on chart axes.
    pub fn elements(&self) -> u64 {
        self.m * self.k * self.n
    }

    /// Floating-point operations of one multiply: one mul and one add per
    /// inner-product term.
    pub fn flops(&self) -> u64 {
        2 * self.elements()
    }

    /// Whether `M == K == N`.
    pub fn is_square(&self) -> bool {
        self.m == self.k && self.k == self.n
    }

    /// Label in the `MxKxN` form used by every report.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MatrixDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.m, self.k, self.n)
    }
}

/// Average timing of one matrix shape.
///
/// Created once by the parser and read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    dims: MatrixDims,
    avg_time_ms: f64,
}

impl BenchmarkRecord {
    /// Create a record, rejecting averages that would make GFLOP/s infinite,
    /// zero or meaningless.
    ///
    /// After this check [`gflops`](Self::gflops) is finite and `> 0`.
    pub fn new(dims: MatrixDims, avg_time_ms: f64) -> Result<Self> {
        if !avg_time_ms.is_finite() {
            return Err(RecordError::NonFiniteTime(avg_time_ms));
        }
        if avg_time_ms <= 0.0 {
            return Err(RecordError::NonPositiveTime(avg_time_ms));
        }

        let gflops = gflops_for(dims, avg_time_ms);
        if !gflops.is_finite() || gflops <= 0.0 {
            return Err(RecordError::UnusableThroughput { dims, avg_time_ms });
        }
        Ok(Self { dims, avg_time_ms })
    }

    /// Billions of floating-point operations per second.
    pub fn gflops(&self) -> f64 {
        gflops_for(self.dims, self.avg_time_ms)
    }

    /// Matrix shape.
    pub fn dims(&self) -> MatrixDims {
        self.dims
    }

    /// Mean execution time in milliseconds. Always `> 0`.
    pub fn avg_time_ms(&self) -> f64 {
        self.avg_time_ms
    }
}

// time is in ms: flops / (ms * 1e-3) / 1e9
fn gflops_for(dims: MatrixDims, avg_time_ms: f64) -> f64 {
    dims.flops() as f64 / (avg_time_ms * 1e6)
}

/// Records of one analysis run, in ascending source-filename order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultBatch {
    records: Vec<BenchmarkRecord>,
}

impl ResultBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Callers push in the order the batch should keep.
    pub fn push(&mut self, record: BenchmarkRecord) {
        self.records.push(record);
    }

    /// All records in batch order.
    pub fn records(&self) -> &[BenchmarkRecord] {
        &self.records
    }

    /// Iterate over records in batch order.
    pub fn iter(&self) -> std::slice::Iter<'_, BenchmarkRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the run produced no usable records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<BenchmarkRecord> for ResultBatch {
    fn from_iter<I: IntoIterator<Item = BenchmarkRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ResultBatch {
    type Item = &'a BenchmarkRecord;
    type IntoIter = std::slice::Iter<'a, BenchmarkRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dims_derived_counts() {
        let dims = MatrixDims::new(64, 64, 64).unwrap();
        assert_eq!(dims.elements(), 262_144);
        assert_eq!(dims.flops(), 524_288);
        assert!(dims.is_square());
        assert_eq!(dims.label(), "64x64x64");
    }

    #[test]
    fn test_dims_reject_zero() {
        assert_eq!(
            MatrixDims::new(0, 4, 4),
            Err(RecordError::ZeroDimension { m: 0, k: 4, n: 4 })
        );
    }

    #[test]
    fn test_dims_reject_flop_overflow() {
        let big = u64::MAX / 2;
        assert!(matches!(
            MatrixDims::new(big, 2, 1),
            Err(RecordError::FlopOverflow { .. })
        ));
        // 2*M*K*N == u64::MAX - 1 still fits
        assert!(MatrixDims::new(big, 1, 1).is_ok());
    }

    #[test]
    fn test_rectangular_is_not_square() {
        let dims = MatrixDims::new(128, 256, 512).unwrap();
        assert!(!dims.is_square());
        assert_eq!(dims.to_string(), "128x256x512");
    }

    #[test]
    fn test_record_rejects_non_positive_time() {
        let dims = MatrixDims::new(2, 2, 2).unwrap();
        assert!(BenchmarkRecord::new(dims, 0.0).is_err());
        assert!(BenchmarkRecord::new(dims, -1.5).is_err());
        assert_eq!(
            BenchmarkRecord::new(dims, f64::NAN).map_err(|e| e.to_string()),
            Err("Average time must be finite, got NaN ms".to_string())
        );
        assert_eq!(
            BenchmarkRecord::new(dims, f64::INFINITY),
            Err(RecordError::NonFiniteTime(f64::INFINITY))
        );
        assert_eq!(BenchmarkRecord::new(dims, 0.25).unwrap().avg_time_ms(), 0.25);
    }

    #[test]
    fn test_record_rejects_unusable_throughput() {
        let dims = MatrixDims::new(1024, 1024, 1024).unwrap();

        // ms * 1e6 is subnormal, flops divided by it is infinite
        assert_eq!(
            BenchmarkRecord::new(dims, 1e-320),
            Err(RecordError::UnusableThroughput {
                dims,
                avg_time_ms: 1e-320
            })
        );
        // ms * 1e6 overflows, GFLOP/s rounds to zero
        assert!(matches!(
            BenchmarkRecord::new(dims, 1e308),
            Err(RecordError::UnusableThroughput { .. })
        ));
    }

    #[test]
    fn test_record_gflops() {
        let dims = MatrixDims::new(64, 64, 64).unwrap();
        let record = BenchmarkRecord::new(dims, 1.0).unwrap();
        assert!((record.gflops() - 0.524288).abs() < 1e-12);
    }

    #[test]
    fn test_batch_keeps_push_order() {
        let a = BenchmarkRecord::new(MatrixDims::new(8, 8, 8).unwrap(), 1.0).unwrap();
        let b = BenchmarkRecord::new(MatrixDims::new(4, 4, 4).unwrap(), 2.0).unwrap();

        let mut batch = ResultBatch::new();
        assert!(batch.is_empty());
        batch.push(a);
        batch.push(b);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records(), &[a, b]);
        let collected: ResultBatch = batch.iter().copied().collect();
        assert_eq!(collected, batch);
    }
}
