// Copyright 2025 AMX Perf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core data model for AMX Perf.
//!
//! A benchmark run leaves one timing file per matrix shape. Each file becomes
//! a [`BenchmarkRecord`] and the records of one run form a [`ResultBatch`].
//! Everything downstream (metrics, reports, charts) reads these types and
//! never mutates them.
//!
//! # Modules
//!
//! - [`record`] - Matrix dimensions, records and batches
//! - [`stats`] - Sample statistics for a single timing file

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod record;
pub mod stats;

pub use record::{BenchmarkRecord, MatrixDims, RecordError, ResultBatch};
pub use stats::SampleStats;
