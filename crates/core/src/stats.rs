// Copyright 2025 AMX Perf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Summary statistics over the samples of one timing file.

use serde::{Deserialize, Serialize};

/// Mean and spread of the valid samples in a timing file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    /// Number of valid samples
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

impl SampleStats {
    /// Compute statistics from a slice of samples.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;

        // Population variance: divide by n, not n - 1
        let variance = samples
            .iter()
            .map(|x| {
                let diff = x - mean;
                diff * diff
            })
            .sum::<f64>()
            / n;

        Some(Self {
            count: samples.len(),
            mean,
            std_dev: variance.sqrt(),
        })
    }
}
