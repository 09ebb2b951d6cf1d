// Copyright 2025 AMX Perf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Derived performance metrics.
//!
//! Everything here is a pure function of a [`ResultBatch`]. Efficiency is
//! relative to the best GFLOP/s of the same batch, so metrics are always
//! recomputed for the batch at hand.

use amx_perf_core::{BenchmarkRecord, ResultBatch};

/// Metrics of one record within its batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    /// `2*M*K*N`
    pub flops: u64,
    /// Billions of floating-point operations per second
    pub gflops: f64,
    /// `M*K*N`
    pub elements: u64,
    /// GFLOP/s as a percentage of the batch maximum
    pub efficiency_pct: f64,
}

impl DerivedMetrics {
    /// Per-record metrics with efficiency not yet known (set to 0).
    pub fn for_record(record: &BenchmarkRecord) -> Self {
        let dims = record.dims();
        let flops = dims.flops();
        Self {
            flops,
            gflops: record.gflops(),
            elements: dims.elements(),
            efficiency_pct: 0.0,
        }
    }
}

/// Derive metrics for every record, index-aligned with the batch.
///
/// An empty batch yields an empty vector.
pub fn derive(batch: &ResultBatch) -> Vec<DerivedMetrics> {
    let mut metrics: Vec<DerivedMetrics> = batch.iter().map(DerivedMetrics::for_record).collect();

    let max_gflops = metrics
        .iter()
        .map(|m| m.gflops)
        .fold(f64::NEG_INFINITY, f64::max);

    for m in &mut metrics {
        m.efficiency_pct = m.gflops / max_gflops * 100.0;
    }

    metrics
}

/// One point of the square-matrix scaling curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquarePoint {
    /// Matrix dimension (`N` for `NxNxN`)
    pub n: u64,
    /// Achieved GFLOP/s
    pub gflops: f64,
    /// Mean execution time in ms
    pub time_ms: f64,
}

/// Batch-wide statistics shown on the charts.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    /// Highest GFLOP/s in the batch
    pub peak_gflops: f64,
    /// Mean GFLOP/s
    pub mean_gflops: f64,
    /// Median GFLOP/s
    pub median_gflops: f64,
    /// Fit of `log10(time)` against `log10(elements)`
    pub trend: Option<LinearFit>,
    /// Square records ordered by dimension
    pub square_series: Vec<SquarePoint>,
}

/// Summarize a batch and its metrics. Returns `None` for an empty batch.
pub fn summarize(batch: &ResultBatch, metrics: &[DerivedMetrics]) -> Option<BatchSummary> {
    if batch.is_empty() {
        return None;
    }

    let gflops: Vec<f64> = metrics.iter().map(|m| m.gflops).collect();
    let peak_gflops = gflops.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean_gflops = gflops.iter().sum::<f64>() / gflops.len() as f64;

    let points: Vec<(f64, f64)> = batch
        .iter()
        .zip(metrics)
        .map(|(r, m)| ((m.elements as f64).log10(), r.avg_time_ms().log10()))
        .collect();

    let mut square_series: Vec<SquarePoint> = batch
        .iter()
        .zip(metrics)
        .filter(|(r, _)| r.dims().is_square())
        .map(|(r, m)| SquarePoint {
            n: r.dims().n(),
            gflops: m.gflops,
            time_ms: r.avg_time_ms(),
        })
        .collect();
    square_series.sort_by_key(|p| p.n);

    Some(BatchSummary {
        peak_gflops,
        mean_gflops,
        median_gflops: median(&gflops),
        trend: linear_fit(&points),
        square_series,
    })
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Slope
    pub slope: f64,
    /// Value at `x = 0`
    pub intercept: f64,
}

impl LinearFit {
    /// Evaluate the line at `x`.
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Least-squares fit of `y` over `x`.
///
/// `None` when there are fewer than two points or all `x` are equal.
pub fn linear_fit(points: &[(f64, f64)]) -> Option<LinearFit> {
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (cov, var) = points.iter().fold((0.0, 0.0), |(cov, var), (x, y)| {
        let dx = x - mean_x;
        (cov + dx * (y - mean_y), var + dx * dx)
    });

    if var <= f64::EPSILON {
        return None;
    }
    let slope = cov / var;
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// A histogram bucket over `[lower, upper)`; the last bucket includes its
/// upper edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    /// Inclusive lower edge
    pub lower: f64,
    /// Upper edge
    pub upper: f64,
    /// Values that fell into the bucket
    pub count: usize,
}

/// Bucket values into `bins` equal-width bins spanning their range.
///
/// When every value is equal the range is widened by 0.5 on each side.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi - lo <= f64::EPSILON {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + width * i as f64,
            upper: lo + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Bin count used for the GFLOP/s distribution: one per record, at most 20.
pub fn histogram_bins(records: usize) -> usize {
    records.min(20)
}

#[cfg(test)]
mod tests {
    use super::*;
    use amx_perf_core::MatrixDims;

    fn record(m: u64, k: u64, n: u64, time: f64) -> BenchmarkRecord {
        BenchmarkRecord::new(MatrixDims::new(m, k, n).unwrap(), time).unwrap()
    }

    #[test]
    fn test_gflops_for_64_cubed() {
        let batch: ResultBatch = vec![record(64, 64, 64, 1.0)].into_iter().collect();
        let metrics = derive(&batch);

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].flops, 524_288);
        assert_eq!(metrics[0].elements, 262_144);
        assert!((metrics[0].gflops - 0.524288).abs() < 1e-12);
        assert_eq!(metrics[0].efficiency_pct, 100.0);
    }

    #[test]
    fn test_extreme_times_keep_efficiency_finite() {
        let dims = MatrixDims::new(1024, 1024, 1024).unwrap();
        assert!(BenchmarkRecord::new(dims, 1e-320).is_err());
        assert!(BenchmarkRecord::new(dims, 1e308).is_err());

        let batch: ResultBatch = vec![
            record(1024, 1024, 1024, 1e-300),
            record(64, 64, 64, 1.0),
            record(64, 64, 64, 1e290),
        ]
        .into_iter()
        .collect();
        let metrics = derive(&batch);

        assert!(metrics.iter().all(|m| m.gflops.is_finite() && m.gflops > 0.0));
        assert!(metrics.iter().all(|m| m.efficiency_pct.is_finite()));
        assert_eq!(metrics[0].efficiency_pct, 100.0);
        assert!(summarize(&batch, &metrics).unwrap().peak_gflops.is_finite());
    }

    #[test]
    fn test_empty_batch() {
        let batch = ResultBatch::new();
        assert!(derive(&batch).is_empty());
        assert!(summarize(&batch, &[]).is_none());
    }

    #[test]
    fn test_efficiency_relative_to_batch_peak() {
        let batch: ResultBatch = vec![
            record(100, 100, 100, 2.0), // 1.0 GFLOP/s
            record(100, 100, 100, 1.0), // 2.0 GFLOP/s
            record(100, 100, 100, 4.0), // 0.5 GFLOP/s
        ]
        .into_iter()
        .collect();

        let metrics = derive(&batch);
        let eff: Vec<f64> = metrics.iter().map(|m| m.efficiency_pct).collect();
        assert_eq!(eff, vec![50.0, 100.0, 25.0]);
    }

    #[test]
    fn test_top_efficiency_is_exactly_100() {
        let batch: ResultBatch = vec![
            record(37, 91, 13, 0.731),
            record(512, 512, 512, 3.3),
            record(1000, 3, 77, 0.0123),
        ]
        .into_iter()
        .collect();

        let metrics = derive(&batch);
        let top = metrics
            .iter()
            .max_by(|a, b| a.gflops.total_cmp(&b.gflops))
            .unwrap();
        assert_eq!(top.efficiency_pct, 100.0);
        assert!(metrics.iter().all(|m| m.efficiency_pct <= 100.0));
    }

    #[test]
    fn test_summary_statistics() {
        let batch: ResultBatch = vec![
            record(100, 100, 100, 2.0), // 1.0
            record(100, 100, 100, 1.0), // 2.0
            record(100, 100, 100, 4.0), // 0.5
            record(100, 100, 100, 0.5), // 4.0
        ]
        .into_iter()
        .collect();
        let metrics = derive(&batch);
        let summary = summarize(&batch, &metrics).unwrap();

        assert_eq!(summary.peak_gflops, 4.0);
        assert!((summary.mean_gflops - 1.875).abs() < 1e-12);
        assert!((summary.median_gflops - 1.5).abs() < 1e-12);
        // All element counts equal: no trend
        assert_eq!(summary.trend, None);
    }

    #[test]
    fn test_trend_slope_of_cubic_scaling() {
        // time proportional to elements -> slope 1 in log-log space
        let batch: ResultBatch = vec![
            record(10, 10, 10, 1.0),
            record(20, 20, 20, 8.0),
            record(40, 40, 40, 64.0),
        ]
        .into_iter()
        .collect();
        let metrics = derive(&batch);
        let summary = summarize(&batch, &metrics).unwrap();

        let trend = summary.trend.unwrap();
        assert!((trend.slope - 1.0).abs() < 1e-9);
        // log10(time) = log10(elements) - 3
        assert!((trend.intercept + 3.0).abs() < 1e-9);
        assert!((trend.at(3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_square_series_sorted_by_dimension() {
        let batch: ResultBatch = vec![
            record(512, 512, 512, 4.0),
            record(64, 128, 64, 1.0),
            record(128, 128, 128, 1.0),
        ]
        .into_iter()
        .collect();
        let metrics = derive(&batch);
        let summary = summarize(&batch, &metrics).unwrap();

        let ns: Vec<u64> = summary.square_series.iter().map(|p| p.n).collect();
        assert_eq!(ns, vec![128, 512]);
        assert_eq!(summary.square_series[1].time_ms, 4.0);
    }

    #[test]
    fn test_histogram_counts() {
        let values = [1.0, 2.0, 2.5, 4.0, 5.0];
        let bins = histogram(&values, 4);

        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].lower, 1.0);
        assert_eq!(bins[3].upper, 5.0);
        // max value lands in the last bin
        assert_eq!(bins[3].count, 2);
    }

    #[test]
    fn test_histogram_single_value() {
        let bins = histogram(&[3.0], histogram_bins(1));
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 1);
        assert!(bins[0].lower < 3.0 && bins[0].upper > 3.0);
    }

    #[test]
    fn test_histogram_bins_capped() {
        assert_eq!(histogram_bins(3), 3);
        assert_eq!(histogram_bins(50), 20);
    }
}
