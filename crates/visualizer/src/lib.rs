// Copyright 2025 AMX Perf Contributors
// SPDX-License-Identifier: Apache-2.0

//! Performance charts for AMX Perf.
//!
//! Renders one figure with four panels from an analyzed batch:
//!
//! 1. execution time against matrix size (log-log) with a power-law trend,
//! 2. GFLOP/s against matrix size with the batch peak,
//! 3. square-matrix scaling, GFLOP/s and time against `N`,
//! 4. the GFLOP/s distribution with mean and median.
//!
//! The figure is written twice: `<base>.png` and `<base>.svg`. The SVG
//! always carries captions, axis descriptions and legends. The PNG only does
//! when the `ttf` feature provides system fonts; otherwise it holds the
//! plotted data alone.
//!
//! # Example
//!
//! ```no_run
//! use amx_perf_benchmarks::analyze;
//! use amx_perf_visualizer::{plot, PLOT_BASE_NAME};
//!
//! let analysis = analyze("results");
//! if let Some(files) = plot(&analysis, PLOT_BASE_NAME) {
//!     println!("{}", files.vector.display());
//! }
//! ```

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use amx_perf_benchmarks::metrics::{histogram, histogram_bins, HistogramBin};
use amx_perf_benchmarks::{Analysis, BatchSummary, DerivedMetrics};
use amx_perf_core::ResultBatch;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Default base name of the chart files.
pub const PLOT_BASE_NAME: &str = "amx_performance_analysis";

const IMAGE_SIZE: (u32, u32) = (1600, 1200);
const RASTER_TEXT: bool = cfg!(feature = "ttf");
const FONT: &str = "sans-serif";

const ORANGE: RGBColor = RGBColor(255, 165, 0);
const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const LIGHT_GRAY: RGBColor = RGBColor(235, 235, 235);

/// Errors that can occur while rendering charts.
#[derive(Debug, Error)]
pub enum VisualizeError {
    /// The batch has no records
    #[error("No results to plot")]
    EmptyBatch,

    /// Some value would put an axis out of floating-point range
    #[error("Cannot plot {0}: values must be positive and finite")]
    Unplottable(&'static str),

    /// A backend failed to draw or write an image
    #[error("Failed to render {path}: {message}")]
    Render {
        /// Image being written
        path: String,
        /// Backend error text
        message: String,
    },
}

/// Result type for chart rendering.
pub type Result<T> = std::result::Result<T, VisualizeError>;

type DrawResult<T, DB> =
    std::result::Result<T, DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Files written by a successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPlots {
    /// High-resolution PNG
    pub raster: PathBuf,
    /// SVG
    pub vector: PathBuf,
}

/// PNG and SVG paths for a base name. The suffix is appended, never
/// substituted, so dots in the base name survive.
pub fn output_paths(base: &Path) -> (PathBuf, PathBuf) {
    (with_suffix(base, ".png"), with_suffix(base, ".svg"))
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = base.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Render the four-panel figure for a batch.
pub fn render(
    batch: &ResultBatch,
    metrics: &[DerivedMetrics],
    summary: &BatchSummary,
    base: impl AsRef<Path>,
) -> Result<RenderedPlots> {
    if batch.is_empty() {
        return Err(VisualizeError::EmptyBatch);
    }

    let data = PlotData::new(batch, metrics, summary);
    if let Some(what) = data.unplottable() {
        return Err(VisualizeError::Unplottable(what));
    }
    let (raster, vector) = output_paths(base.as_ref());

    {
        let root = BitMapBackend::new(&raster, IMAGE_SIZE).into_drawing_area();
        draw_figure(&root, &data, RASTER_TEXT)
            .and_then(|_| root.present())
            .map_err(|e| render_error(&raster, e))?;
    }
    {
        let root = SVGBackend::new(&vector, IMAGE_SIZE).into_drawing_area();
        draw_figure(&root, &data, true)
            .and_then(|_| root.present())
            .map_err(|e| render_error(&vector, e))?;
    }

    Ok(RenderedPlots { raster, vector })
}

/// Render the figure for an analysis.
pub fn render_analysis(analysis: &Analysis, base: impl AsRef<Path>) -> Result<RenderedPlots> {
    let summary = analysis.summary.as_ref().ok_or(VisualizeError::EmptyBatch)?;
    render(&analysis.batch, &analysis.metrics, summary, base)
}

/// Render the figure, logging instead of failing.
pub fn plot(analysis: &Analysis, base: impl AsRef<Path>) -> Option<RenderedPlots> {
    match render_analysis(analysis, base) {
        Ok(files) => {
            info!("Plots saved as:");
            info!("   - {} (high resolution)", files.raster.display());
            info!("   - {} (vector format)", files.vector.display());
            if !RASTER_TEXT {
                info!("Raster image has no text; build with the `ttf` feature for labels");
            }
            Some(files)
        }
        Err(VisualizeError::EmptyBatch) => {
            warn!("No results to plot!");
            None
        }
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

fn render_error(path: &Path, err: impl fmt::Display) -> VisualizeError {
    VisualizeError::Render {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[derive(Debug, Clone, Copy)]
struct Point {
    elements: f64,
    time_ms: f64,
    gflops: f64,
}

struct PlotData<'a> {
    points: Vec<Point>,
    summary: &'a BatchSummary,
    histogram: Vec<HistogramBin>,
    gflops_bounds: (f64, f64),
    time_bounds: (f64, f64),
}

impl<'a> PlotData<'a> {
    fn new(batch: &ResultBatch, metrics: &[DerivedMetrics], summary: &'a BatchSummary) -> Self {
        let points: Vec<Point> = batch
            .iter()
            .zip(metrics)
            .map(|(r, m)| Point {
                elements: m.elements as f64,
                time_ms: r.avg_time_ms(),
                gflops: m.gflops,
            })
            .collect();

        let gflops: Vec<f64> = points.iter().map(|p| p.gflops).collect();
        let histogram = histogram(&gflops, histogram_bins(gflops.len()));

        Self {
            gflops_bounds: bounds(points.iter().map(|p| p.gflops)),
            time_bounds: bounds(points.iter().map(|p| p.time_ms)),
            points,
            summary,
            histogram,
        }
    }

    /// Name of the first quantity whose axis range would not be finite.
    fn unplottable(&self) -> Option<&'static str> {
        let usable = |v: f64| v.is_finite() && v > 0.0;

        if !self.points.iter().all(|p| usable(p.time_ms)) {
            return Some("execution times");
        }
        if !self.points.iter().all(|p| usable(p.gflops)) {
            return Some("GFLOP/s");
        }
        let (_, time_hi) = log_range(self.points.iter().map(|p| p.time_ms));
        if !time_hi.is_finite() {
            return Some("execution times");
        }
        let s = self.summary;
        if ![s.peak_gflops * 1.15, s.mean_gflops, s.median_gflops]
            .into_iter()
            .all(usable)
        {
            return Some("GFLOP/s summary");
        }
        if !self
            .histogram
            .iter()
            .all(|b| b.lower.is_finite() && b.upper.is_finite())
        {
            return Some("GFLOP/s distribution");
        }
        None
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Axis range for strictly positive data on a log scale.
fn log_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = bounds(values);
    (lo / 2.0, hi * 2.0)
}

/// Axis range with 5% padding, widened when all values are equal.
fn linear_range(lo: f64, hi: f64) -> (f64, f64) {
    let pad = if hi - lo > f64::EPSILON {
        (hi - lo) * 0.05
    } else {
        lo.abs().max(1.0) * 0.5
    };
    (lo - pad, hi + pad)
}

fn normalized(value: f64, (lo, hi): (f64, f64)) -> f64 {
    if hi - lo <= f64::EPSILON {
        0.5
    } else {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    }
}

/// Violet for low values through green and yellow to red for high values.
fn heat(t: f64) -> HSLColor {
    HSLColor(0.75 * (1.0 - t), 0.85, 0.45)
}

fn label_area(text: bool, size: u32) -> u32 {
    if text {
        size
    } else {
        0
    }
}

fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &PlotData<'_>,
    text: bool,
) -> DrawResult<(), DB> {
    root.fill(&WHITE)?;

    let panels = if text {
        root.titled("Intel AMX Performance Analysis", (FONT, 40))?
            .split_evenly((2, 2))
    } else {
        root.split_evenly((2, 2))
    };

    draw_time_vs_size(&panels[0], data, text)?;
    draw_gflops_vs_size(&panels[1], data, text)?;
    draw_square_scaling(&panels[2], data, text)?;
    draw_distribution(&panels[3], data, text)?;
    Ok(())
}

fn draw_time_vs_size<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    data: &PlotData<'_>,
    text: bool,
) -> DrawResult<(), DB> {
    let (x_lo, x_hi) = log_range(data.points.iter().map(|p| p.elements));
    let (y_lo, y_hi) = log_range(data.points.iter().map(|p| p.time_ms));

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(15)
        .x_label_area_size(label_area(text, 50))
        .y_label_area_size(label_area(text, 70));
    if text {
        builder.caption("Execution Time vs Matrix Size", (FONT, 24));
    }
    let mut chart =
        builder.build_cartesian_2d((x_lo..x_hi).log_scale(), (y_lo..y_hi).log_scale())?;

    if text {
        chart
            .configure_mesh()
            .x_desc("Matrix Size (MxKxN elements)")
            .y_desc("Execution Time (ms)")
            .light_line_style(BLACK.mix(0.05))
            .draw()?;
    }

    chart.draw_series(data.points.iter().map(|p| {
        let color = heat(normalized(p.gflops, data.gflops_bounds));
        Circle::new((p.elements, p.time_ms), 8, color.filled())
    }))?;
    chart.draw_series(
        data.points
            .iter()
            .map(|p| Circle::new((p.elements, p.time_ms), 8, BLACK.stroke_width(1))),
    )?;

    if let Some(fit) = data.summary.trend {
        let mut xs: Vec<f64> = data.points.iter().map(|p| p.elements).collect();
        xs.sort_by(f64::total_cmp);
        xs.dedup();

        let series = chart.draw_series(LineSeries::new(
            xs.into_iter().map(|x| (x, 10f64.powf(fit.at(x.log10())))),
            RED.stroke_width(2),
        ))?;
        if text {
            series
                .label(format!("Trend (slope={:.2})", fit.slope))
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }
    }

    Ok(())
}

fn draw_gflops_vs_size<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    data: &PlotData<'_>,
    text: bool,
) -> DrawResult<(), DB> {
    let (x_lo, x_hi) = log_range(data.points.iter().map(|p| p.elements));
    let peak = data.summary.peak_gflops;

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(15)
        .x_label_area_size(label_area(text, 50))
        .y_label_area_size(label_area(text, 70));
    if text {
        builder.caption("Performance vs Matrix Size", (FONT, 24));
    }
    let mut chart = builder.build_cartesian_2d((x_lo..x_hi).log_scale(), 0.0..peak * 1.15)?;

    if text {
        chart
            .configure_mesh()
            .x_desc("Matrix Size (MxKxN elements)")
            .y_desc("Performance (GFLOP/s)")
            .light_line_style(BLACK.mix(0.05))
            .draw()?;
    }

    chart.draw_series(data.points.iter().map(|p| {
        let color = heat(normalized(p.time_ms, data.time_bounds));
        Circle::new((p.elements, p.gflops), 8, color.filled())
    }))?;
    chart.draw_series(
        data.points
            .iter()
            .map(|p| Circle::new((p.elements, p.gflops), 8, BLACK.stroke_width(1))),
    )?;

    let peak_line = chart.draw_series(LineSeries::new(
        vec![(x_lo, peak), (x_hi, peak)],
        RED.mix(0.7).stroke_width(2),
    ))?;
    if text {
        peak_line
            .label(format!("Peak: {:.1} GFLOP/s", peak))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    Ok(())
}

fn draw_square_scaling<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    data: &PlotData<'_>,
    text: bool,
) -> DrawResult<(), DB> {
    let series = &data.summary.square_series;

    if series.is_empty() {
        area.fill(&LIGHT_GRAY)?;
        if text {
            let (w, h) = area.dim_in_pixel();
            let style = TextStyle::from((FONT, 26).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
            area.draw(&Text::new(
                "No Square Matrices Found (M=K=N)",
                ((w / 2) as i32, (h / 2) as i32),
                style,
            ))?;
        }
        return Ok(());
    }

    let (n_lo, n_hi) = bounds(series.iter().map(|p| p.n as f64));
    let (x_lo, x_hi) = linear_range(n_lo, n_hi);
    let (_, g_hi) = bounds(series.iter().map(|p| p.gflops));
    let (_, t_hi) = bounds(series.iter().map(|p| p.time_ms));

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(15)
        .x_label_area_size(label_area(text, 50))
        .y_label_area_size(label_area(text, 70))
        .right_y_label_area_size(label_area(text, 70));
    if text {
        builder.caption("Square Matrix Performance Scaling", (FONT, 24));
    }
    let mut chart = builder
        .build_cartesian_2d(x_lo..x_hi, 0.0..g_hi * 1.15)?
        .set_secondary_coord(x_lo..x_hi, 0.0..t_hi * 1.15);

    if text {
        chart
            .configure_mesh()
            .x_desc("Matrix Dimension (N for NxNxN)")
            .y_desc("Performance (GFLOP/s)")
            .light_line_style(BLACK.mix(0.05))
            .draw()?;
        chart
            .configure_secondary_axes()
            .y_desc("Execution Time (ms)")
            .draw()?;
    }

    let perf = chart.draw_series(LineSeries::new(
        series.iter().map(|p| (p.n as f64, p.gflops)),
        BLUE.stroke_width(3),
    ))?;
    if text {
        perf.label("Performance (GFLOP/s)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(3)));
    }
    chart.draw_series(
        series
            .iter()
            .map(|p| Circle::new((p.n as f64, p.gflops), 7, BLUE.filled())),
    )?;

    let time = chart.draw_secondary_series(LineSeries::new(
        series.iter().map(|p| (p.n as f64, p.time_ms)),
        RED.mix(0.8).stroke_width(2),
    ))?;
    if text {
        time.label("Time (ms)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
    }
    chart.draw_secondary_series(
        series
            .iter()
            .map(|p| Circle::new((p.n as f64, p.time_ms), 5, RED.filled())),
    )?;

    if text {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    Ok(())
}

fn draw_distribution<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    data: &PlotData<'_>,
    text: bool,
) -> DrawResult<(), DB> {
    let bins = &data.histogram;
    let (x_lo, x_hi) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.lower, last.upper),
        _ => return Ok(()),
    };
    let y_hi = bins.iter().map(|b| b.count).max().unwrap_or(0) as f64 + 1.0;

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(15)
        .x_label_area_size(label_area(text, 50))
        .y_label_area_size(label_area(text, 70));
    if text {
        builder.caption("Performance Distribution", (FONT, 24));
    }
    let mut chart = builder.build_cartesian_2d(x_lo..x_hi, 0.0..y_hi)?;

    if text {
        chart
            .configure_mesh()
            .x_desc("Performance (GFLOP/s)")
            .y_desc("Number of Matrices")
            .light_line_style(BLACK.mix(0.05))
            .draw()?;
    }

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new(
            [(b.lower, 0.0), (b.upper, b.count as f64)],
            SKY_BLUE.mix(0.7).filled(),
        )
    }))?;
    chart.draw_series(bins.iter().filter(|b| b.count > 0).map(|b| {
        Rectangle::new(
            [(b.lower, 0.0), (b.upper, b.count as f64)],
            BLACK.stroke_width(1),
        )
    }))?;

    let mean = data.summary.mean_gflops;
    let median = data.summary.median_gflops;
    let mean_line = chart.draw_series(LineSeries::new(
        vec![(mean, 0.0), (mean, y_hi)],
        RED.stroke_width(2),
    ))?;
    if text {
        mean_line
            .label(format!("Mean: {:.1}", mean))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
    }
    let median_line = chart.draw_series(LineSeries::new(
        vec![(median, 0.0), (median, y_hi)],
        ORANGE.stroke_width(2),
    ))?;
    if text {
        median_line
            .label(format!("Median: {:.1}", median))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ORANGE.stroke_width(2)));
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    Ok(())
}
