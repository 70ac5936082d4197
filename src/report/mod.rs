//! Report aggregation: charts, tabular export, and summaries.
//!
//! A [`Series`] borrows the output of one benchmark runner. [`render`] turns
//! it into a [`Chart`] (PNG or SVG), [`write_csv`] into rows for downstream
//! plotting, and [`SeriesSummary::of`] into min/max/mean figures.

use crate::bench::{TimingSample, ZoomLevelLatency};
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::output::PngEncoder;
use crate::plots::{LineChart, LineSeries};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use trueno::Vector;

/// One benchmark series.
#[derive(Debug, Clone, Copy)]
pub enum Series<'a> {
    /// Ingestion timing: size vs. seconds.
    Timing(&'a [TimingSample]),
    /// Tile latency: zoom level vs. mean seconds.
    ZoomLatency(&'a [ZoomLevelLatency]),
}

impl Series<'_> {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Timing(s) => s.len(),
            Self::ZoomLatency(s) => s.len(),
        }
    }

    /// Returns true if the series has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(x, y)` points; a zoom level without samples has `y = NaN`.
    #[must_use]
    pub fn points(&self) -> Vec<(f64, f64)> {
        match self {
            Self::Timing(s) => s.iter().map(|t| (t.input_size as f64, t.elapsed_seconds)).collect(),
            Self::ZoomLatency(s) => {
                s.iter().map(|z| (f64::from(z.zoom_level), z.mean_latency_seconds)).collect()
            }
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::Timing(_) => "Ingestion time by catalog size",
            Self::ZoomLatency(_) => "Mean tile latency by zoom level",
        }
    }

    fn axis_labels(&self) -> (&'static str, &'static str) {
        match self {
            Self::Timing(_) => ("rows", "seconds"),
            Self::ZoomLatency(_) => ("zoom level", "mean latency (s)"),
        }
    }
}

/// A rendered benchmark chart.
#[derive(Debug, Clone)]
pub struct Chart {
    chart: LineChart,
}

impl Chart {
    /// Underlying line chart.
    #[must_use]
    pub fn line_chart(&self) -> &LineChart {
        &self.chart
    }

    /// Encode as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization or encoding fails.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        PngEncoder::to_bytes(&self.chart.to_framebuffer()?)
    }

    /// Write a PNG file.
    ///
    /// # Errors
    ///
    /// Returns an error if rasterization, encoding, or the write fails.
    pub fn write_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        PngEncoder::write_to_file(&self.chart.to_framebuffer()?, path)
    }

    /// Render as an SVG document.
    ///
    /// # Errors
    ///
    /// Returns an error if the chart layout fails.
    pub fn to_svg(&self) -> Result<String> {
        Ok(self.chart.to_svg()?.render())
    }

    /// Write an SVG file.
    ///
    /// # Errors
    ///
    /// Returns an error if the chart layout or the write fails.
    pub fn write_svg<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.chart.to_svg()?.write_to_file(path)
    }
}

/// Render a size-vs-time or zoom-vs-latency chart.
///
/// Zoom levels without samples keep their place on the x axis but get no
/// marker, and the line is broken around them.
///
/// # Errors
///
/// Returns [`Error::EmptySeries`] if the series has no entries.
pub fn render(series: Series<'_>) -> Result<Chart> {
    if series.is_empty() {
        return Err(Error::EmptySeries);
    }
    let (x_label, y_label) = series.axis_labels();
    let line = LineSeries::new(series.title()).points(series.points()).color(Rgba::series(0));
    let chart = LineChart::new().title(series.title()).labels(x_label, y_label).add_series(line).build()?;
    Ok(Chart { chart })
}

#[derive(Serialize)]
struct TimingRow {
    size: usize,
    elapsed_seconds: f64,
}

#[derive(Serialize)]
struct LatencyRow {
    zoom: u8,
    mean_latency: f64,
    sample_count: usize,
    failed_count: usize,
}

/// Write the series as CSV with a header row.
///
/// Columns are `size,elapsed_seconds` for timing and
/// `zoom,mean_latency,sample_count,failed_count` for latency. An empty series
/// writes nothing.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_csv<W: Write>(series: Series<'_>, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    match series {
        Series::Timing(samples) => {
            for s in samples {
                out.serialize(TimingRow { size: s.input_size, elapsed_seconds: s.elapsed_seconds })?;
            }
        }
        Series::ZoomLatency(levels) => {
            for z in levels {
                out.serialize(LatencyRow {
                    zoom: z.zoom_level,
                    mean_latency: z.mean_latency_seconds,
                    sample_count: z.sample_count,
                    failed_count: z.failed_count,
                })?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Write the series to a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_csv_file<P: AsRef<Path>>(series: Series<'_>, path: P) -> Result<()> {
    write_csv(series, BufWriter::new(File::create(path)?))
}

/// Min, max, and mean of a series' measured values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    /// Entries with a finite value.
    pub count: usize,
    /// Smallest value.
    pub min: f32,
    /// Largest value.
    pub max: f32,
    /// Mean value.
    pub mean: f32,
}

impl SeriesSummary {
    /// Summarize the finite `y` values, or `None` if there are none.
    #[must_use]
    pub fn of(series: Series<'_>) -> Option<Self> {
        let values: Vec<f32> =
            series.points().into_iter().map(|(_, y)| y).filter(|y| y.is_finite()).map(|y| y as f32).collect();
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let v = Vector::from_vec(values);
        Some(Self { count, min: v.min().ok()?, max: v.max().ok()?, mean: v.mean().ok()? })
    }
}
