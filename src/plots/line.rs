//! Line chart with markers, grid, and gaps.
//!
//! A point whose `y` is not finite breaks the line: the segments on either
//! side are drawn separately and no marker is placed. The x axis still covers
//! every point, so a gap stays visible as a gap.

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::output::{SvgEncoder, TextAnchor};
use crate::render::{draw_circle, draw_hline, draw_line, draw_vline};
use crate::scale::{LinearScale, Scale};

const TICK_COUNT: usize = 5;
const FONT_SIZE: f64 = 12.0;

// ============================================================================
// Line Series
// ============================================================================

/// A data series for line charts.
#[derive(Debug, Clone)]
pub struct LineSeries {
    /// Series name/label.
    pub name: String,
    /// `(x, y)` points in draw order.
    pub points: Vec<(f64, f64)>,
    /// Line and marker color.
    pub color: Rgba,
}

impl LineSeries {
    /// Create an empty series.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), points: Vec::new(), color: Rgba::series(0) }
    }

    /// Set the points.
    #[must_use]
    pub fn points(mut self, points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        self.points = points.into_iter().collect();
        self
    }

    /// Set the color.
    #[must_use]
    pub fn color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Maximal runs of consecutive points with finite `y`.
    fn runs(&self) -> impl Iterator<Item = &[(f64, f64)]> {
        self.points.split(|(_, y)| !y.is_finite()).filter(|run| !run.is_empty())
    }
}

// ============================================================================
// Line Chart
// ============================================================================

/// Builder for line charts rendered to a framebuffer or SVG.
#[derive(Debug, Clone)]
pub struct LineChart {
    series: Vec<LineSeries>,
    width: u32,
    height: u32,
    margin: u32,
    title: Option<String>,
    x_label: Option<String>,
    y_label: Option<String>,
    marker_radius: u32,
    line_width: u32,
}

impl Default for LineChart {
    fn default() -> Self {
        Self::new()
    }
}

/// Pixel mapping shared by both outputs.
struct Layout {
    x: LinearScale,
    y: LinearScale,
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl LineChart {
    /// Create a new line chart builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            series: Vec::new(),
            width: 800,
            height: 600,
            margin: 60,
            title: None,
            x_label: None,
            y_label: None,
            marker_radius: 4,
            line_width: 2,
        }
    }

    /// Add a data series.
    #[must_use]
    pub fn add_series(mut self, series: LineSeries) -> Self {
        self.series.push(series);
        self
    }

    /// Set the output dimensions.
    #[must_use]
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the margin around the plot area.
    #[must_use]
    pub fn margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    /// Set the chart title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the axis labels.
    #[must_use]
    pub fn labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = Some(x.into());
        self.y_label = Some(y.into());
        self
    }

    /// Set the marker radius in pixels (0 hides markers).
    #[must_use]
    pub fn marker_radius(mut self, radius: u32) -> Self {
        self.marker_radius = radius;
        self
    }

    /// Output width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Output height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Series added so far.
    #[must_use]
    pub fn series(&self) -> &[LineSeries] {
        &self.series
    }

    /// Validate the chart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySeries`] if there is no point to place on the x
    /// axis, or [`Error::InvalidDimensions`] if the margins leave no plot area.
    pub fn build(self) -> Result<Self> {
        if self.series.iter().all(|s| s.points.is_empty()) {
            return Err(Error::EmptySeries);
        }
        if self.width <= 2 * self.margin || self.height <= 2 * self.margin {
            return Err(Error::InvalidDimensions { width: self.width, height: self.height });
        }
        Ok(self)
    }

    fn layout(&self) -> Result<Layout> {
        let left = f64::from(self.margin);
        let right = f64::from(self.width.saturating_sub(self.margin));
        let top = f64::from(self.margin);
        let bottom = f64::from(self.height.saturating_sub(self.margin));

        let xs = self.series.iter().flat_map(|s| s.points.iter().map(|p| p.0));
        let ys = self.series.iter().flat_map(|s| s.points.iter().map(|p| p.1));

        let x = LinearScale::covering(xs, (left, right)).ok_or(Error::EmptySeries)?;
        let y = match LinearScale::covering(ys, (bottom, top)) {
            Some(scale) => scale,
            None => LinearScale::new((0.0, 1.0), (bottom, top))?,
        };

        Ok(Layout { x, y, left, right, top, bottom })
    }

    /// Rasterize into a new white framebuffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the chart has no points or invalid dimensions.
    pub fn to_framebuffer(&self) -> Result<Framebuffer> {
        let mut fb = Framebuffer::new(self.width, self.height)?;
        fb.clear(Rgba::WHITE);
        self.render(&mut fb)?;
        Ok(fb)
    }

    /// Rasterize onto `fb`.
    ///
    /// # Errors
    ///
    /// Returns an error if the chart has no points.
    pub fn render(&self, fb: &mut Framebuffer) -> Result<()> {
        let l = self.layout()?;
        let px = |v: f64| v.round() as i32;

        for t in l.y.ticks(TICK_COUNT) {
            draw_hline(fb, px(l.left), px(l.right), px(l.y.scale(t)), Rgba::GRID);
        }
        for t in l.x.ticks(TICK_COUNT) {
            draw_vline(fb, px(l.x.scale(t)), px(l.top), px(l.bottom), Rgba::GRID);
        }
        draw_hline(fb, px(l.left), px(l.right), px(l.bottom), Rgba::AXIS);
        draw_vline(fb, px(l.left), px(l.top), px(l.bottom), Rgba::AXIS);

        for series in &self.series {
            for run in series.runs() {
                let screen: Vec<(i32, i32)> =
                    run.iter().map(|&(x, y)| (px(l.x.scale(x)), px(l.y.scale(y)))).collect();
                for pair in screen.windows(2) {
                    draw_line(fb, pair[0], pair[1], self.line_width, series.color);
                }
                if self.marker_radius > 0 {
                    for &(x, y) in &screen {
                        draw_circle(fb, x, y, self.marker_radius as i32, series.color);
                    }
                }
            }
        }

        Ok(())
    }

    /// Build the vector version, including tick labels and titles.
    ///
    /// # Errors
    ///
    /// Returns an error if the chart has no points.
    pub fn to_svg(&self) -> Result<SvgEncoder> {
        let l = self.layout()?;
        let mut svg = SvgEncoder::new(self.width, self.height);

        for t in l.y.ticks(TICK_COUNT) {
            let y = l.y.scale(t);
            svg = svg
                .line((l.left, y), (l.right, y), Rgba::GRID, 1.0)
                .text((l.left - 6.0, y + FONT_SIZE / 3.0), &format_tick(t), FONT_SIZE, TextAnchor::End);
        }
        for t in l.x.ticks(TICK_COUNT) {
            let x = l.x.scale(t);
            svg = svg
                .line((x, l.top), (x, l.bottom), Rgba::GRID, 1.0)
                .text((x, l.bottom + FONT_SIZE + 4.0), &format_tick(t), FONT_SIZE, TextAnchor::Middle);
        }
        svg = svg
            .line((l.left, l.bottom), (l.right, l.bottom), Rgba::AXIS, 1.0)
            .line((l.left, l.top), (l.left, l.bottom), Rgba::AXIS, 1.0);

        let mid_x = (l.left + l.right) / 2.0;
        if let Some(title) = &self.title {
            svg = svg.text((mid_x, l.top / 2.0), title, FONT_SIZE * 1.4, TextAnchor::Middle);
        }
        if let Some(label) = &self.x_label {
            let y = f64::from(self.height) - FONT_SIZE;
            svg = svg.text((mid_x, y), label, FONT_SIZE, TextAnchor::Middle);
        }
        if let Some(label) = &self.y_label {
            svg = svg.text((4.0, l.top - FONT_SIZE), label, FONT_SIZE, TextAnchor::Start);
        }

        let stroke = f64::from(self.line_width);
        for series in &self.series {
            for run in series.runs() {
                let screen: Vec<(f64, f64)> = run.iter().map(|&(x, y)| (l.x.scale(x), l.y.scale(y))).collect();
                if screen.len() > 1 {
                    svg = svg.polyline(screen.clone(), series.color, stroke);
                }
                if self.marker_radius > 0 {
                    for (x, y) in screen {
                        svg = svg.circle(x, y, f64::from(self.marker_radius), series.color);
                    }
                }
            }
        }

        Ok(svg)
    }
}

/// Short label for a tick value.
fn format_tick(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        let s = format!("{v:.4}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::SvgElement;

    fn chart(points: Vec<(f64, f64)>) -> LineChart {
        LineChart::new().dimensions(200, 150).margin(20).add_series(LineSeries::new("s").points(points))
    }

    #[test]
    fn test_build_rejects_empty() {
        assert!(matches!(LineChart::new().build(), Err(Error::EmptySeries)));
        let empty_series = LineChart::new().add_series(LineSeries::new("x"));
        assert!(matches!(empty_series.build(), Err(Error::EmptySeries)));
    }

    #[test]
    fn test_build_rejects_margin_larger_than_chart() {
        let c = chart(vec![(0.0, 1.0)]).margin(100);
        assert!(matches!(c.build(), Err(Error::InvalidDimensions { .. })));
    }

    #[test]
    fn test_render_draws_series_color() {
        let c = chart(vec![(0.0, 1.0), (1.0, 3.0), (2.0, 2.0)]).build().unwrap();
        let fb = c.to_framebuffer().unwrap();
        let color = Rgba::series(0);
        let hits = fb.pixels().chunks_exact(4).filter(|p| *p == color.to_array()).count();
        assert!(hits > 20);
    }

    #[test]
    fn test_runs_split_at_nan() {
        let s = LineSeries::new("s").points(vec![(0.0, 1.0), (1.0, f64::NAN), (2.0, 2.0), (3.0, 4.0)]);
        let runs: Vec<_> = s.runs().collect();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 1);
        assert_eq!(runs[1].len(), 2);
    }

    #[test]
    fn test_svg_skips_nan_points() {
        let c = chart(vec![(0.0, 1.0), (1.0, f64::NAN), (2.0, 2.0), (3.0, 4.0)]);
        let svg = c.to_svg().unwrap();

        let circles = svg.elements().iter().filter(|e| matches!(e, SvgElement::Circle { .. })).count();
        let lines = svg.elements().iter().filter(|e| matches!(e, SvgElement::Polyline { .. })).count();
        assert_eq!(circles, 3);
        assert_eq!(lines, 1);
    }

    #[test]
    fn test_all_nan_still_has_axes() {
        let c = chart(vec![(0.0, f64::NAN), (1.0, f64::NAN)]);
        let svg = c.to_svg().unwrap();
        assert!(!svg.elements().iter().any(|e| matches!(e, SvgElement::Circle { .. })));
        assert!(svg.render().contains("<line"));
    }

    #[test]
    fn test_titles_in_svg() {
        let c = chart(vec![(1000.0, 0.5), (5000.0, 1.5)]).title("Ingestion").labels("rows", "seconds");
        let out = c.to_svg().unwrap().render();
        assert!(out.contains(">Ingestion<"));
        assert!(out.contains(">rows<"));
        assert!(out.contains(">seconds<"));
        assert!(out.contains(">5000<"));
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(5000.0), "5000");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(-2.0), "-2");
    }
}
