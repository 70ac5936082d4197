//! SVG output encoder.
//!
//! Vector output for charts: axes, polylines, markers, and labels.

use crate::color::Rgba;
use crate::error::Result;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    /// Text starts at the anchor point.
    #[default]
    Start,
    /// Text is centred on the anchor point.
    Middle,
    /// Text ends at the anchor point.
    End,
}

impl TextAnchor {
    fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// An SVG element.
///
/// Field names match SVG attribute names.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum SvgElement {
    Line { x1: f64, y1: f64, x2: f64, y2: f64, stroke: Rgba, stroke_width: f64 },
    Polyline { points: Vec<(f64, f64)>, stroke: Rgba, stroke_width: f64 },
    Circle { cx: f64, cy: f64, r: f64, fill: Rgba },
    Text { x: f64, y: f64, text: String, font_size: f64, fill: Rgba, anchor: TextAnchor },
}

/// SVG document builder.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    width: u32,
    height: u32,
    background: Option<Rgba>,
    elements: Vec<SvgElement>,
}

impl SvgEncoder {
    /// Create an empty document with a white background.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, background: Some(Rgba::WHITE), elements: Vec::new() }
    }

    /// Set the background (`None` for transparent).
    #[must_use]
    pub fn background(mut self, color: Option<Rgba>) -> Self {
        self.background = color;
        self
    }

    /// Add a line segment.
    #[must_use]
    pub fn line(mut self, from: (f64, f64), to: (f64, f64), stroke: Rgba, stroke_width: f64) -> Self {
        self.elements.push(SvgElement::Line {
            x1: from.0,
            y1: from.1,
            x2: to.0,
            y2: to.1,
            stroke,
            stroke_width,
        });
        self
    }

    /// Add a polyline.
    #[must_use]
    pub fn polyline(mut self, points: Vec<(f64, f64)>, stroke: Rgba, stroke_width: f64) -> Self {
        self.elements.push(SvgElement::Polyline { points, stroke, stroke_width });
        self
    }

    /// Add a filled circle.
    #[must_use]
    pub fn circle(mut self, cx: f64, cy: f64, r: f64, fill: Rgba) -> Self {
        self.elements.push(SvgElement::Circle { cx, cy, r, fill });
        self
    }

    /// Add a text label.
    #[must_use]
    pub fn text(mut self, at: (f64, f64), text: &str, font_size: f64, anchor: TextAnchor) -> Self {
        self.elements.push(SvgElement::Text {
            x: at.0,
            y: at.1,
            text: text.to_string(),
            font_size,
            fill: Rgba::AXIS,
            anchor,
        });
        self
    }

    /// Elements added so far.
    #[must_use]
    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    /// Render to an SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(256 + self.elements.len() * 96);
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        if let Some(bg) = self.background {
            let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="{}"/>"#, bg.to_css());
        }
        for element in &self.elements {
            svg.push_str("  ");
            write_element(&mut svg, element);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }

    /// Write to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.render())?;
        Ok(())
    }
}

fn write_element(out: &mut String, element: &SvgElement) {
    let _ = match element {
        SvgElement::Line { x1, y1, x2, y2, stroke, stroke_width } => write!(
            out,
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{}" stroke-width="{stroke_width}"/>"#,
            stroke.to_css()
        ),
        SvgElement::Polyline { points, stroke, stroke_width } => {
            let coords: Vec<String> = points.iter().map(|(x, y)| format!("{x:.2},{y:.2}")).collect();
            write!(
                out,
                r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{stroke_width}"/>"#,
                coords.join(" "),
                stroke.to_css()
            )
        }
        SvgElement::Circle { cx, cy, r, fill } => {
            write!(out, r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r}" fill="{}"/>"#, fill.to_css())
        }
        SvgElement::Text { x, y, text, font_size, fill, anchor } => write!(
            out,
            r#"<text x="{x:.2}" y="{y:.2}" font-size="{font_size}" fill="{}" text-anchor="{}" font-family="sans-serif">{}</text>"#,
            fill.to_css(),
            anchor.as_str(),
            escape(text)
        ),
    };
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        let svg = SvgEncoder::new(800, 600).render();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="800""#));
        assert!(svg.contains(r##"fill="#ffffff""##));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_transparent_background() {
        let svg = SvgEncoder::new(10, 10).background(None).render();
        assert!(!svg.contains("<rect"));
    }

    #[test]
    fn test_elements_render_in_order() {
        let svg = SvgEncoder::new(100, 100)
            .line((0.0, 0.0), (10.0, 10.0), Rgba::BLACK, 1.0)
            .polyline(vec![(1.0, 2.0), (3.5, 4.25)], Rgba::series(0), 2.0)
            .circle(5.0, 5.0, 3.0, Rgba::series(1))
            .render();

        let line = svg.find("<line").unwrap();
        let poly = svg.find("<polyline").unwrap();
        let circle = svg.find("<circle").unwrap();
        assert!(line < poly && poly < circle);
        assert!(svg.contains(r#"points="1.00,2.00 3.50,4.25""#));
    }

    #[test]
    fn test_text_is_escaped() {
        let svg = SvgEncoder::new(10, 10).text((1.0, 1.0), "a<b & \"c\"", 12.0, TextAnchor::Middle).render();
        assert!(svg.contains("a&lt;b &amp; &quot;c&quot;"));
        assert!(svg.contains(r#"text-anchor="middle""#));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        SvgEncoder::new(20, 20).write_to_file(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("<svg"));
    }
}
