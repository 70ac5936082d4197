//! Benchmark configuration.
//!
//! YAML with every field optional; CLI flags override file values.

use crate::bench::{IngestionBenchmark, MapBenchmark, PanOffset};
use crate::catalog::Bounds;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Region positions are drawn from, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsConfig {
    /// Extent along `ra`.
    #[serde(default = "default_extent")]
    pub width: f64,
    /// Extent along `dec`.
    #[serde(default = "default_extent")]
    pub height: f64,
}

fn default_extent() -> f64 {
    15.0
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self { width: default_extent(), height: default_extent() }
    }
}

/// Ingestion benchmark settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Target catalog sizes, in run order.
    #[serde(default = "default_sizes")]
    pub sizes: Vec<usize>,
    /// Calls slower than this count as failures.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_sizes() -> Vec<usize> {
    vec![1_000, 5_000, 10_000, 50_000, 100_000]
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self { sizes: default_sizes(), timeout_ms: None }
    }
}

/// Map viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Width in pixels.
    #[serde(default = "default_viewport_side")]
    pub width: u32,
    /// Height in pixels.
    #[serde(default = "default_viewport_side")]
    pub height: u32,
}

fn default_viewport_side() -> u32 {
    512
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self { width: default_viewport_side(), height: default_viewport_side() }
    }
}

/// Map-load benchmark settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Zoom levels, in run order.
    #[serde(default = "default_zoom_levels")]
    pub zoom_levels: Vec<u8>,
    /// Pan moves as `[dx, dy]` pixels, replayed at every zoom level.
    #[serde(default = "default_pan_sequence")]
    pub pan_sequence: Vec<[f64; 2]>,
    /// Per-tile timeout.
    #[serde(default = "default_tile_timeout_ms")]
    pub tile_timeout_ms: u64,
    /// Viewport size.
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Tile edge in pixels.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Smallest zoom the client accepts.
    #[serde(default)]
    pub min_zoom: u8,
    /// Largest zoom the client accepts.
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
}

fn default_zoom_levels() -> Vec<u8> {
    (0..=8).collect()
}
fn default_pan_sequence() -> Vec<[f64; 2]> {
    vec![[256.0, 0.0], [0.0, 256.0], [-256.0, 0.0], [0.0, -256.0]]
}
fn default_tile_timeout_ms() -> u64 {
    5_000
}
fn default_tile_size() -> u32 {
    256
}
fn default_max_zoom() -> u8 {
    8
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom_levels: default_zoom_levels(),
            pan_sequence: default_pan_sequence(),
            tile_timeout_ms: default_tile_timeout_ms(),
            viewport: ViewportConfig::default(),
            tile_size: default_tile_size(),
            min_zoom: 0,
            max_zoom: default_max_zoom(),
        }
    }
}

/// Which report files to write, and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Write PNG charts.
    #[serde(default = "default_true")]
    pub png: bool,
    /// Write SVG charts.
    #[serde(default = "default_true")]
    pub svg: bool,
    /// Write CSV series.
    #[serde(default = "default_true")]
    pub csv: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("bench-results")
}
fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: default_output_dir(), png: true, svg: true, csv: true }
    }
}

/// Complete benchmark configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Seed for position jitter; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Position region.
    #[serde(default)]
    pub bounds: BoundsConfig,
    /// Ingestion benchmark settings.
    #[serde(default)]
    pub ingestion: IngestionConfig,
    /// Map-load benchmark settings.
    #[serde(default)]
    pub map: MapConfig,
    /// Report output.
    #[serde(default)]
    pub output: OutputConfig,
}

impl BenchmarkConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            line: 0,
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] with the offending line on malformed input.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(0);
            Error::Config { line, message: e.to_string() }
        })
    }

    /// Load from `path`, falling back to defaults if it is missing or invalid.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Check values that parse but cannot run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        self.position_bounds()?;

        if self.ingestion.sizes.is_empty() {
            return Err(Error::InvalidArgument("ingestion.sizes is empty".to_string()));
        }
        if self.ingestion.sizes.contains(&0) {
            return Err(Error::InvalidArgument("ingestion.sizes contains 0".to_string()));
        }
        if self.ingestion.timeout_ms == Some(0) {
            return Err(Error::InvalidArgument("ingestion.timeout_ms must be positive".to_string()));
        }

        let map = &self.map;
        if map.tile_timeout_ms == 0 {
            return Err(Error::InvalidArgument("map.tile_timeout_ms must be positive".to_string()));
        }
        if map.tile_size == 0 || map.viewport.width == 0 || map.viewport.height == 0 {
            return Err(Error::InvalidArgument("map tile and viewport sizes must be positive".to_string()));
        }
        if map.min_zoom > map.max_zoom {
            return Err(Error::InvalidArgument(format!(
                "map.min_zoom {} is above map.max_zoom {}",
                map.min_zoom, map.max_zoom
            )));
        }
        if let Some(z) = map.zoom_levels.iter().find(|z| !(map.min_zoom..=map.max_zoom).contains(*z)) {
            return Err(Error::InvalidArgument(format!(
                "zoom level {z} outside {}..={}",
                map.min_zoom, map.max_zoom
            )));
        }
        if map.pan_sequence.iter().flatten().any(|v| !v.is_finite()) {
            return Err(Error::InvalidArgument("map.pan_sequence has a non-finite offset".to_string()));
        }
        Ok(())
    }

    /// Position region as validated [`Bounds`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for non-positive or non-finite extents.
    pub fn position_bounds(&self) -> Result<Bounds> {
        Bounds::new(self.bounds.width, self.bounds.height)
    }

    /// Ingestion run described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for invalid bounds.
    pub fn ingestion_benchmark(&self) -> Result<IngestionBenchmark> {
        let mut bench = IngestionBenchmark::new(self.ingestion.sizes.clone()).bounds(self.position_bounds()?);
        if let Some(ms) = self.ingestion.timeout_ms {
            bench = bench.timeout(Duration::from_millis(ms));
        }
        Ok(bench)
    }

    /// Map-load run described by this configuration.
    #[must_use]
    pub fn map_benchmark(&self) -> MapBenchmark {
        let pans: Vec<PanOffset> = self.map.pan_sequence.iter().map(|&[dx, dy]| PanOffset::new(dx, dy)).collect();
        MapBenchmark::new(self.map.zoom_levels.clone(), pans)
            .tile_timeout(Duration::from_millis(self.map.tile_timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.bounds, BoundsConfig { width: 15.0, height: 15.0 });
        assert_eq!(config.map.zoom_levels, (0..=8).collect::<Vec<u8>>());
        assert_eq!(config.map.viewport, ViewportConfig { width: 512, height: 512 });
        assert_eq!(config.map.tile_size, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(BenchmarkConfig::parse("{}").unwrap(), BenchmarkConfig::default());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = r#"
seed: 7
ingestion:
  sizes: [100, 200]
  timeout_ms: 1500
map:
  zoom_levels: [1, 3]
  pan_sequence:
    - [128, 0]
"#;
        let config = BenchmarkConfig::parse(yaml).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.ingestion.sizes, vec![100, 200]);
        assert_eq!(config.ingestion.timeout_ms, Some(1500));
        assert_eq!(config.map.pan_sequence, vec![[128.0, 0.0]]);
        assert_eq!(config.map.tile_timeout_ms, 5_000);
        assert!(config.output.png);

        let bench = config.map_benchmark();
        assert_eq!(bench.zoom_levels(), &[1, 3]);
        assert_eq!(config.ingestion_benchmark().unwrap().sizes(), &[100, 200]);
    }

    #[test]
    fn test_parse_error_includes_line() {
        let yaml = "ingestion:\n  sizes: [1, 2]\nmap:\n  tile_timeout_ms: soon\n";
        let err = BenchmarkConfig::parse(yaml).unwrap_err();
        assert!(matches!(err, Error::Config { line, .. } if line > 0));
        assert!(err.to_string().contains('4'), "error should name line 4: {err}");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = BenchmarkConfig::default();
        config.map.zoom_levels = vec![2, 9];
        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));

        let mut config = BenchmarkConfig::default();
        config.bounds.width = 0.0;
        assert!(config.validate().is_err());

        let mut config = BenchmarkConfig::default();
        config.ingestion.sizes.clear();
        assert!(config.validate().is_err());

        let mut config = BenchmarkConfig::default();
        config.map.tile_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.yaml");
        std::fs::write(&path, "seed: 3\n").unwrap();

        assert_eq!(BenchmarkConfig::load(&path).unwrap().seed, Some(3));
        assert!(matches!(BenchmarkConfig::load(dir.path().join("missing.yaml")), Err(Error::Config { .. })));
        assert_eq!(BenchmarkConfig::load_or_default(dir.path().join("missing.yaml")), BenchmarkConfig::default());
    }
}
