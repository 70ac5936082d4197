//! # catalog-bench
//!
//! Workload generator and benchmark harness for astronomical catalog map
//! widgets.
//!
//! A base catalog is sampled from CSV, doubled up to each target size, given
//! uniform random sky positions, and handed to an ingestion backend under a
//! timer. A second runner drives a map client through zoom levels and pan
//! moves, waiting on every outstanding tile before it moves on, and averages
//! tile latency per zoom level. Both series render as PNG/SVG charts and
//! export as CSV.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use catalog_bench::prelude::*;
//! use rand::SeedableRng;
//!
//! let base = sample("catalog.csv")?;
//! let mut store = MemoryStore::new();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//!
//! let bench = IngestionBenchmark::new(vec![1_000, 5_000, 10_000]);
//! let timings = run_ingestion_benchmark(&bench, &base, &mut store, &mut rng)?;
//!
//! render(Series::Timing(&timings))?.write_png("ingestion.png")?;
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): the `catalog-bench` command-line driver

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Workload Modules
// ============================================================================

/// Catalog model, sampling, inflation, and position jitter.
pub mod catalog;

/// Ingestion and map-load benchmark runners.
pub mod bench;

/// Benchmark configuration (YAML).
pub mod config;

// ============================================================================
// Reference Collaborators
// ============================================================================

/// In-process catalog store used as an ingestion backend.
pub mod store;

/// Tile math and the reference map client.
pub mod tiles;

// ============================================================================
// Reporting Modules
// ============================================================================

/// Report aggregation: charts, CSV export, summaries.
pub mod report;

/// Chart types.
pub mod plots;

/// Colors.
pub mod color;

/// Pixel buffer charts rasterize into.
pub mod framebuffer;

/// Data-to-pixel scales.
pub mod scale;

/// Rasterization.
pub mod render;

/// Output encoders (PNG, SVG).
pub mod output;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for catalog-bench operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and functions.
///
/// ```rust,ignore
/// use catalog_bench::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bench::{
        run_ingestion_benchmark, run_map_benchmark, CancelToken, IngestionBenchmark,
        IngestionTarget, MapBenchmark, MapReport, PanOffset, RenderingClient, TileEvents,
        TimingSample, ZoomLevelLatency,
    };
    pub use crate::catalog::{inflate, jitter, sample, Bounds, Catalog};
    pub use crate::config::BenchmarkConfig;
    pub use crate::error::{Error, IngestionError, Result, TileLoadError};
    pub use crate::report::{render, write_csv, Chart, Series, SeriesSummary};
    pub use crate::store::MemoryStore;
    pub use crate::tiles::{CatalogTileClient, TileCoord};
}
