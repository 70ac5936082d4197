//! Error types for catalog-bench operations.

use crate::bench::TimingSample;
use crate::tiles::TileCoord;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in catalog-bench operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// CSV decoding or encoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The base catalog could not be read.
    #[error("catalog source unavailable: {}: {source}", path.display())]
    SourceUnavailable {
        /// Path of the source dataset.
        path: PathBuf,
        /// Underlying read failure.
        source: io::Error,
    },

    /// An argument was outside its valid domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The external ingestion call failed; remaining sizes were skipped.
    #[error("ingestion failed at size {size} after {} completed measurements: {source}", completed.len())]
    IngestionAborted {
        /// Target size whose ingestion failed.
        size: usize,
        /// Samples measured before the failure, in run order.
        completed: Vec<TimingSample>,
        /// The ingestion failure.
        source: IngestionError,
    },

    /// The rendering client rejected a zoom or pan command.
    #[error("rendering client error at zoom {zoom}: {message}")]
    Client {
        /// Zoom level being measured.
        zoom: u8,
        /// Client-provided message.
        message: String,
    },

    /// A report was requested for a series with no samples.
    #[error("empty series: nothing to render")]
    EmptySeries,

    /// Invalid dimensions for framebuffer or chart.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Scale domain error (e.g., log of non-positive value).
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    Config {
        /// Line number where the error occurred (1-indexed, 0 if unknown).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },
}

/// Failure of one call into an ingestion backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestionError {
    /// The backend refused the catalog.
    #[error("catalog rejected: {0}")]
    Rejected(String),

    /// The backend failed while writing.
    #[error("backend failure: {0}")]
    Backend(String),

    /// The call returned, but took longer than the caller allowed.
    #[error("ingestion took {elapsed:?}, limit was {limit:?}")]
    Timeout {
        /// Measured duration of the call.
        elapsed: Duration,
        /// Caller-supplied limit.
        limit: Duration,
    },
}

/// Failure of a single tile fetch. Recorded as a gap, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TileLoadError {
    /// The client reported the fetch as failed.
    #[error("tile {tile} failed: {message}")]
    Failed {
        /// Tile that failed.
        tile: TileCoord,
        /// Client-provided message.
        message: String,
    },

    /// No completion arrived before the tile's deadline.
    #[error("tile {tile} timed out after {limit:?}")]
    TimedOut {
        /// Tile that timed out.
        tile: TileCoord,
        /// Timeout that elapsed.
        limit: Duration,
    },
}

impl TileLoadError {
    /// The tile this error refers to.
    #[must_use]
    pub fn tile(&self) -> TileCoord {
        match self {
            Self::Failed { tile, .. } | Self::TimedOut { tile, .. } => *tile,
        }
    }
}
