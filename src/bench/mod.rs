//! Benchmark runners and their measurement types.
//!
//! - [`run_ingestion_benchmark`]: time one blocking ingestion call per target size.
//! - [`run_map_benchmark`]: drive a rendering client through zoom levels and
//!   pan moves, averaging tile latency per level.
//!
//! Both runners are single-threaded drivers. They check a [`CancelToken`] at
//! each loop boundary; a measurement already in flight always completes.

mod ingest;
mod map;

pub use ingest::{run_ingestion_benchmark, IngestionBenchmark, IngestionTarget};
pub use map::{
    run_map_benchmark, MapBenchmark, MapReport, PanOffset, PendingTiles, RenderingClient, Settled,
    TileEvents, TileTicket,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Wall-clock time of one ingestion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingSample {
    /// Rows handed to the ingestion call.
    pub input_size: usize,
    /// Seconds between call and return.
    pub elapsed_seconds: f64,
}

impl TimingSample {
    /// Create a new timing sample.
    #[must_use]
    pub const fn new(input_size: usize, elapsed_seconds: f64) -> Self {
        Self { input_size, elapsed_seconds }
    }

    pub(crate) fn from_duration(input_size: usize, elapsed: Duration) -> Self {
        Self::new(input_size, elapsed.as_secs_f64())
    }
}

/// Latency of one tile fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileLoadSample {
    /// Zoom level the tile was fetched at.
    pub zoom_level: u8,
    /// Completion time minus request time, in seconds.
    pub latency_seconds: f64,
}

/// Mean tile latency for one zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLevelLatency {
    /// Zoom level.
    pub zoom_level: u8,
    /// Mean over successful fetches; `NaN` when `sample_count == 0`.
    pub mean_latency_seconds: f64,
    /// Successful fetches averaged into the mean.
    pub sample_count: usize,
    /// Fetches that failed or timed out.
    pub failed_count: usize,
}

impl ZoomLevelLatency {
    /// Aggregate samples for a level.
    #[must_use]
    pub fn from_samples(zoom_level: u8, samples: &[TileLoadSample], failed_count: usize) -> Self {
        let sample_count = samples.len();
        let mean_latency_seconds = if sample_count == 0 {
            f64::NAN
        } else {
            samples.iter().map(|s| s.latency_seconds).sum::<f64>() / sample_count as f64
        };
        Self { zoom_level, mean_latency_seconds, sample_count, failed_count }
    }

    /// Returns true if the mean is backed by at least one sample.
    #[must_use]
    pub fn has_samples(&self) -> bool {
        self.sample_count > 0
    }
}

/// A zoom level produced no usable tile samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoSamplesWarning {
    /// Zoom level affected.
    pub zoom_level: u8,
    /// Fetches that failed at this level.
    pub failed: usize,
}

/// Shared flag for stopping a run between measurements.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect at the next loop boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tile(zoom_level: u8, latency_seconds: f64) -> TileLoadSample {
        TileLoadSample { zoom_level, latency_seconds }
    }

    #[test]
    fn test_zoom_latency_mean() {
        let level = ZoomLevelLatency::from_samples(3, &[tile(3, 0.1), tile(3, 0.2), tile(3, 0.6)], 1);

        assert_relative_eq!(level.mean_latency_seconds, 0.3, epsilon = 1e-12);
        assert_eq!(level.sample_count, 3);
        assert_eq!(level.failed_count, 1);
        assert!(level.has_samples());
    }

    #[test]
    fn test_zoom_latency_without_samples_is_nan() {
        let level = ZoomLevelLatency::from_samples(5, &[], 4);
        assert!(level.mean_latency_seconds.is_nan());
        assert_eq!(level.sample_count, 0);
        assert!(!level.has_samples());
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_timing_from_duration() {
        let s = TimingSample::from_duration(1000, Duration::from_millis(250));
        assert_eq!(s.input_size, 1000);
        assert_relative_eq!(s.elapsed_seconds, 0.25);
    }
}
