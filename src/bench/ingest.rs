//! Ingestion benchmark runner.
//!
//! For each target size the runner builds an exactly-sized positioned
//! catalog (inflate, jitter, prefix), then times only the ingestion call.
//! Catalog preparation is outside the timed window.

use super::{CancelToken, TimingSample};
use crate::catalog::{inflate, jitter, rounds_to_reach, Bounds, Catalog};
use crate::error::{Error, IngestionError, Result};
use rand::Rng;
use std::time::{Duration, Instant};

/// Entry point of an ingestion backend.
///
/// Calls are not idempotent: every successful call adds data to the backend.
/// Callers reset the backend between runs when they need isolation.
pub trait IngestionTarget {
    /// Load a positioned catalog into the backend, blocking until done.
    fn ingest(&mut self, catalog: &Catalog) -> std::result::Result<(), IngestionError>;
}

impl<F> IngestionTarget for F
where
    F: FnMut(&Catalog) -> std::result::Result<(), IngestionError>,
{
    fn ingest(&mut self, catalog: &Catalog) -> std::result::Result<(), IngestionError> {
        self(catalog)
    }
}

/// Parameters of an ingestion benchmark run.
#[derive(Debug, Clone, Default)]
pub struct IngestionBenchmark {
    sizes: Vec<usize>,
    bounds: Bounds,
    timeout: Option<Duration>,
    cancel: CancelToken,
}

impl IngestionBenchmark {
    /// Create a run over the given target sizes, in order.
    #[must_use]
    pub fn new(sizes: impl Into<Vec<usize>>) -> Self {
        Self { sizes: sizes.into(), ..Self::default() }
    }

    /// Set the region positions are drawn from.
    #[must_use]
    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Treat calls slower than `limit` as failures.
    #[must_use]
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Attach a cancellation token, checked before each size.
    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Target sizes in run order.
    #[must_use]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }
}

/// Time one ingestion call per target size.
///
/// Every size is validated against `base` before the first call, so argument
/// errors never leave a partial run behind. A cancelled run returns the
/// samples measured so far.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] if `base` is empty or a size is smaller than it.
/// - [`Error::IngestionAborted`] if a call fails or exceeds the timeout; it
///   carries the samples measured before the failure.
pub fn run_ingestion_benchmark<T, R>(
    bench: &IngestionBenchmark,
    base: &Catalog,
    target: &mut T,
    rng: &mut R,
) -> Result<Vec<TimingSample>>
where
    T: IngestionTarget + ?Sized,
    R: Rng + ?Sized,
{
    let plan = bench
        .sizes
        .iter()
        .map(|&size| rounds_to_reach(base.len(), size).map(|rounds| (size, rounds)))
        .collect::<Result<Vec<_>>>()?;

    let mut samples = Vec::with_capacity(plan.len());

    for (size, rounds) in plan {
        if bench.cancel.is_cancelled() {
            log::info!("ingestion benchmark cancelled after {} sizes", samples.len());
            break;
        }

        let catalog = jitter(&inflate(base, rounds)?, bench.bounds, rng).prefix(size);
        debug_assert_eq!(catalog.len(), size);

        let start = Instant::now();
        let outcome = target.ingest(&catalog);
        let elapsed = start.elapsed();

        let outcome = outcome.and_then(|()| match bench.timeout {
            Some(limit) if elapsed > limit => Err(IngestionError::Timeout { elapsed, limit }),
            _ => Ok(()),
        });

        if let Err(source) = outcome {
            log::warn!("ingestion of {size} rows failed: {source}");
            return Err(Error::IngestionAborted { size, completed: samples, source });
        }

        log::info!("ingested {size} rows in {:.3}s", elapsed.as_secs_f64());
        samples.push(TimingSample::from_duration(size, elapsed));
    }

    Ok(samples)
}
