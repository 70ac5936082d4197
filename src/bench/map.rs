//! Map-load benchmark runner.
//!
//! The runner owns a [`PendingTiles`] set fed by a channel. A rendering
//! client announces each fetch with [`TileEvents::request`] and later resolves
//! the returned [`TileTicket`] from whatever thread did the work. After every
//! viewport move the runner blocks in [`PendingTiles::wait_all`] until the
//! set is empty; a tile that has not resolved by its own deadline is expired
//! and counted as a gap.

use super::{CancelToken, NoSamplesWarning, TileLoadSample, ZoomLevelLatency};
use crate::error::{Error, Result, TileLoadError};
use crate::tiles::TileCoord;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default per-tile timeout.
const DEFAULT_TILE_TIMEOUT: Duration = Duration::from_secs(5);

/// Viewport displacement in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanOffset {
    /// Horizontal displacement (positive moves right).
    pub dx: f64,
    /// Vertical displacement (positive moves down).
    pub dy: f64,
}

impl PanOffset {
    /// Create a new offset.
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// A map view that loads tiles on demand.
///
/// Implementations must call [`TileEvents::request`] for every tile a command
/// fetches before the command returns. Tickets may be resolved later, from
/// any thread.
pub trait RenderingClient {
    /// Change zoom level, requesting any tiles the new view needs.
    fn set_zoom(&mut self, level: u8, events: &TileEvents) -> Result<()>;

    /// Move the viewport, requesting tiles that enter it.
    fn pan(&mut self, offset: PanOffset, events: &TileEvents) -> Result<()>;
}

#[derive(Debug)]
enum TileEvent {
    Requested { id: u64, tile: TileCoord, at: Instant },
    Completed { id: u64, tile: TileCoord, requested_at: Instant, at: Instant },
    Failed { id: u64, tile: TileCoord, message: String },
}

/// Handle through which a client reports tile fetches.
#[derive(Debug, Clone)]
pub struct TileEvents {
    tx: Sender<TileEvent>,
    next_id: Arc<AtomicU64>,
}

impl TileEvents {
    /// Announce a tile fetch starting now.
    pub fn request(&self, tile: TileCoord) -> TileTicket {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let requested_at = Instant::now();
        let _ = self.tx.send(TileEvent::Requested { id, tile, at: requested_at });
        TileTicket { id, tile, requested_at, tx: self.tx.clone(), resolved: false }
    }
}

/// One outstanding tile fetch. Dropping it unresolved reports a failure.
#[derive(Debug)]
#[must_use = "an unresolved ticket is reported as a failed tile"]
pub struct TileTicket {
    id: u64,
    tile: TileCoord,
    requested_at: Instant,
    tx: Sender<TileEvent>,
    resolved: bool,
}

impl TileTicket {
    /// Tile this ticket was issued for.
    #[must_use]
    pub fn tile(&self) -> TileCoord {
        self.tile
    }

    /// When the fetch was requested.
    #[must_use]
    pub fn requested_at(&self) -> Instant {
        self.requested_at
    }

    /// Report the tile as loaded now.
    pub fn complete(self) {
        self.complete_at(Instant::now());
    }

    /// Report the tile as loaded at `at`.
    pub fn complete_at(mut self, at: Instant) {
        let event = TileEvent::Completed {
            id: self.id,
            tile: self.tile,
            requested_at: self.requested_at,
            at,
        };
        self.resolve(event);
    }

    /// Report the tile as failed.
    pub fn fail(mut self, message: impl Into<String>) {
        let event = TileEvent::Failed { id: self.id, tile: self.tile, message: message.into() };
        self.resolve(event);
    }

    fn resolve(&mut self, event: TileEvent) {
        self.resolved = true;
        let _ = self.tx.send(event);
    }
}

impl Drop for TileTicket {
    fn drop(&mut self) {
        if !self.resolved {
            let _ = self.tx.send(TileEvent::Failed {
                id: self.id,
                tile: self.tile,
                message: "ticket dropped without resolution".to_string(),
            });
        }
    }
}

/// Tiles resolved by one [`PendingTiles::wait_all`] call.
#[derive(Debug, Default)]
pub struct Settled {
    /// Successful fetches with their latency.
    pub loads: Vec<(TileCoord, Duration)>,
    /// Failed or expired fetches.
    pub failures: Vec<TileLoadError>,
}

/// Set of outstanding tile requests plus the barrier that drains it.
#[derive(Debug)]
pub struct PendingTiles {
    rx: Receiver<TileEvent>,
    timeout: Duration,
    pending: HashMap<u64, (TileCoord, Instant)>,
    // Resolved before their request event was seen.
    early: HashSet<u64>,
    // Expired by the barrier; late resolutions are ignored.
    expired: HashSet<u64>,
}

impl PendingTiles {
    /// Create an empty set and the event handle that feeds it.
    #[must_use]
    pub fn new(timeout: Duration) -> (Self, TileEvents) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let set = Self {
            rx,
            timeout,
            pending: HashMap::new(),
            early: HashSet::new(),
            expired: HashSet::new(),
        };
        (set, TileEvents { tx, next_id: Arc::new(AtomicU64::new(0)) })
    }

    /// Requests seen but not yet resolved.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Block until every announced request has resolved or expired.
    ///
    /// Each tile expires `timeout` after its own request time. A completion
    /// whose latency exceeds the timeout counts as expired too.
    pub fn wait_all(&mut self) -> Settled {
        let mut settled = Settled::default();
        self.drain(&mut settled);

        while let Some(deadline) = self.next_deadline() {
            let now = Instant::now();
            if now >= deadline {
                self.expire_overdue(now, &mut settled);
                continue;
            }
            match self.rx.recv_deadline(deadline) {
                Ok(event) => self.apply(event, &mut settled),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    self.expire_due(Instant::now() + self.timeout, &mut settled);
                }
            }
        }

        settled
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|&(_, at)| at + self.timeout).min()
    }

    fn drain(&mut self, settled: &mut Settled) {
        while let Ok(event) = self.rx.try_recv() {
            self.apply(event, settled);
        }
    }

    /// Apply queued events, then expire whatever is still overdue at `now`.
    fn expire_overdue(&mut self, now: Instant, settled: &mut Settled) {
        self.drain(settled);
        self.expire_due(now, settled);
    }

    fn expire_due(&mut self, now: Instant, settled: &mut Settled) {
        let due: Vec<u64> = self
            .pending
            .iter()
            .filter(|(_, &(_, at))| at + self.timeout <= now)
            .map(|(&id, _)| id)
            .collect();

        for id in due {
            if let Some((tile, _)) = self.pending.remove(&id) {
                log::debug!("tile {tile} expired after {:?}", self.timeout);
                self.expired.insert(id);
                settled.failures.push(TileLoadError::TimedOut { tile, limit: self.timeout });
            }
        }
    }

    fn apply(&mut self, event: TileEvent, settled: &mut Settled) {
        match event {
            TileEvent::Requested { id, tile, at } => {
                if !self.early.remove(&id) {
                    self.pending.insert(id, (tile, at));
                }
            }
            TileEvent::Completed { id, tile, requested_at, at } => {
                if !self.take(id) {
                    return;
                }
                let latency = at.saturating_duration_since(requested_at);
                if latency > self.timeout {
                    settled.failures.push(TileLoadError::TimedOut { tile, limit: self.timeout });
                } else {
                    settled.loads.push((tile, latency));
                }
            }
            TileEvent::Failed { id, tile, message } => {
                if self.take(id) {
                    settled.failures.push(TileLoadError::Failed { tile, message });
                }
            }
        }
    }

    /// Claim a resolution for `id`. Returns false if it must be ignored.
    fn take(&mut self, id: u64) -> bool {
        if self.expired.remove(&id) {
            return false;
        }
        if self.pending.remove(&id).is_none() {
            self.early.insert(id);
        }
        true
    }
}

/// Parameters of a map-load benchmark run.
#[derive(Debug, Clone)]
pub struct MapBenchmark {
    zoom_levels: Vec<u8>,
    pan_sequence: Vec<PanOffset>,
    tile_timeout: Duration,
    cancel: CancelToken,
}

impl MapBenchmark {
    /// Create a run over `zoom_levels`, replaying `pan_sequence` at each.
    #[must_use]
    pub fn new(zoom_levels: impl Into<Vec<u8>>, pan_sequence: impl Into<Vec<PanOffset>>) -> Self {
        Self {
            zoom_levels: zoom_levels.into(),
            pan_sequence: pan_sequence.into(),
            tile_timeout: DEFAULT_TILE_TIMEOUT,
            cancel: CancelToken::default(),
        }
    }

    /// Set the per-tile timeout.
    #[must_use]
    pub fn tile_timeout(mut self, limit: Duration) -> Self {
        self.tile_timeout = limit;
        self
    }

    /// Attach a cancellation token, checked before each zoom level.
    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Zoom levels in run order.
    #[must_use]
    pub fn zoom_levels(&self) -> &[u8] {
        &self.zoom_levels
    }
}

/// Result of a map-load run.
#[derive(Debug, Clone, Default)]
pub struct MapReport {
    /// One entry per measured zoom level, in run order.
    pub levels: Vec<ZoomLevelLatency>,
    /// Levels where every fetch failed or nothing was fetched.
    pub warnings: Vec<NoSamplesWarning>,
}

/// Drive `client` through each zoom level and pan move, averaging tile latency.
///
/// Tile failures and timeouts never abort a level; they are excluded from
/// the mean and counted in `failed_count`.
///
/// # Errors
///
/// Returns [`Error::Client`] if the client rejects a zoom or pan command.
pub fn run_map_benchmark<C>(bench: &MapBenchmark, client: &mut C) -> Result<MapReport>
where
    C: RenderingClient + ?Sized,
{
    let (mut pending, events) = PendingTiles::new(bench.tile_timeout);
    let mut report = MapReport::default();

    for &zoom in &bench.zoom_levels {
        if bench.cancel.is_cancelled() {
            log::info!("map benchmark cancelled after {} zoom levels", report.levels.len());
            break;
        }

        let mut samples = Vec::new();
        let mut failed = 0;
        let mut absorb = |settled: Settled| {
            samples.extend(settled.loads.into_iter().map(|(_, latency)| TileLoadSample {
                zoom_level: zoom,
                latency_seconds: latency.as_secs_f64(),
            }));
            failed += settled.failures.len();
        };

        client.set_zoom(zoom, &events).map_err(|e| client_error(zoom, &e))?;
        absorb(pending.wait_all());

        for (step, &offset) in bench.pan_sequence.iter().enumerate() {
            client.pan(offset, &events).map_err(|e| client_error(zoom, &e))?;
            let settled = pending.wait_all();
            log::debug!(
                "zoom {zoom} pan {step}: {} loaded, {} failed",
                settled.loads.len(),
                settled.failures.len()
            );
            absorb(settled);
        }

        let level = ZoomLevelLatency::from_samples(zoom, &samples, failed);
        if level.has_samples() {
            log::info!(
                "zoom {zoom}: mean tile latency {:.4}s over {} tiles ({} failed)",
                level.mean_latency_seconds,
                level.sample_count,
                level.failed_count
            );
        } else {
            log::warn!("zoom {zoom}: no usable tile samples ({failed} failed)");
            report.warnings.push(NoSamplesWarning { zoom_level: zoom, failed });
        }
        report.levels.push(level);
    }

    Ok(report)
}

fn client_error(zoom: u8, err: &Error) -> Error {
    match err {
        Error::Client { zoom, message } => Error::Client { zoom: *zoom, message: message.clone() },
        other => Error::Client { zoom, message: other.to_string() },
    }
}
