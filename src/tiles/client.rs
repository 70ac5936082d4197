//! Reference map client over a [`MemoryStore`] collection.

use super::{grid_size, TileCoord, Viewport};
use crate::bench::{PanOffset, RenderingClient, TileEvents};
use crate::error::{Error, Result};
use crate::store::{Collection, MemoryStore};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Tile edge in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Viewport size in pixels.
pub const DEFAULT_VIEWPORT: (u32, u32) = (512, 512);

const DEFAULT_MIN_ZOOM: u8 = 0;
const DEFAULT_MAX_ZOOM: u8 = 8;

/// Map client that fetches tiles of one collection on worker threads.
///
/// Each tile is fetched at most once per zoom level. A fetch counts the
/// collection's objects inside the tile and then completes its ticket.
#[derive(Debug)]
pub struct CatalogTileClient {
    collection: Arc<Collection>,
    tile_size: u32,
    viewport: Viewport,
    min_zoom: u8,
    max_zoom: u8,
    zoom: Option<u8>,
    fetch_delay: Duration,
    loaded: HashSet<TileCoord>,
    objects: Arc<AtomicUsize>,
}

impl CatalogTileClient {
    /// Create a client for `collection` with 256px tiles and a 512x512 view.
    #[must_use]
    pub fn new(collection: Arc<Collection>) -> Self {
        let (width, height) = DEFAULT_VIEWPORT;
        Self {
            collection,
            tile_size: DEFAULT_TILE_SIZE,
            viewport: Viewport::new((0.0, 0.0), width, height),
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom: None,
            fetch_delay: Duration::ZERO,
            loaded: HashSet::new(),
            objects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a client for the collection `name` in `store`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the collection does not exist.
    pub fn from_store(store: &MemoryStore, name: &str) -> Result<Self> {
        store
            .collection(name)
            .map(Self::new)
            .ok_or_else(|| Error::InvalidArgument(format!("no collection named {name}")))
    }

    /// Set the tile edge in pixels.
    #[must_use]
    pub fn tile_size(mut self, size: u32) -> Self {
        self.tile_size = size.max(1);
        self
    }

    /// Set the viewport size in pixels.
    #[must_use]
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport.width = width;
        self.viewport.height = height;
        self
    }

    /// Set the accepted zoom range.
    #[must_use]
    pub fn zoom_range(mut self, min: u8, max: u8) -> Self {
        self.min_zoom = min.min(max);
        self.max_zoom = max.max(min);
        self
    }

    /// Add a fixed delay to every fetch.
    #[must_use]
    pub fn fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    /// Current zoom, once set.
    #[must_use]
    pub fn zoom(&self) -> Option<u8> {
        self.zoom
    }

    /// Current viewport.
    #[must_use]
    pub fn current_viewport(&self) -> Viewport {
        self.viewport
    }

    /// Tiles fetched so far, across all zoom levels.
    #[must_use]
    pub fn loaded_tiles(&self) -> usize {
        self.loaded.len()
    }

    /// Objects counted by completed fetches.
    #[must_use]
    pub fn objects_fetched(&self) -> usize {
        self.objects.load(Ordering::Relaxed)
    }

    fn fetch_new_tiles(&mut self, z: u8, events: &TileEvents) {
        let extent = self.collection.meta().extent;
        for tile in self.viewport.visible_tiles(z, self.tile_size) {
            if !self.loaded.insert(tile) {
                continue;
            }

            let ticket = events.request(tile);
            let collection = Arc::clone(&self.collection);
            let objects = Arc::clone(&self.objects);
            let delay = self.fetch_delay;
            let bounds = tile.bounds(&extent);

            // On spawn failure the closure and its ticket are dropped, which
            // reports the tile as failed.
            let spawned = thread::Builder::new().name(format!("tile-{tile}")).spawn(move || {
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                let count = collection.count_in(&bounds);
                objects.fetch_add(count, Ordering::Relaxed);
                log::trace!("tile {tile}: {count} objects");
                ticket.complete();
            });
            if let Err(e) = spawned {
                log::warn!("could not spawn fetch for tile {tile}: {e}");
            }
        }
    }
}

impl RenderingClient for CatalogTileClient {
    fn set_zoom(&mut self, level: u8, events: &TileEvents) -> Result<()> {
        if !(self.min_zoom..=self.max_zoom).contains(&level) {
            return Err(Error::InvalidArgument(format!(
                "zoom {level} outside {}..={}",
                self.min_zoom, self.max_zoom
            )));
        }

        self.viewport.center = match self.zoom {
            Some(old) => {
                let scale = 2f64.powi(i32::from(level) - i32::from(old));
                (self.viewport.center.0 * scale, self.viewport.center.1 * scale)
            }
            None => {
                let half = f64::from(self.tile_size) * f64::from(grid_size(level)) / 2.0;
                (half, half)
            }
        };
        self.zoom = Some(level);
        self.fetch_new_tiles(level, events);
        Ok(())
    }

    fn pan(&mut self, offset: PanOffset, events: &TileEvents) -> Result<()> {
        let z = self
            .zoom
            .ok_or_else(|| Error::InvalidArgument("pan before any zoom was set".to_string()))?;
        self.viewport.center.0 += offset.dx;
        self.viewport.center.1 += offset.dy;
        self.fetch_new_tiles(z, events);
        Ok(())
    }
}
