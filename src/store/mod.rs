//! In-process catalog store.
//!
//! [`MemoryStore`] is a reference ingestion backend: it indexes positioned
//! catalogs into named collections and answers per-tile object counts for
//! [`CatalogTileClient`](crate::tiles::CatalogTileClient).

use crate::bench::IngestionTarget;
use crate::catalog::{Catalog, Position, Schema};
use crate::error::IngestionError;
use crate::tiles::{Extent, TileBounds};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

/// How a map client should draw a collection's objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Plain markers.
    #[default]
    Point,
    /// Circles sized by a `RADIUS` column.
    Radius,
    /// Ellipses from `A_IMAGE`, `B_IMAGE`, `THETA_IMAGE`.
    Shape,
}

impl RenderMode {
    /// Choose from the columns a schema carries.
    #[must_use]
    pub fn for_schema(schema: &Schema) -> Self {
        if schema.contains_all(&["A_IMAGE", "B_IMAGE", "THETA_IMAGE"]) {
            Self::Shape
        } else if schema.contains_all(&["RADIUS"]) {
            Self::Radius
        } else {
            Self::Point
        }
    }
}

/// Summary computed at ingestion time.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionMeta {
    /// Bounding box of all positions.
    pub extent: Extent,
    /// Centre as `[dec, ra]`.
    pub center: [f64; 2],
    /// `(min, max)` of every all-numeric field.
    pub min_max: BTreeMap<String, (f64, f64)>,
    /// Number of objects.
    pub count: usize,
    /// Drawing mode derived from the schema.
    pub render_mode: RenderMode,
}

/// One ingested catalog.
#[derive(Debug)]
pub struct Collection {
    name: String,
    meta: CollectionMeta,
    // Sorted by ra.
    positions: Vec<Position>,
}

impl Collection {
    fn build(name: String, catalog: &Catalog) -> Result<Self, IngestionError> {
        if catalog.is_empty() {
            return Err(IngestionError::Rejected("catalog has no rows".to_string()));
        }
        let mut positions: Vec<Position> = catalog.positions().collect();
        if positions.len() != catalog.len() {
            return Err(IngestionError::Rejected(format!(
                "{} of {} rows have no position",
                catalog.len() - positions.len(),
                catalog.len()
            )));
        }

        let extent = Extent::covering(positions.iter().copied())
            .ok_or_else(|| IngestionError::Rejected("catalog has no positions".to_string()))?;
        positions.sort_by(|a, b| a.ra.total_cmp(&b.ra));

        let meta = CollectionMeta {
            extent,
            center: extent.center(),
            min_max: numeric_ranges(catalog),
            count: positions.len(),
            render_mode: RenderMode::for_schema(catalog.schema()),
        };

        Ok(Self { name, meta, positions })
    }

    /// Collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ingestion-time summary.
    #[must_use]
    pub fn meta(&self) -> &CollectionMeta {
        &self.meta
    }

    /// Objects inside `bounds`.
    #[must_use]
    pub fn count_in(&self, bounds: &TileBounds) -> usize {
        let lo = self.positions.partition_point(|p| p.ra < bounds.ra_min);
        let hi = self.positions.partition_point(|p| p.ra < bounds.ra_max);
        self.positions[lo..hi].iter().filter(|p| bounds.contains(**p)).count()
    }
}

fn numeric_ranges(catalog: &Catalog) -> BTreeMap<String, (f64, f64)> {
    catalog
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter_map(|(i, field)| {
            let mut range: Option<(f64, f64)> = None;
            for row in catalog.iter() {
                let v = row.record().get(i)?.as_f64()?;
                range = Some(match range {
                    Some((lo, hi)) => (lo.min(v), hi.max(v)),
                    None => (v, v),
                });
            }
            range.map(|r| (field.clone(), r))
        })
        .collect()
}

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, Arc<Collection>>,
    generated: u64,
}

/// Thread-safe map of named collections. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest `catalog` under a generated `catalog-<n>` name.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError::Rejected`] for an empty or unpositioned catalog.
    pub fn insert(&self, catalog: &Catalog) -> Result<String, IngestionError> {
        let mut inner = self.write()?;
        let name = loop {
            inner.generated += 1;
            let candidate = format!("catalog-{}", inner.generated);
            if !inner.collections.contains_key(&candidate) {
                break candidate;
            }
        };
        let collection = Collection::build(name.clone(), catalog)?;
        inner.collections.insert(name.clone(), Arc::new(collection));
        log::debug!("stored {} objects as {name}", catalog.len());
        Ok(name)
    }

    /// Ingest `catalog` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError::Rejected`] if `name` is taken or the catalog
    /// is empty or unpositioned.
    pub fn insert_named(&self, name: &str, catalog: &Catalog) -> Result<(), IngestionError> {
        let mut inner = self.write()?;
        if inner.collections.contains_key(name) {
            return Err(IngestionError::Rejected(format!("collection {name} already exists")));
        }
        let collection = Collection::build(name.to_string(), catalog)?;
        inner.collections.insert(name.to_string(), Arc::new(collection));
        Ok(())
    }

    /// Look up a collection.
    #[must_use]
    pub fn collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.inner.read().ok()?.collections.get(name).cloned()
    }

    /// Objects of collection `name` inside `bounds`, or `None` if it does not exist.
    #[must_use]
    pub fn count_in(&self, name: &str, bounds: &TileBounds) -> Option<usize> {
        self.collection(name).map(|c| c.count_in(bounds))
    }

    /// Names of all collections, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .read()
            .map(|inner| inner.collections.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Number of collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.collections.len()).unwrap_or(0)
    }

    /// Returns true if no collection is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every collection.
    pub fn reset(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.collections.clear();
        }
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, IngestionError> {
        self.inner.write().map_err(|_| IngestionError::Backend("store lock poisoned".to_string()))
    }
}

impl IngestionTarget for MemoryStore {
    fn ingest(&mut self, catalog: &Catalog) -> Result<(), IngestionError> {
        self.insert(catalog).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::small_catalog;
    use crate::catalog::{jitter, Bounds, CatalogRecord, FieldValue};
    use crate::tiles::TileCoord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn positioned(rows: usize) -> Catalog {
        jitter(&small_catalog(rows), Bounds::default(), &mut StdRng::seed_from_u64(5))
    }

    #[test]
    fn test_insert_generates_unique_names() {
        let store = MemoryStore::new();
        let a = store.insert(&positioned(10)).unwrap();
        let b = store.insert(&positioned(10)).unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("catalog-"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let store = MemoryStore::new();
        store.insert_named("stars", &positioned(3)).unwrap();
        let err = store.insert_named("stars", &positioned(3)).unwrap_err();
        assert!(matches!(err, IngestionError::Rejected(_)));
    }

    #[test]
    fn test_unpositioned_and_empty_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(store.insert(&small_catalog(4)), Err(IngestionError::Rejected(_))));
        assert!(matches!(store.insert(&positioned(0)), Err(IngestionError::Rejected(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_meta_summary() {
        let store = MemoryStore::new();
        let catalog = positioned(100);
        let name = store.insert(&catalog).unwrap();
        let meta = store.collection(&name).unwrap().meta().clone();

        assert_eq!(meta.count, 100);
        assert_eq!(meta.render_mode, RenderMode::Point);
        assert!(meta.extent.x_min >= 0.0 && meta.extent.x_min + meta.extent.x_range <= 15.0);
        assert!(meta.min_max.contains_key("mag_r"));
        // `class` is text, so it has no range.
        assert!(!meta.min_max.contains_key("class"));
    }

    #[test]
    fn test_render_mode_from_columns() {
        let shape = Schema::new(["id", "a_image", "B_IMAGE", "theta_image"]);
        let radius = Schema::new(["id", "RADIUS"]);
        assert_eq!(RenderMode::for_schema(&shape), RenderMode::Shape);
        assert_eq!(RenderMode::for_schema(&radius), RenderMode::Radius);
        assert_eq!(RenderMode::for_schema(&Schema::new(["id"])), RenderMode::Point);
    }

    #[test]
    fn test_numeric_range() {
        let schema = Schema::new(["v"]);
        let records = [3.0, -1.5, 7.25]
            .into_iter()
            .map(|v| CatalogRecord::new(vec![FieldValue::Float(v)]))
            .collect();
        let catalog = jitter(&Catalog::new(schema, records), Bounds::default(), &mut StdRng::seed_from_u64(1));
        assert_eq!(numeric_ranges(&catalog)["v"], (-1.5, 7.25));
    }

    #[test]
    fn test_tile_counts_partition_the_collection() {
        let store = MemoryStore::new();
        let name = store.insert(&positioned(500)).unwrap();
        let collection = store.collection(&name).unwrap();
        let extent = collection.meta().extent;

        for z in 0..4u8 {
            let n = 1u32 << z;
            let total: usize = (0..n)
                .flat_map(|y| (0..n).map(move |x| TileCoord::new(x, y, z)))
                .map(|t| collection.count_in(&t.bounds(&extent)))
                .sum();
            assert_eq!(total, 500, "zoom {z}");
        }
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = MemoryStore::new();
        store.ingest(&positioned(5)).unwrap();
        let shared = store.clone();
        shared.reset();
        assert!(store.is_empty());
        assert!(store.count_in("catalog-1", &TileCoord::new(0, 0, 0).bounds(&Extent {
            x_min: 0.0,
            y_max: 1.0,
            x_range: 1.0,
            y_range: 1.0
        }))
        .is_none());
    }
}
