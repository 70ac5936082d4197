//! Uniform random position assignment.

use super::{Catalog, Position};
use crate::error::{Error, Result};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

/// Sky region positions are drawn from: `ra ∈ [0, width)`, `dec ∈ [0, height)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    width: f64,
    height: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self { width: 15.0, height: 15.0 }
    }
}

impl Bounds {
    /// Create bounds of the given extent in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless both extents are finite and positive.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(Error::InvalidArgument(format!(
                "bounds must be finite and positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Extent along `ra`.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Extent along `dec`.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Returns true if the position lies inside the half-open region.
    #[must_use]
    pub fn contains(&self, p: Position) -> bool {
        (0.0..self.width).contains(&p.ra) && (0.0..self.height).contains(&p.dec)
    }
}

/// Assign every row an independent uniform position within `bounds`.
///
/// Existing positions are overwritten in the returned catalog; `catalog`
/// itself is not modified.
pub fn jitter<R: Rng + ?Sized>(catalog: &Catalog, bounds: Bounds, rng: &mut R) -> Catalog {
    let ra = Uniform::new(0.0, bounds.width);
    let dec = Uniform::new(0.0, bounds.height);

    let rows = catalog
        .iter()
        .map(|row| row.with_position(Position::new(ra.sample(rng), dec.sample(rng))))
        .collect();

    Catalog::from_rows(catalog.shared_schema(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::small_catalog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_bounds_validation() {
        assert!(Bounds::new(15.0, 15.0).is_ok());
        assert!(Bounds::new(0.0, 1.0).is_err());
        assert!(Bounds::new(1.0, -2.0).is_err());
        assert!(Bounds::new(f64::NAN, 1.0).is_err());
        assert!(Bounds::new(f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn test_every_row_is_positioned_in_bounds() {
        let base = small_catalog(500);
        let bounds = Bounds::new(2.0, 0.5).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let out = jitter(&base, bounds, &mut rng);

        assert_eq!(out.len(), base.len());
        assert!(out.is_positioned());
        assert!(out.positions().all(|p| bounds.contains(p)));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let base = small_catalog(50);
        let mut rng = StdRng::seed_from_u64(1);

        let a = jitter(&base, Bounds::default(), &mut rng);
        let b = jitter(&base, Bounds::default(), &mut rng);

        assert_eq!(base.positions().count(), 0);
        assert_eq!(a.len(), b.len());
        assert_ne!(a.positions().collect::<Vec<_>>(), b.positions().collect::<Vec<_>>());
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let base = small_catalog(20);
        let a = jitter(&base, Bounds::default(), &mut StdRng::seed_from_u64(9));
        let b = jitter(&base, Bounds::default(), &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejitter_overwrites_positions() {
        let base = small_catalog(10);
        let mut rng = StdRng::seed_from_u64(3);
        let first = jitter(&base, Bounds::default(), &mut rng);
        let tight = Bounds::new(0.001, 0.001).unwrap();

        let second = jitter(&first, tight, &mut rng);

        assert!(second.positions().all(|p| tight.contains(p)));
        assert!(first.positions().any(|p| !tight.contains(p)));
    }

    #[test]
    fn test_records_are_shared_not_copied() {
        let base = small_catalog(5);
        let out = jitter(&base, Bounds::default(), &mut StdRng::seed_from_u64(0));
        for (a, b) in out.iter().zip(base.iter()) {
            assert!(a.shares_record_with(b));
        }
    }
}
