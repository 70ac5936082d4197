//! Data-to-pixel scales for chart axes.

use crate::error::{Error, Result};

/// Maps domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Domain extent.
    fn domain(&self) -> (D, D);

    /// Range extent.
    fn range(&self) -> (R, R);
}

/// Linear scale for continuous-to-continuous mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScaleDomain`] if the domain is empty or not finite.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(Error::ScaleDomain(format!("non-finite domain {domain:?}")));
        }
        if (domain.1 - domain.0).abs() < f64::EPSILON {
            return Err(Error::ScaleDomain("domain min and max cannot be equal".to_string()));
        }
        Ok(Self { domain_min: domain.0, domain_max: domain.1, range_min: range.0, range_max: range.1 })
    }

    /// Scale covering the finite values of `data`, widened to "nice" tick
    /// boundaries. A single distinct value gets a unit-wide domain around it.
    #[must_use]
    pub fn covering(data: impl IntoIterator<Item = f64>, range: (f64, f64)) -> Option<Self> {
        let (lo, hi) = data
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })?;

        let (lo, hi) = if hi - lo < f64::EPSILON {
            let pad = (lo.abs() * 0.5).max(0.5);
            (lo - pad, hi + pad)
        } else {
            (lo, hi)
        };

        let step = nice_step(hi - lo, 5);
        Self::new(((lo / step).floor() * step, (hi / step).ceil() * step), range).ok()
    }

    /// Map a range value back to the domain.
    #[must_use]
    pub fn invert(&self, value: f64) -> f64 {
        let t = (value - self.range_min) / (self.range_max - self.range_min);
        self.domain_min + t * (self.domain_max - self.domain_min)
    }

    /// Roughly `count` evenly spaced round values inside the domain.
    #[must_use]
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = (self.domain_min.min(self.domain_max), self.domain_min.max(self.domain_max));
        let step = nice_step(hi - lo, count.max(1));
        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

impl Scale<f64, f64> for LinearScale {
    fn scale(&self, value: f64) -> f64 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f64, f64) {
        (self.range_min, self.range_max)
    }
}

/// A 1, 2, or 5 times power-of-ten step splitting `span` into about `count` parts.
fn nice_step(span: f64, count: usize) -> f64 {
    let raw = span / count as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_scale_maps_and_inverts() {
        let s = LinearScale::new((0.0, 10.0), (100.0, 0.0)).unwrap();
        assert_relative_eq!(s.scale(0.0), 100.0);
        assert_relative_eq!(s.scale(2.5), 75.0);
        assert_relative_eq!(s.invert(75.0), 2.5);
    }

    #[test]
    fn test_degenerate_domain_rejected() {
        assert!(matches!(LinearScale::new((1.0, 1.0), (0.0, 1.0)), Err(Error::ScaleDomain(_))));
        assert!(LinearScale::new((0.0, f64::NAN), (0.0, 1.0)).is_err());
    }

    #[test]
    fn test_covering_ignores_nan_and_rounds_out() {
        let s = LinearScale::covering([1000.0, f64::NAN, 4300.0], (0.0, 1.0)).unwrap();
        let (lo, hi) = s.domain();
        assert!(lo <= 1000.0 && hi >= 4300.0);
        assert_relative_eq!(lo, 1000.0);
        assert_relative_eq!(hi, 5000.0);
    }

    #[test]
    fn test_covering_single_value_and_empty() {
        let s = LinearScale::covering([3.0], (0.0, 1.0)).unwrap();
        let (lo, hi) = s.domain();
        assert!(lo < 3.0 && hi > 3.0);
        assert!(LinearScale::covering([f64::NAN], (0.0, 1.0)).is_none());
    }

    #[test]
    fn test_ticks_are_round() {
        let s = LinearScale::new((0.0, 100.0), (0.0, 1.0)).unwrap();
        let ticks = s.ticks(5);
        assert_eq!(ticks.len(), 6);
        assert_relative_eq!(ticks[1], 20.0);
    }
}
