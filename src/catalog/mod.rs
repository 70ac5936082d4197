//! Catalog data model and workload generation.
//!
//! A [`Catalog`] is an ordered sequence of [`PositionedRecord`]s sharing one
//! [`Schema`]. Record payloads are reference-counted, so duplicating a
//! catalog copies pointers, never field data, and a record can never be
//! mutated after sampling.
//!
//! The workload pipeline is `sample → inflate → jitter`:
//!
//! ```rust,ignore
//! use catalog_bench::catalog::{inflate, jitter, sample, Bounds};
//! use rand::SeedableRng;
//!
//! let base = sample("sdss_dr12.csv")?;
//! let big = inflate(&base, 4)?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let positioned = jitter(&big, Bounds::default(), &mut rng);
//! ```

mod inflate;
mod jitter;
mod sampler;

pub use inflate::{inflate, rounds_to_reach, DuplicationCount};
pub use jitter::{jitter, Bounds};
pub use sampler::{sample, sample_reader, sample_with_limit};

use std::fmt;
use std::sync::Arc;

/// Column names of a catalog, excluding position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    fields: Vec<String>,
}

impl Schema {
    /// Create a schema from column names.
    #[must_use]
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { fields: fields.into_iter().map(Into::into).collect() }
    }

    /// Column names in order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Index of a column, compared case-insensitively.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.eq_ignore_ascii_case(name))
    }

    /// Returns true if every name is present (case-insensitive).
    #[must_use]
    pub fn contains_all(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.index_of(n).is_some())
    }
}

/// A scalar cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Integer cell.
    Int(i64),
    /// Floating-point cell.
    Float(f64),
    /// Anything that did not parse as a number.
    Text(String),
}

impl FieldValue {
    /// Parse a raw cell: integer first, then float, else text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            Self::Int(i)
        } else if let Ok(f) = trimmed.parse::<f64>() {
            Self::Float(f)
        } else {
            Self::Text(raw.to_string())
        }
    }

    /// Numeric view of the value, if it has one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One catalog row without position. Immutable once sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    values: Vec<FieldValue>,
}

impl CatalogRecord {
    /// Create a record from cell values.
    #[must_use]
    pub fn new(values: Vec<FieldValue>) -> Self {
        Self { values }
    }

    /// Cell values in schema order.
    #[must_use]
    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    /// Cell at a column index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index)
    }
}

/// Sky position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// Right ascension.
    pub ra: f64,
    /// Declination.
    pub dec: f64,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }
}

/// A shared record plus an optional position.
///
/// Sampled rows have no position; the jitterer assigns one.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedRecord {
    record: Arc<CatalogRecord>,
    position: Option<Position>,
}

impl PositionedRecord {
    /// Wrap a record with no position.
    #[must_use]
    pub fn unpositioned(record: Arc<CatalogRecord>) -> Self {
        Self { record, position: None }
    }

    /// Same record, new position.
    #[must_use]
    pub fn with_position(&self, position: Position) -> Self {
        Self { record: Arc::clone(&self.record), position: Some(position) }
    }

    /// The record payload.
    #[must_use]
    pub fn record(&self) -> &CatalogRecord {
        &self.record
    }

    /// Assigned position, if any.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Returns true if both rows share the same record allocation.
    #[must_use]
    pub fn shares_record_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.record, &other.record)
    }
}

/// Ordered sequence of positioned records with a shared schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Catalog {
    schema: Arc<Schema>,
    rows: Vec<PositionedRecord>,
}

impl Catalog {
    /// Build an unpositioned catalog from records.
    #[must_use]
    pub fn new(schema: Schema, records: Vec<CatalogRecord>) -> Self {
        let rows = records.into_iter().map(|r| PositionedRecord::unpositioned(Arc::new(r))).collect();
        Self { schema: Arc::new(schema), rows }
    }

    /// Build a catalog that reuses an existing schema.
    pub(crate) fn from_rows(schema: Arc<Schema>, rows: Vec<PositionedRecord>) -> Self {
        Self { schema, rows }
    }

    /// Column names shared by every row.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub(crate) fn shared_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    /// Rows in order.
    #[must_use]
    pub fn rows(&self) -> &[PositionedRecord] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the catalog has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over rows.
    pub fn iter(&self) -> impl Iterator<Item = &PositionedRecord> {
        self.rows.iter()
    }

    /// Iterate over assigned positions, skipping unpositioned rows.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.rows.iter().filter_map(PositionedRecord::position)
    }

    /// Returns true if every row carries a position.
    #[must_use]
    pub fn is_positioned(&self) -> bool {
        self.rows.iter().all(|r| r.position.is_some())
    }

    /// The first `len` rows, in order. Never resamples.
    #[must_use]
    pub fn prefix(&self, len: usize) -> Self {
        let end = len.min(self.rows.len());
        Self::from_rows(self.shared_schema(), self.rows[..end].to_vec())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Small catalog with three numeric columns and a label.
    pub(crate) fn small_catalog(rows: usize) -> Catalog {
        let schema = Schema::new(["objid", "mag_r", "redshift", "class"]);
        let records = (0..rows)
            .map(|i| {
                CatalogRecord::new(vec![
                    FieldValue::Int(i as i64),
                    FieldValue::Float(17.0 + i as f64 * 0.1),
                    FieldValue::Float(0.01 * i as f64),
                    FieldValue::Text(if i % 2 == 0 { "GALAXY" } else { "STAR" }.to_string()),
                ])
            })
            .collect();
        Catalog::new(schema, records)
    }
}
