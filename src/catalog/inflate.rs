//! Geometric catalog duplication.
//!
//! Each round appends a copy of the current catalog to itself, so `times`
//! rounds multiply the row count by `2^times`. Rows are shared, not cloned,
//! and existing rows are never reordered.

use super::Catalog;
use crate::error::{Error, Result};

/// A validated, non-negative number of doubling rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct DuplicationCount(u32);

impl DuplicationCount {
    /// Number of rounds.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for DuplicationCount {
    fn from(times: u32) -> Self {
        Self(times)
    }
}

impl TryFrom<i64> for DuplicationCount {
    type Error = Error;

    fn try_from(times: i64) -> Result<Self> {
        u32::try_from(times).map(Self).map_err(|_| {
            Error::InvalidArgument(format!("duplication count must be in 0..=u32::MAX, got {times}"))
        })
    }
}

/// Duplicate `catalog` `times` times; output length is `len * 2^times`.
///
/// `times == 0` returns an equivalent copy. Counts from untyped input
/// (configuration, CLI) go through [`DuplicationCount::try_from`] first.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the resulting size overflows `usize`.
pub fn inflate(catalog: &Catalog, times: u32) -> Result<Catalog> {
    let target = 1usize
        .checked_shl(times)
        .and_then(|factor| catalog.len().checked_mul(factor))
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "inflating {} rows {times} times overflows the address space",
                catalog.len()
            ))
        })?;

    let mut rows = Vec::with_capacity(target);
    rows.extend_from_slice(catalog.rows());
    for _ in 0..times {
        rows.extend_from_within(..);
    }
    debug_assert_eq!(rows.len(), target);

    Ok(Catalog::from_rows(catalog.shared_schema(), rows))
}

/// Smallest number of rounds with `base_len * 2^rounds >= target`.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `base_len` is zero or `target` is
/// smaller than `base_len`.
pub fn rounds_to_reach(base_len: usize, target: usize) -> Result<u32> {
    if base_len == 0 {
        return Err(Error::InvalidArgument("base catalog is empty".to_string()));
    }
    if target < base_len {
        return Err(Error::InvalidArgument(format!(
            "target size {target} is smaller than the base catalog ({base_len} rows)"
        )));
    }

    let mut rounds = 0u32;
    let mut len = base_len;
    while len < target {
        len = len.saturating_mul(2);
        rounds += 1;
    }
    Ok(rounds)
}
