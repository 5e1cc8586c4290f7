//! Closed integer intervals and range-set arithmetic.
//!
//! `UintRange` lists are the ledger's universal coordinate system: badge
//! IDs, transfer times, ownership times, and timeline times are all
//! expressed as lists of closed `[start, end]` intervals over `u64`.

use serde::{Deserialize, Serialize};

use crate::error::RangeError;

/// A closed interval of unsigned integers: `start..=end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UintRange {
    /// Inclusive lower bound.
    pub start: u64,
    /// Inclusive upper bound. Must be `>= start`.
    pub end: u64,
}

impl UintRange {
    /// Create a range, rejecting inverted bounds.
    pub fn new(start: u64, end: u64) -> Result<Self, RangeError> {
        if end < start {
            return Err(RangeError::InvalidBounds { start, end });
        }
        Ok(Self { start, end })
    }

    /// The full `u64` domain.
    #[inline]
    pub const fn full() -> Self {
        Self { start: 0, end: u64::MAX }
    }

    /// A single-value range.
    #[inline]
    pub const fn point(value: u64) -> Self {
        Self { start: value, end: value }
    }

    /// Check whether `value` lies inside this range.
    #[inline]
    pub fn contains(&self, value: u64) -> bool {
        self.start <= value && value <= self.end
    }

    /// Check whether two ranges share at least one value.
    #[inline]
    pub fn overlaps(&self, other: &UintRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The overlapping portion of two ranges, if any.
    pub fn intersection(&self, other: &UintRange) -> Option<UintRange> {
        if !self.overlaps(other) {
            return None;
        }
        Some(UintRange {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }
}

/// Sort a range list and merge overlapping or adjacent ranges.
///
/// The result is the canonical form of the set: sorted by start, disjoint,
/// with no two ranges mergeable.
pub fn normalize(ranges: &[UintRange]) -> Vec<UintRange> {
    let mut sorted: Vec<UintRange> = ranges.to_vec();
    sorted.sort_by_key(|r| (r.start, r.end));

    let mut merged: Vec<UintRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match merged.last_mut() {
            // Adjacent (end + 1 == start) counts as mergeable; guard the +1
            // against overflow at u64::MAX.
            Some(last) if range.start <= last.end.saturating_add(1) => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Check whether any range in the list contains `value`.
pub fn contains_value(ranges: &[UintRange], value: u64) -> bool {
    ranges.iter().any(|r| r.contains(value))
}

/// Check whether the set described by `outer` contains every value of `inner`.
pub fn contains_range(outer: &[UintRange], inner: &UintRange) -> bool {
    let mut remaining = *inner;
    for range in normalize(outer) {
        if range.start > remaining.start {
            return false;
        }
        if range.end >= remaining.end {
            return true;
        }
        if range.end >= remaining.start {
            if range.end == u64::MAX {
                return true;
            }
            remaining.start = range.end + 1;
        }
    }
    false
}

/// Check whether `outer` contains every value of every range in `inner`.
pub fn contains_all(outer: &[UintRange], inner: &[UintRange]) -> bool {
    inner.iter().all(|r| contains_range(outer, r))
}

/// The complement of a range set over the full `u64` domain.
pub fn invert(ranges: &[UintRange]) -> Vec<UintRange> {
    let mut result = Vec::new();
    let mut cursor: u128 = 0;
    for range in normalize(ranges) {
        if (range.start as u128) > cursor {
            result.push(UintRange {
                start: cursor as u64,
                end: range.start - 1,
            });
        }
        cursor = range.end as u128 + 1;
    }
    if cursor <= u64::MAX as u128 {
        result.push(UintRange {
            start: cursor as u64,
            end: u64::MAX,
        });
    }
    result
}

/// The intersection of two range sets.
pub fn intersect(a: &[UintRange], b: &[UintRange]) -> Vec<UintRange> {
    let a = normalize(a);
    let b = normalize(b);
    let mut result = Vec::new();
    for ra in &a {
        for rb in &b {
            if let Some(overlap) = ra.intersection(rb) {
                result.push(overlap);
            }
        }
    }
    normalize(&result)
}

/// Check whether two range sets share at least one value.
pub fn overlaps(a: &[UintRange], b: &[UintRange]) -> bool {
    a.iter().any(|ra| b.iter().any(|rb| ra.overlaps(rb)))
}

/// Shift every range in the list upward by `by`, failing on overflow.
pub fn offset(ranges: &[UintRange], by: u64) -> Result<Vec<UintRange>, RangeError> {
    ranges
        .iter()
        .map(|r| {
            let start = r.start.checked_add(by).ok_or(RangeError::Overflow)?;
            let end = r.end.checked_add(by).ok_or(RangeError::Overflow)?;
            Ok(UintRange { start, end })
        })
        .collect()
}

/// Validate that every range in a list is well-formed (`end >= start`).
pub fn validate(ranges: &[UintRange]) -> Result<(), RangeError> {
    for range in ranges {
        if range.end < range.start {
            return Err(RangeError::InvalidBounds {
                start: range.start,
                end: range.end,
            });
        }
    }
    Ok(())
}
