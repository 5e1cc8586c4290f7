//! Balance algebra over (amount, badge IDs, ownership times).
//!
//! A balance list describes how much of which badges an owner holds, and
//! for which ownership times. Addition and subtraction decompose the two
//! range dimensions into an atomic grid, apply the change per cell, and
//! rebuild a canonical list. The canonical form is what gets persisted, so
//! the rebuild must be deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::BalanceError;
use crate::types::ranges::{self, UintRange};

/// An amount of badges held over a set of badge IDs and ownership times.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Amount held for every (badge ID, ownership time) point covered.
    pub amount: u64,
    /// Badge IDs this amount applies to.
    pub badge_ids: Vec<UintRange>,
    /// Ownership times this amount applies to.
    pub ownership_times: Vec<UintRange>,
}

impl Balance {
    /// A balance covering the given ranges.
    pub fn new(amount: u64, badge_ids: Vec<UintRange>, ownership_times: Vec<UintRange>) -> Self {
        Self {
            amount,
            badge_ids,
            ownership_times,
        }
    }
}

/// Atomic grid decomposition of one or more balance lists.
///
/// Cut points are collected from every range bound (`start` and `end + 1`),
/// so every input range aligns exactly with a span of grid segments.
struct Grid {
    id_cuts: Vec<u128>,
    time_cuts: Vec<u128>,
    /// Amount per (id segment index, time segment index). Zero cells are
    /// kept out of the map.
    cells: BTreeMap<(usize, usize), u64>,
}

impl Grid {
    fn new(lists: &[&[Balance]]) -> Self {
        let mut id_cuts: Vec<u128> = Vec::new();
        let mut time_cuts: Vec<u128> = Vec::new();
        for list in lists {
            for balance in *list {
                for r in &balance.badge_ids {
                    id_cuts.push(r.start as u128);
                    id_cuts.push(r.end as u128 + 1);
                }
                for r in &balance.ownership_times {
                    time_cuts.push(r.start as u128);
                    time_cuts.push(r.end as u128 + 1);
                }
            }
        }
        id_cuts.sort_unstable();
        id_cuts.dedup();
        time_cuts.sort_unstable();
        time_cuts.dedup();
        Self {
            id_cuts,
            time_cuts,
            cells: BTreeMap::new(),
        }
    }

    /// Segment indices spanned by a range. Bounds always align because the
    /// grid was cut from the same range lists.
    fn segments(cuts: &[u128], range: &UintRange) -> std::ops::Range<usize> {
        let lo = cuts.binary_search(&(range.start as u128)).unwrap_or(0);
        let hi = cuts
            .binary_search(&(range.end as u128 + 1))
            .unwrap_or(cuts.len());
        lo..hi
    }

    fn add(&mut self, balance: &Balance) -> Result<(), BalanceError> {
        for id_range in &balance.badge_ids {
            for id_seg in Self::segments(&self.id_cuts, id_range) {
                for time_range in &balance.ownership_times {
                    for time_seg in Self::segments(&self.time_cuts, time_range) {
                        let cell = self.cells.entry((id_seg, time_seg)).or_insert(0);
                        *cell = cell
                            .checked_add(balance.amount)
                            .ok_or(BalanceError::AmountOverflow)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn subtract(&mut self, balance: &Balance) -> Result<(), BalanceError> {
        for id_range in &balance.badge_ids {
            for id_seg in Self::segments(&self.id_cuts, id_range) {
                for time_range in &balance.ownership_times {
                    for time_seg in Self::segments(&self.time_cuts, time_range) {
                        let available =
                            self.cells.get(&(id_seg, time_seg)).copied().unwrap_or(0);
                        if available < balance.amount {
                            return Err(BalanceError::InsufficientBalance {
                                needed: balance.amount,
                                available,
                            });
                        }
                        self.cells.insert((id_seg, time_seg), available - balance.amount);
                    }
                }
            }
        }
        Ok(())
    }

    fn segment_range(cuts: &[u128], seg: usize) -> UintRange {
        UintRange {
            start: cuts[seg] as u64,
            end: (cuts[seg + 1] - 1) as u64,
        }
    }

    /// Rebuild a canonical balance list: group nonzero cells by amount,
    /// merge badge segments per time segment, then merge time segments that
    /// carry identical badge sets.
    fn rebuild(&self) -> Vec<Balance> {
        // amount -> time segment -> merged badge ranges
        let mut by_amount: BTreeMap<u64, BTreeMap<usize, Vec<usize>>> = BTreeMap::new();
        for (&(id_seg, time_seg), &amount) in &self.cells {
            if amount == 0 {
                continue;
            }
            by_amount
                .entry(amount)
                .or_default()
                .entry(time_seg)
                .or_default()
                .push(id_seg);
        }

        let mut result = Vec::new();
        for (amount, times) in by_amount {
            // Group time segments by the badge-range signature they carry.
            let mut by_signature: BTreeMap<Vec<(u64, u64)>, Vec<usize>> = BTreeMap::new();
            for (time_seg, id_segs) in times {
                let id_ranges = self.merge_segments(&self.id_cuts, &id_segs);
                let signature: Vec<(u64, u64)> =
                    id_ranges.iter().map(|r| (r.start, r.end)).collect();
                by_signature.entry(signature).or_default().push(time_seg);
            }
            for (signature, time_segs) in by_signature {
                let badge_ids: Vec<UintRange> = signature
                    .iter()
                    .map(|&(start, end)| UintRange { start, end })
                    .collect();
                let ownership_times = self.merge_segments(&self.time_cuts, &time_segs);
                result.push(Balance {
                    amount,
                    badge_ids,
                    ownership_times,
                });
            }
        }

        result.sort_by_key(|b| {
            (
                b.badge_ids[0].start,
                b.ownership_times[0].start,
                b.amount,
            )
        });
        result
    }

    /// Merge a sorted list of segment indices into ranges, coalescing
    /// numerically adjacent segments (segment i ends where i+1 starts).
    fn merge_segments(&self, cuts: &[u128], segs: &[usize]) -> Vec<UintRange> {
        let mut ranges: Vec<UintRange> = Vec::new();
        for &seg in segs {
            let range = Self::segment_range(cuts, seg);
            match ranges.last_mut() {
                Some(last) if last.end as u128 + 1 == range.start as u128 => {
                    last.end = range.end;
                }
                _ => ranges.push(range),
            }
        }
        ranges
    }
}

/// Add `delta` to `base`, returning the canonical combined list.
pub fn add_balances(base: &[Balance], delta: &[Balance]) -> Result<Vec<Balance>, BalanceError> {
    let mut grid = Grid::new(&[base, delta]);
    for balance in base.iter().chain(delta) {
        grid.add(balance)?;
    }
    Ok(grid.rebuild())
}

/// Subtract `delta` from `base`, returning the canonical remainder.
///
/// Fails with `InsufficientBalance` if any (badge, time) point of `delta`
/// holds less than the subtracted amount in `base`.
pub fn subtract_balances(
    base: &[Balance],
    delta: &[Balance],
) -> Result<Vec<Balance>, BalanceError> {
    let mut grid = Grid::new(&[base, delta]);
    for balance in base {
        grid.add(balance)?;
    }
    for balance in delta {
        grid.subtract(balance)?;
    }
    Ok(grid.rebuild())
}

/// Amount held at a single (badge ID, ownership time) point.
///
/// Overlapping entries are additive, matching `add_balances` semantics.
pub fn amount_at(balances: &[Balance], badge_id: u64, time: u64) -> u64 {
    balances
        .iter()
        .filter(|b| {
            ranges::contains_value(&b.badge_ids, badge_id)
                && ranges::contains_value(&b.ownership_times, time)
        })
        .fold(0u64, |acc, b| acc.saturating_add(b.amount))
}

/// Check that `current` stays at or under `threshold` everywhere.
///
/// Regions not covered by `threshold` are capped at zero, so any positive
/// amount there fails the check.
pub fn within_threshold(current: &[Balance], threshold: &[Balance]) -> bool {
    let mut have = Grid::new(&[current, threshold]);
    let mut cap = Grid::new(&[current, threshold]);
    for balance in current {
        if have.add(balance).is_err() {
            return false;
        }
    }
    for balance in threshold {
        if cap.add(balance).is_err() {
            return false;
        }
    }
    have.cells.iter().all(|(cell, &amount)| {
        amount == 0 || cap.cells.get(cell).copied().unwrap_or(0) >= amount
    })
}
