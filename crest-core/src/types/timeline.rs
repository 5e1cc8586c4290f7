//! Time-varying configuration values.
//!
//! A timeline is an ordered list of (value, applicable time ranges) pairs.
//! Resolution at an instant is a pure first-match scan; entries are
//! intended to be non-overlapping, and update handlers reject timelines
//! that would introduce an overlap, but resolution itself never errors.

use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::types::ranges::{self, UintRange};

/// One timeline entry: a value and the times it applies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry<V> {
    /// The value in effect during `times`.
    pub value: V,
    /// The time instants this entry covers.
    pub times: Vec<UintRange>,
}

impl<V> TimelineEntry<V> {
    /// An entry in effect at all times.
    pub fn always(value: V) -> Self {
        Self {
            value,
            times: vec![UintRange::full()],
        }
    }
}

/// An ordered list of timeline entries.
pub type Timeline<V> = Vec<TimelineEntry<V>>;

/// Resolve the value in effect at `at`.
///
/// Scans entries in list order and returns the first whose times contain
/// `at`. Overlapping entries are a data anomaly elsewhere; here the first
/// match deterministically wins and no error is raised.
pub fn resolve_timeline<V>(timeline: &[TimelineEntry<V>], at: u64) -> Option<&V> {
    timeline
        .iter()
        .find(|entry| ranges::contains_value(&entry.times, at))
        .map(|entry| &entry.value)
}

/// Reject timelines in which two entries claim the same instant.
pub fn validate_timeline<V>(timeline: &[TimelineEntry<V>]) -> Result<(), TimelineError> {
    for (i, entry) in timeline.iter().enumerate() {
        for later in &timeline[i + 1..] {
            for a in &entry.times {
                for b in &later.times {
                    if let Some(overlap) = a.intersection(b) {
                        return Err(TimelineError::OverlappingTimes {
                            instant: overlap.start,
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(start: u64, end: u64) -> UintRange {
        UintRange { start, end }
    }

    fn timeline() -> Timeline<&'static str> {
        vec![
            TimelineEntry {
                value: "early",
                times: vec![r(0, 99)],
            },
            TimelineEntry {
                value: "late",
                times: vec![r(100, 199), r(300, 400)],
            },
        ]
    }

    #[test]
    fn test_resolve_first_match() {
        let t = timeline();
        assert_eq!(resolve_timeline(&t, 50), Some(&"early"));
        assert_eq!(resolve_timeline(&t, 150), Some(&"late"));
        assert_eq!(resolve_timeline(&t, 350), Some(&"late"));
        assert_eq!(resolve_timeline(&t, 250), None);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let t = timeline();
        assert_eq!(resolve_timeline(&t, 120), resolve_timeline(&t, 120));
    }

    #[test]
    fn test_resolve_overlap_picks_list_order() {
        let t = vec![
            TimelineEntry {
                value: "first",
                times: vec![r(0, 100)],
            },
            TimelineEntry {
                value: "second",
                times: vec![r(50, 200)],
            },
        ];
        // Overlap is malformed data, but resolution still picks the first
        // entry in list order without erroring.
        assert_eq!(resolve_timeline(&t, 75), Some(&"first"));
    }

    #[test]
    fn test_validate_detects_overlap() {
        let t = vec![
            TimelineEntry {
                value: 1u32,
                times: vec![r(0, 100)],
            },
            TimelineEntry {
                value: 2u32,
                times: vec![r(100, 200)],
            },
        ];
        assert!(matches!(
            validate_timeline(&t),
            Err(TimelineError::OverlappingTimes { instant: 100 })
        ));
    }

    #[test]
    fn test_validate_accepts_disjoint() {
        assert!(validate_timeline(&timeline()).is_ok());
        assert!(validate_timeline::<u32>(&[]).is_ok());
    }

    #[test]
    fn test_always_entry() {
        let t = vec![TimelineEntry::always(7u32)];
        assert_eq!(resolve_timeline(&t, 0), Some(&7));
        assert_eq!(resolve_timeline(&t, u64::MAX), Some(&7));
    }
}
