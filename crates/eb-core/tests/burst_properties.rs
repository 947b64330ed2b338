//! Property-based tests for burst hierarchies.
//!
//! Random event sequences (with duplicates) and random parameters must
//! always produce a contiguous, exactly-covering, merged hierarchy.

use eb_common::BurstParams;
use eb_core::burst::{BurstDetector, DetectorConfig};
use proptest::prelude::*;

/// Ascending offsets with at least two distinct values.
fn offsets_strategy() -> impl Strategy<Value = Vec<f64>> {
    (
        -1000.0..1000.0f64,
        prop::collection::vec(prop_oneof![1 => Just(0.0), 4 => 0.01..50.0f64], 1..60),
    )
        .prop_filter("needs two distinct timestamps", |(_, gaps)| {
            gaps.iter().any(|g| *g > 0.0)
        })
        .prop_map(|(start, gaps)| {
            let mut offsets = Vec::with_capacity(gaps.len() + 1);
            let mut t = start;
            offsets.push(t);
            for g in gaps {
                t += g;
                offsets.push(t);
            }
            offsets
        })
}

fn detector(s: f64, gamma: f64) -> BurstDetector {
    BurstDetector::new(BurstParams::new(s, gamma), DetectorConfig::default())
        .expect("parameters in range")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Intervals tile [first, last] with no gaps or overlaps.
    #[test]
    fn hierarchy_is_contiguous_and_covering(
        offsets in offsets_strategy(),
        s in 1.1..5.0f64,
        gamma in 0.05..5.0f64,
    ) {
        let h = detector(s, gamma).detect(&offsets).unwrap();
        let intervals = h.intervals();
        prop_assert!(!intervals.is_empty());
        prop_assert_eq!(intervals[0].start, offsets[0]);
        prop_assert_eq!(intervals[intervals.len() - 1].end, offsets[offsets.len() - 1]);
        for pair in intervals.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
        for iv in intervals {
            prop_assert!(iv.start <= iv.end);
        }
    }

    /// Runs are merged: neighbours never share a level.
    #[test]
    fn adjacent_levels_differ(
        offsets in offsets_strategy(),
        s in 1.1..5.0f64,
        gamma in 0.05..5.0f64,
    ) {
        let h = detector(s, gamma).detect(&offsets).unwrap();
        for pair in h.intervals().windows(2) {
            prop_assert_ne!(pair[0].level, pair[1].level);
        }
    }

    /// Level changes only happen at the key's own timestamps.
    #[test]
    fn boundaries_are_event_times(offsets in offsets_strategy(), gamma in 0.05..5.0f64) {
        let h = detector(2.0, gamma).detect(&offsets).unwrap();
        for iv in h.intervals() {
            prop_assert!(offsets.contains(&iv.start));
            prop_assert!(offsets.contains(&iv.end));
        }
    }

    /// Same input, same output, regardless of input order.
    #[test]
    fn detection_is_deterministic(offsets in offsets_strategy(), gamma in 0.05..5.0f64) {
        let d = detector(2.0, gamma);
        let first = d.detect(&offsets).unwrap();
        let again = d.detect(&offsets).unwrap();
        prop_assert_eq!(&first, &again);

        let mut reversed = offsets.clone();
        reversed.reverse();
        prop_assert_eq!(&first, &d.detect(&reversed).unwrap());
    }

    /// Raising gamma with s fixed never raises the maximum level or the
    /// total amount of upward movement.
    #[test]
    fn higher_gamma_never_climbs_higher(
        offsets in offsets_strategy(),
        s in 1.1..5.0f64,
        gamma in 0.05..5.0f64,
        factor in 1.5..10.0f64,
    ) {
        let climb = |levels: &[u32]| -> u32 {
            levels.windows(2).map(|w| w[1].saturating_sub(w[0])).sum()
        };
        let low = detector(s, gamma).detect(&offsets).unwrap();
        let high = detector(s, gamma * factor).detect(&offsets).unwrap();
        prop_assert!(high.max_level() <= low.max_level(),
            "gamma {} -> {} raised max level {} -> {}",
            gamma, gamma * factor, low.max_level(), high.max_level());

        let levels = |h: &eb_common::BurstHierarchy| -> Vec<u32> {
            h.intervals().iter().map(|iv| iv.level).collect()
        };
        prop_assert!(climb(levels(&high).as_slice()) <= climb(levels(&low).as_slice()));
    }

    /// Levels stay below the state bound.
    #[test]
    fn levels_respect_state_count(offsets in offsets_strategy(), s in 1.1..5.0f64) {
        let d = detector(s, 1.0);
        let k = d.state_count(&offsets).unwrap();
        let h = d.detect(&offsets).unwrap();
        prop_assert!((h.max_level() as usize) < k);
    }

    /// The nested view never reports a burst outside the hierarchy's span.
    #[test]
    fn nested_bursts_within_span(offsets in offsets_strategy(), gamma in 0.05..5.0f64) {
        let h = detector(2.0, gamma).detect(&offsets).unwrap();
        let (lo, hi) = h.span().unwrap();
        for burst in h.nested() {
            prop_assert!(burst.level >= 1);
            prop_assert!(burst.level <= h.max_level());
            prop_assert!(burst.start >= lo && burst.end <= hi);
            prop_assert!(burst.start <= burst.end);
        }
    }
}
