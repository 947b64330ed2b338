//! Burst hierarchy types.
//!
//! A [`BurstHierarchy`] is the output of burst detection for one key: a
//! sequence of contiguous, non-overlapping [`BurstInterval`]s covering the
//! key's first to last timestamp, each tagged with the automaton level that
//! was optimal over that stretch. Level 0 is the baseline rate.

use serde::{Deserialize, Serialize};

/// Tuning knobs for one burst-detection run.
///
/// - `s`: ratio between the event rates of consecutive levels (`s > 1`).
/// - `gamma`: cost multiplier for moving up a level (`gamma > 0`).
///
/// One `BurstParams` is exactly one parameter combination; sweeping several
/// values of `s` or `gamma` means issuing one batch call per combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurstParams {
    pub s: f64,
    pub gamma: f64,
}

impl BurstParams {
    pub fn new(s: f64, gamma: f64) -> Self {
        Self { s, gamma }
    }
}

impl Default for BurstParams {
    fn default() -> Self {
        Self { s: 2.0, gamma: 1.0 }
    }
}

/// One stretch of constant burst level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurstInterval {
    pub level: u32,
    pub start: f64,
    pub end: f64,
}

impl BurstInterval {
    pub fn new(level: u32, start: f64, end: f64) -> Self {
        Self { level, start, end }
    }

    /// Width of the interval.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Half-open intersection test against `[lower, upper)`.
    pub fn overlaps(&self, lower: f64, upper: f64) -> bool {
        self.start < upper && self.end > lower
    }
}

/// A burst in the classic nested presentation: every level `l >= 1` opens a
/// burst that stays open while the level remains at or above `l`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NestedBurst {
    pub level: u32,
    pub start: f64,
    pub end: f64,
}

/// Ordered burst intervals for one key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BurstHierarchy {
    intervals: Vec<BurstInterval>,
}

impl BurstHierarchy {
    /// Wrap intervals that are already sorted, contiguous and merged.
    pub fn from_intervals(intervals: Vec<BurstInterval>) -> Self {
        Self { intervals }
    }

    /// Trivial hierarchy: a single level-0 interval.
    pub fn baseline(start: f64, end: f64) -> Self {
        Self {
            intervals: vec![BurstInterval::new(0, start, end)],
        }
    }

    /// Hierarchy with no intervals (key had no timestamps).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn intervals(&self) -> &[BurstInterval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// `(first timestamp, last timestamp)` covered by the hierarchy.
    pub fn span(&self) -> Option<(f64, f64)> {
        let first = self.intervals.first()?;
        let last = self.intervals.last()?;
        Some((first.start, last.end))
    }

    /// Highest level reached anywhere; 0 for an empty hierarchy.
    pub fn max_level(&self) -> u32 {
        self.intervals.iter().map(|i| i.level).max().unwrap_or(0)
    }

    /// Level in effect at time `t`.
    ///
    /// Intervals are treated as `[start, end)` except the final one, which
    /// also contains its end point. Returns `None` outside the span.
    pub fn level_at(&self, t: f64) -> Option<u32> {
        let last = self.intervals.len().checked_sub(1)?;
        self.intervals
            .iter()
            .enumerate()
            .find(|(idx, iv)| iv.start <= t && (t < iv.end || (*idx == last && t <= iv.end)))
            .map(|(_, iv)| iv.level)
    }

    /// Maximum level among intervals intersecting `[lower, upper)`.
    ///
    /// No intersecting interval means the key was silent in the range,
    /// which reads as level 0.
    pub fn max_level_in(&self, lower: f64, upper: f64) -> u32 {
        self.intervals
            .iter()
            .filter(|iv| iv.overlaps(lower, upper))
            .map(|iv| iv.level)
            .max()
            .unwrap_or(0)
    }

    /// Nested burst list, sorted by `(start, level)`.
    ///
    /// Level 0 is implicit (it spans the whole hierarchy) and is not listed.
    pub fn nested(&self) -> Vec<NestedBurst> {
        let mut bursts: Vec<NestedBurst> = Vec::new();
        // Indices into `bursts` for levels 1..=current, innermost last.
        let mut open: Vec<usize> = Vec::new();
        let mut current = 0u32;

        for iv in &self.intervals {
            while current > iv.level {
                if let Some(idx) = open.pop() {
                    bursts[idx].end = iv.start;
                }
                current -= 1;
            }
            while current < iv.level {
                current += 1;
                open.push(bursts.len());
                bursts.push(NestedBurst {
                    level: current,
                    start: iv.start,
                    end: iv.end,
                });
            }
            for &idx in &open {
                bursts[idx].end = iv.end;
            }
        }

        bursts.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.level.cmp(&b.level)));
        bursts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BurstHierarchy {
        BurstHierarchy::from_intervals(vec![
            BurstInterval::new(0, 0.0, 10.0),
            BurstInterval::new(2, 10.0, 12.0),
            BurstInterval::new(1, 12.0, 15.0),
            BurstInterval::new(0, 15.0, 30.0),
        ])
    }

    #[test]
    fn test_span_and_max_level() {
        let h = sample();
        assert_eq!(h.span(), Some((0.0, 30.0)));
        assert_eq!(h.max_level(), 2);
        assert_eq!(BurstHierarchy::empty().max_level(), 0);
        assert_eq!(BurstHierarchy::empty().span(), None);
    }

    #[test]
    fn test_level_at_boundaries() {
        let h = sample();
        assert_eq!(h.level_at(0.0), Some(0));
        assert_eq!(h.level_at(10.0), Some(2));
        assert_eq!(h.level_at(11.99), Some(2));
        assert_eq!(h.level_at(12.0), Some(1));
        assert_eq!(h.level_at(30.0), Some(0));
        assert_eq!(h.level_at(30.5), None);
        assert_eq!(h.level_at(-1.0), None);
    }

    #[test]
    fn test_max_level_in_half_open_range() {
        let h = sample();
        assert_eq!(h.max_level_in(0.0, 10.0), 0);
        assert_eq!(h.max_level_in(0.0, 10.5), 2);
        assert_eq!(h.max_level_in(14.0, 20.0), 1);
        assert_eq!(h.max_level_in(15.0, 20.0), 0);
        assert_eq!(h.max_level_in(40.0, 50.0), 0);
    }

    #[test]
    fn test_nested_bursts() {
        let nested = sample().nested();
        assert_eq!(
            nested,
            vec![
                NestedBurst { level: 1, start: 10.0, end: 15.0 },
                NestedBurst { level: 2, start: 10.0, end: 12.0 },
            ]
        );
    }

    #[test]
    fn test_nested_bursts_separate_episodes() {
        let h = BurstHierarchy::from_intervals(vec![
            BurstInterval::new(1, 0.0, 3.0),
            BurstInterval::new(0, 3.0, 20.0),
            BurstInterval::new(1, 20.0, 23.0),
        ]);
        let nested = h.nested();
        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0], NestedBurst { level: 1, start: 0.0, end: 3.0 });
        assert_eq!(nested[1], NestedBurst { level: 1, start: 20.0, end: 23.0 });
    }

    #[test]
    fn test_baseline_has_no_nested_bursts() {
        assert!(BurstHierarchy::baseline(0.0, 5.0).nested().is_empty());
    }

    #[test]
    fn test_hierarchy_serializes_as_list() {
        let h = BurstHierarchy::baseline(1.0, 2.0);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, r#"[{"level":0,"start":1.0,"end":2.0}]"#);
    }
}
