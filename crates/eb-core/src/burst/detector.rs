//! Kleinberg burst detection over one key's event offsets.
//!
//! # Model
//!
//! Events are generated by an automaton with states `0, 1, 2, ...`; in state
//! `i` the gaps between events are exponential with rate
//! ```text
//! α_i = α_0 · s^i,    α_0 = (n - 1) / (t_last - t_first)
//! ```
//! so state 0 reproduces the sequence's mean gap and every level above it is
//! `s` times faster. Each gap `x_t` is assigned a state `q_t`, and the chosen
//! sequence minimizes
//! ```text
//! Σ_t [ -ln α_{q_t} + α_{q_t} · x_t ]  +  Σ_t τ(q_{t-1}, q_t)
//! τ(i, j) = (j - i) · γ · ln n   if j > i, else 0
//! ```
//! Moving down is free; moving up costs `γ · ln n` per level. The first gap's
//! state carries no entry cost.
//!
//! The infinite state space is cut to
//! `k = ceil(1 + log_s(T / min_gap))` states: a state faster than that would
//! expect gaps shorter than the shortest one observed, so it can never be
//! optimal. `max_states` caps `k` for `s` very close to 1.
//!
//! # Solving
//!
//! A backward pass fills the optimal cost-to-go for every (gap, state); a
//! forward pass then walks it, taking the smallest optimal state at each
//! step. The result is the exact minimum, and among equal-cost sequences the
//! lexicographically smallest one.
//!
//! # Example
//!
//! ```
//! use eb_core::burst::{BurstDetector, DetectorConfig};
//! use eb_common::BurstParams;
//!
//! let detector = BurstDetector::new(BurstParams::new(2.0, 1.0), DetectorConfig::default())?;
//! let hierarchy = detector.detect(&[0.0, 1.0, 2.0, 3.0, 20.0, 21.0, 22.0, 23.0])?;
//! assert_eq!(hierarchy.len(), 2);
//! assert!(hierarchy.max_level() > 0);
//! # Ok::<(), eb_common::Error>(())
//! ```

use eb_common::{BurstHierarchy, BurstInterval, BurstParams, Error, Result};
use eb_config::{BurstSettings, ShortSequencePolicy};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Detector behaviour that is not part of the model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Handling of keys with fewer than two distinct timestamps.
    pub short_sequence: ShortSequencePolicy,
    /// Upper bound on the number of automaton states.
    pub max_states: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            short_sequence: ShortSequencePolicy::Fail,
            max_states: 64,
        }
    }
}

impl From<&BurstSettings> for DetectorConfig {
    fn from(settings: &BurstSettings) -> Self {
        Self {
            short_sequence: settings.short_sequence,
            max_states: settings.max_states,
        }
    }
}

/// Kleinberg burst detector for a single parameter combination.
#[derive(Debug, Clone)]
pub struct BurstDetector {
    params: BurstParams,
    config: DetectorConfig,
}

impl BurstDetector {
    /// Create a detector, validating `s > 1` and `gamma > 0`.
    pub fn new(params: BurstParams, config: DetectorConfig) -> Result<Self> {
        validate_params(&params)?;
        if config.max_states == 0 {
            return Err(Error::invalid_parameter(
                "max_states",
                0,
                "must be at least 1",
            ));
        }
        Ok(Self { params, config })
    }

    /// Create a detector with the default [`DetectorConfig`].
    pub fn with_params(params: BurstParams) -> Result<Self> {
        Self::new(params, DetectorConfig::default())
    }

    pub fn params(&self) -> BurstParams {
        self.params
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect bursts in an anonymous sequence.
    pub fn detect(&self, offsets: &[f64]) -> Result<BurstHierarchy> {
        self.detect_key("sequence", offsets)
    }

    /// Detect bursts in the offsets of the key described by `subject`.
    ///
    /// `subject` only appears in error messages.
    pub fn detect_key(&self, subject: &str, offsets: &[f64]) -> Result<BurstHierarchy> {
        let offsets = prepare_offsets(subject, offsets)?;

        match self.optimal_states_sorted(subject, &offsets)? {
            Some(states) => Ok(states_to_hierarchy(&offsets, &states)),
            None => Ok(match (offsets.first(), offsets.last()) {
                (Some(&first), Some(&last)) => BurstHierarchy::baseline(first, last),
                _ => BurstHierarchy::empty(),
            }),
        }
    }

    /// Optimal state per gap (`offsets.len() - 1` entries).
    ///
    /// Follows the same short-sequence policy as [`detect`](Self::detect);
    /// a trivial sequence yields an empty state list.
    pub fn optimal_states(&self, offsets: &[f64]) -> Result<Vec<u32>> {
        let offsets = prepare_offsets("sequence", offsets)?;
        Ok(self
            .optimal_states_sorted("sequence", &offsets)?
            .unwrap_or_default())
    }

    /// Number of automaton states used for a sorted sequence.
    pub fn state_count(&self, offsets: &[f64]) -> Option<usize> {
        let span = offsets.last()? - offsets.first()?;
        let min_gap = offsets
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|g| *g > 0.0)
            .min_by(|a, b| a.total_cmp(b))?;
        let raw = 1.0 + (span / min_gap).ln() / self.params.s.ln();
        let k = raw.ceil().max(1.0) as usize;
        Some(k.min(self.config.max_states))
    }

    /// `None` means the sequence was trivial and the policy allows it.
    fn optimal_states_sorted(&self, subject: &str, offsets: &[f64]) -> Result<Option<Vec<u32>>> {
        let n = offsets.len();
        let distinct = count_distinct(offsets);
        if distinct < 2 {
            return match self.config.short_sequence {
                ShortSequencePolicy::Baseline => Ok(None),
                ShortSequencePolicy::Fail => Err(Error::insufficient_data(
                    subject,
                    format!(
                        "fewer than 2 distinct timestamps (got {} of {} events)",
                        distinct, n
                    ),
                )),
            };
        }

        let k = match self.state_count(offsets) {
            Some(k) => k,
            None => return Ok(None),
        };
        let gaps: Vec<f64> = offsets.windows(2).map(|w| w[1] - w[0]).collect();
        let span = offsets[n - 1] - offsets[0];

        let alpha_0 = (n - 1) as f64 / span;
        let ln_alpha_0 = alpha_0.ln();
        let ln_s = self.params.s.ln();
        let alphas: Vec<f64> = (0..k).map(|j| alpha_0 * self.params.s.powi(j as i32)).collect();
        let ln_alphas: Vec<f64> = (0..k).map(|j| ln_alpha_0 + j as f64 * ln_s).collect();
        let step_cost = self.params.gamma * (n as f64).ln();

        let emission = |t: usize, j: usize| -> f64 {
            let x = gaps[t];
            // Duplicate timestamps say nothing about the rate; treat the
            // zero gap as equally likely under every state.
            if x <= 0.0 {
                0.0
            } else {
                -ln_alphas[j] + alphas[j] * x
            }
        };
        let transition = |from: usize, to: usize| -> f64 {
            if to > from {
                (to - from) as f64 * step_cost
            } else {
                0.0
            }
        };

        // cost_to_go[t * k + j]: cheapest cost of gaps t.. given gap t is in state j.
        let m = gaps.len();
        let mut cost_to_go = vec![0.0f64; m * k];
        for j in 0..k {
            cost_to_go[(m - 1) * k + j] = emission(m - 1, j);
        }
        for t in (0..m - 1).rev() {
            let next = &cost_to_go[(t + 1) * k..(t + 2) * k];
            let mut row = vec![0.0f64; k];
            for (j, slot) in row.iter_mut().enumerate() {
                let (_, best) = argmin((0..k).map(|i| transition(j, i) + next[i]));
                *slot = emission(t, j) + best;
            }
            cost_to_go[t * k..(t + 1) * k].copy_from_slice(&row);
        }

        let mut states = Vec::with_capacity(m);
        let (first, total) = argmin(cost_to_go[..k].iter().copied());
        states.push(first);
        for t in 1..m {
            let prev = states[t - 1];
            let row = &cost_to_go[t * k..(t + 1) * k];
            let (next, _) = argmin((0..k).map(|i| transition(prev, i) + row[i]));
            states.push(next);
        }

        tracing::trace!(
            subject,
            events = n,
            states = k,
            cost = total,
            "burst.states_solved"
        );

        Ok(Some(states.into_iter().map(|s| s as u32).collect()))
    }
}

/// Index and value of the minimum; the earliest index wins ties.
fn argmin(values: impl Iterator<Item = f64>) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (idx, v) in values.enumerate() {
        if v < best.1 {
            best = (idx, v);
        }
    }
    best
}

fn validate_params(params: &BurstParams) -> Result<()> {
    if !params.s.is_finite() || params.s <= 1.0 {
        return Err(Error::invalid_parameter(
            "s",
            params.s,
            "must be a finite number greater than 1",
        ));
    }
    if !params.gamma.is_finite() || params.gamma <= 0.0 {
        return Err(Error::invalid_parameter(
            "gamma",
            params.gamma,
            "must be a finite positive number",
        ));
    }
    Ok(())
}

/// Reject non-finite timestamps and sort if needed.
fn prepare_offsets<'a>(subject: &str, offsets: &'a [f64]) -> Result<Cow<'a, [f64]>> {
    if let Some((idx, bad)) = offsets.iter().enumerate().find(|(_, t)| !t.is_finite()) {
        return Err(Error::invalid_parameter(
            format!("offsets[{}] of {}", idx, subject),
            bad,
            "timestamps must be finite",
        ));
    }
    if offsets.windows(2).all(|w| w[0] <= w[1]) {
        Ok(Cow::Borrowed(offsets))
    } else {
        let mut sorted = offsets.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Ok(Cow::Owned(sorted))
    }
}

fn count_distinct(sorted: &[f64]) -> usize {
    if sorted.is_empty() {
        return 0;
    }
    1 + sorted.windows(2).filter(|w| w[1] > w[0]).count()
}

/// Collapse per-gap states into runs; gap `t` spans `offsets[t]..offsets[t+1]`.
fn states_to_hierarchy(offsets: &[f64], states: &[u32]) -> BurstHierarchy {
    let mut intervals: Vec<BurstInterval> = Vec::new();
    for (t, &level) in states.iter().enumerate() {
        let (start, end) = (offsets[t], offsets[t + 1]);
        match intervals.last_mut() {
            Some(last) if last.level == level => last.end = end,
            _ => intervals.push(BurstInterval::new(level, start, end)),
        }
    }
    BurstHierarchy::from_intervals(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(s: f64, gamma: f64) -> BurstDetector {
        BurstDetector::with_params(BurstParams::new(s, gamma)).unwrap()
    }

    fn two_clusters() -> Vec<f64> {
        vec![0.0, 1.0, 2.0, 3.0, 20.0, 21.0, 22.0, 23.0]
    }

    /// Sparse stretch, a dense burst, then sparse again.
    fn burst_in_the_middle() -> Vec<f64> {
        let mut events: Vec<f64> = (0..=10).map(|i| i as f64 * 10.0).collect();
        events.extend((1..=10).map(|i| 100.0 + i as f64 * 0.5));
        events.extend((1..=10).map(|i| 105.0 + i as f64 * 10.0));
        events
    }

    #[test]
    fn test_rejects_s_at_most_one() {
        for s in [0.5, 1.0, f64::NAN] {
            let err = BurstDetector::with_params(BurstParams::new(s, 1.0)).unwrap_err();
            assert!(
                matches!(err, Error::InvalidParameter { ref name, .. } if name == "s"),
                "s={} gave {:?}",
                s,
                err
            );
        }
    }

    #[test]
    fn test_rejects_non_positive_gamma() {
        for gamma in [0.0, -1.0, f64::INFINITY] {
            let err = BurstDetector::with_params(BurstParams::new(2.0, gamma)).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter { ref name, .. } if name == "gamma"));
        }
    }

    #[test]
    fn test_two_clusters_yield_one_elevated_interval() {
        let h = detector(2.0, 1.0).detect(&two_clusters()).unwrap();
        let intervals = h.intervals();
        assert_eq!(intervals.len(), 2, "got {:?}", intervals);
        assert_eq!(intervals[0], BurstInterval::new(2, 0.0, 3.0));
        assert_eq!(intervals[1], BurstInterval::new(0, 3.0, 23.0));
    }

    #[test]
    fn test_state_count_from_gap_ratio() {
        // T = 23, min gap = 1: ceil(1 + log2(23)) = 6
        assert_eq!(detector(2.0, 1.0).state_count(&two_clusters()), Some(6));
    }

    #[test]
    fn test_state_count_respects_ceiling() {
        let d = BurstDetector::new(
            BurstParams::new(1.0001, 1.0),
            DetectorConfig {
                max_states: 8,
                ..DetectorConfig::default()
            },
        )
        .unwrap();
        assert_eq!(d.state_count(&two_clusters()), Some(8));
    }

    #[test]
    fn test_uniform_stream_has_no_burst() {
        let events: Vec<f64> = (0..50).map(|i| i as f64 * 2.0).collect();
        let h = detector(2.0, 1.0).detect(&events).unwrap();
        assert_eq!(h.intervals(), &[BurstInterval::new(0, 0.0, 98.0)]);
    }

    #[test]
    fn test_dense_middle_is_detected() {
        let events = burst_in_the_middle();
        let h = detector(2.0, 0.5).detect(&events).unwrap();
        assert!(h.max_level() > 0);
        assert_eq!(h.level_at(50.0), Some(0));
        assert!(h.level_at(102.0).unwrap() > 0);
        assert_eq!(h.level_at(180.0), Some(0));
    }

    #[test]
    fn test_higher_gamma_never_raises_max_level() {
        let events = burst_in_the_middle();
        let gammas = [0.05, 0.2, 0.5, 1.0, 2.0, 5.0, 20.0, 100.0];
        let levels: Vec<u32> = gammas
            .iter()
            .map(|&g| detector(2.0, g).detect(&events).unwrap().max_level())
            .collect();
        for pair in levels.windows(2) {
            assert!(pair[1] <= pair[0], "max levels not monotone: {:?}", levels);
        }
        assert!(levels[0] > 0);
        assert_eq!(*levels.last().unwrap(), 0);
    }

    #[test]
    fn test_transitions_happen_at_own_timestamps() {
        let events = burst_in_the_middle();
        let h = detector(3.0, 0.5).detect(&events).unwrap();
        for iv in h.intervals() {
            assert!(events.contains(&iv.start));
            assert!(events.contains(&iv.end));
        }
    }

    #[test]
    fn test_detection_is_deterministic() {
        let events = burst_in_the_middle();
        let d = detector(2.0, 1.0);
        let a = serde_json::to_string(&d.detect(&events).unwrap()).unwrap();
        let b = serde_json::to_string(&d.detect(&events).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let mut events = two_clusters();
        events.reverse();
        let h = detector(2.0, 1.0).detect(&events).unwrap();
        assert_eq!(h, detector(2.0, 1.0).detect(&two_clusters()).unwrap());
    }

    #[test]
    fn test_duplicates_are_tolerated() {
        let events = vec![0.0, 1.0, 1.0, 2.0, 3.0, 3.0, 20.0, 21.0, 22.0, 23.0];
        let h = detector(2.0, 1.0).detect(&events).unwrap();
        assert_eq!(h.span(), Some((0.0, 23.0)));
        for pair in h.intervals().windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert_ne!(pair[0].level, pair[1].level);
        }
    }

    #[test]
    fn test_short_sequences_fail_by_default() {
        let d = detector(2.0, 1.0);
        for events in [vec![], vec![4.0], vec![5.0, 5.0, 5.0]] {
            let err = d.detect_key("key (a, b)", &events).unwrap_err();
            match err {
                Error::InsufficientData { subject, .. } => assert_eq!(subject, "key (a, b)"),
                other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn test_short_sequences_with_baseline_policy() {
        let d = BurstDetector::new(
            BurstParams::default(),
            DetectorConfig {
                short_sequence: ShortSequencePolicy::Baseline,
                ..DetectorConfig::default()
            },
        )
        .unwrap();
        assert!(d.detect(&[]).unwrap().is_empty());
        assert_eq!(d.detect(&[4.0]).unwrap(), BurstHierarchy::baseline(4.0, 4.0));
        assert_eq!(
            d.detect(&[5.0, 5.0]).unwrap(),
            BurstHierarchy::baseline(5.0, 5.0)
        );
        assert!(d.optimal_states(&[5.0, 5.0]).unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_offsets_rejected() {
        let err = detector(2.0, 1.0)
            .detect(&[0.0, f64::NAN, 2.0])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref name, .. } if name.starts_with("offsets[1]")));
    }

    #[test]
    fn test_two_events_single_interval() {
        let h = detector(2.0, 1.0).detect(&[10.0, 11.0]).unwrap();
        assert_eq!(h.intervals(), &[BurstInterval::new(0, 10.0, 11.0)]);
    }

    #[test]
    fn test_optimal_states_length() {
        let states = detector(2.0, 1.0).optimal_states(&two_clusters()).unwrap();
        assert_eq!(states, vec![2, 2, 2, 0, 0, 0, 0]);
    }

    #[test]
    fn test_argmin_prefers_earliest() {
        assert_eq!(argmin([3.0, 1.0, 1.0].into_iter()), (1, 1.0));
        assert_eq!(argmin(std::iter::empty()).0, 0);
    }
}
