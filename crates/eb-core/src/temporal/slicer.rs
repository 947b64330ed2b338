//! Equal-width time slicing of a dataset's global range.
//!
//! Slice `i` of `N` spans `[min + i·w, min + (i+1)·w)` with
//! `w = (max - min) / N`; the last slice's upper bound is pinned to `max` so
//! rounding never drops the final event.

use chrono::format::{Item, StrftimeItems};
use chrono::DateTime;
use eb_common::{Error, OffsetStore, Result};
use eb_config::SliceSettings;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One slice of the global time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlice {
    pub index: usize,
    pub lower: f64,
    pub upper: f64,
    /// Human-readable form of `upper`, the instant the slice closes.
    pub label: String,
}

impl TimeSlice {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// How slice labels are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliceLabels {
    /// Treat offsets as Unix epoch seconds and format in UTC.
    Epoch { format: String },
    /// Plain numeric upper bound.
    Numeric,
}

/// Divides a time range into a fixed number of equal-width slices.
#[derive(Debug, Clone)]
pub struct TimeSlicer {
    ticks: usize,
    labels: SliceLabels,
}

impl TimeSlicer {
    /// Slicer with `ticks` slices and UTC `%Y-%m-%d %H:%M:%S` labels.
    pub fn new(ticks: usize) -> Result<Self> {
        if ticks == 0 {
            return Err(Error::invalid_parameter(
                "ticks",
                ticks,
                "must be at least 1",
            ));
        }
        Ok(Self {
            ticks,
            labels: SliceLabels::Epoch {
                format: "%Y-%m-%d %H:%M:%S".to_string(),
            },
        })
    }

    pub fn from_settings(settings: &SliceSettings) -> Result<Self> {
        let slicer = Self::new(settings.ticks)?;
        if settings.epoch_labels {
            slicer.with_epoch_labels(&settings.label_format)
        } else {
            Ok(slicer.with_numeric_labels())
        }
    }

    /// Label slices with a chrono format string; rejects malformed formats.
    pub fn with_epoch_labels(mut self, format: &str) -> Result<Self> {
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::invalid_parameter(
                "label_format",
                format,
                "not a valid strftime format",
            ));
        }
        self.labels = SliceLabels::Epoch {
            format: format.to_string(),
        };
        Ok(self)
    }

    pub fn with_numeric_labels(mut self) -> Self {
        self.labels = SliceLabels::Numeric;
        self
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Slice the global range of an offset store.
    ///
    /// Fails with `EmptyInput` for a store without keys and with
    /// `InsufficientData` when its keys carry no timestamps at all.
    pub fn slice_store<K: Ord + fmt::Debug>(&self, store: &OffsetStore<K>) -> Result<Vec<TimeSlice>> {
        if store.is_empty() {
            return Err(Error::EmptyInput("offset store has no keys".to_string()));
        }
        let (min, max) = store.global_range().ok_or_else(|| {
            Error::insufficient_data(
                "offset store",
                format!("none of its {} keys has a timestamp", store.len()),
            )
        })?;
        self.slice_range(min, max)
    }

    /// Slice the range spanned by arbitrary timestamps.
    pub fn slice_timestamps(&self, timestamps: impl IntoIterator<Item = f64>) -> Result<Vec<TimeSlice>> {
        let (min, max) = timestamps
            .into_iter()
            .fold(None, |acc: Option<(f64, f64)>, t| match acc {
                None => Some((t, t)),
                Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
            })
            .ok_or_else(|| Error::insufficient_data("timestamp set", "no timestamps"))?;
        self.slice_range(min, max)
    }

    /// Slice `[min, max]` into `ticks` equal-width slices.
    ///
    /// A degenerate range (`min == max`) yields `ticks` zero-width slices.
    pub fn slice_range(&self, min: f64, max: f64) -> Result<Vec<TimeSlice>> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(Error::invalid_parameter(
                "range",
                format!("[{}, {}]", min, max),
                "bounds must be finite with min <= max",
            ));
        }

        let width = (max - min) / self.ticks as f64;
        let slices: Vec<TimeSlice> = (0..self.ticks)
            .map(|i| {
                let lower = min + i as f64 * width;
                let upper = if i + 1 == self.ticks {
                    max
                } else {
                    min + (i + 1) as f64 * width
                };
                TimeSlice {
                    index: i,
                    lower,
                    upper,
                    label: self.label(upper),
                }
            })
            .collect();

        tracing::debug!(
            event = crate::logging::event_names::SLICES_BUILT,
            ticks = self.ticks,
            min,
            max,
            "Time slices built"
        );
        Ok(slices)
    }

    fn label(&self, t: f64) -> String {
        match &self.labels {
            SliceLabels::Numeric => format!("{}", t),
            SliceLabels::Epoch { format } => {
                let secs = t.floor();
                let nanos = ((t - secs) * 1e9).round().min(999_999_999.0) as u32;
                match DateTime::from_timestamp(secs as i64, nanos) {
                    Some(dt) => dt.format(format).to_string(),
                    None => format!("{}", t),
                }
            }
        }
    }
}
