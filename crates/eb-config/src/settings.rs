//! Analysis configuration types.
//!
//! Every section has serde defaults, so a config file only needs the keys
//! it wants to override:
//!
//! ```toml
//! [burst]
//! s = 3.0
//! gamma = 0.5
//!
//! [ranking]
//! mode = "in"
//! top_k = 10
//! ```

use eb_common::{BurstParams, Error};
use serde::{Deserialize, Serialize};

/// Complete analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default)]
    pub burst: BurstSettings,

    #[serde(default)]
    pub batch: BatchSettings,

    #[serde(default)]
    pub slicing: SliceSettings,

    #[serde(default)]
    pub ranking: RankSettings,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            burst: BurstSettings::default(),
            batch: BatchSettings::default(),
            slicing: SliceSettings::default(),
            ranking: RankSettings::default(),
        }
    }
}

/// A parameter as written in a file: one value or a list of values.
///
/// Lists are accepted by the parser so the rejection can name the
/// parameter; a run always uses exactly one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(f64),
    Many(Vec<f64>),
}

impl ParamValue {
    /// The single value, or `InvalidParameter` for a list.
    ///
    /// A one-element list is unwrapped.
    pub fn single(&self, name: &str) -> Result<f64, Error> {
        match self {
            ParamValue::Single(v) => Ok(*v),
            ParamValue::Many(values) if values.len() == 1 => Ok(values[0]),
            ParamValue::Many(values) => Err(Error::invalid_parameter(
                name,
                format!("{:?}", values),
                "expected a single value; issue one run per parameter combination",
            )),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Single(v)
    }
}

/// What the detector does with a key that has fewer than two distinct
/// timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortSequencePolicy {
    /// Fail with `InsufficientData`.
    #[default]
    Fail,
    /// Return a single level-0 interval over whatever span exists.
    Baseline,
}

/// What a batch does when one key fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchErrorPolicy {
    /// Abort the whole batch with the key's error.
    #[default]
    Abort,
    /// Record the key as skipped and continue.
    Skip,
}

/// Which edges count toward a node's degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeMode {
    In,
    Out,
    #[default]
    #[serde(alias = "both")]
    Total,
}

impl DegreeMode {
    pub fn name(&self) -> &'static str {
        match self {
            DegreeMode::In => "in",
            DegreeMode::Out => "out",
            DegreeMode::Total => "total",
        }
    }
}

impl std::fmt::Display for DegreeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DegreeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in" | "in_degree" | "indegree" => Ok(DegreeMode::In),
            "out" | "out_degree" | "outdegree" => Ok(DegreeMode::Out),
            "total" | "both" | "degree" | "all" => Ok(DegreeMode::Total),
            _ => Err(Error::invalid_parameter(
                "degree_mode",
                s,
                "expected one of: in, out, total (or both)",
            )),
        }
    }
}

/// Burst detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstSettings {
    #[serde(default = "default_s")]
    pub s: ParamValue,

    #[serde(default = "default_gamma")]
    pub gamma: ParamValue,

    #[serde(default)]
    pub short_sequence: ShortSequencePolicy,

    /// Ceiling on automaton states, whatever the data's gap ratio asks for.
    #[serde(default = "default_max_states")]
    pub max_states: usize,
}

fn default_s() -> ParamValue {
    ParamValue::Single(2.0)
}

fn default_gamma() -> ParamValue {
    ParamValue::Single(1.0)
}

fn default_max_states() -> usize {
    64
}

impl Default for BurstSettings {
    fn default() -> Self {
        Self {
            s: default_s(),
            gamma: default_gamma(),
            short_sequence: ShortSequencePolicy::default(),
            max_states: default_max_states(),
        }
    }
}

impl BurstSettings {
    /// Collapse the configured values into one parameter combination.
    pub fn params(&self) -> Result<BurstParams, Error> {
        Ok(BurstParams::new(
            self.s.single("s")?,
            self.gamma.single("gamma")?,
        ))
    }
}

/// Batch execution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSettings {
    #[serde(default)]
    pub on_error: BatchErrorPolicy,

    /// Spread keys across the rayon pool.
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_true() -> bool {
    true
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            on_error: BatchErrorPolicy::default(),
            parallel: true,
        }
    }
}

/// Time slicing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceSettings {
    #[serde(default = "default_ticks")]
    pub ticks: usize,

    /// Interpret timestamps as Unix epoch seconds when labelling slices.
    #[serde(default = "default_true")]
    pub epoch_labels: bool,

    /// chrono format string for epoch labels.
    #[serde(default = "default_label_format")]
    pub label_format: String,
}

fn default_ticks() -> usize {
    10
}

fn default_label_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

impl Default for SliceSettings {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            epoch_labels: true,
            label_format: default_label_format(),
        }
    }
}

/// Degree ranking settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankSettings {
    #[serde(default)]
    pub mode: DegreeMode,

    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    5
}

impl Default for RankSettings {
    fn default() -> Self {
        Self {
            mode: DegreeMode::default(),
            top_k: default_top_k(),
        }
    }
}
