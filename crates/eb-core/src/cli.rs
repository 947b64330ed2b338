//! Command implementations behind the `edgeburst` binary.
//!
//! Each command takes the loaded configuration plus its own options, applies
//! the options as overrides and returns the JSON payload for stdout.

use crate::exit_codes::ExitCode;
use crate::input::load_offsets;
use crate::logging::{event_names, Stage};
use crate::pipeline::Analyzer;
use crate::report::burst_rows;
use eb_config::{
    AnalysisConfig, BatchErrorPolicy, LoadedConfig, ParamValue, ShortSequencePolicy,
    ValidationError,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use thiserror::Error;

/// Any failure a command can report.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ValidationError),

    #[error(transparent)]
    Analysis(#[from] eb_common::Error),
}

impl CommandError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CommandError::Config(ValidationError::IoError(_))
            | CommandError::Config(ValidationError::ParseError(_)) => ExitCode::IoError,
            CommandError::Config(_) => ExitCode::ArgsError,
            CommandError::Analysis(err) => err.category().into(),
        }
    }

    /// `{"error": {...}}` payload for stdout.
    pub fn to_json(&self) -> Value {
        let (code, kind) = match self {
            CommandError::Config(err) => (err.code(), "config"),
            CommandError::Analysis(err) => (err.code(), err.kind()),
        };
        json!({
            "error": {
                "code": code,
                "kind": kind,
                "exit_code": self.exit_code().as_i32(),
                "message": self.to_string(),
            }
        })
    }
}

/// Burst parameter overrides shared by the analysis commands.
#[derive(Debug, Clone, Default)]
pub struct BurstOverrides {
    pub s: Option<f64>,
    pub gamma: Option<f64>,
    pub skip_failures: bool,
    pub baseline_short: bool,
    pub sequential: bool,
}

impl BurstOverrides {
    fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(s) = self.s {
            config.burst.s = ParamValue::Single(s);
        }
        if let Some(gamma) = self.gamma {
            config.burst.gamma = ParamValue::Single(gamma);
        }
        if self.skip_failures {
            config.batch.on_error = BatchErrorPolicy::Skip;
        }
        if self.baseline_short {
            config.burst.short_sequence = ShortSequencePolicy::Baseline;
        }
        if self.sequential {
            config.batch.parallel = false;
        }
    }
}

#[derive(Debug, Clone)]
pub struct BurstsOptions {
    pub input: PathBuf,
    pub burst: BurstOverrides,
    /// Emit nested bursts instead of flat intervals.
    pub nested: bool,
}

#[derive(Debug, Clone)]
pub struct DegreesOptions {
    pub input: PathBuf,
    pub burst: BurstOverrides,
    pub ticks: Option<usize>,
    pub mode: Option<String>,
    pub top: Option<usize>,
    pub numeric_labels: bool,
}

/// `edgeburst bursts`
pub fn run_bursts(config: &AnalysisConfig, opts: &BurstsOptions) -> Result<Value, CommandError> {
    let mut config = config.clone();
    opts.burst.apply(&mut config);

    let analyzer = Analyzer::from_config(&config)?;
    let store = load_offsets(&opts.input)?;
    let report = analyzer.detect_bursts(store)?;

    let _span = tracing::debug_span!("stage", stage = %Stage::Export).entered();
    let rendered = report.render();
    tracing::info!(
        event = event_names::REPORT_WRITTEN,
        keys = rendered.bursts.len(),
        skipped = rendered.skipped.len(),
        "Burst report ready"
    );

    Ok(json!({
        "schema_version": rendered.schema_version,
        "params": rendered.params,
        "from_svos": rendered.from_svos,
        "nested": opts.nested,
        "rows": burst_rows(&report, opts.nested),
        "skipped": rendered.skipped,
    }))
}

/// `edgeburst degrees`
pub fn run_degrees(config: &AnalysisConfig, opts: &DegreesOptions) -> Result<Value, CommandError> {
    let mut config = config.clone();
    opts.burst.apply(&mut config);
    if let Some(ticks) = opts.ticks {
        config.slicing.ticks = ticks;
    }
    if let Some(mode) = &opts.mode {
        config.ranking.mode = mode.parse()?;
    }
    if let Some(top) = opts.top {
        config.ranking.top_k = top;
    }
    if opts.numeric_labels {
        config.slicing.epoch_labels = false;
    }

    let analyzer = Analyzer::from_config(&config)?;
    let store = load_offsets(&opts.input)?;
    let report = analyzer.detect_bursts(store)?;
    let ranking = analyzer.degree_over_time(&report)?;

    let _span = tracing::debug_span!("stage", stage = %Stage::Export).entered();
    tracing::info!(
        event = event_names::REPORT_WRITTEN,
        slices = ranking.len(),
        skipped = report.skipped.len(),
        "Degree ranking ready"
    );
    Ok(json!({
        "schema_version": eb_common::SCHEMA_VERSION,
        "params": report.params,
        "mode": ranking.mode,
        "top_k": ranking.top_k,
        "slices": ranking.slices,
        "skipped": report.render().skipped,
    }))
}

/// `edgeburst config`
pub fn run_config(loaded: &LoadedConfig) -> Value {
    json!({
        "source": loaded.source.to_string(),
        "path": loaded.path.as_ref().map(|p| p.display().to_string()),
        "config": loaded.config,
    })
}
