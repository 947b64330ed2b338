//! Edgeburst core library.
//!
//! Detects bursts of activity in timestamped relationships with Kleinberg's
//! automaton, then follows which nodes are most connected through bursting
//! relationships over time.
//!
//! - [`burst`]: per-key detection and the parallel batch runner
//! - [`temporal`]: time slices, per-slice graph snapshots, degree ranking
//! - [`report`]: the result bundle and flat export rows
//! - [`pipeline`]: the components wired together from an `AnalysisConfig`
//! - [`input`], [`cli`], [`exit_codes`]: the `edgeburst` binary's surface
//! - [`logging`]: tracing subscriber setup

pub mod burst;
pub mod cli;
pub mod exit_codes;
pub mod input;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod temporal;

pub use burst::{BatchOutcome, BurstBatch, BurstDetector, CancelToken, DetectorConfig, SkippedKey};
pub use pipeline::Analyzer;
pub use report::{burst_rows, BurstReport, BurstRow, RenderedReport};
pub use temporal::{
    DegreeRanker, DegreeRanking, GraphSnapshot, GraphSnapshotBuilder, RankedNode, TimeSlice,
    TimeSlicer,
};
