//! Edgeburst common types and errors.
//!
//! This crate provides the foundational types shared across the workspace:
//! - Relationship keys and the `EdgeKey` endpoint trait
//! - Per-key offset stores
//! - Burst parameters, intervals and hierarchies
//! - Common error types

pub mod burst;
pub mod error;
pub mod key;
pub mod offsets;

pub use burst::{BurstHierarchy, BurstInterval, BurstParams, NestedBurst};
pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use key::{EdgeKey, KeyPath};
pub use offsets::OffsetStore;

/// Schema version for serialized reports.
pub const SCHEMA_VERSION: &str = "1.0.0";
