//! Error types for Edgeburst.
//!
//! Every error names the offending key or parameter so a caller can
//! diagnose a failure without re-deriving it from logs:
//! ```text
//! invalid parameter s=0.5: must be greater than 1
//! insufficient data for key ("a", "b"): fewer than 2 distinct timestamps (got 1)
//! ```
//!
//! Errors also expose a stable numeric code and a category so the CLI can
//! map them to exit codes and JSON error payloads.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for Edgeburst operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// A caller-supplied parameter is out of range.
    Parameter,
    /// The input does not contain enough data to compute a result.
    Data,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Parameter => write!(f, "parameter"),
            ErrorCategory::Data => write!(f, "data"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Edgeburst.
#[derive(Error, Debug)]
pub enum Error {
    // Parameter errors (10-19)
    #[error("invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    // Data errors (20-29)
    #[error("insufficient data for {subject}: {reason}")]
    InsufficientData { subject: String, reason: String },

    #[error("empty input: {0}")]
    EmptyInput(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build an `InvalidParameter` error from anything displayable.
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Build an `InsufficientData` error for the given subject.
    pub fn insufficient_data(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InsufficientData {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Parameter errors
    /// - 20-29: Data errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidParameter { .. } => 10,
            Error::InsufficientData { .. } => 20,
            Error::EmptyInput(_) => 21,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidParameter { .. } => ErrorCategory::Parameter,
            Error::InsufficientData { .. } | Error::EmptyInput(_) => ErrorCategory::Data,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Short machine-readable kind name, used in JSON error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidParameter { .. } => "invalid_parameter",
            Error::InsufficientData { .. } => "insufficient_data",
            Error::EmptyInput(_) => "empty_input",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }

    /// Structured form for agent-facing output.
    pub fn to_structured(&self) -> StructuredError {
        StructuredError {
            code: self.code(),
            kind: self.kind().to_string(),
            category: self.category(),
            message: self.to_string(),
        }
    }
}

/// Serializable error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredError {
    pub code: u32,
    pub kind: String,
    pub category: ErrorCategory,
    pub message: String,
}
