//! Configuration validation errors and semantic validation.

use crate::settings::AnalysisConfig;
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate an analysis configuration semantically.
pub fn validate_config(config: &AnalysisConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    // Lists are legal in a file, but every element must still be in range so
    // that a caller sweeping them one at a time never hits a bad value.
    for (field, values) in [
        ("burst.s", param_values(&config.burst.s)),
        ("burst.gamma", param_values(&config.burst.gamma)),
    ] {
        if values.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                message: "Must contain at least one value".to_string(),
            });
        }
        for v in values {
            if !v.is_finite() {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be finite, got {}", v),
                });
            }
        }
    }

    for s in param_values(&config.burst.s) {
        if s <= 1.0 {
            return Err(ValidationError::InvalidValue {
                field: "burst.s".to_string(),
                message: format!("Must be greater than 1, got {}", s),
            });
        }
    }

    for gamma in param_values(&config.burst.gamma) {
        if gamma <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "burst.gamma".to_string(),
                message: format!("Must be positive, got {}", gamma),
            });
        }
    }

    if config.burst.max_states == 0 {
        return Err(ValidationError::InvalidValue {
            field: "burst.max_states".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }

    if config.slicing.ticks == 0 {
        return Err(ValidationError::InvalidValue {
            field: "slicing.ticks".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }

    if config.slicing.epoch_labels && config.slicing.label_format.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "slicing.label_format".to_string(),
            message: "Must not be empty when epoch_labels is enabled".to_string(),
        });
    }

    if config.ranking.top_k == 0 {
        return Err(ValidationError::InvalidValue {
            field: "ranking.top_k".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }

    Ok(())
}

fn param_values(value: &crate::settings::ParamValue) -> Vec<f64> {
    match value {
        crate::settings::ParamValue::Single(v) => vec![*v],
        crate::settings::ParamValue::Many(values) => values.clone(),
    }
}
