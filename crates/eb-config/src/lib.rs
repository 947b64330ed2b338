//! Edgeburst configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the analysis configuration
//! - Config resolution (CLI → env → XDG → defaults)
//! - TOML or JSON parsing by file extension
//! - Semantic validation

pub mod resolve;
pub mod settings;
pub mod validate;

pub use resolve::{resolve_config_path, ConfigSource};
pub use settings::{
    AnalysisConfig, BatchErrorPolicy, BatchSettings, BurstSettings, DegreeMode, ParamValue,
    RankSettings, ShortSequencePolicy, SliceSettings,
};
pub use validate::{validate_config, ValidationError, ValidationResult};

use std::path::{Path, PathBuf};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

impl AnalysisConfig {
    /// Load a configuration file.
    ///
    /// Files ending in `.json` are parsed as JSON; anything else as TOML.
    pub fn from_file(path: &Path) -> ValidationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> ValidationResult<Self> {
        toml::from_str(content)
            .map_err(|e| ValidationError::ParseError(format!("Invalid TOML: {}", e)))
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(content: &str) -> ValidationResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }
}

/// A validated configuration with provenance.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AnalysisConfig,
    /// Path the config was read from (None when using defaults).
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Resolve, parse and validate the configuration.
pub fn load_config(cli_path: Option<&Path>) -> ValidationResult<LoadedConfig> {
    let (path, source) = resolve_config_path(cli_path);

    let config = match &path {
        Some(p) => AnalysisConfig::from_file(p)?,
        None => AnalysisConfig::default(),
    };

    validate_config(&config)?;

    Ok(LoadedConfig {
        config,
        path,
        source,
    })
}
