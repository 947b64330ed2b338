//! No-mock configuration loading + resolution tests.
//!
//! Covers:
//! - TOML and JSON files on disk
//! - Resolution order (CLI > env path > env dir)
//! - Validation failures surfacing through `load_config`

use eb_config::resolve::{ConfigSource, ENV_CONFIG_DIR, ENV_CONFIG_PATH};
use eb_config::{load_config, AnalysisConfig, DegreeMode, ParamValue, ValidationError};
use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

struct EnvGuard {
    keys: Vec<String>,
    saved: Vec<Option<String>>,
}

impl EnvGuard {
    fn new(keys: &[&str]) -> Self {
        let mut saved = Vec::with_capacity(keys.len());
        for key in keys {
            saved.push(env::var(key).ok());
            env::remove_var(key);
        }
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            saved,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (idx, key) in self.keys.iter().enumerate() {
            match self.saved.get(idx).and_then(|v| v.as_ref()) {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

fn with_env_lock<T>(f: impl FnOnce() -> T) -> T {
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .expect("env lock poisoned");
    f()
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, content).expect("write config");
}

#[test]
fn test_load_toml_from_cli_path() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("analysis.toml");
    write_file(
        &path,
        r#"
        [burst]
        s = 3.0
        gamma = 0.25
        short_sequence = "baseline"

        [batch]
        on_error = "skip"

        [ranking]
        mode = "in"
        top_k = 3
        "#,
    );

    let loaded = load_config(Some(&path)).expect("valid config");
    assert_eq!(loaded.source, ConfigSource::CliArgument);
    assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
    assert_eq!(loaded.config.burst.s, ParamValue::Single(3.0));
    assert_eq!(loaded.config.ranking.mode, DegreeMode::In);
    assert_eq!(loaded.config.ranking.top_k, 3);
}

#[test]
fn test_load_json_by_extension() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("analysis.json");
    write_file(&path, r#"{"slicing": {"ticks": 4, "epoch_labels": false}}"#);

    let config = AnalysisConfig::from_file(&path).expect("json config");
    assert_eq!(config.slicing.ticks, 4);
    assert!(!config.slicing.epoch_labels);
}

#[test]
fn test_missing_cli_file_is_io_error() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("absent.toml");
    let err = load_config(Some(&path)).expect_err("missing file should fail");
    assert!(matches!(err, ValidationError::IoError(_)));
}

#[test]
fn test_invalid_values_rejected_on_load() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("bad.toml");
    write_file(&path, "[burst]\ns = 0.5\n");

    let err = load_config(Some(&path)).expect_err("s <= 1 should fail");
    assert!(matches!(err, ValidationError::InvalidValue { .. }));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("broken.toml");
    write_file(&path, "[burst\ns = ");

    let err = load_config(Some(&path)).expect_err("malformed file should fail");
    assert!(matches!(err, ValidationError::ParseError(_)));
}

#[test]
fn test_env_path_over_env_dir() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);

        let temp = TempDir::new().expect("temp dir");
        let env_path = temp.path().join("env").join("custom.toml");
        let dir = temp.path().join("dir");
        write_file(&env_path, "[slicing]\nticks = 7\n");
        write_file(&dir.join("config.toml"), "[slicing]\nticks = 3\n");

        env::set_var(ENV_CONFIG_PATH, env_path.display().to_string());
        env::set_var(ENV_CONFIG_DIR, dir.display().to_string());

        let loaded = load_config(None).expect("env config");
        assert_eq!(loaded.source, ConfigSource::Environment);
        assert_eq!(loaded.config.slicing.ticks, 7);
    });
}

#[test]
fn test_env_dir_used_when_path_unset() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH, ENV_CONFIG_DIR]);

        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join("dir");
        write_file(&dir.join("config.toml"), "[slicing]\nticks = 3\n");
        env::set_var(ENV_CONFIG_DIR, dir.display().to_string());

        let loaded = load_config(None).expect("env dir config");
        assert_eq!(loaded.source, ConfigSource::Environment);
        assert_eq!(loaded.config.slicing.ticks, 3);
    });
}
