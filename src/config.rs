use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ops::TraversalLimit;

const DEFAULT_MAX_CONFIG_BYTES: u64 = 1024 * 1024;
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory that relative request paths resolve against. Defaults to the process working
    /// directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Limits {
    /// Upper bound applied to every list/tree/glob result.
    ///
    /// - `None` => callers may request unbounded results.
    /// - `Some(0)` is invalid and rejected by validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
    /// Depth used by `tree` when the request does not set one (`0` => unlimited).
    #[serde(default)]
    pub default_tree_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if let Some(base_dir) = &self.base_dir {
            if !base_dir.is_absolute() {
                return Err(Error::InvalidConfig(format!(
                    "base_dir must be absolute: {}",
                    base_dir.display()
                )));
            }
        }
        if self.limits.max_results == Some(0) {
            return Err(Error::InvalidConfig(
                "limits.max_results must be > 0".to_string(),
            ));
        }
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::InvalidConfig(format!(
                "logging.level {:?} is not one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    /// Combines a caller-supplied limit with `limits.max_results`.
    ///
    /// A missing or zero request falls back to the configured cap, which may itself be
    /// unbounded.
    pub fn effective_limit(&self, requested: Option<usize>) -> TraversalLimit {
        let requested = requested.filter(|limit| *limit > 0);
        match (requested, self.limits.max_results) {
            (Some(requested), Some(cap)) => TraversalLimit::new(requested.min(cap)),
            (Some(requested), None) => TraversalLimit::new(requested),
            (None, Some(cap)) => TraversalLimit::new(cap),
            (None, None) => TraversalLimit::unbounded(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

pub fn parse_config(raw: &str, format: ConfigFormat) -> Result<Config> {
    let config: Config = match format {
        ConfigFormat::Json => serde_json::from_str(raw)
            .map_err(|err| Error::InvalidConfig(format!("invalid json config: {err}")))?,
        ConfigFormat::Toml => toml::from_str(raw)
            .map_err(|err| Error::InvalidConfig(format!("invalid toml config: {err}")))?,
    };
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    load_config_limited(path, DEFAULT_MAX_CONFIG_BYTES)
}

/// Load and validate a config file from disk with a byte limit.
///
/// Format detection is by file extension:
/// - `.json` => JSON
/// - `.toml` or no extension => TOML
pub fn load_config_limited(path: impl AsRef<Path>, max_bytes: u64) -> Result<Config> {
    if max_bytes == 0 {
        return Err(Error::InvalidConfig(
            "max config bytes must be > 0".to_string(),
        ));
    }

    let path = path.as_ref();
    let meta = std::fs::metadata(path).map_err(|err| Error::io_path_or_missing("metadata", path, err))?;
    if !meta.is_file() {
        return Err(Error::InvalidPath(format!(
            "config path {} is not a regular file",
            path.display()
        )));
    }

    let limit = max_bytes.saturating_add(1);
    let mut bytes = Vec::<u8>::new();
    std::fs::File::open(path)
        .map_err(|err| Error::io_path("open", path, err))?
        .take(limit)
        .read_to_end(&mut bytes)
        .map_err(|err| Error::io_path("read", path, err))?;

    if bytes.len() as u64 > max_bytes {
        return Err(Error::InvalidConfig(format!(
            "config file {} exceeds {max_bytes} bytes",
            path.display()
        )));
    }

    let raw = std::str::from_utf8(&bytes).map_err(|_| {
        Error::InvalidConfig(format!("config file {} is not valid utf-8", path.display()))
    })?;
    let format = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => ConfigFormat::Json,
        Some("toml") | None => ConfigFormat::Toml,
        Some(other) => {
            return Err(Error::InvalidConfig(format!(
                "unsupported config format {other:?}; expected .toml or .json"
            )));
        }
    };
    parse_config(raw, format)
}
