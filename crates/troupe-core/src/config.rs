//! # Configuration
//!
//! File-backed settings for LLM access, telemetry and memory, with
//! environment overrides. Files ending in `.json` are read and written as
//! JSON; everything else is TOML.
//!
//! # Environment Variables
//!
//! - `TROUPE_LOG_LEVEL`: log level (trace, debug, info, warn, error, off)
//! - `TROUPE_LOG_FORMAT`: `pretty` or `json`
//! - `TROUPE_LOG_FILE`: write logs to this file instead of stderr
//! - `TROUPE_LLM_PROVIDER`: provider name, also selects `<PROVIDER>_API_KEY`
//! - `TROUPE_LLM_MODEL`: model identifier
//! - `TROUPE_LLM_TEMPERATURE`: sampling temperature (0.0 to 2.0)
//! - `TROUPE_LLM_MAX_TOKENS`: maximum tokens per completion

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// File name searched for in the working directory.
pub const CONFIG_FILE_NAME: &str = "troupe.toml";
/// JSON alternative searched for in the working directory.
pub const CONFIG_JSON_FILE_NAME: &str = "troupe.json";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to serialize TOML config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Failed to process JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub telemetry: TelemetryConfig,
    pub memory: MemoryConfig,
    /// Free-form application values.
    pub custom: HashMap<String, Value>,
}

/// Model provider settings.
///
/// The API key is never written back to disk. When absent it is looked up
/// from `<PROVIDER>_API_KEY`, e.g. `ANTHROPIC_API_KEY`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: 4096,
        }
    }
}

impl LlmConfig {
    /// Name of the environment variable holding this provider's key.
    pub fn api_key_env_var(&self) -> String {
        format!("{}_API_KEY", self.provider.to_uppercase())
    }

    /// The configured key, or the provider's environment variable.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| env::var(self.api_key_env_var()).ok())
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}', expected pretty or json")),
        }
    }
}

/// Logging and tracing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub format: LogFormat,
    pub metrics_enabled: bool,
    pub trace_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "info".to_string(),
            log_file: None,
            format: LogFormat::Pretty,
            metrics_enabled: false,
            trace_enabled: false,
        }
    }
}

/// Memory backend settings, carried for backends outside the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub backend: String,
    pub max_items: usize,
    pub ttl_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_path: Option<PathBuf>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: "local".to_string(),
            max_items: 1000,
            ttl_seconds: 3600,
            persistence_path: None,
        }
    }
}

impl Config {
    /// Load configuration from `path`.
    ///
    /// A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = if is_json(path) {
            Self::load_from_json(&content)?
        } else {
            Self::load_from_toml(&content)?
        };
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn load_from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse configuration from a JSON string.
    pub fn load_from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Write configuration to `path`, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            self.to_toml()?
        };
        fs::write(path, content).map_err(io_err)
    }

    /// Render as TOML.
    ///
    /// TOML has no null, so null custom values are left out, including
    /// nulls nested in tables and arrays. JSON output keeps them.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        if !self.custom.values().any(contains_null) {
            return Ok(toml::to_string_pretty(self)?);
        }

        let mut config = self.clone();
        config.custom.retain(|key, value| {
            let keep = !value.is_null();
            if !keep {
                debug!(key = %key, "Dropping null custom value from TOML output");
            }
            keep
        });
        config.custom.values_mut().for_each(strip_nulls);
        Ok(toml::to_string_pretty(&config)?)
    }

    /// Custom value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.custom.get(key)
    }

    /// Set a custom value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.custom.insert(key.into(), value.into());
    }

    /// Apply `TROUPE_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("TROUPE_LOG_LEVEL") {
            self.telemetry.log_level = level.to_lowercase();
        }
        if let Some(format) = get_env_parsed::<LogFormat, _>(&lookup, "TROUPE_LOG_FORMAT")? {
            self.telemetry.format = format;
        }
        if let Some(file) = lookup("TROUPE_LOG_FILE") {
            self.telemetry.log_file = Some(PathBuf::from(file));
        }
        if let Some(provider) = lookup("TROUPE_LLM_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Some(model) = lookup("TROUPE_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(temperature) = get_env_parsed::<f32, _>(&lookup, "TROUPE_LLM_TEMPERATURE")? {
            self.llm.temperature = temperature;
        }
        if let Some(max_tokens) = get_env_parsed::<u32, _>(&lookup, "TROUPE_LLM_MAX_TOKENS")? {
            self.llm.max_tokens = max_tokens;
        }
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Validation(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "llm.max_tokens must be greater than 0".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.telemetry.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "telemetry.log_level '{}' is not one of {}",
                self.telemetry.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// First existing default location: `./troupe.toml`, `./troupe.json`,
    /// then `$HOME/.troupe/config.toml`.
    pub fn discover_path() -> Option<PathBuf> {
        let mut candidates = vec![
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from(CONFIG_JSON_FILE_NAME),
        ];
        if let Some(home) = env::var_os("HOME") {
            candidates.push(PathBuf::from(home).join(".troupe").join("config.toml"));
        }
        candidates.into_iter().find(|path| path.is_file())
    }

    /// Load from the first default location, or the defaults.
    pub fn discover() -> Result<Self, ConfigError> {
        match Self::discover_path() {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn contains_null(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.iter().any(contains_null),
        Value::Object(map) => map.values().any(contains_null),
        _ => false,
    }
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Array(items) => {
            items.retain(|item| !item.is_null());
            items.iter_mut().for_each(strip_nulls);
        }
        Value::Object(map) => {
            map.retain(|_, item| !item.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        _ => {}
    }
}

fn get_env_parsed<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => val
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid value '{val}': {e}"),
            }),
        None => Ok(None),
    }
}
