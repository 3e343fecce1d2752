//! Configuration loading traits and types.
//!
//! Simulator settings come from three layers, applied in order:
//!
//! 1. built-in defaults ([`SimConfig::default`]),
//! 2. an optional TOML file ([`SimFileConfig`]),
//! 3. `SAE_*` environment overrides ([`SimConfig::with_env_overrides`]).
//!
//! # TOML Example
//!
//! ```toml
//! log_level = "debug"
//!
//! [sim]
//! tick_delay_ms = 20
//! initial_position = 50
//! learning_state = "ok"
//! threshold_enabled = false
//! ```

use crate::consts::{DEFAULT_TICK_DELAY_MS, POS_MAX_PERCENT, env};
use crate::protocol::LearningState;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Trait for loading configuration from TOML files.
///
/// Blanket-implemented for every `DeserializeOwned` type.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

fn default_true() -> bool {
    true
}

fn default_tick_delay_ms() -> u64 {
    DEFAULT_TICK_DELAY_MS
}

/// Settings for one simulated seat ECU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Per-command and per-tick diagnostic lines.
    #[serde(default = "default_true")]
    pub debug: bool,

    /// Hex dumps of every frame and per-tick step lines.
    #[serde(default)]
    pub verbose: bool,

    /// Simulated read latency; also the time quantum of one motion step.
    #[serde(default = "default_tick_delay_ms")]
    pub tick_delay_ms: u64,

    /// Starting position of all motors in percent. `None` = uncalibrated.
    #[serde(default)]
    pub initial_position: Option<u8>,

    /// Learning state reported for all motors.
    #[serde(default)]
    pub learning_state: LearningState,

    /// Hi/lo threshold auto-stop.
    #[serde(default = "default_true")]
    pub threshold_enabled: bool,

    /// Reserved: apply motor 1 state to all motor slots (init summary only).
    #[serde(default)]
    pub all_motors: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            debug: true,
            verbose: false,
            tick_delay_ms: DEFAULT_TICK_DELAY_MS,
            initial_position: None,
            learning_state: LearningState::Ok,
            threshold_enabled: true,
            all_motors: false,
        }
    }
}

impl SimConfig {
    /// Validate the configuration.
    ///
    /// # Validation Rules
    /// 1. `initial_position` within 0..=100
    ///
    /// Any non-negative tick delay is accepted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pos) = self.initial_position {
            if i32::from(pos) > POS_MAX_PERCENT {
                return Err(ConfigError::ValidationError(format!(
                    "initial_position {} out of range 0..={}",
                    pos, POS_MAX_PERCENT
                )));
            }
        }
        Ok(())
    }

    /// Apply `SAE_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_env_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `SAE_*` overrides from an arbitrary lookup.
    ///
    /// Integer flags follow C conventions: any non-zero value enables.
    pub fn with_env_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(env::DEBUG) {
            self.debug = parse_int(env::DEBUG, &value)? != 0;
        }
        if let Some(value) = lookup(env::VERBOSE) {
            self.verbose = parse_int(env::VERBOSE, &value)? != 0;
        }
        if let Some(value) = lookup(env::DELAY) {
            let delay = parse_int(env::DELAY, &value)?;
            self.tick_delay_ms = u64::try_from(delay).map_err(|_| {
                ConfigError::ValidationError(format!("{} must not be negative: {}", env::DELAY, delay))
            })?;
        }
        if let Some(value) = lookup(env::POS) {
            self.initial_position = match parse_int(env::POS, &value)? {
                -1 | 255 => None,
                pos @ 0..=100 => Some(pos as u8),
                pos => {
                    return Err(ConfigError::ValidationError(format!(
                        "{} out of range (0..=100, -1 or 255): {}",
                        env::POS,
                        pos
                    )));
                }
            };
        }
        if let Some(value) = lookup(env::LRN) {
            let raw = parse_int(env::LRN, &value)?;
            self.learning_state = LearningState::from_raw(raw).ok_or_else(|| {
                ConfigError::ValidationError(format!("{} unknown learning state: {}", env::LRN, raw))
            })?;
        }
        if let Some(value) = lookup(env::STOP) {
            self.threshold_enabled = parse_int(env::STOP, &value)? != 0;
        }
        if let Some(value) = lookup(env::ALL) {
            self.all_motors = parse_int(env::ALL, &value)? != 0;
        }
        Ok(self)
    }
}

fn parse_int(name: &str, value: &str) -> Result<i64, ConfigError> {
    value.trim().parse::<i64>().map_err(|_| {
        ConfigError::ValidationError(format!("{} is not an integer: '{}'", name, value))
    })
}

/// On-disk configuration file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimFileConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Simulator settings.
    #[serde(default)]
    pub sim: SimConfig,
}

/// Load the full configuration: file (if any), then environment, then validate.
pub fn load_sim_config(path: Option<&Path>) -> Result<SimFileConfig, ConfigError> {
    load_sim_config_with(path, |key| std::env::var(key).ok())
}

/// [`load_sim_config`] with an injectable environment lookup.
pub fn load_sim_config_with<F>(path: Option<&Path>, lookup: F) -> Result<SimFileConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut file_config = match path {
        Some(path) => SimFileConfig::load(path)?,
        None => SimFileConfig::default(),
    };
    file_config.sim = file_config.sim.with_env_overrides_from(lookup)?;
    file_config.sim.validate()?;
    Ok(file_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert!(config.debug);
        assert!(!config.verbose);
        assert_eq!(config.tick_delay_ms, 10);
        assert_eq!(config.initial_position, None);
        assert_eq!(config.learning_state, LearningState::Ok);
        assert!(config.threshold_enabled);
        assert!(!config.all_motors);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_matches_default() {
        let config: SimConfig = toml::from_str("").unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_env_overrides_all_fields() {
        let config = SimConfig::default()
            .with_env_overrides_from(lookup(&[
                ("SAE_DEBUG", "0"),
                ("SAE_VERBOSE", "1"),
                ("SAE_DELAY", "25"),
                ("SAE_POS", "60"),
                ("SAE_LRN", "0"),
                ("SAE_STOP", "0"),
                ("SAE_ALL", "1"),
            ]))
            .unwrap();

        assert!(!config.debug);
        assert!(config.verbose);
        assert_eq!(config.tick_delay_ms, 25);
        assert_eq!(config.initial_position, Some(60));
        assert_eq!(config.learning_state, LearningState::Nok);
        assert!(!config.threshold_enabled);
        assert!(config.all_motors);
    }

    #[test]
    fn test_env_position_invalid_sentinels() {
        let base = SimConfig {
            initial_position: Some(10),
            ..Default::default()
        };
        let config = base
            .clone()
            .with_env_overrides_from(lookup(&[("SAE_POS", "-1")]))
            .unwrap();
        assert_eq!(config.initial_position, None);

        let config = base
            .with_env_overrides_from(lookup(&[("SAE_POS", "255")]))
            .unwrap();
        assert_eq!(config.initial_position, None);
    }

    #[test]
    fn test_env_rejects_bad_values() {
        for (key, value) in [
            ("SAE_POS", "101"),
            ("SAE_POS", "abc"),
            ("SAE_DELAY", "-5"),
            ("SAE_LRN", "7"),
            ("SAE_STOP", "yes"),
        ] {
            let result = SimConfig::default().with_env_overrides_from(lookup(&[(key, value)]));
            assert!(
                matches!(result, Err(ConfigError::ValidationError(_))),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_env_absent_keeps_values() {
        let config = SimConfig::default()
            .with_env_overrides_from(|_| None)
            .unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = SimConfig {
            initial_position: Some(150),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_large_tick_delay_accepted() {
        let config = SimConfig::default()
            .with_env_overrides_from(lookup(&[("SAE_DELAY", "60000")]))
            .unwrap();
        assert_eq!(config.tick_delay_ms, 60_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_directive() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
        assert_eq!(LogLevel::Trace.as_directive(), "trace");
        assert_eq!(LogLevel::Warn.as_directive(), "warn");
    }
}
