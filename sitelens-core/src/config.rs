//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/sitelens/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/sitelens/` (~/.config/sitelens/)
//! - State/Logs: `$XDG_STATE_HOME/sitelens/` (~/.local/state/sitelens/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Analytics defaults
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Insight detector tuning
    #[serde(default)]
    pub insights: InsightsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults applied when a widget configuration leaves a field unset
#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsConfig {
    /// Length of the top-referrers list
    #[serde(default = "default_referrer_limit")]
    pub top_referrers_limit: usize,

    /// Backward depth for traceback widgets
    #[serde(default = "default_traceback_depth")]
    pub traceback_depth: i64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_referrers_limit: default_referrer_limit(),
            traceback_depth: default_traceback_depth(),
        }
    }
}

fn default_referrer_limit() -> usize {
    5
}

fn default_traceback_depth() -> i64 {
    3
}

/// Thresholds for the insight detector battery
#[derive(Debug, Deserialize, Clone)]
pub struct InsightsConfig {
    /// Detectors to skip, by name (e.g. "referrer.concentration")
    #[serde(default)]
    pub disabled_detectors: Vec<String>,

    /// Minimum 24h event volume before suggesting a count widget
    #[serde(default = "default_traffic_pulse_min_events")]
    pub traffic_pulse_min_events: u64,

    /// Referrer share (percent) that counts as concentration
    #[serde(default = "default_referrer_share_threshold")]
    pub referrer_share_threshold: f64,

    /// Minimum not-found hits before suggesting a traceback widget
    #[serde(default = "default_not_found_min_hits")]
    pub not_found_min_hits: u64,

    /// Minimum direct transitions before suggesting a flow widget
    #[serde(default = "default_flow_min_transitions")]
    pub flow_min_transitions: u64,

    /// Minimum qualifying events before suggesting a conversion widget
    #[serde(default = "default_conversion_min_events")]
    pub conversion_min_events: u64,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            disabled_detectors: vec![],
            traffic_pulse_min_events: default_traffic_pulse_min_events(),
            referrer_share_threshold: default_referrer_share_threshold(),
            not_found_min_hits: default_not_found_min_hits(),
            flow_min_transitions: default_flow_min_transitions(),
            conversion_min_events: default_conversion_min_events(),
        }
    }
}

fn default_traffic_pulse_min_events() -> u64 {
    50
}

fn default_referrer_share_threshold() -> f64 {
    30.0
}

fn default_not_found_min_hits() -> u64 {
    5
}

fn default_flow_min_transitions() -> u64 {
    10
}

fn default_conversion_min_events() -> u64 {
    5
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.analytics.traceback_depth < 1 {
            return Err(Error::Config(format!(
                "analytics.traceback_depth must be >= 1, got {}",
                self.analytics.traceback_depth
            )));
        }
        if self.analytics.top_referrers_limit == 0 {
            return Err(Error::Config(
                "analytics.top_referrers_limit must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/sitelens/config.toml` (~/.config/sitelens/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("sitelens").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/sitelens/` (~/.local/state/sitelens/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("sitelens")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/sitelens/sitelens.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("sitelens.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analytics.top_referrers_limit, 5);
        assert_eq!(config.analytics.traceback_depth, 3);
        assert_eq!(config.insights.traffic_pulse_min_events, 50);
        assert!(config.insights.disabled_detectors.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[analytics]
top_referrers_limit = 10
traceback_depth = 5

[insights]
disabled_detectors = ["referrer.concentration"]
referrer_share_threshold = 50.0

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.analytics.top_referrers_limit, 10);
        assert_eq!(config.analytics.traceback_depth, 5);
        assert_eq!(
            config.insights.disabled_detectors,
            vec!["referrer.concentration".to_string()]
        );
        assert_eq!(config.insights.referrer_share_threshold, 50.0);
        assert_eq!(config.logging.level, "debug");
        // Unspecified insight fields keep their defaults
        assert_eq!(config.insights.not_found_min_hits, 5);
    }

    #[test]
    fn test_validate_rejects_bad_depth() {
        let toml = r#"
[analytics]
traceback_depth = 0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[analytics]\ntop_referrers_limit = 7").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.analytics.top_referrers_limit, 7);
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = PathBuf::from("/nonexistent/sitelens/config.toml");
        assert!(Config::load_from(&path).is_err());
    }
}
