//! Configuration for the Stoa pulse service.

use crate::core::history::DEFAULT_HISTORY_CAPACITY;
use crate::core::metrics::MetricScales;
use crate::core::mood::MoodThresholds;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Time between broadcast ticks
    #[serde(with = "duration_serde")]
    pub tick_interval: Duration,

    /// How long a tick waits for the data source
    #[serde(with = "duration_serde")]
    pub fetch_timeout: Duration,

    /// Number of readings kept for charting
    pub history_capacity: usize,

    /// Scale constants for temperature and pulse
    pub scales: MetricScales,

    /// Mood classifier thresholds
    pub mood: MoodThresholds,

    /// Where agent and project records come from
    pub source: SourceConfig,

    /// Port for the HTTP server
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(5),
            fetch_timeout: Duration::from_secs(10),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            scales: MetricScales::default(),
            mood: MoodThresholds::default(),
            source: SourceConfig::default(),
            port: 3000,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file, falling back to defaults when absent.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save_to(&self, config_path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stoa-pulse")
            .join("config.json")
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::Invalid("tick_interval must be positive".to_string()));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::Invalid("fetch_timeout must be positive".to_string()));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid("history_capacity must be at least 1".to_string()));
        }
        self.scales.validate().map_err(ConfigError::Invalid)?;
        self.mood.validate().map_err(ConfigError::Invalid)?;
        if let SourceConfig::Http { url } = &self.source {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!("source url '{url}' is not http(s)")));
            }
        }
        Ok(())
    }
}

/// Where agent and project records come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Randomly generated population
    Mock { agents: usize, projects: usize },
    /// JSON endpoint returning `{ agents, projects }`
    Http { url: String },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Mock {
            agents: 20,
            projects: 15,
        }
    }
}

impl SourceConfig {
    /// Parse a command-line source argument: `mock` or an http(s) URL.
    pub fn from_arg(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("mock") {
            Some(Self::default())
        } else if s.starts_with("http://") || s.starts_with("https://") {
            Some(SourceConfig::Http { url: s.to_string() })
        } else {
            None
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_config_parsing() {
        assert_eq!(SourceConfig::from_arg("mock"), Some(SourceConfig::default()));
        assert_eq!(
            SourceConfig::from_arg("https://example.org/agents"),
            Some(SourceConfig::Http {
                url: "https://example.org/agents".to_string()
            })
        );
        assert_eq!(SourceConfig::from_arg("ftp://nope"), None);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tick_interval, Duration::from_secs(5));
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.scales.pulse_max, 100.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"tick_interval": 300, "source": {"kind": "http", "url": "http://localhost:3001/api"}}"#)
                .unwrap();

        assert_eq!(config.tick_interval, Duration::from_secs(300));
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert!(matches!(config.source, SourceConfig::Http { .. }));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            history_capacity: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = Config {
            source: SourceConfig::Http {
                url: "localhost".to_string(),
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("stoa-pulse-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.json");

        let config = Config {
            port: 4100,
            tick_interval: Duration::from_secs(300),
            source: SourceConfig::Mock {
                agents: 5,
                projects: 3,
            },
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.port, 4100);
        assert_eq!(loaded.tick_interval, Duration::from_secs(300));
        assert_eq!(loaded.source, config.source);
        assert_eq!(loaded.scales, MetricScales::default());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_file_rejected_on_load() {
        let dir = std::env::temp_dir().join(format!("stoa-pulse-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.json");
        std::fs::create_dir_all(&dir).unwrap();

        std::fs::write(&path, r#"{"history_capacity": 0}"#).unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Invalid(_))));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::ParseError(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("stoa-pulse-missing-config.json");
        let _ = std::fs::remove_file(&path);

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.port, 3000);
    }
}
