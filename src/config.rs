//! Configuration for the sensor stream CLI.

use crate::core::alerts::AlertTimeZone;
use crate::core::processor::ALERT_LOOKBACK;
use crate::core::windowing::{TimeRange, MAX_WINDOW_LEN};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration for the sensor stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Period between generate-and-process ticks
    #[serde(with = "duration_serde")]
    pub tick_interval: Duration,

    /// Retention range of the reading window
    pub time_range: TimeRange,

    /// Readings generated per tick
    pub batch_size: usize,

    /// Maximum readings retained in the window
    pub max_window_len: usize,

    /// Trailing readings alerts are derived from
    pub alert_lookback: usize,

    /// IANA timezone for alert times, host local time when unset
    pub timezone: Option<String>,

    /// Seed for reproducible simulation, entropy when unset
    pub seed: Option<u64>,

    /// Whether streaming is currently paused
    pub paused: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            time_range: TimeRange::default(),
            batch_size: 3,
            max_window_len: MAX_WINDOW_LEN,
            alert_lookback: ALERT_LOOKBACK,
            timezone: None,
            seed: None,
            paused: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a path, falling back to defaults when absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sensorstream")
            .join("config.json")
    }

    /// Check the window limits: the window holds at most `MAX_WINDOW_LEN`
    /// readings and alerts look back at most `ALERT_LOOKBACK` readings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_window_len == 0 || self.max_window_len > MAX_WINDOW_LEN {
            return Err(ConfigError::OutOfRange {
                field: "max_window_len",
                value: self.max_window_len,
                max: MAX_WINDOW_LEN,
            });
        }
        if self.alert_lookback == 0 || self.alert_lookback > ALERT_LOOKBACK {
            return Err(ConfigError::OutOfRange {
                field: "alert_lookback",
                value: self.alert_lookback,
                max: ALERT_LOOKBACK,
            });
        }
        Ok(())
    }

    /// Resolve the configured alert timezone.
    pub fn alert_timezone(&self) -> Result<AlertTimeZone, ConfigError> {
        match self.timezone.as_deref() {
            None => Ok(AlertTimeZone::Local),
            Some(name) => name
                .parse::<Tz>()
                .map(AlertTimeZone::Named)
                .map_err(|_| ConfigError::InvalidTimeZone(name.to_string())),
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    InvalidTimeRange(String),
    InvalidTimeZone(String),
    OutOfRange {
        field: &'static str,
        value: usize,
        max: usize,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::InvalidTimeRange(r) => {
                write!(f, "Invalid time range '{r}' (expected 1m, 5m, 10m or 30m)")
            }
            ConfigError::InvalidTimeZone(tz) => write!(f, "Unknown timezone '{tz}'"),
            ConfigError::OutOfRange { field, value, max } => {
                write!(f, "{field} must be between 1 and {max}, got {value}")
            }
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
