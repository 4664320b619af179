//! Configuration module
//!
//! Handles loading evreplay configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::device::{
    AbsRange, CapabilitySet, DeviceDescriptor, InputId, ABS_CNT, DEFAULT_CONTROL_PATH,
};
use crate::replay::{DEFAULT_LOG_PATH, FIRST_EVENT_DELAY};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Virtual device settings
    #[serde(default)]
    pub device: DeviceConfig,

    /// Playback settings
    #[serde(default)]
    pub playback: PlaybackConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Virtual device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// uinput control node
    #[serde(default = "default_control_path")]
    pub path: PathBuf,
    /// Name the virtual device is announced with
    #[serde(default = "default_device_name")]
    pub name: String,
    /// Bus type, vendor, product and version
    #[serde(default)]
    pub id: InputId,
    /// Absolute axis ranges
    #[serde(default = "default_abs_ranges")]
    pub abs_ranges: Vec<AbsRange>,
}

fn default_control_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONTROL_PATH)
}

fn default_device_name() -> String {
    DeviceDescriptor::default().name
}

fn default_abs_ranges() -> Vec<AbsRange> {
    AbsRange::screen(1920, 1080)
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: default_control_path(),
            name: default_device_name(),
            id: InputId::default(),
            abs_ranges: default_abs_ranges(),
        }
    }
}

impl DeviceConfig {
    /// Build the descriptor for the standard keyboard/mouse capability set
    pub fn descriptor(&self) -> DeviceDescriptor {
        DeviceDescriptor {
            name: self.name.clone(),
            id: self.id,
            capabilities: CapabilitySet::standard(),
            abs_ranges: self.abs_ranges.clone(),
        }
    }
}

/// Playback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Recorded event log
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
    /// Wait before the first record (us)
    #[serde(default = "default_first_event_delay")]
    pub first_event_delay_us: u64,
}

fn default_log_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_PATH)
}

fn default_first_event_delay() -> u64 {
    FIRST_EVENT_DELAY.as_micros() as u64
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            first_event_delay_us: default_first_event_delay(),
        }
    }
}

impl PlaybackConfig {
    pub fn first_event_delay(&self) -> Duration {
        Duration::from_micros(self.first_event_delay_us)
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location
    pub fn load_default() -> ConfigResult<Self> {
        for path in Self::search_paths() {
            if path.exists() {
                tracing::debug!("Loading configuration from {}", path.display());
                return Self::load(&path);
            }
        }

        // Return default config if no file found
        Ok(Self::default())
    }

    /// Locations checked by `load_default`, in order
    pub fn search_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("evreplay/config.toml")),
            Some(PathBuf::from("./evreplay.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.device.name.is_empty() {
            return Err(ConfigError::Invalid("device.name is empty".to_string()));
        }

        for range in &self.device.abs_ranges {
            if range.axis as usize >= ABS_CNT {
                return Err(ConfigError::Invalid(format!(
                    "absolute axis {} out of range (max {})",
                    range.axis,
                    ABS_CNT - 1
                )));
            }
            if range.min > range.max {
                return Err(ConfigError::Invalid(format!(
                    "absolute axis {}: min {} > max {}",
                    range.axis, range.min, range.max
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.device.path, PathBuf::from("/dev/uinput"));
        assert_eq!(config.playback.log_path, PathBuf::from("/tmp/record-input.log"));
        assert_eq!(config.playback.first_event_delay(), Duration::from_millis(10));
        assert_eq!(config.device.descriptor(), DeviceDescriptor::default());
    }

    #[test]
    fn test_serialized_config_loads_back() {
        let mut config = Config::default();
        config.playback.first_event_delay_us = 2_000;
        config.device.abs_ranges = AbsRange::screen(2560, 1440);

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml::to_string_pretty(&config).unwrap().as_bytes())
            .unwrap();

        let loaded = Config::load(file.path()).unwrap();
        assert_eq!(loaded.playback.first_event_delay_us, 2_000);
        assert_eq!(loaded.device.abs_ranges, config.device.abs_ranges);
        assert_eq!(loaded.device.id, config.device.id);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[playback]\nlog_path = \"/var/tmp/keys.log\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.playback.log_path, PathBuf::from("/var/tmp/keys.log"));
        assert_eq!(config.device.name, "blueberry-input");
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_custom_ranges() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[device]\nabs_ranges = [{{ axis = 0, min = 0, max = 4095 }}, {{ axis = 1, min = 0, max = 4095 }}]"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        let descriptor = config.device.descriptor();
        assert_eq!(descriptor.abs_ranges[0].max, 4095);
        assert_eq!(descriptor.abs_ranges[1].max, 4095);
    }

    #[test]
    fn test_invalid_range_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[device]\nabs_ranges = [{{ axis = 0, min = 10, max = 0 }}]").unwrap();

        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(Config::load(&path), Err(ConfigError::NotFound(_))));
    }
}
