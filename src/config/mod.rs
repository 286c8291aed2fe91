//! Configuration module for Serial Scope
//!
//! This module handles application configuration including:
//! - Serial link settings (port, baud, parity, read timeout)
//! - ADC conversion constants (reference voltage, raw code range, tick step)
//! - Channel/chart definitions (axis ranges, labels, titles)
//! - Application state persistence (last used port, UI preferences)
//!
//! # Files
//!
//! - `config.toml` - Full configuration, stored in the app data directory
//! - `app_state.json` - Last session info (selected port, dark mode)
//!
//! App data is stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/serialscope/`
//! - **macOS**: `~/Library/Application Support/serialscope/`
//! - **Windows**: `%APPDATA%\serialscope\`

use crate::error::{Result, ScopeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "serialscope";

/// Configuration filename
pub const CONFIG_FILE: &str = "config.toml";

/// App state filename
pub const APP_STATE_FILE: &str = "app_state.json";

/// Default serial baud rate for the Arduino sketch
pub const DEFAULT_BAUD: u32 = 9600;

/// Default serial read timeout in milliseconds.
///
/// This bounds the cancellation latency of the acquisition loop: a pending
/// `stop()` is observed at most one timeout after it is issued.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 100;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir()
        .ok_or_else(|| ScopeError::Config("could not determine app data directory".to_string()))?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }

    Ok(dir)
}

// ==================== Serial Settings ====================

/// Serial parity setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityMode {
    /// No parity bit
    #[default]
    None,
    /// Odd parity
    Odd,
    /// Even parity
    Even,
}

impl std::fmt::Display for ParityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParityMode::None => write!(f, "none"),
            ParityMode::Odd => write!(f, "odd"),
            ParityMode::Even => write!(f, "even"),
        }
    }
}

/// Serial device link configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Port to preselect in the UI (e.g. `/dev/ttyACM0`, `COM3`)
    pub port: Option<String>,
    /// Baud rate
    pub baud: u32,
    /// Parity used for the (final) open
    pub parity: ParityMode,
    /// Open with odd parity first, then switch to no parity.
    ///
    /// Workaround for a USB-serial chipset whose DTR/reset behavior the
    /// original hardware target depended on. Off by default; a single
    /// no-parity open is the normal path.
    pub two_phase_open: bool,
    /// Read timeout in milliseconds (bounds stop/shutdown latency)
    pub read_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: DEFAULT_BAUD,
            parity: ParityMode::None,
            two_phase_open: false,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

// ==================== ADC Conversion ====================

/// Raw-code to engineering-unit conversion constants
///
/// The device streams unconverted integer ADC readings ("raw codes"); the
/// acquisition loop converts each to volts as
/// `raw * reference_voltage / max_raw_code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdcConfig {
    /// ADC reference voltage in volts
    pub reference_voltage: f64,
    /// Full-scale raw code (1024 for a 10-bit ADC)
    pub max_raw_code: u32,
    /// Logical time advanced per successfully parsed sample.
    ///
    /// This is a tick counter, not wall-clock time: it diverges from real
    /// elapsed time whenever device I/O stalls.
    pub tick_step: f64,
}

impl Default for AdcConfig {
    fn default() -> Self {
        Self {
            reference_voltage: 5.0,
            max_raw_code: 1024,
            tick_step: 0.1,
        }
    }
}

impl AdcConfig {
    /// Convert a raw ADC code to volts
    #[inline]
    pub fn volts(&self, raw: i64) -> f64 {
        raw as f64 * self.reference_voltage / self.max_raw_code as f64
    }
}

// ==================== Channels ====================

/// One chart's coordinate domain and labeling
///
/// Immutable after construction; the buffer capacity is derived from the
/// x range (one slot per integer tick of the display window). Changing a
/// range means recreating the channel's buffer, not resizing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Short channel name (legend/curve label)
    pub name: String,
    /// Chart title
    pub title: String,
    /// Left edge of the x axis (inclusive)
    pub x_min: i64,
    /// Right edge of the x axis (inclusive)
    pub x_max: i64,
    /// Bottom edge of the y axis
    pub y_min: f64,
    /// Top edge of the y axis
    pub y_max: f64,
    /// X axis label
    pub x_label: String,
    /// Y axis label
    pub y_label: String,
}

impl ChannelConfig {
    /// Buffer capacity for this channel: one slot per integer tick of the
    /// display window.
    ///
    /// Fails with [`ScopeError::InvalidCapacity`] if the x range is empty
    /// or inverted.
    pub fn capacity(&self) -> Result<usize> {
        let span = self.x_max - self.x_min + 1;
        if span <= 0 {
            return Err(ScopeError::InvalidCapacity(0));
        }
        Ok(span as usize)
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            name: "voltage".to_string(),
            title: "Analog Input".to_string(),
            x_min: 0,
            x_max: 100,
            y_min: 0.0,
            y_max: 5.0,
            x_label: "Time (ticks)".to_string(),
            y_label: "Voltage (V)".to_string(),
        }
    }
}

// ==================== App Config ====================

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Serial link settings
    pub serial: SerialConfig,
    /// ADC conversion constants
    pub adc: AdcConfig,
    /// Chart/channel definitions (one buffer each)
    pub channels: Vec<ChannelConfig>,
    /// UI preferences
    pub ui: UiConfig,
}

impl AppConfig {
    /// Configuration with a single default voltage channel
    pub fn with_default_channel() -> Self {
        Self {
            channels: vec![ChannelConfig::default()],
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| ScopeError::Config(format!("failed to parse config: {}", e)))
    }

    /// Load the configuration from the app data dir, or fall back to the
    /// default single-channel setup.
    pub fn load_or_default() -> Self {
        let Some(path) = app_data_dir().map(|d| d.join(CONFIG_FILE)) else {
            return Self::with_default_channel();
        };
        if !path.exists() {
            return Self::with_default_channel();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config from {:?}: {}", path, e);
                Self::with_default_channel()
            }
        }
    }

    /// Save configuration as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ScopeError::Config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }
}

/// UI preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Dark mode enabled
    pub dark_mode: bool,
    /// Plot line width
    pub line_width: f32,
    /// UI refresh interval in milliseconds
    pub refresh_interval_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dark_mode: true,
            line_width: 1.5,
            refresh_interval_ms: 33,
        }
    }
}

// ==================== App State ====================

/// Persistent application state (distinct from configuration)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    /// Port selected in the last session
    pub last_port: Option<String>,
}

impl AppState {
    /// Load app state from the data directory, or return defaults
    pub fn load_or_default() -> Self {
        let Some(path) = app_data_dir().map(|d| d.join(APP_STATE_FILE)) else {
            return Self::default();
        };
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse app state: {}", e);
            Self::default()
        })
    }

    /// Save app state to the data directory
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ScopeError::Config(format!("failed to serialize app state: {}", e)))?;
        std::fs::write(dir.join(APP_STATE_FILE), content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adc_conversion() {
        let adc = AdcConfig::default();
        assert_eq!(adc.volts(512), 2.5);
        assert_eq!(adc.volts(0), 0.0);
        assert!((adc.volts(1023) - 4.995_117_187_5).abs() < 1e-9);
    }

    #[test]
    fn test_channel_capacity() {
        let channel = ChannelConfig::default();
        assert_eq!(channel.capacity().unwrap(), 101);

        let inverted = ChannelConfig {
            x_min: 10,
            x_max: 5,
            ..Default::default()
        };
        assert!(inverted.capacity().is_err());
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::with_default_channel();
        config.serial.baud = 115_200;
        config.serial.two_phase_open = true;
        config.channels[0].title = "Bench PSU".to_string();

        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[serial]\nbaud = 57600\n").unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.serial.baud, 57_600);
        assert_eq!(loaded.serial.parity, ParityMode::None);
        assert_eq!(loaded.adc, AdcConfig::default());
    }
}
