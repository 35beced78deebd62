//! Configuration for the sweep pipeline
//!
//! Replaces the original global settings singleton with an explicit
//! configuration struct passed down through the pipeline's constructors,
//! with a load/store lifecycle at process start/stop.
//!
//! # App Data Location
//!
//! Configuration is stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/dev.hxyulin.sweepvis-rs/`
//! - **macOS**: `~/Library/Application Support/dev.hxyulin.sweepvis-rs/`
//! - **Windows**: `%APPDATA%\dev.hxyulin.sweepvis-rs\`
//!
//! # Files
//!
//! - `config.json` - window geometry, marker count, sweep parameters

use crate::error::{Result, SweepVisError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.hxyulin.sweepvis-rs";

/// Config filename
pub const CONFIG_FILE: &str = "config.json";

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        SweepVisError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            SweepVisError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the config file
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

/// Window and layout state persisted across sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuiConfig {
    /// Window width in pixels
    pub window_width: u32,
    /// Window height in pixels
    pub window_height: u32,
    /// Saved splitter pane sizes
    #[serde(default)]
    pub splitter_sizes: Vec<u32>,
    /// Whether the marker column is hidden
    #[serde(default)]
    pub markers_hidden: bool,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            window_width: 1100,
            window_height: 950,
            splitter_sizes: Vec::new(),
            markers_hidden: false,
        }
    }
}

/// Chart/marker state persisted across sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Number of markers to recreate on startup
    pub marker_count: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self { marker_count: 3 }
    }
}

/// Sweep acquisition parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Device name used when synthesizing sweep source labels
    pub device_name: String,
    /// Sweep start frequency in Hz
    pub start_hz: u64,
    /// Sweep stop frequency in Hz
    pub stop_hz: u64,
    /// Number of segments the sweep is acquired in
    pub segments: usize,
    /// Points acquired per segment
    pub points_per_segment: usize,
    /// Fixed external attenuation in the S21 path, in dB (0 = none)
    #[serde(default)]
    pub s21_attenuation_db: f64,
    /// Cable velocity factor used by the TDR estimate
    #[serde(default = "default_velocity_factor")]
    pub tdr_velocity_factor: f64,
}

fn default_velocity_factor() -> f64 {
    0.66
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            device_name: "nanovna".to_string(),
            start_hz: 1_000_000,
            stop_hz: 30_000_000,
            segments: 1,
            points_per_segment: 101,
            s21_attenuation_db: 0.0,
            tdr_velocity_factor: default_velocity_factor(),
        }
    }
}

/// Top-level configuration, passed down through the pipeline's constructors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version for future migration support
    #[serde(default)]
    pub version: u32,
    /// Window and layout state
    #[serde(default)]
    pub gui: GuiConfig,
    /// Chart/marker state
    #[serde(default)]
    pub chart: ChartConfig,
    /// Sweep acquisition parameters
    #[serde(default)]
    pub sweep: SweepConfig,
}

impl AppConfig {
    /// Load configuration from a specific path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SweepVisError::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| SweepVisError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load from the default location, returning defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SweepVisError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| SweepVisError::Serialization(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| SweepVisError::Config(format!("Failed to write config: {}", e)))
    }

    /// Save to the default location
    pub fn store(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save(&dir.join(CONFIG_FILE))
    }
}
