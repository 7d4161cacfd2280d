//! Configuration management for Rover Remote
//!
//! Handles loading and parsing of the YAML configuration file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::fs;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub transport: TransportConfig,
    #[serde(default)]
    pub joystick: JoystickConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoConfig>,
    #[serde(default)]
    pub log_panel: LogPanelConfig,
}

/// Robot control server endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
    /// WebSocket URL, e.g. `ws://rover.local:5000/control`
    pub url: String,
}

/// Stick processing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JoystickConfig {
    /// Radial deadzone; a stick resting inside it reads as centered
    #[serde(default = "default_deadzone")]
    pub deadzone: f32,
    /// Per-axis inversion, keyed by axis id ("lx", "ly", "rx", "ry")
    #[serde(default)]
    pub invert: HashMap<String, bool>,
    /// Gamepad button that triggers the emergency stop
    #[serde(default = "default_estop_button")]
    pub emergency_stop_button: String,
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            deadzone: default_deadzone(),
            invert: HashMap::new(),
            emergency_stop_button: default_estop_button(),
        }
    }
}

/// Video feed probe configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoConfig {
    /// MJPEG stream URL, e.g. `http://rover.local:5000/video_feed`
    pub url: String,
    #[serde(default = "default_video_timeout_ms")]
    pub timeout_ms: u64,
}

/// Session log configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogPanelConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for LogPanelConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        Ok(config)
    }
}

// Default value functions
fn default_deadzone() -> f32 {
    0.05
}
fn default_estop_button() -> String {
    "east".to_string()
}
fn default_video_timeout_ms() -> u64 {
    3000
}
fn default_true() -> bool {
    true
}
