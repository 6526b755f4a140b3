//! Host settings
//!
//! Everything the headless host reads from `shaderflow.toml`. Every field has
//! a default so partial files are valid.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::audio::DEFAULT_FRAME_SIZE;
use crate::binding::ParamBinding;
use crate::error::{ParamError, Result};
use crate::logging::LogConfig;
use crate::session::AudioReactiveSession;

/// Audio input settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Input device name; `None` picks the system default
    pub device: Option<String>,
    /// Samples per analysis frame
    pub frame_size: usize,
    /// Analysis ticks per second
    pub tick_rate_hz: f64,
    /// Start in audio-reactive mode
    pub enabled: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            frame_size: DEFAULT_FRAME_SIZE,
            tick_rate_hz: 60.0,
            enabled: true,
        }
    }
}

/// Settings of the headless host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    /// Preset to load
    pub preset: String,
    /// Audio input
    pub audio: AudioConfig,
    /// Parameter name to signal (`loudness`, `beat`, `music`, `manual`)
    pub bindings: HashMap<String, String>,
    /// Parameter name to manual value
    pub manual_values: HashMap<String, f32>,
    /// Stop after this many seconds; run until interrupted when unset
    pub run_seconds: Option<f64>,
    /// Logging
    pub log_config: LogConfig,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            preset: "metaballs".to_string(),
            audio: AudioConfig::default(),
            bindings: HashMap::new(),
            manual_values: HashMap::new(),
            run_seconds: None,
            log_config: LogConfig::default(),
        }
    }
}

impl HostSettings {
    /// Parse and validate settings from TOML
    pub fn from_toml_str(source: &str) -> std::result::Result<Self, ParamError> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the host cannot run with
    pub fn validate(&self) -> std::result::Result<(), ParamError> {
        if self.audio.frame_size == 0 {
            return Err(ParamError::InvalidSetting {
                key: "audio.frame_size".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Apply manual values and bindings to a session on the matching preset.
    ///
    /// Entries naming parameters the preset does not declare are rejected.
    pub fn apply_to(&self, session: &mut AudioReactiveSession) -> Result<()> {
        for (name, value) in &self.manual_values {
            let clamped = session.set_manual_value(name, *value)?;
            if clamped != *value {
                warn!("Manual value for '{}' clamped to {}", name, clamped);
            }
        }
        for (name, signal) in &self.bindings {
            let binding: ParamBinding = signal.parse()?;
            session.set_binding(name, binding)?;
        }
        Ok(())
    }
}
