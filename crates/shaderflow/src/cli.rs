//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use shaderflow_core::HostSettings;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "shaderflow")]
#[command(about = "Headless audio-reactive shader parameter host", long_about = None)]
pub struct Args {
    /// Settings file (TOML); defaults are used if it does not exist
    #[arg(long, short, value_name = "FILE", default_value = "shaderflow.toml")]
    pub config: PathBuf,

    /// Extra preset declarations (TOML), added to the built-in presets
    #[arg(long, value_name = "FILE")]
    pub presets: Option<PathBuf>,

    /// Preset to run, overriding the settings file
    #[arg(long, short, value_name = "NAME")]
    pub preset: Option<String>,

    /// Input device name, overriding the settings file
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub seconds: Option<f64>,

    /// Stay in manual mode; no audio device is opened
    #[arg(long)]
    pub no_audio: bool,

    /// Print available input devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Print available presets and exit
    #[arg(long)]
    pub list_presets: bool,
}

impl Args {
    /// Apply command-line overrides on top of file settings
    pub fn apply_overrides(&self, settings: &mut HostSettings) {
        if let Some(preset) = &self.preset {
            settings.preset = preset.clone();
        }
        if let Some(device) = &self.device {
            settings.audio.device = Some(device.clone());
        }
        if let Some(seconds) = self.seconds {
            settings.run_seconds = Some(seconds);
        }
        if self.no_audio {
            settings.audio.enabled = false;
        }
    }
}
