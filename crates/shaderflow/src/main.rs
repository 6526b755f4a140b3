//! ShaderFlow - headless audio-reactive parameter host
//!
//! Loads settings, opens the microphone and drives an
//! [`AudioReactiveSession`] from a fixed-rate tick loop. Once per second the
//! latest analysis and the resolved shader parameters are written to stdout
//! as one JSON line.

mod cli;
mod logging_setup;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use shaderflow_core::{AudioConfig, AudioReactiveSession, HostSettings, PresetRegistry};

use crate::cli::Args;

fn load_settings(path: &Path) -> Result<HostSettings> {
    if !path.exists() {
        return Ok(HostSettings::default());
    }
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings: {:?}", path))?;
    HostSettings::from_toml_str(&source)
        .with_context(|| format!("Failed to parse settings: {:?}", path))
}

fn load_registry(extra: Option<&Path>) -> Result<PresetRegistry> {
    let mut registry = PresetRegistry::builtin();
    if let Some(path) = extra {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read presets: {:?}", path))?;
        let loaded = PresetRegistry::from_toml_str(&source)
            .with_context(|| format!("Failed to load presets: {:?}", path))?;
        for name in loaded.names() {
            if let Some(set) = loaded.get(name) {
                registry.insert(set.clone())?;
            }
        }
    }
    Ok(registry)
}

#[cfg(feature = "audio")]
fn list_devices() -> Result<()> {
    use shaderflow_core::CpalBackend;

    match CpalBackend::list_devices().context("Failed to enumerate input devices")? {
        Some(names) => names.iter().for_each(|name| println!("{}", name)),
        None => println!("No input devices found"),
    }
    Ok(())
}

#[cfg(not(feature = "audio"))]
fn list_devices() -> Result<()> {
    println!("Built without audio support");
    Ok(())
}

/// Enable audio-reactive mode. Failure is logged and the host stays manual.
#[cfg(feature = "audio")]
fn enable_audio(session: &mut AudioReactiveSession, config: &AudioConfig) {
    use shaderflow_core::CpalBackend;

    let backend = match CpalBackend::new(config.device.clone(), config.frame_size) {
        Ok(backend) => backend,
        Err(e) => {
            warn!("Audio input unavailable, continuing in manual mode: {}", e);
            return;
        }
    };
    info!("Capturing from '{}'", backend.device_name());
    if let Err(e) = session.enable_audio(Box::new(backend)) {
        warn!("Audio input unavailable, continuing in manual mode: {}", e);
    }
}

#[cfg(not(feature = "audio"))]
fn enable_audio(_session: &mut AudioReactiveSession, _config: &AudioConfig) {
    warn!("Built without audio support, continuing in manual mode");
}

fn report(session: &AudioReactiveSession, elapsed: f64) -> Result<()> {
    let line = serde_json::json!({
        "t": elapsed,
        "audio_reactive": session.is_audio_reactive(),
        "analysis": session.latest_analysis(),
        "params": session.resolve_all(),
    });
    println!("{}", serde_json::to_string(&line)?);
    Ok(())
}

fn run(session: &mut AudioReactiveSession, settings: &HostSettings) -> Result<()> {
    let rate = if settings.audio.tick_rate_hz > 0.0 {
        settings.audio.tick_rate_hz
    } else {
        warn!(
            "Invalid tick rate {}, using 60 Hz",
            settings.audio.tick_rate_hz
        );
        60.0
    };
    let period = Duration::from_secs_f64(1.0 / rate);
    let report_every = rate.round().max(1.0) as u64;

    info!("--- Entering tick loop at {} Hz ---", rate);
    let start = Instant::now();
    let mut next = start;
    let mut ticks: u64 = 0;

    loop {
        let elapsed = start.elapsed().as_secs_f64();
        if settings.run_seconds.is_some_and(|limit| elapsed >= limit) {
            break;
        }

        if let Err(e) = session.update() {
            debug!("Tick skipped: {}", e);
        }

        if ticks % report_every == 0 {
            report(session, elapsed)?;
        }
        if let Some(analysis) = session.latest_analysis() {
            debug!(
                "loudness={:.3} beat={:.3} music={:.3}",
                analysis.loudness(),
                analysis.beat(),
                analysis.music()
            );
        }
        ticks += 1;

        next += period;
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        } else {
            // Fell behind; do not try to catch up
            next = now;
        }
    }

    info!("Stopped after {} ticks", ticks);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    args.apply_overrides(&mut settings);

    let _log_guard = logging_setup::init(&settings.log_config)?;

    info!("==========================================");
    info!("===    ShaderFlow Session Started      ===");
    info!("==========================================");

    if args.list_devices {
        return list_devices();
    }

    let registry = load_registry(args.presets.as_deref())?;
    if args.list_presets {
        for name in registry.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let params = registry
        .require(&settings.preset)
        .context("Failed to select preset")?
        .clone();
    info!(
        "Preset '{}' with {} parameters",
        params.name,
        params.len()
    );

    let mut session = AudioReactiveSession::new(params);
    settings
        .apply_to(&mut session)
        .context("Failed to apply bindings from settings")?;

    if settings.audio.enabled {
        enable_audio(&mut session, &settings.audio);
    }

    if let Err(e) = run(&mut session, &settings) {
        error!("Host error: {:#}", e);
        return Err(e);
    }

    session.disable_audio();
    Ok(())
}
