//! ShaderFlow Core - Audio Analysis and Parameter Mapping
//!
//! This crate contains the audio-reactive core of the ShaderFlow renderer:
//! - Time-domain analysis (loudness, beat pulse, music confidence)
//! - Audio frame sources (cpal capture, scripted mock)
//! - Shader parameter declarations and built-in presets
//! - Parameter bindings and the parameter mapper
//! - The session that ties them together per tick
//! - Logging and host settings

#![warn(missing_docs)]

pub mod audio;
pub mod binding;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod params;
pub mod session;
pub mod settings;

// --- Re-exports grouped by category ---

// Analysis
pub use audio::backend::{AudioBackend, MockBackend};
pub use audio::{
    AnalysisPipeline, AnalysisResult, AudioFrame, BeatDetector, DetectorState, DEFAULT_FRAME_SIZE,
};

#[cfg(feature = "audio")]
pub use audio::backend::cpal_backend::CpalBackend;

// Parameters
pub use binding::{AudioSignal, ManualValues, ParamBinding, ParamBindings};
pub use mapper::{ParameterMapper, ResolvedParam};
pub use params::{ParamDef, ParamSet, PresetRegistry};

// Session
pub use session::AudioReactiveSession;

// Errors
pub use error::{AnalysisError, AudioError, ParamError, Result, SessionError};

// Configuration
pub use logging::LogConfig;
pub use settings::{AudioConfig, HostSettings};
