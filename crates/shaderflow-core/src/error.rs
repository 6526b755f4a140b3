//! Error types for the analysis core
use thiserror::Error;

/// A frame was rejected at the pipeline boundary.
///
/// Rejection happens before any detector state is touched, so a bad frame
/// never leaks NaN/Infinity into the running energy window.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The frame contained no samples
    #[error("audio frame is empty")]
    EmptyFrame,

    /// The frame length differs from the length the source promised
    #[error("audio frame has {actual} samples, expected {expected}")]
    FrameLengthMismatch {
        /// Length declared by the frame source
        expected: usize,
        /// Length actually delivered
        actual: usize,
    },

    /// A sample was NaN or infinite
    #[error("non-finite sample at index {index}")]
    NonFiniteSample {
        /// Position of the first offending sample
        index: usize,
    },
}

/// Audio acquisition errors (device lookup, permission, stream setup)
#[derive(Error, Debug)]
pub enum AudioError {
    /// No default input device is available
    #[error("no audio input device available")]
    NoInputDevice,

    /// A named device was requested but not found
    #[error("audio input device not found: {0}")]
    DeviceNotFound(String),

    /// The device does not offer a usable sample format
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// A frame size of zero samples was requested
    #[error("frame size must be at least one sample")]
    InvalidFrameSize,

    /// Querying the host or device failed
    #[error("audio device error: {0}")]
    Device(String),

    /// Building the input stream failed (includes permission denial)
    #[error("failed to build input stream: {0}")]
    StreamBuild(String),

    /// Starting the input stream failed
    #[error("failed to start input stream: {0}")]
    StreamPlay(String),
}

/// Parameter declaration and binding errors
#[derive(Error, Debug)]
pub enum ParamError {
    /// The parameter is not declared by the active preset
    #[error("unknown parameter '{name}' for preset '{preset}'")]
    UnknownParameter {
        /// Active preset identifier
        preset: String,
        /// Requested parameter name
        name: String,
    },

    /// The preset identifier is not registered
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// A parameter declaration is inconsistent
    #[error("invalid definition for '{name}': {reason}")]
    InvalidDefinition {
        /// Parameter name
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// Two parameters in one preset share a name
    #[error("duplicate parameter '{name}' in preset '{preset}'")]
    DuplicateParameter {
        /// Preset identifier
        preset: String,
        /// Repeated name
        name: String,
    },

    /// A host setting is out of range
    #[error("invalid setting '{key}': {reason}")]
    InvalidSetting {
        /// Setting path
        key: String,
        /// What is wrong with it
        reason: String,
    },

    /// Two presets in one registry share a name
    #[error("duplicate preset '{0}'")]
    DuplicatePreset(String),

    /// A binding string does not name an analysis signal
    #[error("unknown audio signal: {0}")]
    UnknownSignal(String),

    /// Registry or settings TOML could not be parsed
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors surfaced by an audio-reactive session
#[derive(Error, Debug)]
pub enum SessionError {
    /// The frame source could not be acquired; audio-reactive mode stays off
    #[error("audio acquisition failed: {0}")]
    Acquisition(#[from] AudioError),

    /// A tick was rejected
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// A parameter operation was rejected
    #[error("parameter error: {0}")]
    Param(#[from] ParamError),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
