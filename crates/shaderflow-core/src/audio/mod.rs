//! Audio analysis - time-domain loudness, beat pulse and music confidence
//!
//! Everything here runs synchronously inside a single tick. The frame source
//! (see [`backend`]) is the only part that touches another thread.

pub mod backend;
pub mod beat;
pub mod loudness;
pub mod music;
pub mod pipeline;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

pub use beat::{BeatDetector, DetectorState};
pub use loudness::estimate_loudness;
pub use music::estimate_music;
pub use pipeline::AnalysisPipeline;

/// Samples per frame delivered by the capture backend.
///
/// Matches the time-domain window of a 2048-point analyser (1024 bins).
pub const DEFAULT_FRAME_SIZE: usize = 1024;

/// One tick's worth of time-domain samples, nominally in [-1, 1].
///
/// Borrowed from the frame source for the duration of one analysis call.
#[derive(Debug, Clone, Copy)]
pub struct AudioFrame<'a> {
    samples: &'a [f32],
}

impl<'a> AudioFrame<'a> {
    /// Wrap a sample buffer. Empty buffers are rejected.
    pub fn new(samples: &'a [f32]) -> Result<Self, AnalysisError> {
        if samples.is_empty() {
            return Err(AnalysisError::EmptyFrame);
        }
        Ok(Self { samples })
    }

    /// The samples of this frame
    pub fn samples(&self) -> &'a [f32] {
        self.samples
    }

    /// Number of samples (never zero)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Check the frame-source contract: expected length and finite samples.
    pub fn validate(&self, expected_len: Option<usize>) -> Result<(), AnalysisError> {
        if let Some(expected) = expected_len {
            if self.samples.len() != expected {
                return Err(AnalysisError::FrameLengthMismatch {
                    expected,
                    actual: self.samples.len(),
                });
            }
        }
        if let Some(index) = self.samples.iter().position(|s| !s.is_finite()) {
            return Err(AnalysisError::NonFiniteSample { index });
        }
        Ok(())
    }
}

/// Scalar signals produced once per tick. All fields are in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    loudness: f32,
    beat: f32,
    music: f32,
}

impl AnalysisResult {
    /// Build a result, clamping every field to [0, 1]
    pub fn new(loudness: f32, beat: f32, music: f32) -> Self {
        Self {
            loudness: unit(loudness),
            beat: unit(beat),
            music: unit(music),
        }
    }

    /// Normalized RMS loudness
    pub fn loudness(&self) -> f32 {
        self.loudness
    }

    /// Decaying beat pulse (1.0 on a detected onset)
    pub fn beat(&self) -> f32 {
        self.beat
    }

    /// Music-presence confidence
    pub fn music(&self) -> f32 {
        self.music
    }
}

// NaN collapses to 0 so a result can never carry it downstream.
fn unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
