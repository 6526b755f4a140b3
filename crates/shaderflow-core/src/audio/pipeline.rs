//! Per-tick analysis pipeline: loudness -> beat -> music confidence

use tracing::{trace, warn};

use super::beat::{BeatDetector, DetectorState};
use super::loudness::estimate_loudness;
use super::music::estimate_music;
use super::{AnalysisResult, AudioFrame};
use crate::error::AnalysisError;

/// Runs the three estimators once per tick.
///
/// Owns the beat detector state; dropping the pipeline forgets all history.
#[derive(Debug, Clone, Default)]
pub struct AnalysisPipeline {
    detector: BeatDetector,
    expected_frame_len: Option<usize>,
    ticks: u64,
}

impl AnalysisPipeline {
    /// Create a pipeline that accepts frames of any non-zero length
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline that rejects frames whose length differs from `len`
    pub fn with_frame_len(len: usize) -> Self {
        Self {
            expected_frame_len: Some(len),
            ..Self::default()
        }
    }

    /// Analyze one frame captured at `timestamp` (seconds since session start).
    ///
    /// Malformed frames are rejected before the detector sees them.
    pub fn tick(
        &mut self,
        frame: &AudioFrame<'_>,
        timestamp: f64,
    ) -> Result<AnalysisResult, AnalysisError> {
        if let Err(e) = frame.validate(self.expected_frame_len) {
            warn!("Rejected audio frame at {:.3}s: {}", timestamp, e);
            return Err(e);
        }

        let loudness = estimate_loudness(frame);
        let beat = self.detector.process(loudness, timestamp);
        let music = estimate_music(loudness, beat);
        self.ticks += 1;

        let result = AnalysisResult::new(loudness, beat, music);
        trace!(
            "Tick #{} @ {:.3}s: loudness={:.3} beat={:.3} music={:.3}",
            self.ticks,
            timestamp,
            result.loudness(),
            result.beat(),
            result.music()
        );
        Ok(result)
    }

    /// Detector state (diagnostics)
    pub fn detector_state(&self) -> &DetectorState {
        self.detector.state()
    }

    /// Number of frames analyzed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Frame length this pipeline enforces, if any
    pub fn expected_frame_len(&self) -> Option<usize> {
        self.expected_frame_len
    }
}
