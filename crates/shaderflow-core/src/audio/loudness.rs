//! RMS loudness estimation

use super::AudioFrame;

/// Empirical gain that maps typical microphone RMS levels onto [0, 1].
pub const LOUDNESS_GAIN: f32 = 10.0;

/// Root-mean-square of all samples in the frame
pub fn calculate_rms(frame: &AudioFrame<'_>) -> f32 {
    let samples = frame.samples();
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

/// Normalized loudness: `min(1, rms * 10)`
pub fn estimate_loudness(frame: &AudioFrame<'_>) -> f32 {
    (calculate_rms(frame) * LOUDNESS_GAIN).min(1.0)
}
