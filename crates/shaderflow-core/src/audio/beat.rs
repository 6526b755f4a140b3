//! Adaptive-threshold beat detection
//!
//! Onsets are detected on the loudness signal itself: a rolling window of
//! the last [`HISTORY_SIZE`] loudness values sets a threshold that drops as
//! the window gets more dynamic. A refractory gate suppresses retriggers and
//! the output pulse decays exponentially between beats.
//!
//! Timestamps must be non-decreasing for one detector. Rewinding the clock
//! without resetting the detector gives undefined trigger timing.

use std::collections::VecDeque;
use tracing::debug;

/// Number of loudness values in the energy window
pub const HISTORY_SIZE: usize = 43;
/// Per-tick decay factor of the beat pulse
pub const BEAT_DECAY: f32 = 0.98;
/// Minimum time between beats (seconds)
pub const BEAT_MIN_INTERVAL: f64 = 0.15;
/// Threshold slope against window variance
pub const THRESHOLD_VARIANCE_SLOPE: f32 = -15.0;
/// Threshold at zero variance
pub const THRESHOLD_BASE: f32 = 1.55;

/// Initial threshold before the window first fills
const INITIAL_THRESHOLD: f32 = 0.3;

/// Mutable state owned by exactly one detector
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorState {
    /// Most recent loudness values, oldest first
    pub energy_history: VecDeque<f32>,
    /// Timestamp of the last detected beat (seconds)
    pub last_beat_time: f64,
    /// Current decayed beat pulse
    pub beat: f32,
    /// Last computed adaptive threshold
    pub threshold: f32,
}

impl Default for DetectorState {
    fn default() -> Self {
        Self {
            energy_history: VecDeque::with_capacity(HISTORY_SIZE + 1),
            last_beat_time: 0.0,
            beat: 0.0,
            threshold: INITIAL_THRESHOLD,
        }
    }
}

impl DetectorState {
    /// Fresh state with an empty window
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the window holds [`HISTORY_SIZE`] values
    pub fn is_primed(&self) -> bool {
        self.energy_history.len() >= HISTORY_SIZE
    }
}

/// Push `loudness` into the window and return the beat pulse for `now`.
pub fn detect_beat(loudness: f32, state: &mut DetectorState, now: f64) -> f32 {
    state.energy_history.push_back(loudness);
    // A pre-seeded state may hold more than one excess entry
    while state.energy_history.len() > HISTORY_SIZE {
        state.energy_history.pop_front();
    }

    // Cold start: nothing is reported until the window is full
    if state.energy_history.len() < HISTORY_SIZE {
        return 0.0;
    }

    let (avg_energy, variance) = window_stats(&state.energy_history);
    state.threshold = THRESHOLD_VARIANCE_SLOPE * variance + THRESHOLD_BASE;

    let time_since_last_beat = now - state.last_beat_time;
    if loudness > state.threshold && time_since_last_beat > BEAT_MIN_INTERVAL {
        debug!(
            "Beat at {:.3}s: loudness={:.3} threshold={:.3} avg={:.3}",
            now, loudness, state.threshold, avg_energy
        );
        state.last_beat_time = now;
        state.beat = 1.0;
        return 1.0;
    }

    state.beat = (state.beat * BEAT_DECAY).max(0.0);
    state.beat
}

/// Mean and population variance of the window
fn window_stats(history: &VecDeque<f32>) -> (f32, f32) {
    let len = history.len() as f32;
    let avg = history.iter().sum::<f32>() / len;
    let variance = history.iter().map(|v| (v - avg).powi(2)).sum::<f32>() / len;
    (avg, variance)
}

/// Beat detector owning its [`DetectorState`]
#[derive(Debug, Clone, Default)]
pub struct BeatDetector {
    state: DetectorState,
}

impl BeatDetector {
    /// Create a detector with an empty window
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one tick's loudness
    pub fn process(&mut self, loudness: f32, now: f64) -> f32 {
        detect_beat(loudness, &mut self.state, now)
    }

    /// Read-only view of the detector state
    pub fn state(&self) -> &DetectorState {
        &self.state
    }

    /// Forget all history
    pub fn reset(&mut self) {
        self.state = DetectorState::default();
        debug!("BeatDetector reset");
    }
}
