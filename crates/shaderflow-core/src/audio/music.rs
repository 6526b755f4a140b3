//! Music-presence confidence heuristic

/// Loudness weight in the base confidence
pub const LOUDNESS_WEIGHT: f32 = 1.5;
/// Beat pulse above this adds [`BEAT_BOOST`]
pub const BEAT_BOOST_THRESHOLD: f32 = 0.3;
/// Confidence added while the beat pulse is high
pub const BEAT_BOOST: f32 = 0.3;

/// Blend loudness and beat activity into a confidence in [0, 1].
///
/// Higher when the signal is both loud and rhythmically active.
pub fn estimate_music(loudness: f32, beat_pulse: f32) -> f32 {
    let base = (loudness * LOUDNESS_WEIGHT).min(1.0);
    let boost = if beat_pulse > BEAT_BOOST_THRESHOLD {
        BEAT_BOOST
    } else {
        0.0
    };
    (base + boost).min(1.0)
}
