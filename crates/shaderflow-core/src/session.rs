//! Audio-reactive session
//!
//! Single owner of everything that changes per tick: the active preset's
//! bindings and manual values, the analysis pipeline (present only while
//! audio-reactive mode is on), the latest published analysis and the frame
//! source. All mutation happens from the host's tick callback.

use std::time::Instant;
use tracing::{debug, info};

use crate::audio::backend::AudioBackend;
use crate::audio::{AnalysisPipeline, AnalysisResult, AudioFrame};
use crate::binding::{ManualValues, ParamBinding, ParamBindings};
use crate::error::Result;
use crate::mapper::{ParameterMapper, ResolvedParam};
use crate::params::ParamSet;

/// State owned by an enabled audio-reactive mode
struct AudioReactive {
    backend: Box<dyn AudioBackend>,
    pipeline: AnalysisPipeline,
    started_at: Instant,
}

/// One rendering session's parameter and analysis state
pub struct AudioReactiveSession {
    params: ParamSet,
    bindings: ParamBindings,
    manual: ManualValues,
    audio: Option<AudioReactive>,
    latest: Option<AnalysisResult>,
}

impl AudioReactiveSession {
    /// Start a session on `params` with every parameter at its default
    pub fn new(params: ParamSet) -> Self {
        let manual = ManualValues::from_defaults(&params);
        Self {
            params,
            bindings: ParamBindings::new(),
            manual,
            audio: None,
            latest: None,
        }
    }

    /// Switch preset. Bindings are cleared and manual values reset to defaults.
    pub fn select_preset(&mut self, params: ParamSet) {
        debug!("Selecting preset '{}'", params.name);
        self.manual = ManualValues::from_defaults(&params);
        self.bindings.clear();
        self.params = params;
    }

    /// Active parameter set
    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    /// Current bindings
    pub fn bindings(&self) -> &ParamBindings {
        &self.bindings
    }

    /// Current manual values
    pub fn manual_values(&self) -> &ManualValues {
        &self.manual
    }

    /// Bind a parameter of the active preset
    pub fn set_binding(&mut self, name: &str, binding: ParamBinding) -> Result<()> {
        self.params.require(name)?;
        self.bindings.set(name, binding);
        debug!("Parameter '{}' bound to {}", name, binding);
        Ok(())
    }

    /// Set the manual value of a parameter, clamped to its range
    pub fn set_manual_value(&mut self, name: &str, value: f32) -> Result<f32> {
        let clamped = self.params.require(name)?.clamp(value);
        self.manual.set(name, clamped);
        Ok(clamped)
    }

    /// Turn audio-reactive mode on with `backend` as frame source.
    ///
    /// If the backend cannot be started the error is returned, the mode stays
    /// off and no detector state is created. Enabling twice keeps the running
    /// source.
    pub fn enable_audio(&mut self, mut backend: Box<dyn AudioBackend>) -> Result<()> {
        if self.audio.is_some() {
            debug!("Audio-reactive mode already enabled");
            return Ok(());
        }

        backend.start()?;

        let pipeline = AnalysisPipeline::with_frame_len(backend.frame_size());
        self.audio = Some(AudioReactive {
            backend,
            pipeline,
            started_at: Instant::now(),
        });
        self.latest = None;
        info!("Audio-reactive mode enabled");
        Ok(())
    }

    /// Turn audio-reactive mode off.
    ///
    /// Releases the frame source and forgets all analysis history; a later
    /// enable starts cold.
    pub fn disable_audio(&mut self) {
        if let Some(mut audio) = self.audio.take() {
            audio.backend.stop();
            info!(
                "Audio-reactive mode disabled after {} ticks",
                audio.pipeline.ticks()
            );
        }
        self.latest = None;
    }

    /// Whether audio-reactive mode is on
    pub fn is_audio_reactive(&self) -> bool {
        self.audio.is_some()
    }

    /// Analyze `frame` captured at `timestamp` and publish the result.
    ///
    /// Returns `Ok(None)` while audio-reactive mode is off. A rejected frame
    /// leaves the previously published result in place.
    pub fn tick(&mut self, frame: &AudioFrame<'_>, timestamp: f64) -> Result<Option<AnalysisResult>> {
        let Some(audio) = self.audio.as_mut() else {
            return Ok(None);
        };
        let result = audio.pipeline.tick(frame, timestamp)?;
        self.latest = Some(result);
        Ok(Some(result))
    }

    /// Pull the latest frame from the backend and analyze it.
    ///
    /// Timestamps are seconds since audio-reactive mode was enabled. When the
    /// source has nothing yet, nothing runs and the last result stays published.
    pub fn update(&mut self) -> Result<Option<AnalysisResult>> {
        let Some(audio) = self.audio.as_mut() else {
            return Ok(None);
        };
        let Some(samples) = audio.backend.latest_frame() else {
            return Ok(None);
        };
        let timestamp = audio.started_at.elapsed().as_secs_f64();
        let frame = AudioFrame::new(&samples)?;
        self.tick(&frame, timestamp)
    }

    /// Most recently published analysis
    pub fn latest_analysis(&self) -> Option<&AnalysisResult> {
        self.latest.as_ref()
    }

    /// Beat detector diagnostics while audio-reactive mode is on
    pub fn detector_state(&self) -> Option<&crate::audio::DetectorState> {
        self.audio.as_ref().map(|a| a.pipeline.detector_state())
    }

    fn mapper(&self) -> ParameterMapper {
        ParameterMapper::new(self.is_audio_reactive())
    }

    /// Effective value of a parameter of the active preset
    pub fn resolve(&self, name: &str) -> Option<f32> {
        let def = self.params.get(name)?;
        Some(
            self.mapper()
                .resolve(def, &self.bindings, &self.manual, self.latest.as_ref()),
        )
    }

    /// Effective values of every parameter, in declaration order
    pub fn resolve_all(&self) -> Vec<ResolvedParam> {
        self.mapper()
            .resolve_all(&self.params, &self.bindings, &self.manual, self.latest.as_ref())
    }
}

impl Drop for AudioReactiveSession {
    fn drop(&mut self) {
        self.disable_audio();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::MockBackend;
    use crate::binding::AudioSignal;
    use crate::error::{ParamError, SessionError};
    use crate::params::ParamDef;

    fn params() -> ParamSet {
        ParamSet::new(
            "test",
            vec![
                ParamDef::new("speed", 0.0, 2.0, 0.4),
                ParamDef::new("size", 0.5, 5.0, 3.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_session_uses_defaults() {
        let session = AudioReactiveSession::new(params());
        assert!(!session.is_audio_reactive());
        assert_eq!(session.resolve("speed"), Some(0.4));
        assert_eq!(session.resolve("size"), Some(3.0));
        assert_eq!(session.resolve("hue"), None);
    }

    #[test]
    fn test_unknown_parameter_rejected() {
        let mut session = AudioReactiveSession::new(params());
        let err = session
            .set_binding("hue", ParamBinding::Bound(AudioSignal::Beat))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Param(ParamError::UnknownParameter { .. })
        ));
        assert!(session.set_manual_value("hue", 0.5).is_err());
    }

    #[test]
    fn test_manual_value_is_clamped() {
        let mut session = AudioReactiveSession::new(params());
        assert_eq!(session.set_manual_value("speed", 9.0).unwrap(), 2.0);
        assert_eq!(session.resolve("speed"), Some(2.0));
    }

    #[test]
    fn test_tick_while_disabled_is_noop() {
        let mut session = AudioReactiveSession::new(params());
        let samples = [0.5f32; 8];
        let frame = AudioFrame::new(&samples).unwrap();
        assert_eq!(session.tick(&frame, 0.0).unwrap(), None);
        assert!(session.latest_analysis().is_none());
    }

    #[test]
    fn test_update_pulls_from_backend() {
        let mut session = AudioReactiveSession::new(params());
        let backend = MockBackend::with_frames(4, vec![vec![0.05; 4]]);
        session.enable_audio(Box::new(backend)).unwrap();

        let result = session.update().unwrap().expect("frame available");
        assert!((result.loudness() - 0.5).abs() < 1e-5);
        assert_eq!(session.latest_analysis(), Some(&result));
    }

    #[test]
    fn test_update_without_frames_keeps_last_result() {
        let mut session = AudioReactiveSession::new(params());
        session
            .enable_audio(Box::new(MockBackend::new(4)))
            .unwrap();
        assert_eq!(session.update().unwrap(), None);
        assert!(session.latest_analysis().is_none());
    }
}
