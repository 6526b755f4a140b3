//! Resolve effective parameter values for the current tick

use serde::Serialize;

use crate::audio::AnalysisResult;
use crate::binding::{ManualValues, ParamBinding, ParamBindings};
use crate::params::{ParamDef, ParamSet};

/// One resolved parameter, in declaration order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedParam {
    /// Parameter name
    pub name: String,
    /// Effective value, within the declared range
    pub value: f32,
    /// Binding that produced the value
    pub binding: ParamBinding,
}

/// Maps bindings, manual values and the latest analysis onto parameter values.
///
/// Pure query. Callers must only pass definitions of the active preset;
/// set membership is not checked here.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterMapper {
    /// Whether audio-reactive mode is on
    pub audio_reactive: bool,
}

impl ParameterMapper {
    /// Create a mapper for the given mode
    pub fn new(audio_reactive: bool) -> Self {
        Self { audio_reactive }
    }

    /// Effective value of `def` for this tick.
    ///
    /// Bound signals are mapped linearly onto `[min, max]`; a missing
    /// analysis counts as signal 0.
    pub fn resolve(
        &self,
        def: &ParamDef,
        bindings: &ParamBindings,
        manual: &ManualValues,
        analysis: Option<&AnalysisResult>,
    ) -> f32 {
        let binding = self.effective_binding(def, bindings);
        self.value_for(def, binding, manual, analysis)
    }

    /// Resolve every parameter of `set` in declaration order
    pub fn resolve_all(
        &self,
        set: &ParamSet,
        bindings: &ParamBindings,
        manual: &ManualValues,
        analysis: Option<&AnalysisResult>,
    ) -> Vec<ResolvedParam> {
        set.iter()
            .map(|def| {
                let binding = self.effective_binding(def, bindings);
                ResolvedParam {
                    name: def.name.clone(),
                    value: self.value_for(def, binding, manual, analysis),
                    binding,
                }
            })
            .collect()
    }

    // Bindings are ignored entirely while audio-reactive mode is off.
    fn effective_binding(&self, def: &ParamDef, bindings: &ParamBindings) -> ParamBinding {
        if self.audio_reactive {
            bindings.get(&def.name)
        } else {
            ParamBinding::Manual
        }
    }

    fn value_for(
        &self,
        def: &ParamDef,
        binding: ParamBinding,
        manual: &ManualValues,
        analysis: Option<&AnalysisResult>,
    ) -> f32 {
        match binding {
            ParamBinding::Manual => def.clamp(manual.get(&def.name).unwrap_or(def.default)),
            ParamBinding::Bound(signal) => {
                let s = analysis.map_or(0.0, |a| signal.read(a)).clamp(0.0, 1.0);
                def.clamp(def.min + s * (def.max - def.min))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::AudioSignal;

    fn speed() -> ParamDef {
        ParamDef::new("speed", 0.0, 2.0, 0.4)
    }

    #[test]
    fn test_disabled_mode_ignores_binding() {
        let mapper = ParameterMapper::new(false);
        let mut bindings = ParamBindings::new();
        bindings.set("speed", ParamBinding::Bound(AudioSignal::Loudness));
        let manual = ManualValues::new();
        let analysis = AnalysisResult::new(1.0, 1.0, 1.0);

        assert_eq!(
            mapper.resolve(&speed(), &bindings, &manual, Some(&analysis)),
            0.4
        );
    }

    #[test]
    fn test_manual_value_wins_over_default() {
        let mapper = ParameterMapper::new(true);
        let mut manual = ManualValues::new();
        manual.set("speed", 1.5);
        assert_eq!(
            mapper.resolve(&speed(), &ParamBindings::new(), &manual, None),
            1.5
        );
    }

    #[test]
    fn test_manual_value_clamped_to_range() {
        let mapper = ParameterMapper::new(false);
        let mut manual = ManualValues::new();
        manual.set("speed", 7.0);
        assert_eq!(
            mapper.resolve(&speed(), &ParamBindings::new(), &manual, None),
            2.0
        );
    }

    #[test]
    fn test_loudness_maps_linearly() {
        let mapper = ParameterMapper::new(true);
        let mut bindings = ParamBindings::new();
        bindings.set("speed", ParamBinding::Bound(AudioSignal::Loudness));
        let analysis = AnalysisResult::new(0.5, 0.0, 0.0);

        let value = mapper.resolve(&speed(), &bindings, &ManualValues::new(), Some(&analysis));
        assert_eq!(value, 1.0);
    }

    #[test]
    fn test_missing_analysis_counts_as_zero() {
        let mapper = ParameterMapper::new(true);
        let def = ParamDef::new("size", 0.5, 5.0, 3.0);
        let mut bindings = ParamBindings::new();
        bindings.set("size", ParamBinding::Bound(AudioSignal::Beat));

        assert_eq!(
            mapper.resolve(&def, &bindings, &ManualValues::new(), None),
            0.5
        );
    }

    #[test]
    fn test_resolve_all_keeps_declaration_order() {
        let set = ParamSet::new(
            "p",
            vec![
                ParamDef::new("hue", 0.0, 1.0, 0.0),
                speed(),
                ParamDef::new("size", 0.1, 2.0, 1.3),
            ],
        )
        .unwrap();
        let mut bindings = ParamBindings::new();
        bindings.set("hue", ParamBinding::Bound(AudioSignal::Music));
        let analysis = AnalysisResult::new(0.0, 0.0, 0.25);

        let resolved = ParameterMapper::new(true).resolve_all(
            &set,
            &bindings,
            &ManualValues::from_defaults(&set),
            Some(&analysis),
        );

        let names: Vec<&str> = resolved.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["hue", "speed", "size"]);
        assert_eq!(resolved[0].value, 0.25);
        assert_eq!(resolved[0].binding, ParamBinding::Bound(AudioSignal::Music));
        assert_eq!(resolved[1].value, 0.4);
        assert_eq!(resolved[2].value, 1.3);
    }
}
