//! Binding - Parameter Signal Routing
//!
//! Associates each declared parameter with either its manual value or one of
//! the live analysis signals. Both maps are keyed by parameter name; a name
//! with no entry is manual.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::audio::AnalysisResult;
use crate::error::ParamError;
use crate::params::ParamSet;

/// Analysis signal a parameter can follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSignal {
    /// Normalized RMS loudness
    Loudness,
    /// Decaying beat pulse
    Beat,
    /// Music-presence confidence
    Music,
}

impl AudioSignal {
    /// Every signal, in display order
    pub const ALL: [AudioSignal; 3] = [AudioSignal::Loudness, AudioSignal::Beat, AudioSignal::Music];

    /// Read this signal from an analysis result
    pub fn read(self, analysis: &AnalysisResult) -> f32 {
        match self {
            AudioSignal::Loudness => analysis.loudness(),
            AudioSignal::Beat => analysis.beat(),
            AudioSignal::Music => analysis.music(),
        }
    }

    /// Lowercase identifier
    pub fn as_str(self) -> &'static str {
        match self {
            AudioSignal::Loudness => "loudness",
            AudioSignal::Beat => "beat",
            AudioSignal::Music => "music",
        }
    }
}

impl fmt::Display for AudioSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a parameter gets its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamBinding {
    /// Use the manual value (or the declared default)
    #[default]
    Manual,
    /// Follow an analysis signal across the declared range
    Bound(AudioSignal),
}

impl FromStr for ParamBinding {
    type Err = ParamError;

    /// Accepts `manual`/`none` and the signal names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" | "none" => Ok(ParamBinding::Manual),
            "loudness" => Ok(ParamBinding::Bound(AudioSignal::Loudness)),
            "beat" => Ok(ParamBinding::Bound(AudioSignal::Beat)),
            "music" => Ok(ParamBinding::Bound(AudioSignal::Music)),
            other => Err(ParamError::UnknownSignal(other.to_string())),
        }
    }
}

impl fmt::Display for ParamBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamBinding::Manual => f.write_str("manual"),
            ParamBinding::Bound(signal) => signal.fmt(f),
        }
    }
}

/// Per-parameter bindings of the active preset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParamBindings {
    bindings: HashMap<String, ParamBinding>,
}

impl ParamBindings {
    /// Create an empty binding map (everything manual)
    pub fn new() -> Self {
        Self::default()
    }

    /// Binding of `name`; absent entries are manual
    pub fn get(&self, name: &str) -> ParamBinding {
        self.bindings.get(name).copied().unwrap_or_default()
    }

    /// Set a binding. Setting `Manual` removes the entry.
    pub fn set(&mut self, name: impl Into<String>, binding: ParamBinding) {
        let name = name.into();
        match binding {
            ParamBinding::Manual => {
                self.bindings.remove(&name);
            }
            bound => {
                self.bindings.insert(name, bound);
            }
        }
    }

    /// Forget all bindings
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Names bound to a signal, with their signal
    pub fn bound(&self) -> impl Iterator<Item = (&str, AudioSignal)> {
        self.bindings.iter().filter_map(|(name, b)| match b {
            ParamBinding::Bound(signal) => Some((name.as_str(), *signal)),
            ParamBinding::Manual => None,
        })
    }

    /// True when no parameter is bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Manual values of the active preset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ManualValues {
    values: HashMap<String, f32>,
}

impl ManualValues {
    /// Create an empty map (every parameter at its default)
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with the defaults of every parameter in `set`
    pub fn from_defaults(set: &ParamSet) -> Self {
        Self {
            values: set.defaults(),
        }
    }

    /// Manual value of `name`, if one is set
    pub fn get(&self, name: &str) -> Option<f32> {
        self.values.get(name).copied()
    }

    /// Set a manual value
    pub fn set(&mut self, name: impl Into<String>, value: f32) {
        self.values.insert(name.into(), value);
    }

    /// Drop the manual value of `name`
    pub fn remove(&mut self, name: &str) -> Option<f32> {
        self.values.remove(name)
    }

    /// Forget all manual values
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamDef;

    #[test]
    fn test_absent_binding_is_manual() {
        let bindings = ParamBindings::new();
        assert_eq!(bindings.get("hue"), ParamBinding::Manual);
    }

    #[test]
    fn test_set_manual_removes_entry() {
        let mut bindings = ParamBindings::new();
        bindings.set("hue", ParamBinding::Bound(AudioSignal::Beat));
        assert_eq!(bindings.get("hue"), ParamBinding::Bound(AudioSignal::Beat));
        assert!(!bindings.is_empty());

        bindings.set("hue", ParamBinding::Manual);
        assert!(bindings.is_empty());
    }

    #[test]
    fn test_parse_binding() {
        assert_eq!("none".parse::<ParamBinding>().unwrap(), ParamBinding::Manual);
        assert_eq!(
            "Loudness".parse::<ParamBinding>().unwrap(),
            ParamBinding::Bound(AudioSignal::Loudness)
        );
        assert_eq!(
            " music ".parse::<ParamBinding>().unwrap(),
            ParamBinding::Bound(AudioSignal::Music)
        );
        assert!(matches!(
            "bpm".parse::<ParamBinding>(),
            Err(ParamError::UnknownSignal(_))
        ));
        for signal in AudioSignal::ALL {
            let binding = ParamBinding::Bound(signal);
            assert_eq!(binding.to_string().parse::<ParamBinding>().unwrap(), binding);
        }
    }

    #[test]
    fn test_signal_read() {
        let analysis = AnalysisResult::new(0.1, 0.2, 0.3);
        assert_eq!(AudioSignal::Loudness.read(&analysis), 0.1);
        assert_eq!(AudioSignal::Beat.read(&analysis), 0.2);
        assert_eq!(AudioSignal::Music.read(&analysis), 0.3);
    }

    #[test]
    fn test_manual_values_from_defaults() {
        let set = ParamSet::new(
            "p",
            vec![
                ParamDef::new("a", 0.0, 1.0, 0.25),
                ParamDef::new("b", 0.0, 4.0, 2.0),
            ],
        )
        .unwrap();
        let mut manual = ManualValues::from_defaults(&set);
        assert_eq!(manual.get("a"), Some(0.25));
        assert_eq!(manual.get("b"), Some(2.0));

        manual.set("a", 0.75);
        assert_eq!(manual.get("a"), Some(0.75));
        assert_eq!(manual.remove("b"), Some(2.0));
        assert_eq!(manual.get("b"), None);
    }

    #[test]
    fn test_bindings_serialization() {
        let mut bindings = ParamBindings::new();
        bindings.set("speed", ParamBinding::Bound(AudioSignal::Loudness));

        let json = serde_json::to_string(&bindings).expect("Failed to serialize");
        assert!(json.contains("loudness"));
        let deserialized: ParamBindings = serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(bindings, deserialized);
    }
}
