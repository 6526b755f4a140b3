//! Shader parameter declarations
//!
//! Each visual preset declares an ordered list of numeric parameters. The
//! declarations are static; live values come from [`crate::binding`] and
//! [`crate::mapper`].
//!
//! # Features
//!
//! - **ParamDef**: name, inclusive range, default and optional UI step.
//! - **ParamSet**: the ordered parameters of one preset.
//! - **PresetRegistry**: preset id -> `ParamSet`, built in or loaded from TOML.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::error::ParamError;

/// Declaration of one numeric shader parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    /// Name, unique within its preset
    pub name: String,
    /// Inclusive lower bound
    pub min: f32,
    /// Inclusive upper bound
    pub max: f32,
    /// Value used when no manual value is set
    pub default: f32,
    /// UI quantization step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f32>,
}

impl ParamDef {
    /// Create a definition without a step
    pub fn new(name: impl Into<String>, min: f32, max: f32, default: f32) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            default,
            step: None,
        }
    }

    /// Set the UI step
    pub fn with_step(mut self, step: f32) -> Self {
        self.step = Some(step);
        self
    }

    /// Check bounds, default and step for consistency
    pub fn validate(&self) -> Result<(), ParamError> {
        let invalid = |reason: &str| ParamError::InvalidDefinition {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.is_empty() {
            return Err(invalid("empty name"));
        }
        if !self.min.is_finite() || !self.max.is_finite() || !self.default.is_finite() {
            return Err(invalid("non-finite bound or default"));
        }
        if self.min > self.max {
            return Err(invalid("min is greater than max"));
        }
        if self.default < self.min || self.default > self.max {
            return Err(invalid("default outside [min, max]"));
        }
        if let Some(step) = self.step {
            if !(step.is_finite() && step > 0.0) {
                return Err(invalid("step must be positive"));
            }
        }
        Ok(())
    }

    /// Clamp `value` into `[min, max]`. NaN maps to the default.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        value.max(self.min).min(self.max)
    }

    /// Snap `value` to the nearest step above `min`, then clamp
    pub fn quantize(&self, value: f32) -> f32 {
        match self.step {
            Some(step) if step > 0.0 => {
                let steps = ((value - self.min) / step).round();
                self.clamp(self.min + steps * step)
            }
            _ => self.clamp(value),
        }
    }
}

/// Ordered parameter declarations of one preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSet {
    /// Preset identifier
    pub name: String,
    /// Parameters in declaration order
    #[serde(default)]
    pub params: Vec<ParamDef>,
}

impl ParamSet {
    /// Create a validated parameter set
    pub fn new(name: impl Into<String>, params: Vec<ParamDef>) -> Result<Self, ParamError> {
        let set = Self {
            name: name.into(),
            params,
        };
        set.validate()?;
        Ok(set)
    }

    /// Validate every definition and name uniqueness
    pub fn validate(&self) -> Result<(), ParamError> {
        let mut seen = HashSet::new();
        for def in &self.params {
            def.validate()?;
            if !seen.insert(def.name.as_str()) {
                return Err(ParamError::DuplicateParameter {
                    preset: self.name.clone(),
                    name: def.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Look up a definition by name
    pub fn get(&self, name: &str) -> Option<&ParamDef> {
        self.params.iter().find(|d| d.name == name)
    }

    /// Look up a definition, failing with `UnknownParameter`
    pub fn require(&self, name: &str) -> Result<&ParamDef, ParamError> {
        self.get(name).ok_or_else(|| ParamError::UnknownParameter {
            preset: self.name.clone(),
            name: name.to_string(),
        })
    }

    /// Iterate definitions in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &ParamDef> {
        self.params.iter()
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True for presets without parameters
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Default value of every parameter, keyed by name
    pub fn defaults(&self) -> HashMap<String, f32> {
        self.params
            .iter()
            .map(|d| (d.name.clone(), d.default))
            .collect()
    }
}

/// Registry of presets and their parameter sets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PresetRegistry {
    #[serde(default)]
    presets: Vec<ParamSet>,
}

impl PresetRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The presets shipped with the renderer
    pub fn builtin() -> Self {
        let hue = || ParamDef::new("hue", 0.0, 1.0, 0.0).with_step(0.01);

        let presets = vec![
            ParamSet {
                name: "metaballs".to_string(),
                params: vec![
                    hue(),
                    ParamDef::new("speed", 0.0, 2.0, 0.4).with_step(0.1),
                    ParamDef::new("size", 0.1, 2.0, 1.3).with_step(0.01),
                ],
            },
            ParamSet {
                name: "pool_reflections".to_string(),
                params: vec![
                    hue(),
                    ParamDef::new("speed", 0.0, 2.0, 0.3).with_step(0.1),
                    ParamDef::new("size", 0.5, 5.0, 3.0).with_step(0.1),
                    ParamDef::new("sparkliness", 0.0, 1.0, 0.2).with_step(0.01),
                ],
            },
            ParamSet {
                name: "sun".to_string(),
                params: vec![],
            },
            ParamSet {
                name: "night_sky".to_string(),
                params: vec![
                    ParamDef::new("speed", 0.0, 2.0, 1.7).with_step(0.1),
                    ParamDef::new("size", 0.5, 3.0, 1.5).with_step(0.1),
                    ParamDef::new("sparkliness", 0.0, 1.0, 0.7).with_step(0.01),
                ],
            },
        ];

        Self { presets }
    }

    /// Parse and validate a registry from TOML
    ///
    /// ```toml
    /// [[presets]]
    /// name = "tunnel"
    ///
    /// [[presets.params]]
    /// name = "speed"
    /// min = 0.0
    /// max = 2.0
    /// default = 1.0
    /// step = 0.1
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ParamError> {
        let registry: Self = toml::from_str(source)?;
        registry.validate()?;
        debug!("Loaded {} presets from TOML", registry.presets.len());
        Ok(registry)
    }

    /// Validate every preset and preset name uniqueness
    pub fn validate(&self) -> Result<(), ParamError> {
        let mut seen = HashSet::new();
        for set in &self.presets {
            set.validate()?;
            if !seen.insert(set.name.as_str()) {
                return Err(ParamError::DuplicatePreset(set.name.clone()));
            }
        }
        Ok(())
    }

    /// Add or replace a preset
    pub fn insert(&mut self, set: ParamSet) -> Result<(), ParamError> {
        set.validate()?;
        match self.presets.iter_mut().find(|p| p.name == set.name) {
            Some(existing) => *existing = set,
            None => self.presets.push(set),
        }
        Ok(())
    }

    /// Parameter set of a preset
    pub fn get(&self, preset: &str) -> Option<&ParamSet> {
        self.presets.iter().find(|p| p.name == preset)
    }

    /// Parameter set of a preset, failing with `UnknownPreset`
    pub fn require(&self, preset: &str) -> Result<&ParamSet, ParamError> {
        self.get(preset)
            .ok_or_else(|| ParamError::UnknownPreset(preset.to_string()))
    }

    /// Preset identifiers in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.name.as_str())
    }
}
