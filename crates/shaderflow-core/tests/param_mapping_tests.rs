use shaderflow_core::{
    AnalysisResult, AudioSignal, ManualValues, ParamBinding, ParamBindings, ParamDef, ParamError,
    ParameterMapper, PresetRegistry,
};

#[test]
fn test_builtin_defaults_resolve_without_audio() {
    let registry = PresetRegistry::builtin();
    let metaballs = registry.require("metaballs").unwrap();
    let manual = ManualValues::from_defaults(metaballs);

    let resolved = ParameterMapper::new(false).resolve_all(
        metaballs,
        &ParamBindings::new(),
        &manual,
        None,
    );
    let values: Vec<(&str, f32)> = resolved.iter().map(|r| (r.name.as_str(), r.value)).collect();
    assert_eq!(values, [("hue", 0.0), ("speed", 0.4), ("size", 1.3)]);
}

#[test]
fn test_sun_has_no_parameters() {
    let registry = PresetRegistry::builtin();
    let sun = registry.require("sun").unwrap();
    assert!(sun.is_empty());
    let resolved = ParameterMapper::new(true).resolve_all(
        sun,
        &ParamBindings::new(),
        &ManualValues::new(),
        Some(&AnalysisResult::new(1.0, 1.0, 1.0)),
    );
    assert!(resolved.is_empty());
}

#[test]
fn test_unknown_preset() {
    let registry = PresetRegistry::builtin();
    assert!(registry.get("tunnel").is_none());
    assert!(matches!(
        registry.require("tunnel"),
        Err(ParamError::UnknownPreset(name)) if name == "tunnel"
    ));
}

#[test]
fn test_each_signal_maps_across_range() {
    let def = ParamDef::new("size", 0.5, 5.0, 3.0);
    let analysis = AnalysisResult::new(0.0, 1.0, 0.5);
    let mapper = ParameterMapper::new(true);
    let manual = ManualValues::new();

    let expected = [
        (AudioSignal::Loudness, 0.5),
        (AudioSignal::Beat, 5.0),
        (AudioSignal::Music, 2.75),
    ];
    for (signal, value) in expected {
        let mut bindings = ParamBindings::new();
        bindings.set("size", ParamBinding::Bound(signal));
        let resolved = mapper.resolve(&def, &bindings, &manual, Some(&analysis));
        assert!(
            (resolved - value).abs() < 1e-6,
            "{}: {} vs {}",
            signal,
            resolved,
            value
        );
    }
}

#[test]
fn test_registry_from_toml() {
    let registry = PresetRegistry::from_toml_str(
        r#"
        [[presets]]
        name = "tunnel"

        [[presets.params]]
        name = "speed"
        min = 0.0
        max = 2.0
        default = 1.0
        step = 0.1

        [[presets.params]]
        name = "twist"
        min = -1.0
        max = 1.0
        default = 0.0
        "#,
    )
    .unwrap();

    let tunnel = registry.require("tunnel").unwrap();
    let names: Vec<&str> = tunnel.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["speed", "twist"]);
    assert_eq!(tunnel.get("speed").unwrap().step, Some(0.1));
    assert_eq!(tunnel.get("twist").unwrap().step, None);
}

#[test]
fn test_registry_rejects_inverted_range() {
    let result = PresetRegistry::from_toml_str(
        r#"
        [[presets]]
        name = "broken"

        [[presets.params]]
        name = "speed"
        min = 2.0
        max = 0.0
        default = 1.0
        "#,
    );
    assert!(matches!(
        result,
        Err(ParamError::InvalidDefinition { name, .. }) if name == "speed"
    ));
}

#[test]
fn test_registry_rejects_duplicate_names() {
    let result = PresetRegistry::from_toml_str(
        r#"
        [[presets]]
        name = "twice"

        [[presets.params]]
        name = "hue"
        min = 0.0
        max = 1.0
        default = 0.0

        [[presets.params]]
        name = "hue"
        min = 0.0
        max = 1.0
        default = 0.5
        "#,
    );
    assert!(matches!(result, Err(ParamError::DuplicateParameter { .. })));
}

#[test]
fn test_quantize_to_step() {
    let registry = PresetRegistry::builtin();
    let speed = registry
        .require("night_sky")
        .unwrap()
        .get("speed")
        .unwrap();
    assert!((speed.quantize(1.23) - 1.2).abs() < 1e-5);
    assert_eq!(speed.quantize(7.0), 2.0);
}

#[test]
fn test_registry_rejects_duplicate_presets() {
    let result = PresetRegistry::from_toml_str(
        r#"
        [[presets]]
        name = "a"

        [[presets]]
        name = "a"

        [[presets.params]]
        name = "speed"
        min = 0.0
        max = 2.0
        default = 1.0
        "#,
    );
    assert!(matches!(
        result,
        Err(ParamError::DuplicatePreset(name)) if name == "a"
    ));
}
