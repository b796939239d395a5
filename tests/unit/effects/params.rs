use super::*;

const DEFINITIONS: &str = r#"{
  "definitions": {
    "edge": {
      "default_params": {"duration_ms": 1000, "shift": 0.1, "buzz": 2, "intensity": 0.5, "lead": 250},
      "steps": [
        {"operation": "apply_linear_change", "axis": "volume",
         "params": {"start_value": "$shift", "duration_ms": "$duration_ms", "mode": "additive"}},
        {"operation": "apply_modulation", "axis": "volume", "start_offset": "$lead",
         "params": {"waveform": "sin", "frequency": "$buzz", "amplitude": "$intensity",
                    "duration_ms": "$duration_ms", "ramp_in_ms": 100}}
      ]
    },
    "broken": {
      "steps": [
        {"operation": "linear_change", "axis": "volume", "params": {"start_value": "$missing", "duration_ms": 10}}
      ]
    },
    "incomplete": {
      "steps": [{"operation": "linear_change", "axis": "volume", "params": {"start_value": 0.2}}]
    },
    "mystery": {
      "steps": [{"operation": "apply_sparkle", "axis": "beta"}]
    }
  },
  "groups": [{"name": "Basics", "events": ["edge"]}]
}"#;

fn defs() -> BTreeMap<String, EventDefinition> {
    DefinitionsDoc::from_json_str(DEFINITIONS).unwrap().definitions
}

fn event(name: &str, time: f64) -> EventRecord {
    EventRecord {
        time,
        name: name.to_string(),
        params: BTreeMap::new(),
    }
}

#[test]
fn dollar_strings_become_tokens() {
    let p: StepParam = serde_json::from_str(r#""$duration_ms""#).unwrap();
    assert_eq!(p, StepParam::Token("duration_ms".into()));
    let p: StepParam = serde_json::from_str(r#""overwrite""#).unwrap();
    assert_eq!(p, StepParam::Literal(ParamValue::Text("overwrite".into())));
    let p: StepParam = serde_json::from_str("12.5").unwrap();
    assert_eq!(p, StepParam::Literal(ParamValue::Number(12.5)));
    assert_eq!(
        serde_json::to_string(&StepParam::Token("x".into())).unwrap(),
        r#""$x""#
    );
}

#[test]
fn groups_are_carried_through() {
    let doc = DefinitionsDoc::from_json_str(DEFINITIONS).unwrap();
    assert!(doc.groups.is_some());
    assert!(doc.normalization.is_none());
}

#[test]
fn tokens_resolve_against_merged_params() {
    let mut ev = event("edge", 1500.0);
    ev.params.insert("duration_ms".into(), ParamValue::Number(400.0));
    let resolved = resolve_event(&ev, &defs()).unwrap();
    assert_eq!(resolved.operations.len(), 2);

    let Operation::LinearChange(lc) = &resolved.operations[0] else {
        panic!("expected linear change");
    };
    assert_eq!(lc.start_ms, 1500.0);
    assert_eq!(lc.duration_ms, 400.0);
    assert_eq!(lc.start_value, 0.1);
    assert_eq!(lc.end_value, 0.1);
    assert_eq!(lc.mode, "additive");

    let Operation::Modulation(m) = &resolved.operations[1] else {
        panic!("expected modulation");
    };
    assert_eq!(m.start_ms, 1750.0);
    assert_eq!(m.frequency, 2.0);
    assert_eq!(m.amplitude, 0.5);
    assert_eq!(m.offset, 0.0);
    assert_eq!(m.ramp.in_ms, 100.0);
    assert_eq!(m.mode, "additive");
}

#[test]
fn undefined_names_are_reported() {
    assert!(matches!(
        resolve_event(&event("nope", 0.0), &defs()),
        Err(ForgeError::UndefinedReference(_))
    ));
    let err = resolve_event(&event("broken", 0.0), &defs()).unwrap_err();
    assert!(matches!(err, ForgeError::UndefinedReference(_)));
    assert!(err.to_string().contains("missing"));
}

#[test]
fn missing_required_parameter_is_invalid() {
    assert!(matches!(
        resolve_event(&event("incomplete", 0.0), &defs()),
        Err(ForgeError::InvalidParameter(_))
    ));
}

#[test]
fn unknown_operations_survive_resolution() {
    let resolved = resolve_event(&event("mystery", 0.0), &defs()).unwrap();
    assert_eq!(
        resolved.operations,
        vec![Operation::Unknown {
            operation: "apply_sparkle".into(),
            axis: "beta".into()
        }]
    );
}

#[test]
fn events_are_ordered_by_time() {
    let file = EventFile::from_json_str(
        r#"{"events":[{"time":3000,"name":"edge"},{"time":100,"name":"mystery"},{"time":3000,"name":"mystery"}]}"#,
    )
    .unwrap();
    let resolved = resolve_events(&file, &defs()).unwrap();
    let order: Vec<(&str, f64)> = resolved
        .iter()
        .map(|e| (e.name.as_str(), e.time_ms))
        .collect();
    assert_eq!(
        order,
        vec![("mystery", 100.0), ("edge", 3000.0), ("mystery", 3000.0)]
    );
}
