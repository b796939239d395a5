use super::*;

#[test]
fn defaults_match_documented_values() {
    let cfg = ProcessorConfig::default();
    assert_eq!(cfg.general.rest_level, 0.4);
    assert_eq!(cfg.general.speed_window_size, 5.0);
    assert_eq!(cfg.speed.interpolation_interval, 0.1);
    assert_eq!(cfg.alpha_beta_generation.algorithm, MotionAlgorithm::TopRightLeft);
    assert_eq!(cfg.prostate_generation.algorithm, ProstateAlgorithm::TearShaped);
    assert_eq!(cfg.prostate_generation.min_distance_from_center, 0.5);
    assert_eq!(cfg.frequency.pulse_frequency_combine_ratio, 3.0);
    assert_eq!(cfg.volume.volume_ramp_combine_ratio, 20.0);
    assert_eq!(cfg.pulse.pulse_rise_max, 0.8);
    assert!(cfg.options.delete_intermediary_files);
    assert_eq!(cfg.positional_axes.mode, PositionalMode::MotionAxis);
    assert!(!cfg.positional_axes.phase_shift.enabled);
    assert_eq!(cfg.positional_axes.e4.curve.control_points.len(), 5);
}

#[test]
fn partial_documents_fill_in_defaults() {
    let cfg = ProcessorConfig::from_json_str(
        r#"{
          "general": {"rest_level": 0.2},
          "speed": {"interpolation_interval": 0.05, "normalization_method": "max"},
          "alpha_beta_generation": {"algorithm": "restim-original", "seed": 7},
          "file_management": {"mode": "local"},
          "positional_axes": {
            "mode": "legacy",
            "e2": {"enabled": false, "curve": {"name": "Flat", "control_points": [[0, 0.5], [1, 0.5]]}}
          }
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.general.rest_level, 0.2);
    assert_eq!(cfg.general.accel_window_size, 3.0);
    assert_eq!(cfg.speed.interpolation_interval, 0.05);
    assert_eq!(cfg.speed.shift_rate, 5.0);
    assert_eq!(cfg.positional_axes.mode, PositionalMode::Legacy);

    let motion = cfg.alpha_beta_generation.motion_options();
    assert_eq!(motion.algorithm, MotionAlgorithm::RestimOriginal);
    assert_eq!(motion.seed, 7);
    assert_eq!(motion.radius.min_distance_from_center, 0.1);

    let axes = cfg.positional_axes.axis_settings();
    assert_eq!(axes.len(), 4);
    assert!(!axes[&MotionAxis::E2].enabled);
    assert_eq!(axes[&MotionAxis::E2].curve.name, "Flat");
    assert!(axes[&MotionAxis::E3].enabled);
}

#[test]
fn unknown_algorithm_is_rejected() {
    let err = ProcessorConfig::from_json_str(r#"{"alpha_beta_generation": {"algorithm": "zigzag"}}"#)
        .unwrap_err();
    assert!(matches!(err, crate::foundation::error::ForgeError::Serde(_)));
}

#[test]
fn serialized_config_reads_back() {
    let mut cfg = ProcessorConfig::default();
    cfg.positional_axes.phase_shift.enabled = true;
    cfg.volume.prostate_rest_level = 0.6;
    let back = ProcessorConfig::from_json_str(&cfg.to_json_string().unwrap()).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn section_conversions() {
    let cfg = ProcessorConfig::default();
    let combine = cfg.general.volume_combine(20.0);
    assert_eq!(combine.ratio, 20.0);
    assert_eq!(combine.rest_level, 0.4);
    assert_eq!(combine.ramp_up_duration, 1.0);

    let prostate = cfg.prostate_generation.prostate_options();
    assert_eq!(prostate, ProstateOptions::default());

    let phase = cfg.positional_axes.phase_shift.options();
    assert_eq!(phase, PhaseShiftOptions::default());
}

#[test]
fn config_file_is_read_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"options": {"normalize_volume": false}}"#).unwrap();
    let cfg = ProcessorConfig::from_path(&path).unwrap();
    assert!(!cfg.options.normalize_volume);
    assert!(cfg.options.delete_intermediary_files);

    assert!(ProcessorConfig::from_path(&dir.path().join("missing.json")).is_err());
}
