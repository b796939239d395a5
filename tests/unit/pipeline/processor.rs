use super::*;

const MAIN: &str = r#"{"actions":[{"at":0,"pos":0},{"at":1000,"pos":50},{"at":2000,"pos":100},{"at":3000,"pos":25},{"at":4000,"pos":75},{"at":5000,"pos":0}]}"#;

fn write_main(dir: &Path) -> PathBuf {
    let path = dir.join("clip.funscript");
    std::fs::write(&path, MAIN).unwrap();
    path
}

fn run(cfg: ProcessorConfig, input: &Path) -> (ForgeResult<ProcessReport>, Vec<(i32, String)>) {
    let mut seen = Vec::new();
    let mut sink = |p: i32, m: &str| seen.push((p, m.to_string()));
    let result = Processor::new(cfg).process(input, &mut sink);
    (result, seen)
}

fn assert_unit_range(path: &Path) {
    let tl = load_timeline(path).unwrap();
    assert!(!tl.is_empty(), "{}", path.display());
    assert!(
        tl.positions().iter().all(|v| (0.0..=1.0).contains(v)),
        "{}",
        path.display()
    );
}

#[test]
fn default_run_writes_channels_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_main(dir.path());
    let (result, progress) = run(ProcessorConfig::default(), &input);
    let report = result.unwrap();

    for channel in [
        "frequency",
        "volume",
        "volume-prostate",
        "alpha-prostate",
        "beta-prostate",
        "e1",
        "e2",
        "e3",
        "e4",
    ] {
        let path = &report.outputs[channel];
        assert_eq!(path, &dir.path().join(format!("clip.{channel}.funscript")));
        assert_unit_range(path);
    }
    // No positional alpha in motion-axis mode, so no alpha-driven channels.
    assert!(!report.outputs.contains_key("pulse_frequency"));
    assert!(!report.outputs.contains_key("pulse_width"));

    let speed = &report.channels["speed"];
    assert!(!speed.is_empty());
    assert_eq!(speed.max_position(), Some(1.0));

    assert!(report.intermediates_removed);
    assert!(!dir.path().join(INTERMEDIATE_DIR).exists());

    let percents: Vec<i32> = progress.iter().map(|(p, _)| *p).collect();
    assert_eq!(percents.first(), Some(&0));
    assert_eq!(percents.last(), Some(&100));
    assert!(percents.windows(2).all(|w| w[0] < w[1]));
    assert!(percents.contains(&65));
    assert!(!percents.contains(&15));
    assert!(!percents.contains(&80));
}

#[test]
fn legacy_mode_generates_alpha_beta_and_pulse_channels() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_main(dir.path());
    let mut cfg = ProcessorConfig::default();
    cfg.positional_axes.mode = PositionalMode::Legacy;
    let (result, progress) = run(cfg, &input);
    let report = result.unwrap();

    for channel in [
        "alpha",
        "beta",
        "pulse_frequency",
        "pulse_width",
        "pulse_rise_time",
    ] {
        assert_unit_range(&report.outputs[channel]);
    }
    assert!(!report.outputs.contains_key("e1"));
    assert!(progress.iter().any(|(p, _)| *p == 15));

    let rise = &report.channels["pulse_rise_time"];
    assert!(rise.positions().iter().all(|v| (0.0..=0.8 + 1e-12).contains(v)));
}

#[test]
fn intermediates_can_be_kept() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_main(dir.path());
    let mut cfg = ProcessorConfig::default();
    cfg.options.delete_intermediary_files = false;
    let report = run(cfg, &input).0.unwrap();
    assert!(!report.intermediates_removed);
    let temp = dir.path().join(INTERMEDIATE_DIR);
    for name in ["speed", "speed_inverted", "accel", "ramp", "volume_not_normalized"] {
        assert!(temp.join(format!("clip.{name}.funscript")).is_file(), "{name}");
    }
}

#[test]
fn existing_auxiliary_files_are_reused() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_main(dir.path());
    std::fs::write(
        dir.path().join("clip.ramp.funscript"),
        r#"{"actions":[{"at":0,"pos":100},{"at":5000,"pos":100}]}"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("clip.alpha.funscript"),
        r#"{"actions":[{"at":0,"pos":0},{"at":5000,"pos":100}]}"#,
    )
    .unwrap();

    let report = run(ProcessorConfig::default(), &input).0.unwrap();
    assert_eq!(report.reused, vec!["ramp".to_string(), "alpha".to_string()]);
    assert_eq!(report.channels["ramp"].positions(), &[1.0, 1.0]);
    // A supplied alpha drives the pulse channels even in motion-axis mode.
    assert!(report.outputs.contains_key("pulse_frequency"));
    assert!(report.outputs.contains_key("pulse_width"));
    assert!(!report.outputs.contains_key("pulse_rise_time"));
}

#[test]
fn inversion_and_phase_shift_outputs_are_optional() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_main(dir.path());
    let mut cfg = ProcessorConfig::default();
    cfg.advanced.enable_volume_inversion = true;
    cfg.advanced.enable_frequency_inversion = true;
    cfg.positional_axes.phase_shift.enabled = true;
    cfg.prostate_generation.generate_prostate_files = false;
    let report = run(cfg, &input).0.unwrap();

    let volume = &report.channels["volume"];
    let inverted = &report.channels["volume_inverted"];
    for (a, b) in volume.positions().iter().zip(inverted.positions()) {
        assert!((a + b - 1.0).abs() < 1e-12);
    }
    assert!(report.outputs.contains_key("frequency_inverted"));
    for axis in ["e1-2", "e2-2", "e3-2", "e4-2"] {
        assert!(report.outputs.contains_key(axis), "{axis}");
    }
    assert!(!report.outputs.contains_key("beta-prostate"));
}

#[test]
fn failures_report_a_single_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("short.funscript");
    std::fs::write(
        &input,
        r#"{"actions":[{"at":0,"pos":0},{"at":1000,"pos":100},{"at":2000,"pos":0}]}"#,
    )
    .unwrap();
    let (result, progress) = run(ProcessorConfig::default(), &input);
    assert!(matches!(result, Err(ForgeError::InsufficientData(_))));

    let errors: Vec<_> = progress.iter().filter(|(p, _)| *p < 0).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(progress.last().unwrap().0, -1);
    assert!(progress.last().unwrap().1.starts_with("Error: "));
}

#[test]
fn missing_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (result, progress) = run(ProcessorConfig::default(), &dir.path().join("none.funscript"));
    assert!(result.is_err());
    assert_eq!(progress.last().unwrap().0, -1);
}

#[test]
fn cancellation_stops_before_the_next_stage() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_main(dir.path());
    let flag = Arc::new(AtomicBool::new(true));
    let processor = Processor::new(ProcessorConfig::default()).with_cancel_flag(flag.clone());

    let mut seen = Vec::new();
    let mut sink = |p: i32, m: &str| seen.push((p, m.to_string()));
    let result = processor.process(&input, &mut sink);
    assert!(matches!(result, Err(ForgeError::Cancelled(_))));
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, -1);
    assert!(!dir.path().join("clip.volume.funscript").exists());
}

#[test]
fn alpha_beta_generation_follows_the_configured_algorithm() {
    let main = Timeline::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0, 0.0, 1.0]).unwrap();
    let mut cfg = AlphaBetaConfig::default();
    let pair = generate_alpha_beta(&main, &cfg).unwrap();
    assert_eq!(pair.metadata["algorithm"], "top-right-left");

    cfg.algorithm = MotionAlgorithm::TearShaped;
    let pair = generate_alpha_beta(&main, &cfg).unwrap();
    assert_eq!(pair.metadata["prostate_algorithm"], "tear-shaped");
    assert_eq!(pair.metadata["generated_from_inverted"], false);
}

#[test]
fn generated_pairs_carry_their_generator_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_main(dir.path());
    let mut cfg = ProcessorConfig::default();
    cfg.positional_axes.mode = PositionalMode::Legacy;
    let report = run(cfg, &input).0.unwrap();

    for channel in ["alpha-prostate", "beta-prostate"] {
        let doc = Funscript::from_path(&report.outputs[channel]).unwrap();
        let metadata = doc.metadata.expect(channel);
        assert_eq!(metadata["prostate_algorithm"], "tear-shaped");
        assert_eq!(metadata["generated_from_inverted"], true);
    }
    for channel in ["alpha", "beta"] {
        let doc = Funscript::from_path(&report.outputs[channel]).unwrap();
        assert_eq!(doc.metadata.expect(channel)["algorithm"], "top-right-left");
    }

    // Derived channels are written without metadata.
    let volume = Funscript::from_path(&report.outputs["volume"]).unwrap();
    assert!(volume.metadata.is_none());
}
