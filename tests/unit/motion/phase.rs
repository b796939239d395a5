use super::*;

fn source() -> Timeline {
    // Max at 1s, min at 2s, close max at 2.1s (filtered), max at 3s... min at 4s.
    Timeline::new(
        vec![0.0, 1.0, 2.0, 2.1, 2.2, 3.0, 4.0, 5.0],
        vec![0.5, 1.0, 0.0, 0.6, 0.5, 1.0, 0.0, 0.5],
    )
    .unwrap()
}

#[test]
fn spacing_filter_drops_close_extrema() {
    let found = detect_extremes(&source(), 0.25);
    let times: Vec<f64> = found.iter().map(|e| e.time).collect();
    // 2.1 (max) is too close to 2.0; 2.2 (min) too.
    assert_eq!(times, vec![1.0, 2.0, 3.0, 4.0]);

    let all = detect_extremes(&source(), 0.0);
    assert_eq!(all.len(), 6);
}

#[test]
fn samples_are_delayed_by_bracket_fraction() {
    let target = Timeline::new(vec![0.5, 1.0, 1.5, 3.5, 4.5], vec![0.1, 0.2, 0.3, 0.4, 0.5]).unwrap();
    let shifted = phase_shift(&target, &source(), PhaseShiftOptions::default()).unwrap();

    assert_eq!(shifted.positions(), target.positions());
    let t = shifted.times();
    assert_eq!(t[0], 0.5); // before first extremum
    assert!((t[1] - 1.1).abs() < 1e-12); // bracket [1, 2)
    assert!((t[2] - 1.6).abs() < 1e-12);
    assert!((t[3] - 3.6).abs() < 1e-12);
    assert_eq!(t[4], 4.5); // after last extremum
}

#[test]
fn output_times_never_go_backwards() {
    let src = Timeline::new(vec![0.0, 1.0, 11.0, 12.0], vec![0.0, 1.0, 0.0, 1.0]).unwrap();
    // 10.9 is delayed by 5 s (to 15.9); 11.0 sits in the next bracket and is not delayed.
    let target = Timeline::new(vec![10.9, 11.0], vec![0.3, 0.7]).unwrap();
    let shifted = phase_shift(
        &target,
        &src,
        PhaseShiftOptions {
            delay_percentage: 50.0,
            min_segment_duration: 0.0,
        },
    )
    .unwrap();
    assert!((shifted.times()[0] - 15.9).abs() < 1e-9);
    assert_eq!(shifted.times()[1], shifted.times()[0]);
}

#[test]
fn bad_percentage_is_rejected() {
    let opts = PhaseShiftOptions {
        delay_percentage: 150.0,
        ..PhaseShiftOptions::default()
    };
    assert!(phase_shift(&source(), &source(), opts).is_err());
}

#[test]
fn all_axes_get_dash_two_variants() {
    let mut targets = BTreeMap::new();
    targets.insert("alpha".to_string(), source());
    targets.insert("e1".to_string(), source());
    let out = phase_shift_all(&targets, &source(), PhaseShiftOptions::default()).unwrap();
    assert_eq!(
        out.keys().cloned().collect::<Vec<_>>(),
        vec!["alpha-2".to_string(), "e1-2".to_string()]
    );
}
