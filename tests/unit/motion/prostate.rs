use super::*;

fn main_timeline() -> Timeline {
    Timeline::new(
        vec![0.0, 1.0, 2.0, 3.0, 4.0],
        vec![0.0, 1.0, 0.0, 1.0, 0.0],
    )
    .unwrap()
}

#[test]
fn tear_shaped_resamples_at_configured_density() {
    let pair = generate_prostate(&main_timeline(), &ProstateOptions::default()).unwrap();
    assert_eq!(pair.alpha.len(), 100);
    assert_eq!(pair.alpha.start(), Some(0.0));
    assert_eq!(pair.alpha.end(), Some(4.0));
    assert_eq!(pair.metadata["prostate_algorithm"], "tear-shaped");
    assert_eq!(pair.metadata["generated_from_inverted"], true);
    for v in pair.alpha.positions().iter().chain(pair.beta.positions()) {
        assert!((0.0..=1.0).contains(v));
    }
}

#[test]
fn short_input_still_gets_two_points() {
    let t = Timeline::new(vec![0.0, 0.01], vec![0.0, 1.0]).unwrap();
    let pair = generate_prostate(&t, &ProstateOptions::default()).unwrap();
    assert_eq!(pair.alpha.len(), 2);
}

#[test]
fn standard_uses_circular_on_the_inverted_input() {
    let opts = ProstateOptions {
        algorithm: ProstateAlgorithm::Standard,
        ..ProstateOptions::default()
    };
    let pair = generate_prostate(&main_timeline(), &opts).unwrap();
    // Inverted first sample is 1.0 and the circular path starts at the segment start.
    assert!((pair.alpha.positions()[0] - 1.0).abs() < 1e-12);
    assert_eq!(pair.alpha.end(), Some(4.0));
}

#[test]
fn needs_two_points() {
    let t = Timeline::new(vec![0.0], vec![0.5]).unwrap();
    assert!(generate_prostate(&t, &ProstateOptions::default()).is_err());
}
