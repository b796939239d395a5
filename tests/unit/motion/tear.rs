use super::*;

#[test]
fn radius_profile_boundaries() {
    // One max at 1.0 and one min at 0.0: base circle radius 0.5.
    let full = 0.5;
    let m = 0.5;
    assert!((tear_radius(full, 0.0, m) - full).abs() < 1e-12);
    assert!((tear_radius(full, 60.0, m) - 0.375).abs() < 1e-12);
    assert!((tear_radius(full, 120.0, m) - m * full).abs() < 1e-12);
    assert!((tear_radius(full, 180.0, m) - m * full).abs() < 1e-12);
    assert!((tear_radius(full, 240.0, m) - m * full).abs() < 1e-12);
    assert!((tear_radius(full, 300.0, m) - 0.375).abs() < 1e-12);
    assert!((tear_radius(full, 360.0, m) - full).abs() < 1e-12);
    assert!((tear_radius(full, -60.0, m) - 0.375).abs() < 1e-12);
}

#[test]
fn single_pair_circle_radius_is_half_the_range() {
    let values = [0.5, 1.0, 0.5, 0.0, 0.5];
    let p = pairs(&values);
    assert_eq!(p.len(), 1);
    assert_eq!(p[0].max, 1.0);
    assert_eq!(p[0].min, 0.0);
    assert_eq!((p[0].from, p[0].to), (1, 3));
    assert!((p[0].circle_radius() - 0.5).abs() < 1e-12);
}

#[test]
fn places_points_around_the_pair_center() {
    let values = [0.5, 1.0, 0.5, 0.0, 0.5];
    let (alpha, beta) = tear_shape(&values, 0.5);

    // Outside the pair: linear fallback.
    assert!((alpha[0] - 0.5).abs() < 1e-12);
    assert!((beta[0] - 0.5).abs() < 1e-12);
    assert!((alpha[4] - 0.5).abs() < 1e-12);

    // At the max while falling: 180°, narrow radius.
    assert!((alpha[1] - 0.25).abs() < 1e-12);
    assert!((beta[1] - 0.5).abs() < 1e-9);

    // Half-way with no full lookahead: rising, 90°.
    assert!((alpha[2] - 0.5).abs() < 1e-9);
    assert!((beta[2] - 0.8125).abs() < 1e-12);

    // At the min while rising: 0°, full radius.
    assert!((alpha[3] - 1.0).abs() < 1e-12);
    assert!((beta[3] - 0.5).abs() < 1e-12);
}

#[test]
fn pairs_cover_up_to_the_next_pair() {
    let values = [0.0, 1.0, 0.0, 0.8, 0.1, 0.9, 0.2];
    let p = pairs(&values);
    // Extrema at 1..=5; pairs (1,2) and (3,4); index 5 is unpaired.
    assert_eq!(p.len(), 2);
    assert_eq!((p[0].from, p[0].to), (1, 2));
    assert_eq!((p[1].from, p[1].to), (3, 5));
}

#[test]
fn fewer_than_two_extrema_is_linear() {
    let values = [0.0, 0.25, 0.5, 1.0];
    let (alpha, beta) = tear_shape(&values, 0.3);
    for (a, p) in alpha.iter().zip(values) {
        assert!((a - (0.2 + p * 0.8)).abs() < 1e-12);
    }
    assert!(beta.iter().all(|&b| b == 0.5));
}

#[test]
fn short_lookahead_near_the_end_counts_as_rising() {
    // Index 4 is the third point from the end; the two values after it fall.
    let values = [0.5, 1.0, 0.5, 0.2, 0.6, 0.0, 0.0];
    let (alpha, beta) = tear_shape(&values, 0.5);

    // Pair (1.0, 0.2): center alpha 0.6, circle radius 0.4, q = 0.5 → 90°.
    assert!((alpha[4] - 0.6).abs() < 1e-9);
    assert!((beta[4] - 0.75).abs() < 1e-12);
}

#[test]
fn full_lookahead_still_detects_falling() {
    let values = [0.5, 1.0, 0.5, 0.2, 0.6, 0.0, 0.0];
    let (_, beta) = tear_shape(&values, 0.5);
    // Index 2 looks at [0.2, 0.6, 0.0]: mean 0.2667 < 0.5 → descending half.
    assert!(beta[2] < 0.5);
}
