use super::*;

fn tl(points: &[(f64, f64)]) -> Timeline {
    Timeline::from_points(points.iter().copied()).unwrap()
}

#[test]
fn rejects_structurally_invalid_input() {
    assert!(matches!(
        Timeline::new(vec![0.0, 1.0], vec![0.5]),
        Err(ForgeError::InvalidParameter(_))
    ));
    assert!(Timeline::new(vec![1.0, 0.5], vec![0.0, 0.0]).is_err());
    assert!(Timeline::new(vec![-1.0], vec![0.0]).is_err());
    assert!(Timeline::new(vec![0.0], vec![f64::NAN]).is_err());
    // Repeated timestamps are allowed.
    assert!(Timeline::new(vec![0.0, 0.0, 1.0], vec![0.0, 1.0, 0.5]).is_ok());
}

#[test]
fn interpolation_is_linear_inside_the_span() {
    let t = tl(&[(0.0, 0.0), (1.0, 1.0), (3.0, 0.0)]);
    assert_eq!(t.interpolate(0.5), 0.5);
    assert!((t.interpolate(2.0) - 0.5).abs() < 1e-12);
    assert!((t.interpolate(2.5) - 0.25).abs() < 1e-12);
    assert_eq!(t.interpolate(1.0), 1.0);
}

#[test]
fn interpolation_clamps_outside_the_span() {
    let t = tl(&[(1.0, 0.2), (2.0, 0.8)]);
    assert_eq!(t.interpolate(0.0), 0.2);
    assert_eq!(t.interpolate(5.0), 0.8);
    assert_eq!(Timeline::default().interpolate(1.0), 0.0);
}

#[test]
fn interpolated_values_lie_between_brackets() {
    let t = tl(&[(0.0, 0.1), (0.7, 0.9), (1.3, 0.4), (2.0, 0.4), (4.0, 1.0)]);
    let mut q = 0.0;
    while q <= 4.0 {
        let v = t.interpolate(q);
        let idx = t.times().partition_point(|&x| x <= q).clamp(1, t.len() - 1);
        let (a, b) = (t.positions()[idx - 1], t.positions()[idx]);
        assert!(v >= a.min(b) - 1e-12 && v <= a.max(b) + 1e-12, "q={q} v={v}");
        q += 0.05;
    }
}

#[test]
fn union_is_sorted_and_deduplicated() {
    let a = tl(&[(0.0, 0.0), (1.0, 0.0), (3.0, 0.0)]);
    let b = tl(&[(0.5, 0.0), (1.0, 0.0), (4.0, 0.0)]);
    assert_eq!(union_times(&a, &b), vec![0.0, 0.5, 1.0, 3.0, 4.0]);
    assert_eq!(union_times(&a, &Timeline::default()), vec![0.0, 1.0, 3.0]);
}

#[test]
fn map_positions_leaves_the_source_untouched() {
    let src = tl(&[(0.0, 0.25), (1.0, 0.75)]);
    let copy = src.map_positions(|y| y * 2.0);
    assert_eq!(src.positions(), &[0.25, 0.75]);
    assert_eq!(copy.positions(), &[0.5, 1.5]);
    assert_eq!(copy.times(), src.times());
}

#[test]
fn accessors_report_span_and_extremes() {
    let t = tl(&[(2.0, 0.3), (5.0, 0.9), (6.0, 0.1)]);
    assert_eq!(t.start(), Some(2.0));
    assert_eq!(t.end(), Some(6.0));
    assert_eq!(t.duration(), 4.0);
    assert_eq!(t.min_position(), Some(0.1));
    assert_eq!(t.max_position(), Some(0.9));
    assert_eq!(t.points().count(), 3);
}
