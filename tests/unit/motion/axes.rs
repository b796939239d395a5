use super::*;

fn main_timeline() -> Timeline {
    Timeline::new(vec![0.0, 1.0, 2.0], vec![0.0, 0.5, 1.0]).unwrap()
}

fn all_enabled() -> BTreeMap<MotionAxis, AxisSettings> {
    MotionAxis::ALL
        .into_iter()
        .map(|a| (a, AxisSettings::for_axis(a)))
        .collect()
}

#[test]
fn default_curves_per_axis() {
    let out = generate_motion_axes(&main_timeline(), &all_enabled()).unwrap();
    assert_eq!(out.len(), 4);
    assert_eq!(out[&MotionAxis::E1].positions(), &[0.0, 0.5, 1.0]);
    assert_eq!(out[&MotionAxis::E2].positions(), &[0.0, 0.2, 1.0]);
    assert_eq!(out[&MotionAxis::E3].positions(), &[0.0, 0.8, 1.0]);
    assert_eq!(out[&MotionAxis::E4].positions(), &[0.0, 1.0, 0.0]);
    assert_eq!(out[&MotionAxis::E4].times(), main_timeline().times());
}

#[test]
fn disabled_axes_are_skipped() {
    let mut settings = all_enabled();
    settings.get_mut(&MotionAxis::E3).unwrap().enabled = false;
    let out = generate_motion_axes(&main_timeline(), &settings).unwrap();
    assert!(!out.contains_key(&MotionAxis::E3));
    assert_eq!(out.len(), 3);
}

#[test]
fn invalid_curve_falls_back_to_default() {
    let mut settings = BTreeMap::new();
    settings.insert(
        MotionAxis::E2,
        AxisSettings {
            enabled: true,
            curve: ResponseCurve {
                name: "broken".into(),
                description: String::new(),
                control_points: vec![(0.5, 0.5)],
            },
        },
    );
    let out = generate_motion_axes(&main_timeline(), &settings).unwrap();
    assert_eq!(out[&MotionAxis::E2].positions(), &[0.0, 0.2, 1.0]);
}

#[test]
fn axis_names_parse() {
    assert_eq!("E3".parse::<MotionAxis>().unwrap(), MotionAxis::E3);
    assert!("e5".parse::<MotionAxis>().is_err());
    assert_eq!(MotionAxis::E4.to_string(), "e4");
}
