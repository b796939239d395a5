use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::{
    foundation::error::{ForgeError, ForgeResult},
    timeline::model::Timeline,
    transform::curve::{self, ResponseCurve},
};

/// The four curve-driven motion axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MotionAxis {
    E1,
    E2,
    E3,
    E4,
}

impl MotionAxis {
    pub const ALL: [MotionAxis; 4] = [Self::E1, Self::E2, Self::E3, Self::E4];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::E1 => "e1",
            Self::E2 => "e2",
            Self::E3 => "e3",
            Self::E4 => "e4",
        }
    }

    pub fn default_curve(self) -> ResponseCurve {
        match self {
            Self::E1 => curve::linear(),
            Self::E2 => curve::ease_in(),
            Self::E3 => curve::ease_out(),
            Self::E4 => curve::bell(),
        }
    }
}

impl fmt::Display for MotionAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotionAxis {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ForgeError::undefined_reference(format!("unknown motion axis '{s}'")))
    }
}

/// One axis' switch and curve.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AxisSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub curve: ResponseCurve,
}

fn default_enabled() -> bool {
    true
}

impl AxisSettings {
    pub fn for_axis(axis: MotionAxis) -> Self {
        Self {
            enabled: true,
            curve: axis.default_curve(),
        }
    }
}

/// Curve to use for `axis`: the configured one when valid, otherwise the axis default.
pub fn effective_curve(axis: MotionAxis, settings: &AxisSettings) -> ResponseCurve {
    match settings.curve.validate() {
        Ok(()) => settings.curve.clone(),
        Err(err) => {
            tracing::warn!(axis = %axis, error = %err, "invalid response curve, using default");
            axis.default_curve()
        }
    }
}

/// Apply each enabled axis' curve to the main timeline.
#[tracing::instrument(skip_all, fields(points = main.len()))]
pub fn generate_motion_axes(
    main: &Timeline,
    settings: &BTreeMap<MotionAxis, AxisSettings>,
) -> ForgeResult<BTreeMap<MotionAxis, Timeline>> {
    if main.is_empty() {
        return Err(ForgeError::insufficient_data(
            "motion axes need a non-empty timeline",
        ));
    }
    let out: BTreeMap<_, _> = settings
        .iter()
        .filter(|(_, s)| s.enabled)
        .map(|(&axis, s)| (axis, effective_curve(axis, s).apply_to_timeline(main)))
        .collect();
    tracing::debug!(axes = out.len(), "generated motion axes");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/motion/axes.rs"]
mod tests;
