//! Piecewise-linear response curves.
//!
//! A curve is a set of `(input, output)` control points in `[0, 1]`, at least two, with
//! unique inputs. Inputs outside the covered range saturate to the nearest endpoint's output.

use crate::{
    foundation::{
        error::{ForgeError, ForgeResult},
        math::{clamp01, lerp},
    },
    timeline::model::Timeline,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponseCurve {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub control_points: Vec<(f64, f64)>,
}

impl ResponseCurve {
    /// Build and validate a curve.
    pub fn new(
        name: impl Into<String>,
        control_points: impl IntoIterator<Item = (f64, f64)>,
    ) -> ForgeResult<Self> {
        let curve = Self {
            name: name.into(),
            description: String::new(),
            control_points: control_points.into_iter().collect(),
        };
        curve.validate()?;
        Ok(curve)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(&self) -> ForgeResult<()> {
        if self.control_points.len() < 2 {
            return Err(ForgeError::invalid_parameter(format!(
                "curve '{}' needs at least two control points",
                self.name
            )));
        }
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if let Some(&(x, y)) = self
            .control_points
            .iter()
            .find(|&&(x, y)| !in_unit(x) || !in_unit(y))
        {
            return Err(ForgeError::invalid_parameter(format!(
                "curve '{}' control point ({x}, {y}) outside [0, 1]",
                self.name
            )));
        }
        let sorted = self.sorted_points();
        if sorted.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(ForgeError::invalid_parameter(format!(
                "curve '{}' has duplicate input coordinates",
                self.name
            )));
        }
        Ok(())
    }

    fn sorted_points(&self) -> Vec<(f64, f64)> {
        let mut pts = self.control_points.clone();
        pts.sort_by(|a, b| a.0.total_cmp(&b.0));
        pts
    }

    /// Map one value through the curve. The input is clamped to `[0, 1]` first.
    pub fn apply(&self, value: f64) -> f64 {
        eval_sorted(&self.sorted_points(), clamp01(value))
    }

    /// Remap every position of `timeline`, clamping the result to `[0, 1]`.
    pub fn apply_to_timeline(&self, timeline: &Timeline) -> Timeline {
        let pts = self.sorted_points();
        timeline.map_positions(|y| clamp01(eval_sorted(&pts, clamp01(y))))
    }

    /// `count` evenly spaced `(input, output)` samples, for previews and diagnostics.
    pub fn preview(&self, count: usize) -> Vec<(f64, f64)> {
        let pts = self.sorted_points();
        crate::foundation::math::linspace(0.0, 1.0, count)
            .into_iter()
            .map(|x| (x, clamp01(eval_sorted(&pts, x))))
            .collect()
    }
}

fn eval_sorted(pts: &[(f64, f64)], v: f64) -> f64 {
    let (Some(&(x_first, y_first)), Some(&(x_last, y_last))) = (pts.first(), pts.last()) else {
        return v;
    };
    if v <= x_first {
        return y_first;
    }
    if v >= x_last {
        return y_last;
    }
    let idx = pts.partition_point(|&(x, _)| x <= v);
    let ((x1, y1), (x2, y2)) = (pts[idx - 1], pts[idx]);
    if x2 == x1 {
        return y1;
    }
    lerp(y1, y2, (v - x1) / (x2 - x1))
}

fn builtin(name: &str, description: &str, pts: &[(f64, f64)]) -> ResponseCurve {
    ResponseCurve {
        name: name.to_string(),
        description: description.to_string(),
        control_points: pts.to_vec(),
    }
}

pub fn linear() -> ResponseCurve {
    builtin("Linear", "Direct 1:1 mapping", &[(0.0, 0.0), (1.0, 1.0)])
}

pub fn ease_in() -> ResponseCurve {
    builtin(
        "Ease In",
        "Gradual start, strong finish",
        &[(0.0, 0.0), (0.5, 0.2), (1.0, 1.0)],
    )
}

pub fn ease_out() -> ResponseCurve {
    builtin(
        "Ease Out",
        "Strong start, gradual finish",
        &[(0.0, 0.0), (0.5, 0.8), (1.0, 1.0)],
    )
}

pub fn bell() -> ResponseCurve {
    builtin(
        "Bell Curve",
        "Emphasis on middle range",
        &[(0.0, 0.0), (0.25, 0.3), (0.5, 1.0), (0.75, 0.3), (1.0, 0.0)],
    )
}

/// Named presets: the four motion-axis defaults plus common variations.
pub const PRESET_NAMES: &[&str] = &[
    "linear",
    "ease_in",
    "ease_out",
    "bell",
    "inverted",
    "s_curve",
    "sharp_peak",
    "gentle_wave",
];

pub fn preset(name: &str) -> Option<ResponseCurve> {
    let curve = match name {
        "linear" => linear(),
        "ease_in" => ease_in(),
        "ease_out" => ease_out(),
        "bell" => bell(),
        "inverted" => builtin(
            "Inverted",
            "Inverted linear mapping",
            &[(0.0, 1.0), (1.0, 0.0)],
        ),
        "s_curve" => builtin(
            "S-Curve",
            "Smooth acceleration and deceleration",
            &[(0.0, 0.0), (0.2, 0.1), (0.5, 0.5), (0.8, 0.9), (1.0, 1.0)],
        ),
        "sharp_peak" => builtin(
            "Sharp Peak",
            "Sharp emphasis on middle range",
            &[(0.0, 0.0), (0.4, 0.1), (0.5, 1.0), (0.6, 0.1), (1.0, 0.0)],
        ),
        "gentle_wave" => builtin(
            "Gentle Wave",
            "Gentle wave-like response",
            &[(0.0, 0.2), (0.25, 0.7), (0.5, 0.3), (0.75, 0.8), (1.0, 0.4)],
        ),
        _ => return None,
    };
    Some(curve)
}

#[cfg(test)]
#[path = "../../tests/unit/transform/curve.rs"]
mod tests;
