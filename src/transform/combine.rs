use crate::{
    foundation::{
        error::{ForgeError, ForgeResult},
        math::lerp,
    },
    timeline::model::{Timeline, union_times},
};

/// Weighting and rest handling for [`combine`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombineOptions {
    /// `y = (left * (ratio - 1) + right) / ratio`; must be greater than 1.
    pub ratio: f64,
    /// Multiplier applied where either input is exactly zero.
    pub rest_level: f64,
    /// Seconds over which the multiplier climbs back to 1 after a rest. Zero snaps.
    pub ramp_up_duration: f64,
}

impl CombineOptions {
    pub fn new(ratio: f64) -> Self {
        Self {
            ratio,
            ..Self::default()
        }
    }

    pub fn with_rest(mut self, rest_level: f64, ramp_up_duration: f64) -> Self {
        self.rest_level = rest_level;
        self.ramp_up_duration = ramp_up_duration;
        self
    }
}

impl Default for CombineOptions {
    fn default() -> Self {
        Self {
            ratio: 2.0,
            rest_level: 0.5,
            ramp_up_duration: 0.0,
        }
    }
}

/// Weighted blend of two timelines over the union of their sample times.
///
/// Larger ratios bias the result toward `left`. A union sample where either interpolated
/// input is exactly `0.0` is a rest sample and is scaled by `rest_level`. When
/// `ramp_up_duration` is positive, active samples following a rest scale linearly from
/// `rest_level` to `1.0`, measured from the last rest sample's time.
pub fn combine(left: &Timeline, right: &Timeline, opts: CombineOptions) -> ForgeResult<Timeline> {
    let CombineOptions {
        ratio,
        rest_level,
        ramp_up_duration,
    } = opts;
    if !(ratio.is_finite() && ratio > 1.0) {
        return Err(ForgeError::invalid_parameter(format!(
            "combine ratio must be greater than 1 (got {ratio})"
        )));
    }
    if !ramp_up_duration.is_finite() || ramp_up_duration < 0.0 {
        return Err(ForgeError::invalid_parameter(format!(
            "ramp-up duration must be non-negative (got {ramp_up_duration})"
        )));
    }

    let times = union_times(left, right);
    let mut positions = Vec::with_capacity(times.len());
    let mut last_rest: Option<f64> = None;

    for &t in &times {
        let yl = left.interpolate(t);
        let yr = right.interpolate(t);
        let blended = (yl * (ratio - 1.0) + yr) / ratio;

        let multiplier = if yl == 0.0 || yr == 0.0 {
            last_rest = Some(t);
            rest_level
        } else {
            match last_rest {
                Some(rest_t) if ramp_up_duration > 0.0 && t - rest_t < ramp_up_duration => {
                    lerp(rest_level, 1.0, (t - rest_t) / ramp_up_duration)
                }
                _ => 1.0,
            }
        };
        positions.push(blended * multiplier);
    }

    Ok(Timeline::from_sorted_unchecked(times, positions))
}

/// Point-wise product over the union of sample times.
pub fn multiply(left: &Timeline, right: &Timeline) -> Timeline {
    let times = union_times(left, right);
    let positions = times
        .iter()
        .map(|&t| left.interpolate(t) * right.interpolate(t))
        .collect();
    Timeline::from_sorted_unchecked(times, positions)
}

#[cfg(test)]
#[path = "../../tests/unit/transform/combine.rs"]
mod tests;
