use crate::{
    foundation::error::{ForgeError, ForgeResult},
    timeline::model::Timeline,
};

/// Tuning for windowed speed derivation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SpeedOptions {
    /// Resampling step in seconds.
    pub interpolation_interval: f64,
    /// Samples-per-second factor used to compute the backward time shift
    /// (`shift = floor(window_seconds * shift_rate)` samples).
    pub shift_rate: f64,
}

impl Default for SpeedOptions {
    fn default() -> Self {
        Self {
            interpolation_interval: 0.1,
            shift_rate: 5.0,
        }
    }
}

/// Resample onto a fixed grid starting at `floor(t0)` and covering up to `floor(t_last) + 1`
/// (exclusive), using linear interpolation.
pub fn resample_uniform(timeline: &Timeline, interval: f64) -> ForgeResult<Timeline> {
    if timeline.len() < 2 {
        return Err(ForgeError::insufficient_data(
            "need at least two points to interpolate",
        ));
    }
    if !(interval.is_finite() && interval > 0.0) {
        return Err(ForgeError::invalid_parameter(format!(
            "interpolation interval must be positive (got {interval})"
        )));
    }

    let (Some(first), Some(last)) = (timeline.start(), timeline.end()) else {
        return Err(ForgeError::insufficient_data("empty timeline"));
    };
    let start = first.floor();
    let stop = last.floor() + 1.0;
    let count = ((stop - start) / interval).ceil().max(0.0) as usize;

    let times: Vec<f64> = (0..count)
        .map(|k| start + k as f64 * interval)
        .filter(|&t| t < stop)
        .collect();
    let positions = timeline.sample_at(&times);
    Ok(Timeline::from_sorted_unchecked(times, positions))
}

/// Rolling-window speed over an already uniformly sampled timeline, normalized to `[0, 1]`.
///
/// The output starts and ends with a zero-speed anchor at the input's first and last
/// timestamps; each intermediate value is reported `shift` samples earlier than the window
/// end it was computed at.
pub fn windowed_speed(
    timeline: &Timeline,
    window_seconds: f64,
    shift_rate: f64,
) -> ForgeResult<Timeline> {
    if timeline.len() < 2 {
        return Err(ForgeError::insufficient_data(
            "speed derivation needs at least two points",
        ));
    }
    if !(window_seconds.is_finite() && window_seconds > 0.0) {
        return Err(ForgeError::invalid_parameter(format!(
            "speed window must be positive (got {window_seconds})"
        )));
    }

    let x = timeline.times();
    let y = timeline.positions();
    let n = x.len();
    let shift = (window_seconds * shift_rate.max(0.0)).floor() as usize;

    let mut out_x = Vec::with_capacity(n.saturating_sub(shift) + 2);
    let mut out_y = Vec::with_capacity(n.saturating_sub(shift) + 2);
    out_x.push(x[0]);
    out_y.push(0.0);

    let mut max_speed = 0.0_f64;
    for i in (1 + shift)..n {
        let current = x[i];
        let mut total = 0.0;
        let mut count = 0usize;

        for j in (1..=i).rev() {
            if current - x[j] > window_seconds {
                break;
            }
            let dt = x[j] - x[j - 1];
            if dt != 0.0 {
                total += (y[j] - y[j - 1]).abs() / dt;
                count += 1;
            }
        }

        let avg = if count > 0 { total / count as f64 } else { 0.0 };
        max_speed = max_speed.max(avg);
        out_x.push(x[i - shift]);
        out_y.push(avg);
    }

    out_x.push(x[n - 1]);
    out_y.push(0.0);

    if max_speed > 0.0 {
        for v in &mut out_y {
            *v /= max_speed;
        }
    }

    Timeline::new(out_x, out_y)
}

/// Derive a normalized speed timeline: resample, then apply [`windowed_speed`].
#[tracing::instrument(skip(timeline), fields(points = timeline.len()))]
pub fn convert_to_speed(
    timeline: &Timeline,
    window_seconds: f64,
    opts: SpeedOptions,
) -> ForgeResult<Timeline> {
    let resampled = resample_uniform(timeline, opts.interpolation_interval)?;
    let speed = windowed_speed(&resampled, window_seconds, opts.shift_rate)?;
    tracing::debug!(
        resampled = resampled.len(),
        output = speed.len(),
        "derived windowed speed"
    );
    Ok(speed)
}

/// Acceleration is speed derivation applied to a speed timeline.
pub fn convert_to_acceleration(
    speed: &Timeline,
    window_seconds: f64,
    opts: SpeedOptions,
) -> ForgeResult<Timeline> {
    convert_to_speed(speed, window_seconds, opts)
}

#[cfg(test)]
#[path = "../../tests/unit/derive/speed.rs"]
mod tests;
