use crate::{
    foundation::{
        error::{ForgeError, ForgeResult},
        math::clamp01,
    },
    timeline::model::Timeline,
};

/// Four-point volume envelope spanning the input: silent start, a rise to a level that
/// depends on the clip length, full level near the end, silent end.
///
/// The rise level is `1 - (percent_per_hour / 100) * (t[n-2] - t[1]) / 3600`, so long
/// clips start quieter and climb `percent_per_hour` percent per hour of material.
pub fn make_volume_ramp(timeline: &Timeline, percent_per_hour: f64) -> ForgeResult<Timeline> {
    let n = timeline.len();
    if n < 4 {
        return Err(ForgeError::insufficient_data(format!(
            "volume ramp needs at least 4 points (got {n})"
        )));
    }

    let x = timeline.times();
    let (t0, t1, t2, t3) = (x[0], x[1], x[n - 2], x[n - 1]);
    let hours = (t2 - t1) / 3600.0;
    let rise = clamp01(1.0 - percent_per_hour / 100.0 * hours);

    Timeline::new(vec![t0, t1, t2, t3], vec![0.0, rise, 1.0, 0.0])
}

#[cfg(test)]
#[path = "../../tests/unit/transform/ramp.rs"]
mod tests;
