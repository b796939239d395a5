use crate::{
    foundation::error::{ForgeError, ForgeResult},
    timeline::model::Timeline,
};

/// `1 - y` for every sample.
pub fn invert(timeline: &Timeline) -> Timeline {
    timeline.map_positions(|y| 1.0 - y)
}

/// Linearly rescale the observed `[min(y), max(y)]` onto `[new_min, new_max]`.
///
/// A constant timeline maps to the midpoint of the target range.
pub fn map_range(timeline: &Timeline, new_min: f64, new_max: f64) -> ForgeResult<Timeline> {
    if !(new_min < new_max) {
        return Err(ForgeError::invalid_parameter(format!(
            "map range requires min < max (got {new_min} >= {new_max})"
        )));
    }
    let (Some(lo), Some(hi)) = (timeline.min_position(), timeline.max_position()) else {
        return Ok(timeline.clone());
    };

    if hi == lo {
        let mid = (new_min + new_max) / 2.0;
        return Ok(timeline.map_positions(|_| mid));
    }
    let scale = (new_max - new_min) / (hi - lo);
    Ok(timeline.map_positions(|y| (y - lo) * scale + new_min))
}

/// Clamp every sample into `[min, max]`.
pub fn limit(timeline: &Timeline, min: f64, max: f64) -> ForgeResult<Timeline> {
    if min > max {
        return Err(ForgeError::invalid_parameter(format!(
            "limit requires min <= max (got {min} > {max})"
        )));
    }
    Ok(timeline.map_positions(|y| y.clamp(min, max)))
}

/// Shift everything up so the peak reaches 1.0, capping at 1.0.
pub fn normalize(timeline: &Timeline) -> Timeline {
    let Some(peak) = timeline.max_position() else {
        return timeline.clone();
    };
    let shift = 1.0 - peak;
    timeline.map_positions(|y| (y + shift).min(1.0))
}

/// Reflect samples below `threshold` to the same distance above it.
pub fn mirror_up(timeline: &Timeline, threshold: f64) -> Timeline {
    timeline.map_positions(|y| if y < threshold { 2.0 * threshold - y } else { y })
}

#[cfg(test)]
#[path = "../../tests/unit/transform/basic.rs"]
mod tests;
