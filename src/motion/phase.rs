//! Extrema-bracketed phase delay.
//!
//! Extrema of a source timeline bracket each target sample; the sample is moved later by a
//! fraction of its bracket's duration. Samples before the first or after the last kept
//! extremum stay in place.

use std::collections::BTreeMap;

use super::{Extremum, local_extrema};
use crate::{
    foundation::error::{ForgeError, ForgeResult},
    timeline::model::Timeline,
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhaseShiftOptions {
    /// Delay as a percentage (0–100) of the bracketing extrema's spacing.
    pub delay_percentage: f64,
    /// Extrema closer than this (seconds) to the last kept one are dropped.
    pub min_segment_duration: f64,
}

impl Default for PhaseShiftOptions {
    fn default() -> Self {
        Self {
            delay_percentage: 10.0,
            min_segment_duration: 0.25,
        }
    }
}

/// Time of a kept source extremum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedExtremum {
    pub time: f64,
    pub extremum: Extremum,
}

/// Strict local extrema of `source`, thinned to at least `min_spacing` seconds apart.
pub fn detect_extremes(source: &Timeline, min_spacing: f64) -> Vec<TimedExtremum> {
    let times = source.times();
    let mut kept: Vec<TimedExtremum> = Vec::new();
    for extremum in local_extrema(source.positions()) {
        let time = times[extremum.index];
        let far_enough = kept
            .last()
            .is_none_or(|last| min_spacing <= 0.0 || time - last.time >= min_spacing);
        if far_enough {
            kept.push(TimedExtremum { time, extremum });
        }
    }
    kept
}

/// Delay at `t`: the spacing of the extrema at or before `t` and after `t`, times `fraction`.
fn delay_at(extremes: &[TimedExtremum], t: f64, fraction: f64) -> f64 {
    let next = extremes.partition_point(|e| e.time <= t);
    match (next.checked_sub(1).and_then(|i| extremes.get(i)), extremes.get(next)) {
        (Some(prev), Some(next)) => (next.time - prev.time) * fraction,
        _ => 0.0,
    }
}

/// `target`'s values at times delayed according to `source`'s rhythm.
///
/// Output times are kept non-decreasing by clamping each to the previous output time.
pub fn phase_shift(
    target: &Timeline,
    source: &Timeline,
    opts: PhaseShiftOptions,
) -> ForgeResult<Timeline> {
    if !(0.0..=100.0).contains(&opts.delay_percentage) {
        return Err(ForgeError::invalid_parameter(format!(
            "delay percentage must be within 0..=100 (got {})",
            opts.delay_percentage
        )));
    }
    let extremes = detect_extremes(source, opts.min_segment_duration);
    let fraction = opts.delay_percentage / 100.0;

    let mut times = Vec::with_capacity(target.len());
    let mut floor = f64::NEG_INFINITY;
    for &t in target.times() {
        let shifted = (t + delay_at(&extremes, t, fraction)).max(floor);
        floor = shifted;
        times.push(shifted);
    }
    Ok(Timeline::from_sorted_unchecked(
        times,
        target.positions().to_vec(),
    ))
}

/// `<axis>-2` phase-shifted variants for every entry of `targets`.
#[tracing::instrument(skip(targets, source), fields(axes = targets.len()))]
pub fn phase_shift_all(
    targets: &BTreeMap<String, Timeline>,
    source: &Timeline,
    opts: PhaseShiftOptions,
) -> ForgeResult<BTreeMap<String, Timeline>> {
    targets
        .iter()
        .map(|(axis, timeline)| Ok((format!("{axis}-2"), phase_shift(timeline, source, opts)?)))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/motion/phase.rs"]
mod tests;
