//! 1D → 2D motion-pattern generators, motion axes and phase shifting.
//!
//! Generators walk the input segment by segment (between consecutive samples), subdivide
//! each segment into evenly spaced points and place every point on a 2D path whose
//! excursion scales with the segment's speed.

pub mod axes;
pub mod circular;
pub mod oscillating;
pub mod phase;
pub mod prostate;
pub mod restim;
pub mod tear;

use std::{fmt, str::FromStr};

use crate::{
    foundation::{
        error::{ForgeError, ForgeResult},
        math::clamp01,
    },
    timeline::model::Timeline,
};

/// Named 2D generation algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MotionAlgorithm {
    Circular,
    TopLeftRight,
    TopRightLeft,
    RestimOriginal,
    TearShaped,
}

impl MotionAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Circular => "circular",
            Self::TopLeftRight => "top-left-right",
            Self::TopRightLeft => "top-right-left",
            Self::RestimOriginal => "restim-original",
            Self::TearShaped => "tear-shaped",
        }
    }
}

impl fmt::Display for MotionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotionAlgorithm {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "circular" => Ok(Self::Circular),
            "top-left-right" => Ok(Self::TopLeftRight),
            "top-right-left" => Ok(Self::TopRightLeft),
            "restim-original" => Ok(Self::RestimOriginal),
            "tear-shaped" => Ok(Self::TearShaped),
            other => Err(ForgeError::unsupported(format!(
                "unknown motion algorithm '{other}'"
            ))),
        }
    }
}

/// Maps a normalized segment speed to an excursion scale in `[min_distance_from_center, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RadiusPolicy {
    pub min_distance_from_center: f64,
    pub speed_threshold_percent: f64,
}

impl Default for RadiusPolicy {
    fn default() -> Self {
        Self {
            min_distance_from_center: 0.1,
            speed_threshold_percent: 50.0,
        }
    }
}

impl RadiusPolicy {
    pub fn scale(&self, speed: f64) -> f64 {
        let threshold = self.speed_threshold_percent / 100.0;
        if threshold <= 0.0 || speed >= threshold {
            return 1.0;
        }
        let min = self.min_distance_from_center;
        min + (1.0 - min) * (speed.max(0.0) / threshold)
    }
}

/// Where per-segment speed estimates come from.
#[derive(Clone, Copy, Debug)]
pub enum SpeedSource<'a> {
    /// `|Δp| / duration`, relative to the speed that reaches the edge.
    Inline { speed_at_edge_hz: f64 },
    /// A normalized speed timeline sampled at each segment's midpoint.
    External(&'a Timeline),
}

impl Default for SpeedSource<'_> {
    fn default() -> Self {
        Self::Inline {
            speed_at_edge_hz: 2.0,
        }
    }
}

impl SpeedSource<'_> {
    pub fn segment_speed(&self, seg: &Segment) -> f64 {
        match *self {
            Self::Inline { speed_at_edge_hz } => {
                if seg.duration() <= 0.0 || speed_at_edge_hz <= 0.0 {
                    return 0.0;
                }
                let per_second = (seg.end_p - seg.start_p).abs() / seg.duration();
                (per_second / speed_at_edge_hz).min(1.0)
            }
            Self::External(speed) => clamp01(speed.interpolate(seg.midpoint())),
        }
    }
}

/// Parameters shared by the segment-based generators.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MotionOptions {
    pub algorithm: MotionAlgorithm,
    pub points_per_second: f64,
    pub radius: RadiusPolicy,
    /// Probability of flipping the vertical side per segment (`restim-original`).
    pub direction_change_probability: f64,
    pub seed: u64,
}

impl Default for MotionOptions {
    fn default() -> Self {
        Self {
            algorithm: MotionAlgorithm::TopRightLeft,
            points_per_second: 25.0,
            radius: RadiusPolicy::default(),
            direction_change_probability: 0.1,
            seed: 0,
        }
    }
}

/// Generated horizontal/vertical pair and a description of how it was produced.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionPair {
    pub alpha: Timeline,
    pub beta: Timeline,
    pub metadata: serde_json::Value,
}

/// One input segment between consecutive samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start_t: f64,
    pub end_t: f64,
    pub start_p: f64,
    pub end_p: f64,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.end_t - self.start_t
    }

    pub fn midpoint(&self) -> f64 {
        (self.start_t + self.end_t) / 2.0
    }

    /// `max(1, floor(duration * points_per_second))`.
    pub fn subdivisions(&self, points_per_second: f64) -> usize {
        let n = (self.duration() * points_per_second).floor();
        if n.is_finite() && n >= 1.0 { n as usize } else { 1 }
    }
}

pub fn segments(timeline: &Timeline) -> impl Iterator<Item = Segment> + '_ {
    timeline
        .times()
        .windows(2)
        .zip(timeline.positions().windows(2))
        .map(|(t, p)| Segment {
            start_t: t[0],
            end_t: t[1],
            start_p: p[0],
            end_p: p[1],
        })
}

/// Per-segment point placement for the segment-based generators.
pub(crate) trait SegmentPattern {
    fn subdivisions(&self, seg: &Segment, points_per_second: f64) -> usize {
        seg.subdivisions(points_per_second)
    }

    fn begin_segment(&mut self, _seg: &Segment) {}

    /// Place the point `frac` of the way through `seg` (`0 <= frac <= 1`).
    fn point(&self, seg: &Segment, frac: f64, scale: f64) -> (f64, f64);
}

/// Drive a [`SegmentPattern`] over every segment, appending the final input sample once.
pub(crate) fn trace(
    timeline: &Timeline,
    pattern: &mut impl SegmentPattern,
    points_per_second: f64,
    radius: RadiusPolicy,
    speed: SpeedSource<'_>,
) -> ForgeResult<(Timeline, Timeline)> {
    if timeline.len() < 2 {
        return Err(ForgeError::insufficient_data(
            "motion generation needs at least two points",
        ));
    }
    if !(points_per_second.is_finite() && points_per_second > 0.0) {
        return Err(ForgeError::invalid_parameter(format!(
            "points per second must be positive (got {points_per_second})"
        )));
    }

    let mut times = Vec::new();
    let mut alpha = Vec::new();
    let mut beta = Vec::new();
    let mut last = None;

    for seg in segments(timeline) {
        pattern.begin_segment(&seg);
        let scale = radius.scale(speed.segment_speed(&seg));
        let n = pattern.subdivisions(&seg, points_per_second);
        for k in 0..n {
            let frac = k as f64 / n as f64;
            let (a, b) = pattern.point(&seg, frac, scale);
            times.push(seg.start_t + seg.duration() * frac);
            alpha.push(clamp01(a));
            beta.push(clamp01(b));
        }
        last = Some((seg, scale));
    }

    if let Some((seg, scale)) = last {
        let (a, b) = pattern.point(&seg, 1.0, scale);
        times.push(seg.end_t);
        alpha.push(clamp01(a));
        beta.push(clamp01(b));
    }

    Ok((
        Timeline::from_sorted_unchecked(times.clone(), alpha),
        Timeline::from_sorted_unchecked(times, beta),
    ))
}

/// Run the configured segment-based generator.
///
/// `TearShaped` is a prostate pattern; use [`prostate::generate_prostate`] for it.
#[tracing::instrument(skip(timeline, speed), fields(points = timeline.len(), algorithm = %opts.algorithm))]
pub fn generate(
    timeline: &Timeline,
    opts: &MotionOptions,
    speed: SpeedSource<'_>,
) -> ForgeResult<MotionPair> {
    let (alpha, beta) = match opts.algorithm {
        MotionAlgorithm::Circular => trace(
            timeline,
            &mut circular::Circular,
            opts.points_per_second,
            opts.radius,
            speed,
        )?,
        MotionAlgorithm::TopLeftRight => trace(
            timeline,
            &mut oscillating::Oscillating::top_left_right(),
            opts.points_per_second,
            opts.radius,
            speed,
        )?,
        MotionAlgorithm::TopRightLeft => trace(
            timeline,
            &mut oscillating::Oscillating::top_right_left(),
            opts.points_per_second,
            opts.radius,
            speed,
        )?,
        MotionAlgorithm::RestimOriginal => trace(
            timeline,
            &mut restim::RestimOriginal::new(opts.seed, opts.direction_change_probability),
            opts.points_per_second,
            opts.radius,
            speed,
        )?,
        MotionAlgorithm::TearShaped => {
            return Err(ForgeError::unsupported(
                "tear-shaped is only available as a prostate pattern",
            ));
        }
    };

    tracing::debug!(output = alpha.len(), "generated 2D motion");
    Ok(MotionPair {
        alpha,
        beta,
        metadata: serde_json::json!({
            "algorithm": opts.algorithm.as_str(),
            "points_per_second": opts.points_per_second,
            "min_distance_from_center": opts.radius.min_distance_from_center,
            "speed_threshold_percent": opts.radius.speed_threshold_percent,
            "speed_source": match speed {
                SpeedSource::Inline { .. } => "inline",
                SpeedSource::External(_) => "external",
            },
        }),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtremumKind {
    Max,
    Min,
}

/// A strict local extremum of a value series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extremum {
    pub index: usize,
    pub value: f64,
    pub kind: ExtremumKind,
}

/// Interior samples strictly greater (or strictly less) than both neighbours.
pub fn local_extrema(values: &[f64]) -> Vec<Extremum> {
    values
        .windows(3)
        .enumerate()
        .filter_map(|(i, w)| {
            let kind = if w[1] > w[0] && w[1] > w[2] {
                ExtremumKind::Max
            } else if w[1] < w[0] && w[1] < w[2] {
                ExtremumKind::Min
            } else {
                return None;
            };
            Some(Extremum {
                index: i + 1,
                value: w[1],
                kind,
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/motion/mod.rs"]
mod tests;
