use crate::{
    foundation::{
        error::{ForgeError, ForgeResult},
        math::linspace,
    },
    motion::{
        MotionAlgorithm, MotionOptions, MotionPair, RadiusPolicy, SpeedSource, generate,
        tear::tear_shape,
    },
    timeline::model::Timeline,
    transform::basic::invert,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProstateAlgorithm {
    /// Circular pattern with a fixed small minimum radius.
    Standard,
    TearShaped,
}

impl ProstateAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::TearShaped => "tear-shaped",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProstateOptions {
    pub algorithm: ProstateAlgorithm,
    pub points_per_second: f64,
    pub min_distance_from_center: f64,
    pub generate_from_inverted: bool,
}

impl Default for ProstateOptions {
    fn default() -> Self {
        Self {
            algorithm: ProstateAlgorithm::TearShaped,
            points_per_second: 25.0,
            min_distance_from_center: 0.5,
            generate_from_inverted: true,
        }
    }
}

/// Generate the prostate alpha/beta pair from the main timeline.
#[tracing::instrument(skip(timeline), fields(points = timeline.len()))]
pub fn generate_prostate(timeline: &Timeline, opts: &ProstateOptions) -> ForgeResult<MotionPair> {
    if timeline.len() < 2 {
        return Err(ForgeError::insufficient_data(
            "prostate generation needs at least two points",
        ));
    }
    let working = if opts.generate_from_inverted {
        invert(timeline)
    } else {
        timeline.clone()
    };

    let (alpha, beta) = match opts.algorithm {
        ProstateAlgorithm::Standard => {
            let circular = MotionOptions {
                algorithm: MotionAlgorithm::Circular,
                points_per_second: opts.points_per_second,
                radius: RadiusPolicy::default(),
                ..MotionOptions::default()
            };
            let pair = generate(&working, &circular, SpeedSource::default())?;
            (pair.alpha, pair.beta)
        }
        ProstateAlgorithm::TearShaped => tear_pair(&working, opts)?,
    };

    Ok(MotionPair {
        alpha,
        beta,
        metadata: serde_json::json!({
            "prostate_algorithm": opts.algorithm.as_str(),
            "points_per_second": opts.points_per_second,
            "min_distance_from_center": opts.min_distance_from_center,
            "generated_from_inverted": opts.generate_from_inverted,
        }),
    })
}

fn tear_pair(working: &Timeline, opts: &ProstateOptions) -> ForgeResult<(Timeline, Timeline)> {
    if !(opts.points_per_second.is_finite() && opts.points_per_second > 0.0) {
        return Err(ForgeError::invalid_parameter(format!(
            "points per second must be positive (got {})",
            opts.points_per_second
        )));
    }
    let (Some(start), Some(end)) = (working.start(), working.end()) else {
        return Err(ForgeError::insufficient_data("empty timeline"));
    };
    let count = ((end - start) * opts.points_per_second).floor().max(2.0) as usize;
    let times = linspace(start, end, count);
    let values = working.sample_at(&times);

    let (alpha, beta) = tear_shape(&values, opts.min_distance_from_center);
    Ok((
        Timeline::from_sorted_unchecked(times.clone(), alpha),
        Timeline::from_sorted_unchecked(times, beta),
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/motion/prostate.rs"]
mod tests;
