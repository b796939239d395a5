use super::{Segment, SegmentPattern, circular::semicircle_point};
use crate::foundation::math::Rng64;

/// Duration covered by each extra point, up to [`MAX_POINTS`].
const SECONDS_PER_POINT: f64 = 0.25;
const MIN_POINTS: usize = 2;
const MAX_POINTS: usize = 6;

/// Stroke-relative semicircle with sparse, duration-adaptive density and a seeded chance
/// per segment of switching to the other vertical side.
#[derive(Clone, Debug)]
pub struct RestimOriginal {
    rng: Rng64,
    flip_probability: f64,
    side: f64,
}

impl RestimOriginal {
    pub fn new(seed: u64, flip_probability: f64) -> Self {
        Self {
            rng: Rng64::new(seed),
            flip_probability,
            side: 1.0,
        }
    }

    /// Current vertical side, `1.0` or `-1.0`.
    pub fn side(&self) -> f64 {
        self.side
    }
}

impl SegmentPattern for RestimOriginal {
    fn subdivisions(&self, seg: &Segment, _points_per_second: f64) -> usize {
        let extra = (seg.duration().max(0.0) / SECONDS_PER_POINT).floor() as usize;
        (MIN_POINTS + extra).min(MAX_POINTS)
    }

    fn begin_segment(&mut self, _seg: &Segment) {
        if self.rng.chance(self.flip_probability) {
            self.side = -self.side;
        }
    }

    fn point(&self, seg: &Segment, frac: f64, scale: f64) -> (f64, f64) {
        semicircle_point(seg, frac, scale, self.side)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/restim.rs"]
mod tests;
