use std::f64::consts::PI;

use super::{Segment, SegmentPattern};
use crate::foundation::math::lerp;

/// Segments whose value range is below this use a reduced radius.
const SMALL_MOVEMENT: f64 = 0.1;
const BASE_RADIUS: f64 = 0.3;

/// Global-value arc around the fixed center `(0.5, 0.5)`.
///
/// The interpolated input value `p` maps to `θ = (1 - p) * arc`, so `p = 1` sits at 0° and
/// `p = 0` at the far end of the arc.
#[derive(Clone, Copy, Debug)]
pub struct Oscillating {
    arc: f64,
}

impl Oscillating {
    /// 270° sweep.
    pub fn top_left_right() -> Self {
        Self { arc: 3.0 * PI / 2.0 }
    }

    /// 90° sweep.
    pub fn top_right_left() -> Self {
        Self { arc: PI / 2.0 }
    }

    pub fn arc(&self) -> f64 {
        self.arc
    }
}

impl SegmentPattern for Oscillating {
    fn point(&self, seg: &Segment, frac: f64, scale: f64) -> (f64, f64) {
        let range = (seg.end_p - seg.start_p).abs();
        let radius = if range < SMALL_MOVEMENT {
            scale * (0.1 + 0.2 * range)
        } else {
            scale * BASE_RADIUS
        };
        let p = lerp(seg.start_p, seg.end_p, frac);
        let theta = (1.0 - p) * self.arc;
        (0.5 + radius * theta.cos(), 0.5 + radius * theta.sin())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/oscillating.rs"]
mod tests;
