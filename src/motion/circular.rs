use std::f64::consts::PI;

use super::{Segment, SegmentPattern};

/// Stroke-relative semicircle: each segment sweeps half a circle whose diameter spans the
/// segment's start and end values.
#[derive(Clone, Copy, Debug, Default)]
pub struct Circular;

/// `(alpha, beta)` on the stroke-relative semicircle, `frac` of the way from start to end.
pub(crate) fn semicircle_point(seg: &Segment, frac: f64, scale: f64, side: f64) -> (f64, f64) {
    let theta = PI * frac;
    let center = (seg.start_p + seg.end_p) / 2.0;
    let r = (seg.start_p - seg.end_p) / 2.0 * scale;
    (center + r * theta.cos(), 0.5 + side * r * theta.sin())
}

impl SegmentPattern for Circular {
    fn point(&self, seg: &Segment, frac: f64, scale: f64) -> (f64, f64) {
        semicircle_point(seg, frac, scale, 1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/circular.rs"]
mod tests;
