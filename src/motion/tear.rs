//! Tear-shaped 2D placement driven by local extrema.
//!
//! Adjacent extrema are paired; each pair defines a center between its values and a circle
//! of half the local range. Rising samples trace the first half of the circle, falling
//! samples the second half, and the radius narrows toward the far side to give the
//! silhouette its point.

use std::f64::consts::PI;

use super::{ExtremumKind, local_extrema};
use crate::foundation::math::clamp01;

const NARROW_START_DEG: f64 = 120.0;
const WIDEN_START_DEG: f64 = 240.0;
const FULL_TURN_DEG: f64 = 360.0;
const LOOKAHEAD: usize = 3;

/// Radius at `angle_deg` around a tear of base radius `circle_radius`.
///
/// `[0, 120]` shrinks linearly from full to `min_distance * full`; `(120, 240]` holds at
/// the minimum; `(240, 360)` grows back to full.
pub fn tear_radius(circle_radius: f64, angle_deg: f64, min_distance: f64) -> f64 {
    let a = angle_deg.rem_euclid(FULL_TURN_DEG);
    if a <= NARROW_START_DEG {
        let progress = a / NARROW_START_DEG;
        circle_radius * (1.0 - progress * (1.0 - min_distance))
    } else if a <= WIDEN_START_DEG {
        circle_radius * min_distance
    } else {
        let progress = (a - WIDEN_START_DEG) / (FULL_TURN_DEG - WIDEN_START_DEG);
        circle_radius * (min_distance + progress * (1.0 - min_distance))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TearPair {
    max: f64,
    min: f64,
    /// First covered index.
    from: usize,
    /// Last covered index, inclusive.
    to: usize,
}

impl TearPair {
    fn circle_radius(&self) -> f64 {
        ((self.max - self.min).abs() / 2.0).min(0.5)
    }
}

fn pairs(values: &[f64]) -> Vec<TearPair> {
    let extrema = local_extrema(values);
    let Some(last_extremum) = extrema.last().map(|e| e.index) else {
        return Vec::new();
    };

    let chunks: Vec<_> = extrema.chunks_exact(2).collect();
    chunks
        .iter()
        .enumerate()
        .map(|(k, pair)| {
            let (a, b) = (pair[0], pair[1]);
            let (max, min) = match (a.kind, b.kind) {
                (ExtremumKind::Max, ExtremumKind::Min) => (a.value, b.value),
                (ExtremumKind::Min, ExtremumKind::Max) => (b.value, a.value),
                _ if a.value > b.value => (a.value, b.value),
                _ => (b.value, a.value),
            };
            let to = match chunks.get(k + 1) {
                Some(next) => next[0].index - 1,
                None => last_extremum,
            };
            TearPair {
                max,
                min,
                from: a.index,
                to,
            }
        })
        .collect()
}

fn linear_fallback(p: f64, min_distance: f64) -> (f64, f64) {
    ((0.5 - min_distance) + p * (0.5 + min_distance), 0.5)
}

/// Place every value of an evenly resampled series on the tear path.
///
/// Points outside every extremum pair, or the whole series when fewer than two extrema
/// exist, use a straight horizontal mapping. The last three points have no full lookahead
/// and are placed on the rising half. Results are clamped to `[0, 1]`.
pub fn tear_shape(values: &[f64], min_distance: f64) -> (Vec<f64>, Vec<f64>) {
    let n = values.len();
    let pairs = pairs(values);
    let mut alpha = Vec::with_capacity(n);
    let mut beta = Vec::with_capacity(n);
    let mut cursor = 0;

    for (i, &p) in values.iter().enumerate() {
        // Rising unless a full lookahead window says otherwise.
        let ascending = match values.get(i + 1..i + 1 + LOOKAHEAD) {
            Some(next) => next.iter().sum::<f64>() / LOOKAHEAD as f64 - p > 0.0,
            None => true,
        };

        while cursor < pairs.len() && pairs[cursor].to < i {
            cursor += 1;
        }
        let pair = pairs.get(cursor).filter(|pair| pair.from <= i);

        let (a, b) = match pair {
            None => linear_fallback(p, min_distance),
            Some(pair) => {
                let center_value = (pair.max + pair.min) / 2.0;
                let center_alpha = (0.5 - min_distance) + center_value * (0.5 + min_distance);

                let range = pair.max - pair.min;
                let angle = if range < 1e-6 {
                    0.0
                } else {
                    let q = clamp01((p - pair.min) / range);
                    if ascending { q * PI } else { 2.0 * PI - q * PI }
                };
                let r = tear_radius(pair.circle_radius(), angle.to_degrees(), min_distance);
                (center_alpha + r * angle.cos(), 0.5 + r * angle.sin())
            }
        };
        alpha.push(clamp01(a));
        beta.push(clamp01(b));
    }

    (alpha, beta)
}

#[cfg(test)]
#[path = "../../tests/unit/motion/tear.rs"]
mod tests;
