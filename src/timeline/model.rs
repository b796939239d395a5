use crate::foundation::error::{ForgeError, ForgeResult};

/// An ordered sequence of `(time, position)` samples describing one control channel.
///
/// Times are seconds, non-negative and non-decreasing (repeats are allowed). Positions are
/// conventionally in `[0, 1]` but the model does not clamp them.
///
/// A timeline is treated as an immutable value: every transform in this crate returns a new
/// timeline rather than editing one in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timeline {
    times: Vec<f64>,
    positions: Vec<f64>,
}

impl Timeline {
    /// Build a timeline from parallel time/position vectors.
    pub fn new(times: Vec<f64>, positions: Vec<f64>) -> ForgeResult<Self> {
        if times.len() != positions.len() {
            return Err(ForgeError::invalid_parameter(format!(
                "timeline needs parallel sequences (got {} times, {} positions)",
                times.len(),
                positions.len()
            )));
        }
        if let Some(t) = times.iter().find(|t| !t.is_finite() || **t < 0.0) {
            return Err(ForgeError::invalid_parameter(format!(
                "timeline times must be finite and non-negative (got {t})"
            )));
        }
        if positions.iter().any(|p| !p.is_finite()) {
            return Err(ForgeError::invalid_parameter(
                "timeline positions must be finite",
            ));
        }
        if !times.windows(2).all(|w| w[0] <= w[1]) {
            return Err(ForgeError::invalid_parameter(
                "timeline times must be non-decreasing",
            ));
        }
        Ok(Self { times, positions })
    }

    /// Build a timeline from `(time, position)` pairs.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> ForgeResult<Self> {
        let (times, positions) = points.into_iter().unzip();
        Self::new(times, positions)
    }

    /// Internal constructor for callers that already uphold the ordering invariant.
    pub(crate) fn from_sorted_unchecked(times: Vec<f64>, positions: Vec<f64>) -> Self {
        debug_assert_eq!(times.len(), positions.len());
        debug_assert!(times.windows(2).all(|w| w[0] <= w[1]));
        Self { times, positions }
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Iterate `(time, position)` pairs in order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.positions.iter().copied())
    }

    pub fn start(&self) -> Option<f64> {
        self.times.first().copied()
    }

    pub fn end(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Span between first and last sample (0 for fewer than two samples).
    pub fn duration(&self) -> f64 {
        match (self.start(), self.end()) {
            (Some(a), Some(b)) => b - a,
            _ => 0.0,
        }
    }

    pub fn min_position(&self) -> Option<f64> {
        self.positions.iter().copied().reduce(f64::min)
    }

    pub fn max_position(&self) -> Option<f64> {
        self.positions.iter().copied().reduce(f64::max)
    }

    /// Piecewise-linear interpolation at `t`.
    ///
    /// Queries before the first or after the last sample return that endpoint's value; an
    /// empty timeline yields `0.0`.
    pub fn interpolate(&self, t: f64) -> f64 {
        let n = self.times.len();
        if n == 0 {
            return 0.0;
        }
        if t <= self.times[0] {
            return self.positions[0];
        }
        if t >= self.times[n - 1] {
            return self.positions[n - 1];
        }

        // First index with time > t; the bracket is [idx - 1, idx].
        let idx = self.times.partition_point(|&x| x <= t);
        let (t0, t1) = (self.times[idx - 1], self.times[idx]);
        let (y0, y1) = (self.positions[idx - 1], self.positions[idx]);
        if t1 <= t0 {
            return y1;
        }
        y0 + (y1 - y0) * ((t - t0) / (t1 - t0))
    }

    /// Interpolate at every query time.
    pub fn sample_at(&self, query: &[f64]) -> Vec<f64> {
        query.iter().map(|&t| self.interpolate(t)).collect()
    }

    /// New timeline with the same times and `f` applied to each position.
    pub fn map_positions(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            times: self.times.clone(),
            positions: self.positions.iter().map(|&y| f(y)).collect(),
        }
    }

    /// New timeline with the same times and the given positions.
    pub(crate) fn with_positions(&self, positions: Vec<f64>) -> Self {
        debug_assert_eq!(positions.len(), self.times.len());
        Self {
            times: self.times.clone(),
            positions,
        }
    }

    /// Mutable positions, reserved for the effects engine's private working copies.
    pub(crate) fn positions_mut(&mut self) -> &mut [f64] {
        &mut self.positions
    }
}

/// Sorted, de-duplicated union of two timelines' sample times.
pub fn union_times(a: &Timeline, b: &Timeline) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(a.len() + b.len());
    let (xa, xb) = (a.times(), b.times());
    let (mut i, mut j) = (0, 0);
    while i < xa.len() || j < xb.len() {
        let next = match (xa.get(i), xb.get(j)) {
            (Some(&ta), Some(&tb)) if ta <= tb => {
                i += 1;
                ta
            }
            (Some(_), Some(&tb)) => {
                j += 1;
                tb
            }
            (Some(&ta), None) => {
                i += 1;
                ta
            }
            (None, Some(&tb)) => {
                j += 1;
                tb
            }
            (None, None) => break,
        };
        if out.last().is_none_or(|&last| last != next) {
            out.push(next);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
