use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::{
    effects::params::{LinearChange, Modulation, Operation, Ramp, ResolvedEvent},
    foundation::{
        error::ForgeError,
        math::{clamp01, linspace},
    },
    timeline::model::Timeline,
};

/// How an effect value combines with the existing sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectMode {
    Additive,
    Overwrite,
}

impl FromStr for EffectMode {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "additive" => Ok(Self::Additive),
            "overwrite" => Ok(Self::Overwrite),
            other => Err(ForgeError::unsupported(format!("unknown mode '{other}'"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
}

impl FromStr for Waveform {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sin" | "sine" => Ok(Self::Sine),
            other => Err(ForgeError::unsupported(format!(
                "waveform '{other}' not supported"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    UnknownAxis,
    UnknownOperation,
    UnsupportedWaveform,
    UnknownMode,
}

/// A skipped operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub axis: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.axis, self.message)
    }
}

/// Axis-name substring → maximum raw value.
///
/// A raw parameter for an axis is divided by the max of the longest key contained in the
/// axis name. A max of 1, or a value already within `[0, 1]` for a larger max, passes
/// through unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizationTable {
    entries: Vec<(String, f64)>,
}

impl Default for NormalizationTable {
    fn default() -> Self {
        Self::from_pairs([
            ("pulse_frequency", 200.0),
            ("pulse_width", 100.0),
            ("frequency", 360.0),
            ("volume", 1.0),
        ])
    }
}

impl NormalizationTable {
    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, f64)>) -> Self {
        Self {
            entries: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn max_for(&self, axis: &str) -> Option<f64> {
        self.entries
            .iter()
            .filter(|(key, _)| axis.contains(key.as_str()))
            .fold(None::<&(String, f64)>, |best, e| match best {
                Some(b) if b.0.len() >= e.0.len() => Some(b),
                _ => Some(e),
            })
            .map(|(_, max)| *max)
    }

    pub fn normalize(&self, axis: &str, value: f64) -> f64 {
        match self.max_for(axis) {
            None => value,
            Some(max) if max == 1.0 => value,
            Some(max) if max > 1.0 && value <= 1.0 => value,
            Some(max) => value / max,
        }
    }
}

/// Primary axis → axes that mirror every operation applied to it.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkTable {
    links: BTreeMap<String, Vec<String>>,
}

impl Default for LinkTable {
    fn default() -> Self {
        Self::from_pairs([
            ("volume", vec!["volume-prostate"]),
            ("alpha", vec!["alpha-prostate"]),
            ("beta", vec!["beta-prostate"]),
        ])
    }
}

impl LinkTable {
    pub fn empty() -> Self {
        Self {
            links: BTreeMap::new(),
        }
    }

    pub fn from_pairs<K: Into<String>, V: Into<String>>(
        pairs: impl IntoIterator<Item = (K, Vec<V>)>,
    ) -> Self {
        Self {
            links: pairs
                .into_iter()
                .map(|(k, vs)| (k.into(), vs.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }

    pub fn linked(&self, axis: &str) -> &[String] {
        self.links.get(axis).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Per-axis bounds check after editing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisReport {
    pub min: f64,
    pub max: f64,
}

impl AxisReport {
    pub fn in_bounds(&self) -> bool {
        self.min >= 0.0 && self.max <= 1.0
    }
}

/// Applies parametrized effects to private working copies of a set of axes.
#[derive(Clone, Debug)]
pub struct EffectsEngine {
    axes: BTreeMap<String, Timeline>,
    normalization: NormalizationTable,
    links: LinkTable,
    apply_to_linked: bool,
    diagnostics: Vec<Diagnostic>,
}

impl EffectsEngine {
    pub fn new(axes: BTreeMap<String, Timeline>) -> Self {
        Self {
            axes,
            normalization: NormalizationTable::default(),
            links: LinkTable::default(),
            apply_to_linked: true,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_normalization(mut self, normalization: NormalizationTable) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_links(mut self, links: LinkTable) -> Self {
        self.links = links;
        self
    }

    pub fn with_apply_to_linked(mut self, apply_to_linked: bool) -> Self {
        self.apply_to_linked = apply_to_linked;
        self
    }

    pub fn axes(&self) -> &BTreeMap<String, Timeline> {
        &self.axes
    }

    pub fn axis(&self, name: &str) -> Option<&Timeline> {
        self.axes.get(name)
    }

    pub fn into_axes(self) -> BTreeMap<String, Timeline> {
        self.axes
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn diagnose(&mut self, kind: DiagnosticKind, axis: &str, message: String) {
        tracing::warn!(axis, ?kind, "{message}; skipping");
        self.diagnostics.push(Diagnostic {
            kind,
            axis: axis.to_string(),
            message,
        });
    }

    /// The primary axis (when loaded) plus every loaded linked axis.
    pub fn target_axes(&self, axis: &str) -> Vec<String> {
        let mut out = Vec::new();
        if self.axes.contains_key(axis) {
            out.push(axis.to_string());
        }
        if self.apply_to_linked {
            out.extend(
                self.links
                    .linked(axis)
                    .iter()
                    .filter(|a| self.axes.contains_key(a.as_str()))
                    .cloned(),
            );
        }
        out
    }

    /// Shift the `volume` axis down so its peak leaves `headroom_percent` of room, flooring
    /// at zero. Returns the applied shift.
    pub fn apply_volume_headroom(&mut self, headroom_percent: f64) -> Option<f64> {
        if headroom_percent <= 0.0 {
            return None;
        }
        let volume = self.axes.get_mut("volume")?;
        let peak = volume.max_position()?;
        let threshold = 1.0 - headroom_percent / 100.0;
        if peak <= threshold {
            return None;
        }
        let shift = peak - threshold;
        for y in volume.positions_mut() {
            *y = (*y - shift).max(0.0);
        }
        tracing::info!(peak, shift, "applied volume headroom");
        Some(shift)
    }

    fn resolve_targets(&mut self, axis: &str, operation: &str) -> Option<Vec<String>> {
        let targets = self.target_axes(axis);
        if targets.is_empty() {
            self.diagnose(
                DiagnosticKind::UnknownAxis,
                axis,
                format!("axis '{axis}' not found for {operation}"),
            );
            return None;
        }
        Some(targets)
    }

    fn parse_mode(&mut self, axis: &str, mode: &str) -> Option<EffectMode> {
        match mode.parse() {
            Ok(m) => Some(m),
            Err(err) => {
                self.diagnose(DiagnosticKind::UnknownMode, axis, err.to_string());
                None
            }
        }
    }

    pub fn linear_change(&mut self, op: &LinearChange) {
        let Some(targets) = self.resolve_targets(&op.axis, "linear change") else {
            return;
        };
        let Some(mode) = self.parse_mode(&op.axis, &op.mode) else {
            return;
        };

        for name in targets {
            let start_value = self.normalization.normalize(&name, op.start_value);
            let end_value = self.normalization.normalize(&name, op.end_value);
            if let Some(timeline) = self.axes.get_mut(&name) {
                let window = Window::new(op.start_ms, op.duration_ms, op.ramp);
                let range = window.select(timeline.times());
                let values = linspace(start_value, end_value, range.len());
                window.write(timeline, range, mode, |i, _| values[i]);
            }
        }
    }

    pub fn modulation(&mut self, op: &Modulation) {
        let Some(targets) = self.resolve_targets(&op.axis, "modulation") else {
            return;
        };
        let waveform = match op.waveform.parse::<Waveform>() {
            Ok(w) => w,
            Err(err) => {
                self.diagnose(
                    DiagnosticKind::UnsupportedWaveform,
                    &op.axis,
                    err.to_string(),
                );
                return;
            }
        };
        let Some(mode) = self.parse_mode(&op.axis, &op.mode) else {
            return;
        };

        let phase = op.phase.to_radians();
        for name in targets {
            let amplitude = self.normalization.normalize(&name, op.amplitude);
            let offset = self.normalization.normalize(&name, op.offset);
            if let Some(timeline) = self.axes.get_mut(&name) {
                let window = Window::new(op.start_ms, op.duration_ms, op.ramp);
                let range = window.select(timeline.times());
                window.write(timeline, range, mode, |_, rel| {
                    let angle = 2.0 * std::f64::consts::PI * op.frequency * rel + phase;
                    let wave = match waveform {
                        Waveform::Sine => angle.sin(),
                    };
                    offset + amplitude * wave
                });
            }
        }
    }

    pub fn apply_operation(&mut self, op: &Operation) {
        match op {
            Operation::LinearChange(lc) => self.linear_change(lc),
            Operation::Modulation(m) => self.modulation(m),
            Operation::Unknown { operation, axis } => self.diagnose(
                DiagnosticKind::UnknownOperation,
                axis,
                format!("unknown operation '{operation}'"),
            ),
        }
    }

    pub fn apply_event(&mut self, event: &ResolvedEvent) {
        tracing::debug!(name = %event.name, time_ms = event.time_ms, "applying event");
        for op in &event.operations {
            self.apply_operation(op);
        }
    }

    /// Apply events in ascending trigger time; equal times keep their given order.
    #[tracing::instrument(skip_all, fields(events = events.len()))]
    pub fn apply_events(&mut self, events: &[ResolvedEvent]) {
        let mut ordered: Vec<&ResolvedEvent> = events.iter().collect();
        ordered.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));
        for event in ordered {
            self.apply_event(event);
        }
    }

    pub fn validation_report(&self) -> BTreeMap<String, AxisReport> {
        self.axes
            .iter()
            .filter_map(|(name, tl)| {
                Some((
                    name.clone(),
                    AxisReport {
                        min: tl.min_position()?,
                        max: tl.max_position()?,
                    },
                ))
            })
            .collect()
    }
}

/// Time window of one operation, in seconds.
#[derive(Clone, Copy, Debug)]
struct Window {
    start: f64,
    duration: f64,
    ramp_in: f64,
    ramp_out: f64,
}

impl Window {
    fn new(start_ms: f64, duration_ms: f64, ramp: Ramp) -> Self {
        Self {
            start: start_ms / 1000.0,
            duration: duration_ms.max(0.0) / 1000.0,
            ramp_in: ramp.in_ms.max(0.0) / 1000.0,
            ramp_out: ramp.out_ms.max(0.0) / 1000.0,
        }
    }

    /// Indices in `[start, start + duration)`, or the first sample at or after `start` for a
    /// zero duration.
    fn select(&self, times: &[f64]) -> std::ops::Range<usize> {
        let from = times.partition_point(|&t| t < self.start);
        if self.duration == 0.0 {
            return from..(from + 1).min(times.len());
        }
        let end = self.start + self.duration;
        let to = times.partition_point(|&t| t < end);
        from..to.max(from)
    }

    /// Trapezoidal fade at `rel` seconds into the window.
    fn envelope(&self, rel: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let mut factor: f64 = 1.0;
        if self.ramp_in > 0.0 {
            factor *= (rel / self.ramp_in.min(self.duration)).min(1.0);
        }
        if self.ramp_out > 0.0 {
            factor *= ((self.duration - rel) / self.ramp_out.min(self.duration)).min(1.0);
        }
        factor.max(0.0)
    }

    fn write(
        &self,
        timeline: &mut Timeline,
        range: std::ops::Range<usize>,
        mode: EffectMode,
        effect: impl Fn(usize, f64) -> f64,
    ) {
        let times: Vec<f64> = timeline.times()[range.clone()].to_vec();
        let ys = &mut timeline.positions_mut()[range];
        for (i, (y, t)) in ys.iter_mut().zip(times).enumerate() {
            let rel = t - self.start;
            let value = effect(i, rel) * self.envelope(rel);
            *y = clamp01(match mode {
                EffectMode::Additive => *y + value,
                EffectMode::Overwrite => value,
            });
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/engine.rs"]
mod tests;
