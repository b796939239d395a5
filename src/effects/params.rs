//! Event documents and parameter resolution.
//!
//! An event names a definition and may override some of its default parameters. Step
//! parameters are either literals or `$name` tokens; tokens are resolved once per event
//! against the merged parameter mapping, before any step runs.

use std::{collections::BTreeMap, path::Path};

use anyhow::Context as _;

use crate::foundation::error::{ForgeError, ForgeResult};

/// A literal parameter value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// A step parameter: a literal, or a reference to a named event parameter.
///
/// In documents a token is written as a string starting with `$`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "ParamValue", into = "ParamValue")]
pub enum StepParam {
    Literal(ParamValue),
    Token(String),
}

impl From<ParamValue> for StepParam {
    fn from(v: ParamValue) -> Self {
        match v {
            ParamValue::Text(s) if s.starts_with('$') => Self::Token(s[1..].to_string()),
            other => Self::Literal(other),
        }
    }
}

impl From<StepParam> for ParamValue {
    fn from(p: StepParam) -> Self {
        match p {
            StepParam::Literal(v) => v,
            StepParam::Token(name) => ParamValue::Text(format!("${name}")),
        }
    }
}

impl Default for StepParam {
    fn default() -> Self {
        Self::Literal(ParamValue::Number(0.0))
    }
}

impl StepParam {
    pub fn resolve(&self, params: &BTreeMap<String, ParamValue>) -> ForgeResult<ParamValue> {
        match self {
            Self::Literal(v) => Ok(v.clone()),
            Self::Token(name) => params.get(name).cloned().ok_or_else(|| {
                ForgeError::undefined_reference(format!("token '${name}' has no value"))
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EventStep {
    pub operation: String,
    pub axis: String,
    /// Milliseconds after the event's trigger time.
    #[serde(default)]
    pub start_offset: StepParam,
    #[serde(default)]
    pub params: BTreeMap<String, StepParam>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EventDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub default_params: BTreeMap<String, ParamValue>,
    #[serde(default)]
    pub steps: Vec<EventStep>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NormalizationEntry {
    pub max: f64,
}

/// The definitions document: named event definitions plus optional normalization limits.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DefinitionsDoc {
    pub definitions: BTreeMap<String, EventDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalization: Option<BTreeMap<String, NormalizationEntry>>,
    /// Presentation grouping of definitions; carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<serde_json::Value>,
}

impl DefinitionsDoc {
    pub fn from_json_str(s: &str) -> ForgeResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> ForgeResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read event definitions '{}'", path.display()))?;
        Self::from_json_str(&s)
    }
}

/// One user-authored event.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EventRecord {
    /// Trigger time in milliseconds.
    pub time: f64,
    pub name: String,
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EventFile {
    pub events: Vec<EventRecord>,
}

impl EventFile {
    pub fn from_json_str(s: &str) -> ForgeResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> ForgeResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read event file '{}'", path.display()))?;
        Self::from_json_str(&s)
    }
}

/// Fade in/out durations shared by both operations, in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ramp {
    pub in_ms: f64,
    pub out_ms: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinearChange {
    pub axis: String,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub start_value: f64,
    pub end_value: f64,
    pub ramp: Ramp,
    pub mode: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Modulation {
    pub axis: String,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub waveform: String,
    /// Hz.
    pub frequency: f64,
    pub amplitude: f64,
    pub offset: f64,
    /// Degrees.
    pub phase: f64,
    pub ramp: Ramp,
    pub mode: String,
}

/// A step with every token substituted and required parameters checked.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    LinearChange(LinearChange),
    Modulation(Modulation),
    /// Operation name with no known implementation; skipped with a diagnostic.
    Unknown { operation: String, axis: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedEvent {
    pub time_ms: f64,
    pub name: String,
    pub operations: Vec<Operation>,
}

struct StepArgs<'a> {
    event: &'a str,
    params: BTreeMap<String, ParamValue>,
}

impl StepArgs<'_> {
    fn number(&self, key: &str) -> ForgeResult<Option<f64>> {
        match self.params.get(key) {
            None => Ok(None),
            Some(ParamValue::Number(v)) => Ok(Some(*v)),
            Some(ParamValue::Text(s)) => Err(ForgeError::invalid_parameter(format!(
                "event '{}': parameter '{key}' must be a number (got '{s}')",
                self.event
            ))),
        }
    }

    fn required_number(&self, key: &str) -> ForgeResult<f64> {
        self.number(key)?.ok_or_else(|| self.missing(key))
    }

    fn text_or(&self, key: &str, default: &str) -> String {
        match self.params.get(key) {
            Some(ParamValue::Text(s)) => s.clone(),
            Some(ParamValue::Number(v)) => v.to_string(),
            None => default.to_string(),
        }
    }

    fn missing(&self, key: &str) -> ForgeError {
        ForgeError::invalid_parameter(format!(
            "event '{}': missing required parameter '{key}'",
            self.event
        ))
    }

    fn ramp(&self) -> ForgeResult<Ramp> {
        Ok(Ramp {
            in_ms: self.number("ramp_in_ms")?.unwrap_or(0.0),
            out_ms: self.number("ramp_out_ms")?.unwrap_or(0.0),
        })
    }
}

fn build_operation(step: &EventStep, start_ms: f64, args: &StepArgs<'_>) -> ForgeResult<Operation> {
    let axis = step.axis.clone();
    let op = match step.operation.as_str() {
        "apply_linear_change" | "linear_change" => {
            let start_value = args.required_number("start_value")?;
            Operation::LinearChange(LinearChange {
                axis,
                start_ms,
                duration_ms: args.required_number("duration_ms")?,
                start_value,
                end_value: args.number("end_value")?.unwrap_or(start_value),
                ramp: args.ramp()?,
                mode: args.text_or("mode", "additive"),
            })
        }
        "apply_modulation" | "modulation" => {
            let waveform = match args.params.get("waveform") {
                Some(ParamValue::Text(s)) => s.clone(),
                Some(ParamValue::Number(v)) => v.to_string(),
                None => return Err(args.missing("waveform")),
            };
            Operation::Modulation(Modulation {
                axis,
                start_ms,
                duration_ms: args.required_number("duration_ms")?,
                waveform,
                frequency: args.required_number("frequency")?,
                amplitude: args.required_number("amplitude")?,
                offset: args.number("offset")?.unwrap_or(0.0),
                phase: args.number("phase")?.unwrap_or(0.0),
                ramp: args.ramp()?,
                mode: args.text_or("mode", "additive"),
            })
        }
        other => Operation::Unknown {
            operation: other.to_string(),
            axis,
        },
    };
    Ok(op)
}

/// Merge defaults with overrides, substitute tokens and build typed operations.
pub fn resolve_event(
    event: &EventRecord,
    definitions: &BTreeMap<String, EventDefinition>,
) -> ForgeResult<ResolvedEvent> {
    let definition = definitions.get(&event.name).ok_or_else(|| {
        ForgeError::undefined_reference(format!(
            "event '{}' at {} ms is not defined",
            event.name, event.time
        ))
    })?;
    if !event.time.is_finite() {
        return Err(ForgeError::invalid_parameter(format!(
            "event '{}' has a non-finite time",
            event.name
        )));
    }

    let mut merged = definition.default_params.clone();
    merged.extend(event.params.iter().map(|(k, v)| (k.clone(), v.clone())));

    let operations = definition
        .steps
        .iter()
        .map(|step| {
            let offset = match step.start_offset.resolve(&merged)? {
                ParamValue::Number(v) => v,
                ParamValue::Text(s) => {
                    return Err(ForgeError::invalid_parameter(format!(
                        "event '{}': start offset must be a number (got '{s}')",
                        event.name
                    )));
                }
            };
            let params = step
                .params
                .iter()
                .map(|(k, p)| Ok((k.clone(), p.resolve(&merged)?)))
                .collect::<ForgeResult<BTreeMap<_, _>>>()
                .map_err(|e| match e {
                    ForgeError::UndefinedReference(msg) => ForgeError::undefined_reference(
                        format!("event '{}': {msg}", event.name),
                    ),
                    other => other,
                })?;
            let args = StepArgs {
                event: &event.name,
                params,
            };
            build_operation(step, event.time + offset, &args)
        })
        .collect::<ForgeResult<Vec<_>>>()?;

    Ok(ResolvedEvent {
        time_ms: event.time,
        name: event.name.clone(),
        operations,
    })
}

/// Resolve every event of a file, ordered by trigger time (stable).
pub fn resolve_events(
    file: &EventFile,
    definitions: &BTreeMap<String, EventDefinition>,
) -> ForgeResult<Vec<ResolvedEvent>> {
    let mut resolved = file
        .events
        .iter()
        .map(|e| resolve_event(e, definitions))
        .collect::<ForgeResult<Vec<_>>>()?;
    resolved.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));
    Ok(resolved)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/params.rs"]
mod tests;
