//! Applies an event file to the channel files that share its base name.
//!
//! `<dir>/<base>.events.json` edits every `<dir>/<base>.<axis>.funscript` in place.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    effects::{
        engine::{Diagnostic, EffectsEngine, NormalizationTable},
        params::{DefinitionsDoc, EventFile, resolve_events},
    },
    foundation::error::{ForgeError, ForgeResult},
    timeline::funscript::{Funscript, axis_from_file_name},
};

pub const EVENTS_FILE_SUFFIX: &str = ".events.json";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventRunOptions {
    /// Percent of the volume range kept free above the volume peak; 0 disables.
    pub volume_headroom: f64,
    pub apply_to_linked: bool,
}

impl Default for EventRunOptions {
    fn default() -> Self {
        Self {
            volume_headroom: 10.0,
            apply_to_linked: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EventRunReport {
    pub message: String,
    pub events_applied: usize,
    pub modified_files: Vec<PathBuf>,
    pub backup: Option<PathBuf>,
    pub headroom_shift: Option<f64>,
    pub diagnostics: Vec<Diagnostic>,
}

/// `my_video` for `my_video.events.json`.
pub fn event_base_name(event_file: &Path) -> ForgeResult<String> {
    let name = event_file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            ForgeError::invalid_parameter(format!("bad event file path '{}'", event_file.display()))
        })?;
    match name.strip_suffix(EVENTS_FILE_SUFFIX) {
        Some(base) if !base.is_empty() => Ok(base.to_string()),
        _ => Err(ForgeError::invalid_parameter(format!(
            "event file must be named '<base>{EVENTS_FILE_SUFFIX}' (got '{name}')"
        ))),
    }
}

/// Axis name → path for every `<base>.<axis>.funscript` in `dir`.
pub fn discover_axis_files(dir: &Path, base: &str) -> ForgeResult<BTreeMap<String, PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read directory '{}'", dir.display()))?;
    let mut found = BTreeMap::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read directory '{}'", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(axis) = entry
            .file_name()
            .to_str()
            .and_then(|name| axis_from_file_name(name, base))
        else {
            continue;
        };
        found.insert(axis, path);
    }
    if found.is_empty() {
        return Err(ForgeError::insufficient_data(format!(
            "no channel files for '{base}' in '{}'",
            dir.display()
        )));
    }
    Ok(found)
}

fn normalization_table(defs: &DefinitionsDoc) -> NormalizationTable {
    match &defs.normalization {
        Some(entries) => {
            NormalizationTable::from_pairs(entries.iter().map(|(k, e)| (k.clone(), e.max)))
        }
        None => NormalizationTable::default(),
    }
}

/// Load, back up, edit and save the channel files addressed by `event_file`.
///
/// Nothing is written when the event file fails to resolve. The backup, when a snapshot
/// service is given, holds the untouched channel files and the event file itself.
#[tracing::instrument(skip(definitions, snapshot), fields(event_file = %event_file.display()))]
pub fn run_events(
    event_file: &Path,
    definitions: &DefinitionsDoc,
    opts: &EventRunOptions,
    snapshot: Option<&dyn super::snapshot::Snapshot>,
) -> ForgeResult<EventRunReport> {
    let base = event_base_name(event_file)?;
    let dir = event_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let paths = discover_axis_files(dir, &base)?;
    let mut metadata = BTreeMap::new();
    let mut axes = BTreeMap::new();
    for (axis, path) in &paths {
        let doc = Funscript::from_path(path)?;
        metadata.insert(axis.clone(), doc.metadata);
        axes.insert(axis.clone(), doc.timeline);
    }
    tracing::debug!(axes = axes.len(), "loaded channel files");

    let events = resolve_events(&EventFile::from_path(event_file)?, &definitions.definitions)?;

    let mut engine = EffectsEngine::new(axes)
        .with_normalization(normalization_table(definitions))
        .with_apply_to_linked(opts.apply_to_linked);
    let headroom_shift = engine.apply_volume_headroom(opts.volume_headroom);

    let backup = match snapshot {
        Some(s) => {
            let mut files: Vec<PathBuf> = paths.values().cloned().collect();
            files.push(event_file.to_path_buf());
            Some(s.snapshot(&files)?)
        }
        None => None,
    };

    engine.apply_events(&events);
    for (axis, report) in engine.validation_report() {
        if !report.in_bounds() {
            tracing::warn!(axis = %axis, min = report.min, max = report.max, "axis out of bounds");
        }
    }
    let diagnostics = engine.diagnostics().to_vec();

    let mut modified_files = Vec::with_capacity(paths.len());
    for (axis, timeline) in engine.into_axes() {
        let Some(path) = paths.get(&axis) else {
            continue;
        };
        let doc = Funscript {
            timeline,
            metadata: metadata.remove(&axis).flatten(),
        };
        doc.save_to_path(path)?;
        modified_files.push(path.clone());
    }

    let mut message = format!(
        "Applied {} events to {} files.",
        events.len(),
        modified_files.len()
    );
    if let Some(dir) = backup.as_ref().and_then(|b| b.file_name()) {
        message.push_str(&format!(" Backup created at {}.", dir.to_string_lossy()));
    }
    tracing::info!("{message}");

    Ok(EventRunReport {
        message,
        events_applied: events.len(),
        modified_files,
        backup,
        headroom_shift,
        diagnostics,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/events.rs"]
mod tests;
