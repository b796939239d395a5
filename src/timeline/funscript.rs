//! On-disk point-sequence documents.
//!
//! A persisted timeline is a JSON object with an `actions` array of `{at, pos}` records,
//! `at` in integer milliseconds and `pos` on a 0–100 scale. The in-memory [`Timeline`] uses
//! seconds and `[0, 1]`; conversion happens only here.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::error::{ForgeError, ForgeResult},
    timeline::model::Timeline,
};

/// File extension used for persisted timelines.
pub const FUNSCRIPT_EXT: &str = "funscript";

/// A single persisted record.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Action {
    /// Timestamp in milliseconds.
    pub at: f64,
    /// Position on the 0–100 scale.
    pub pos: f64,
}

#[derive(Debug, serde::Serialize)]
struct ActionOut {
    at: i64,
    pos: i64,
}

#[derive(Debug, serde::Deserialize)]
struct DocumentIn {
    actions: Vec<Action>,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

#[derive(Debug, serde::Serialize)]
struct DocumentOut<'a> {
    actions: Vec<ActionOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a serde_json::Value>,
}

/// A timeline together with the free-form metadata carried by its document.
#[derive(Clone, Debug, Default)]
pub struct Funscript {
    pub timeline: Timeline,
    pub metadata: Option<serde_json::Value>,
}

impl Funscript {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Parse a JSON document.
    pub fn from_json_str(s: &str) -> ForgeResult<Self> {
        let doc: DocumentIn = serde_json::from_str(s)?;
        let mut actions = doc.actions;
        // Authoring tools occasionally emit unsorted actions.
        actions.sort_by(|a, b| a.at.total_cmp(&b.at));

        let times = actions.iter().map(|a| a.at / 1000.0).collect();
        let positions = actions.iter().map(|a| a.pos / 100.0).collect();
        Ok(Self {
            timeline: Timeline::new(times, positions)?,
            metadata: doc.metadata,
        })
    }

    /// Serialize to a JSON document.
    pub fn to_json_string(&self) -> ForgeResult<String> {
        let actions = self
            .timeline
            .points()
            .map(|(t, y)| ActionOut {
                at: (t * 1000.0).round() as i64,
                pos: (y * 100.0).round().clamp(0.0, 100.0) as i64,
            })
            .collect();
        let doc = DocumentOut {
            actions,
            metadata: self.metadata.as_ref(),
        };
        Ok(serde_json::to_string(&doc)?)
    }

    pub fn from_path(path: &Path) -> ForgeResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read timeline '{}'", path.display()))?;
        Self::from_json_str(&s).map_err(|e| match e {
            ForgeError::Serde(msg) => {
                ForgeError::serde(format!("parse timeline '{}': {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn save_to_path(&self, path: &Path) -> ForgeResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        let json = self.to_json_string()?;
        std::fs::write(path, json)
            .with_context(|| format!("write timeline '{}'", path.display()))?;
        Ok(())
    }
}

/// Load only the timeline of a persisted document.
pub fn load_timeline(path: &Path) -> ForgeResult<Timeline> {
    Ok(Funscript::from_path(path)?.timeline)
}

/// Persist a timeline without metadata.
pub fn save_timeline(timeline: &Timeline, path: &Path) -> ForgeResult<()> {
    Funscript::new(timeline.clone()).save_to_path(path)
}

/// `<dir>/<base>.<axis>.funscript`
pub fn axis_file_path(dir: &Path, base: &str, axis: &str) -> PathBuf {
    dir.join(format!("{base}.{axis}.{FUNSCRIPT_EXT}"))
}

/// Axis suffix of `<base>.<axis>.funscript`, if `file_name` follows that convention.
pub fn axis_from_file_name(file_name: &str, base: &str) -> Option<String> {
    let rest = file_name.strip_prefix(base)?.strip_prefix('.')?;
    let axis = rest.strip_suffix(FUNSCRIPT_EXT)?.strip_suffix('.')?;
    if axis.is_empty() {
        None
    } else {
        Some(axis.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/funscript.rs"]
mod tests;
