//! Replay scripts: one JSON step per line.
//!
//! ```text
//! {"type":"load_map","file_id":42}
//! {"type":"events","events":[{"type":"wheel","dy":1.0}]}
//! {"type":"extract","program":"extractor","args":["--all"]}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use std::path::Path;

use serde::Deserialize;
use viewer::input::InputEvent;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Deliver one batch of host events, then tick once.
    Events { events: Vec<InputEvent> },
    /// Select the map whose mesh file has this id.
    LoadMap { file_id: u32 },
    /// Run an extractor and tick until it exits.
    Extract {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("script could not be read: {0}")]
    Io(#[from] std::io::Error),
    #[error("script line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and parse the script at `path`.
pub fn load(path: &Path) -> Result<Vec<ScriptStep>, ScriptError> {
    let text = std::fs::read_to_string(path)?;
    let steps = parse(&text)?;
    tracing::debug!(path = %path.display(), steps = steps.len(), "script loaded");
    Ok(steps)
}

pub fn parse(text: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(i, line)| serde_json::from_str(line).map_err(|source| ScriptError::Parse { line: i + 1, source }))
        .collect()
}
