//! Report rendering: one explanation line per action.
//!
//! Formatting only — classification happens in `explain`, and this module
//! can be swapped without touching it. The text format is:
//!
//! ```text
//! seconds num_inputs->num_outputs build action changed_inputs -> changed_outputs
//! ```
//!
//! Changed files are shown by basename: a bare name for a content change,
//! `-name` for a removed file, `+name` for a new one. A side with history
//! and no changes shows `[unchanged]`; a first-time action shows
//! `[no history]`. The `C` column marks remote-cache hits.

use crate::model::{ActionDiff, ActionRecord, FileChange, FileClassification};

/// Rendering knobs for the text format.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// After each summary line, list every change again with its full path.
    pub details: bool,
}

/// The report preamble describing the line format.
#[must_use]
pub fn header() -> String {
    "This file lists the build actions executed using the following format:\n\
     seconds num_inputs->num_outputs build action changed_inputs -> changed_outputs\n"
        .to_string()
}

/// Renders one explained action as text. Multi-line when `details` is set;
/// no trailing newline either way.
#[must_use]
pub fn render(record: &ActionRecord, diff: &ActionDiff, options: RenderOptions) -> String {
    let mut line = format!(
        "{:7.2} {}{:5}->{:4} {}",
        record.wall_time_seconds,
        if record.cache_hit { 'C' } else { ' ' },
        record.inputs.len(),
        record.outputs.len(),
        record.progress,
    );

    if diff.has_history {
        render_side(&mut line, &diff.inputs);
        line.push_str(" ->");
        render_side(&mut line, &diff.outputs);
    } else {
        line.push_str(" [no history]");
    }

    if options.details && diff.has_history {
        for change in diff.inputs.iter().chain(&diff.outputs) {
            line.push('\n');
            line.push_str(&detail_line(change));
        }
    }

    line
}

/// Renders one diff as a JSON line, for machine consumers.
pub fn render_json(diff: &ActionDiff) -> serde_json::Result<String> {
    serde_json::to_string(diff)
}

/// Appends the markers for one side of the diff, or the unchanged fallback.
fn render_side(line: &mut String, changes: &[FileChange]) {
    if changes.is_empty() {
        line.push_str(" [unchanged]");
        return;
    }
    for change in changes {
        line.push(' ');
        line.push_str(&marker(change));
    }
}

/// The compact per-file marker: basename, prefixed for removed/added.
fn marker(change: &FileChange) -> String {
    let name = basename(&change.path);
    match change.classification {
        FileClassification::ChangedDigest => name.to_string(),
        FileClassification::Removed => format!("-{name}"),
        FileClassification::Added => format!("+{name}"),
    }
}

/// The indented full-path detail line for one change.
fn detail_line(change: &FileChange) -> String {
    match change.classification {
        FileClassification::ChangedDigest => format!("    {}", change.path),
        FileClassification::Removed => format!("    - {}", change.path),
        FileClassification::Added => format!("    + {}", change.path),
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
