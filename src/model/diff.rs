//! Diff types: the structured result of comparing an action against history.

use serde::{Deserialize, Serialize};

use crate::identity::ActionIdentity;

/// Per-file verdict relative to the previous run.
///
/// Unchanged files are never listed individually — a path present in both
/// runs with an equal digest simply does not appear in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileClassification {
    /// Present in both runs with differing digests.
    ChangedDigest,

    /// Present only in the previous run.
    Removed,

    /// Present only in the current run.
    Added,
}

/// One changed file and how it changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub path: String,
    pub classification: FileClassification,
}

impl FileChange {
    pub fn new(path: impl Into<String>, classification: FileClassification) -> Self {
        Self {
            path: path.into(),
            classification,
        }
    }
}

/// The structured difference between an action and its previous run.
///
/// Produced fresh per action, never persisted. Change listings hold only
/// non-unchanged entries, ordered changed → removed → added; paths are
/// unique across each listing, so each is a mapping path → classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDiff {
    /// The identity the action was matched under.
    pub identity: ActionIdentity,

    /// Changed inputs. Empty when nothing changed or when there is no history.
    pub inputs: Vec<FileChange>,

    /// Changed outputs. Empty when nothing changed or when there is no history.
    pub outputs: Vec<FileChange>,

    /// Whether a previous record existed. When false, both listings are
    /// empty — "first time seen" is distinct from "everything changed".
    pub has_history: bool,

    /// True for a remote-cache hit with history and zero detected changes:
    /// noise the renderer may omit.
    pub suppressible: bool,
}

impl ActionDiff {
    /// Number of changed inputs (content-changed + added + removed).
    /// Zero iff the input listing is empty.
    #[must_use]
    pub fn changed_input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Number of changed outputs (content-changed + added + removed).
    /// Zero iff the output listing is empty.
    #[must_use]
    pub fn changed_output_count(&self) -> usize {
        self.outputs.len()
    }
}
