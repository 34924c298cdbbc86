//! Observed records: what the build system tells us about one executed action.

use serde::{Deserialize, Serialize};

/// One declared input or one produced output of an action.
///
/// The digest is an opaque content hash as emitted by the build system.
/// Two files are "the same content" iff their digests are equal; path
/// equality alone says nothing about content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub path: String,
    pub digest: String,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            digest: digest.into(),
        }
    }
}

/// One executed build action as observed in the current run.
///
/// Immutable once constructed. Inputs and outputs are unordered sets
/// keyed by path — paths are unique within each collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    /// Stable label of the target this action belongs to (e.g. `//foo:bar`).
    pub label: String,

    /// Human-readable progress description (e.g. `"Building foo/bar.jar (12 source files)"`).
    /// May embed per-run noise such as file counts; identity derivation
    /// normalizes that away.
    pub progress: String,

    /// Declared inputs with content digests.
    pub inputs: Vec<FileRecord>,

    /// Actually produced outputs with content digests.
    pub outputs: Vec<FileRecord>,

    /// Wall-clock duration of the action in seconds.
    pub wall_time_seconds: f64,

    /// Whether the action was served from a remote cache.
    pub cache_hit: bool,
}
