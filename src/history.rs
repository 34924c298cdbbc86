//! History store: the last-seen record of every action, keyed by identity.
//!
//! One entry per identity, monotonically replaced: each processing of an
//! action reads the entry once and immediately overwrites it. The filesystem
//! layout shards entries by a hash prefix to bound directory fan-out:
//!
//! ```text
//! <root>/<first 2 hex chars of key>/<key>   # zstd-compressed JSON entry
//! ```
//!
//! where `key = hex(sha256(identity))`.

mod fs;
mod memory;

pub use fs::FsHistoryStore;
pub use memory::MemoryHistoryStore;

use std::io;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{identity::ActionIdentity, model::ActionRecord};

/// Errors that can occur while persisting a history entry.
///
/// Only the write path carries errors; see [`HistoryStore::get`] for why
/// reads cannot fail.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, HistoryError>;

/// The persisted form of an action record: the record plus when it became
/// the baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub record: ActionRecord,
    pub recorded_at: Timestamp,
}

impl HistoryEntry {
    /// Wraps a record as a new baseline, stamped now.
    #[must_use]
    pub fn new(record: ActionRecord) -> Self {
        Self {
            record,
            recorded_at: Timestamp::now(),
        }
    }
}

/// Key-value persistence of the most recent record per identity.
///
/// History is best-effort on the read side and required on the write side:
/// a missing or unreadable entry only costs one "no history" explanation,
/// but a failed write would silently poison every future run's baseline.
pub trait HistoryStore {
    /// Returns the stored entry for `identity`, or `None` when nothing
    /// usable is stored there.
    ///
    /// Never fails: a corrupt, truncated, or unreadable entry is reported
    /// as a warning diagnostic and treated as absent.
    fn get(&self, identity: &ActionIdentity) -> Option<HistoryEntry>;

    /// Durably overwrites the entry for `identity`, creating any missing
    /// storage locations. No retries — an I/O failure surfaces to the caller.
    fn put(&mut self, identity: &ActionIdentity, entry: &HistoryEntry) -> Result<()>;
}
