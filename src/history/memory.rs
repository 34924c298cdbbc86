//! In-memory history: a map keyed by storage key, for tests and embedding.

use std::collections::HashMap;

use crate::identity::ActionIdentity;

use super::{HistoryEntry, HistoryStore, Result};

/// Non-durable history store. Same overwrite-in-place semantics as the
/// filesystem store, minus the disk.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    entries: HashMap<String, HistoryEntry>,
}

impl MemoryHistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct identities with a stored entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn get(&self, identity: &ActionIdentity) -> Option<HistoryEntry> {
        self.entries.get(&identity.storage_key()).cloned()
    }

    fn put(&mut self, identity: &ActionIdentity, entry: &HistoryEntry) -> Result<()> {
        self.entries.insert(identity.storage_key(), entry.clone());
        Ok(())
    }
}
