//! Filesystem-backed history: one compressed entry file per storage key.

use std::{fs, io, path::PathBuf};

use crate::identity::ActionIdentity;

use super::{HistoryEntry, HistoryStore, Result};

/// zstd level for entry files. Entries are small JSON documents; the default
/// level compresses them well without measurable cost.
const COMPRESSION_LEVEL: i32 = 3;

/// Durable history store rooted at a directory.
///
/// Entries live at `<root>/<2-hex shard>/<64-hex key>`. The root and shard
/// directories are created lazily on first write.
#[derive(Debug)]
pub struct FsHistoryStore {
    root: PathBuf,
}

impl FsHistoryStore {
    /// Creates a store rooted at the given directory. The directory itself
    /// is only created once an entry is written.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Shard directory and entry file name for an identity.
    fn locate(&self, identity: &ActionIdentity) -> (PathBuf, String) {
        let key = identity.storage_key();
        let shard = self.root.join(&key[..2]);
        (shard, key)
    }
}

impl HistoryStore for FsHistoryStore {
    fn get(&self, identity: &ActionIdentity) -> Option<HistoryEntry> {
        let (shard, key) = self.locate(identity);
        let path = shard.join(&key);

        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            // First observation of an action: expected, not a diagnostic.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable history entry; treating as no history");
                return None;
            }
        };

        let json = match zstd::decode_all(compressed.as_slice()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt history entry; treating as no history");
                return None;
            }
        };

        match serde_json::from_slice(&json) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "malformed history entry; treating as no history");
                None
            }
        }
    }

    fn put(&mut self, identity: &ActionIdentity, entry: &HistoryEntry) -> Result<()> {
        let (shard, key) = self.locate(identity);
        fs::create_dir_all(&shard)?;

        let json = serde_json::to_vec(entry)?;
        let compressed = zstd::encode_all(json.as_slice(), COMPRESSION_LEVEL)?;
        fs::write(shard.join(&key), compressed)?;
        Ok(())
    }
}
