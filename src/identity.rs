//! Action identity: matching an action across separate build runs.
//!
//! Action records have no natural primary key. The identity is derived from
//! the target label plus a normalized form of the progress description, so
//! that the same logical action maps to the same identity on every run even
//! when incidental description details (an embedded file count) differ.
//!
//! Distinct actions hashing to the same storage key silently share one
//! history slot — an accepted accuracy limitation, not an error.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Separates the label from the normalized description inside an identity.
/// Not expected to occur in either field.
const DELIMITER: char = '|';

/// A stable key matching an action across separate build runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionIdentity(String);

impl ActionIdentity {
    /// Derive the identity for an action from its label and progress description.
    #[must_use]
    pub fn derive(label: &str, progress: &str) -> Self {
        Self(format!("{label}{DELIMITER}{}", normalize_progress(progress)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The history storage key: `hex(sha256(identity))`, 64 lowercase hex chars.
    /// The store shards entries on a prefix of this key.
    #[must_use]
    pub fn storage_key(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl fmt::Display for ActionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip the run-to-run noise from a progress description.
///
/// Recognizes exactly one noisy-suffix shape: `<verb> <primary-output> (<count...>`,
/// i.e. at least two words followed by a parenthesized suffix that opens with
/// a digit, as in `"Building foo/bar.jar (12 source files, 2 jars)"`.
/// Everything from the `(` onward is discarded. Any other description is used
/// verbatim — no general text similarity.
fn normalize_progress(progress: &str) -> &str {
    let Some(open) = progress.find(" (") else {
        if progress.contains('(') {
            tracing::debug!(progress, "unrecognized parenthesized description; identity may vary across runs");
        }
        return progress;
    };

    let prefix = &progress[..open];
    let suffix = &progress[open + 2..];
    if prefix.split_whitespace().count() >= 2 && suffix.starts_with(|c: char| c.is_ascii_digit()) {
        prefix.trim_end()
    } else {
        tracing::debug!(progress, "could not confidently strip description suffix; identity may vary across runs");
        progress
    }
}
