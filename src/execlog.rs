//! Execution log reading: the stream of observed action records.
//!
//! The build system writes one JSON action record per line. Lines are
//! processed in file order — the order actions completed in the build.

use std::{fs, io, path::Path};

// Trait must be in scope for `.lines()` on BufReader.
use io::BufRead;

use crate::model::ActionRecord;

/// Errors that can occur while reading an execution log.
#[derive(Debug, thiserror::Error)]
pub enum ExeclogError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A line that is not a well-formed action record. Reading fails fast
    /// here — a log with unparseable records is not partially explained.
    #[error("line {line}: malformed action record: {source}")]
    Malformed {
        line: usize,
        source: serde_json::Error,
    },
}

/// Reads all action records from a JSONL execution log.
///
/// Empty lines are skipped. Line numbers in errors are 1-based.
pub fn read_records(path: &Path) -> Result<Vec<ActionRecord>, ExeclogError> {
    let file = fs::File::open(path)?;
    let reader = io::BufReader::new(file);

    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| ExeclogError::Malformed {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}
