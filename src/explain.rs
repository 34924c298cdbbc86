//! The diff engine: why did this action run again?
//!
//! Each observed action is matched against the history store by derived
//! identity, its input and output sets are reconciled against the previous
//! run by path and digest, and the observed record becomes the new baseline.
//! Pure computation in, [`ActionDiff`] out — rendering lives elsewhere.

use std::collections::{HashMap, HashSet};

use crate::{
    history::{HistoryEntry, HistoryError, HistoryStore},
    identity::ActionIdentity,
    model::{ActionDiff, ActionRecord, FileChange, FileClassification, FileRecord},
};

/// Errors that can occur while explaining one action.
#[derive(Debug, thiserror::Error)]
pub enum ExplainError {
    /// The record carries no label, so no identity can be derived.
    /// No partial classification is attempted.
    #[error("action record has no label (progress: {progress:?})")]
    MissingLabel { progress: String },

    /// Persisting the new baseline failed. Fatal for this run of the
    /// feature: continuing would leave future runs with a misleading
    /// "no history" state.
    #[error("failed to persist history: {0}")]
    History(#[from] HistoryError),
}

/// Explains observed actions against a history store, one at a time.
///
/// Each `explain` call is a read-then-overwrite on the entry for the
/// action's identity; `&mut self` keeps the pair serialized, so a shared
/// explainer needs external locking (none is expected within a single run).
#[derive(Debug)]
pub struct Explainer<S> {
    store: S,
}

impl<S: HistoryStore> Explainer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Consumes the explainer, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Diff one observed action against its previous run and make it the
    /// new baseline.
    ///
    /// With no usable history the diff reports `has_history = false` with
    /// empty listings — "first time seen", not "everything changed". The
    /// record is persisted under its identity regardless, so the next run
    /// has a baseline.
    pub fn explain(&mut self, record: &ActionRecord) -> Result<ActionDiff, ExplainError> {
        if record.label.is_empty() {
            return Err(ExplainError::MissingLabel {
                progress: record.progress.clone(),
            });
        }

        let identity = ActionIdentity::derive(&record.label, &record.progress);
        let previous = self.store.get(&identity);

        let diff = match &previous {
            Some(prev) => {
                let inputs = classify(&record.inputs, &prev.record.inputs);
                let outputs = classify(&record.outputs, &prev.record.outputs);
                let suppressible = record.cache_hit && inputs.is_empty() && outputs.is_empty();
                ActionDiff {
                    identity: identity.clone(),
                    inputs,
                    outputs,
                    has_history: true,
                    suppressible,
                }
            }
            None => ActionDiff {
                identity: identity.clone(),
                inputs: Vec::new(),
                outputs: Vec::new(),
                has_history: false,
                suppressible: false,
            },
        };

        self.store
            .put(&identity, &HistoryEntry::new(record.clone()))?;

        Ok(diff)
    }
}

/// Three-way reconciliation of one file set against its previous run.
///
/// Paths are the unit of identity; digests decide change. The union of both
/// path sets partitions into unchanged (omitted), changed, removed, and
/// added — each path lands in exactly one bucket. Listing order is changed
/// entries in current-record order, then removed in previous-record order,
/// then added in current-record order: deterministic for a fixed input order.
fn classify(current: &[FileRecord], previous: &[FileRecord]) -> Vec<FileChange> {
    let previous_digests: HashMap<&str, &str> = previous
        .iter()
        .map(|f| (f.path.as_str(), f.digest.as_str()))
        .collect();
    let current_paths: HashSet<&str> = current.iter().map(|f| f.path.as_str()).collect();

    let mut changes = Vec::new();

    for file in current {
        if let Some(prev_digest) = previous_digests.get(file.path.as_str())
            && *prev_digest != file.digest
        {
            changes.push(FileChange::new(
                file.path.clone(),
                FileClassification::ChangedDigest,
            ));
        }
    }

    for file in previous {
        if !current_paths.contains(file.path.as_str()) {
            changes.push(FileChange::new(file.path.clone(), FileClassification::Removed));
        }
    }

    for file in current {
        if !previous_digests.contains_key(file.path.as_str()) {
            changes.push(FileChange::new(file.path.clone(), FileClassification::Added));
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::history::MemoryHistoryStore;

    fn file(path: &str, digest: &str) -> FileRecord {
        FileRecord::new(path, digest)
    }

    fn sample_record() -> ActionRecord {
        ActionRecord {
            label: "//foo:bar".into(),
            progress: "Building foo/bar.jar (12 source files)".into(),
            inputs: vec![file("foo/A.java", "d1"), file("foo/B.java", "d2")],
            outputs: vec![file("foo/bar.jar", "d9")],
            wall_time_seconds: 1.5,
            cache_hit: false,
        }
    }

    fn test_explainer() -> Explainer<MemoryHistoryStore> {
        Explainer::new(MemoryHistoryStore::new())
    }

    // ── classify ──

    #[test]
    fn equal_digests_are_omitted() {
        let prev = vec![file("a.txt", "d1")];
        let curr = vec![file("a.txt", "d1")];

        assert!(classify(&curr, &prev).is_empty());
    }

    #[test]
    fn worked_example_from_two_runs() {
        // previous {a:D1, b:D2}, current {a:D1, b:D3, c:D4}
        let prev = vec![file("a.txt", "D1"), file("b.txt", "D2")];
        let curr = vec![file("a.txt", "D1"), file("b.txt", "D3"), file("c.txt", "D4")];

        let changes = classify(&curr, &prev);

        assert_eq!(
            changes,
            vec![
                FileChange::new("b.txt", FileClassification::ChangedDigest),
                FileChange::new("c.txt", FileClassification::Added),
            ]
        );
        // a.txt is absent from the listing entirely.
        assert!(changes.iter().all(|c| c.path != "a.txt"));
    }

    #[test]
    fn removed_paths_are_listed() {
        let prev = vec![file("a.txt", "d1"), file("gone.txt", "d2")];
        let curr = vec![file("a.txt", "d1")];

        let changes = classify(&curr, &prev);
        assert_eq!(
            changes,
            vec![FileChange::new("gone.txt", FileClassification::Removed)]
        );
    }

    #[test]
    fn changed_then_removed_then_added_order() {
        let prev = vec![file("keep.txt", "d1"), file("mod.txt", "d2"), file("gone.txt", "d3")];
        let curr = vec![file("new.txt", "d4"), file("mod.txt", "d5"), file("keep.txt", "d1")];

        let changes = classify(&curr, &prev);

        assert_eq!(
            changes,
            vec![
                FileChange::new("mod.txt", FileClassification::ChangedDigest),
                FileChange::new("gone.txt", FileClassification::Removed),
                FileChange::new("new.txt", FileClassification::Added),
            ]
        );
    }

    #[test]
    fn union_is_partitioned_exactly_once() {
        let prev = vec![file("a", "1"), file("b", "2"), file("c", "3")];
        let curr = vec![file("b", "2"), file("c", "9"), file("d", "4")];

        let changes = classify(&curr, &prev);

        // c changed, a removed, d added; b unchanged and omitted.
        assert_eq!(changes.len(), 3);
        let mut paths: Vec<&str> = changes.iter().map(|c| c.path.as_str()).collect();
        paths.sort_unstable();
        assert_eq!(paths, vec!["a", "c", "d"]);
    }

    #[test]
    fn both_sets_empty_yield_no_changes() {
        assert!(classify(&[], &[]).is_empty());
    }

    // ── explain ──

    #[test]
    fn first_observation_has_no_history() {
        let mut explainer = test_explainer();

        let diff = explainer.explain(&sample_record()).unwrap();

        assert!(!diff.has_history);
        assert!(diff.inputs.is_empty());
        assert!(diff.outputs.is_empty());
        assert!(!diff.suppressible);
    }

    #[test]
    fn second_identical_observation_is_unchanged() {
        // Round-trip stability: explain, then explain the same record again.
        let mut explainer = test_explainer();

        explainer.explain(&sample_record()).unwrap();
        let diff = explainer.explain(&sample_record()).unwrap();

        assert!(diff.has_history);
        assert_eq!(diff.changed_input_count(), 0);
        assert_eq!(diff.changed_output_count(), 0);
    }

    #[test]
    fn explain_is_idempotent_over_storage() {
        let mut explainer = test_explainer();
        explainer.explain(&sample_record()).unwrap();
        explainer.explain(&sample_record()).unwrap();

        // A third call still sees a baseline identical to the record.
        let diff = explainer.explain(&sample_record()).unwrap();
        assert!(diff.has_history);
        assert_eq!(diff.changed_input_count(), 0);
    }

    #[test]
    fn changed_input_digest_is_reported() {
        let mut explainer = test_explainer();
        explainer.explain(&sample_record()).unwrap();

        let mut record = sample_record();
        record.inputs[1] = file("foo/B.java", "d2-changed");
        let diff = explainer.explain(&record).unwrap();

        assert_eq!(
            diff.inputs,
            vec![FileChange::new("foo/B.java", FileClassification::ChangedDigest)]
        );
        assert_eq!(diff.changed_input_count(), 1);
        assert_eq!(diff.changed_output_count(), 0);
    }

    #[test]
    fn inputs_and_outputs_reconcile_independently() {
        let mut explainer = test_explainer();
        explainer.explain(&sample_record()).unwrap();

        let mut record = sample_record();
        record.outputs = vec![file("foo/bar.jar", "d9-changed")];
        let diff = explainer.explain(&record).unwrap();

        assert!(diff.inputs.is_empty());
        assert_eq!(
            diff.outputs,
            vec![FileChange::new("foo/bar.jar", FileClassification::ChangedDigest)]
        );
    }

    #[test]
    fn varying_progress_counts_share_history() {
        // The normalized identity matches even though the description differs.
        let mut explainer = test_explainer();
        explainer.explain(&sample_record()).unwrap();

        let mut record = sample_record();
        record.progress = "Building foo/bar.jar (15 source files, 2 jars)".into();
        let diff = explainer.explain(&record).unwrap();

        assert!(diff.has_history);
    }

    #[test]
    fn different_labels_do_not_share_history() {
        let mut explainer = test_explainer();
        explainer.explain(&sample_record()).unwrap();

        let mut record = sample_record();
        record.label = "//foo:baz".into();
        let diff = explainer.explain(&record).unwrap();

        assert!(!diff.has_history);
    }

    #[test]
    fn unchanged_cache_hit_is_suppressible() {
        let mut explainer = test_explainer();
        explainer.explain(&sample_record()).unwrap();

        let mut record = sample_record();
        record.cache_hit = true;
        let diff = explainer.explain(&record).unwrap();

        assert!(diff.suppressible);
    }

    #[test]
    fn unchanged_non_cache_hit_is_not_suppressible() {
        let mut explainer = test_explainer();
        explainer.explain(&sample_record()).unwrap();

        let diff = explainer.explain(&sample_record()).unwrap();

        assert!(diff.has_history);
        assert!(!diff.suppressible);
    }

    #[test]
    fn changed_cache_hit_is_not_suppressible() {
        let mut explainer = test_explainer();
        explainer.explain(&sample_record()).unwrap();

        let mut record = sample_record();
        record.cache_hit = true;
        record.inputs[0] = file("foo/A.java", "d1-changed");
        let diff = explainer.explain(&record).unwrap();

        assert!(!diff.suppressible);
    }

    #[test]
    fn first_observation_is_never_suppressible() {
        let mut explainer = test_explainer();

        let mut record = sample_record();
        record.cache_hit = true;
        let diff = explainer.explain(&record).unwrap();

        assert!(!diff.has_history);
        assert!(!diff.suppressible);
    }

    #[test]
    fn missing_label_fails_fast() {
        let mut explainer = test_explainer();

        let mut record = sample_record();
        record.label = String::new();
        let err = explainer.explain(&record).unwrap_err();

        assert!(matches!(err, ExplainError::MissingLabel { .. }));
        // Nothing was persisted for the malformed record.
        assert!(explainer.into_store().is_empty());
    }

    #[test]
    fn history_survives_across_explainer_instances() {
        // Two explainers over one filesystem root stand in for two runs.
        use crate::history::FsHistoryStore;

        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().join("history");

        let mut first_run = Explainer::new(FsHistoryStore::new(&root));
        let diff = first_run.explain(&sample_record()).unwrap();
        assert!(!diff.has_history);

        let mut second_run = Explainer::new(FsHistoryStore::new(&root));
        let mut record = sample_record();
        record.inputs[0] = file("foo/A.java", "d1-changed");
        let diff = second_run.explain(&record).unwrap();

        assert!(diff.has_history);
        assert_eq!(
            diff.inputs,
            vec![FileChange::new("foo/A.java", FileClassification::ChangedDigest)]
        );
    }

    #[test]
    fn new_baseline_wins_after_a_change() {
        // After explaining a changed record, the change becomes the baseline:
        // re-explaining the changed record shows nothing new.
        let mut explainer = test_explainer();
        explainer.explain(&sample_record()).unwrap();

        let mut changed = sample_record();
        changed.inputs[0] = file("foo/A.java", "d1-changed");
        explainer.explain(&changed).unwrap();

        let diff = explainer.explain(&changed).unwrap();
        assert_eq!(diff.changed_input_count(), 0);
    }
}
