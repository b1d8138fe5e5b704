//! Empty-Output Pruner: removes data files that received no records.

use std::path::Path;

use super::error::SortError;
use super::types::PruneOutcome;

/// Delete `path` if it exists and is zero bytes long.
///
/// `label` names the stream in log lines. Deletion failure is logged and
/// reported as [`PruneOutcome::DeleteFailed`].
pub fn prune_if_empty(path: &Path, label: &str) -> PruneOutcome {
    let is_empty = std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.len() == 0)
        .unwrap_or(false);

    if !is_empty {
        tracing::debug!(
            stream = label,
            path = %path.display(),
            "Output missing or non-empty, nothing to prune"
        );
        return PruneOutcome::NotApplicable;
    }

    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(stream = label, path = %path.display(), "Deleted empty output");
            PruneOutcome::Deleted
        }
        Err(source) => {
            let err = SortError::Prune {
                path: path.to_path_buf(),
                source,
            };
            tracing::warn!(stream = label, error = %err, "Empty output could not be deleted");
            PruneOutcome::DeleteFailed
        }
    }
}
