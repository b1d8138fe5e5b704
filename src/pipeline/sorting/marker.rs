//! Completion Marker Writer.
//!
//! A marker is a zero-length `.end` file telling downstream consumers that the
//! matching data file is final. Marker failures never stop a run.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use super::error::SortError;
use super::types::MarkerOutcome;

/// Create `path` as an empty file unless something already exists there.
pub fn create_marker(path: &Path) -> Result<MarkerOutcome, SortError> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => Ok(MarkerOutcome::Created),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(MarkerOutcome::AlreadyPresent),
        Err(source) => Err(SortError::MarkerCreation {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// [`create_marker`] with the outcome logged instead of returned as an error.
pub fn write_marker(path: &Path) -> MarkerOutcome {
    match create_marker(path) {
        Ok(MarkerOutcome::Created) => {
            tracing::info!(path = %path.display(), "Completion marker created");
            MarkerOutcome::Created
        }
        Ok(outcome) => {
            tracing::debug!(path = %path.display(), "Completion marker already present");
            outcome
        }
        Err(e) => {
            tracing::error!(error = %e, "Completion marker creation failed");
            MarkerOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_empty_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ok.end");

        assert_eq!(write_marker(&path), MarkerOutcome::Created);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn existing_marker_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ok.end");
        std::fs::write(&path, "keep").unwrap();

        assert_eq!(write_marker(&path), MarkerOutcome::AlreadyPresent);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep");
    }

    #[test]
    fn missing_parent_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("a.ok.end");

        assert!(matches!(
            create_marker(&path),
            Err(SortError::MarkerCreation { .. })
        ));
        assert_eq!(write_marker(&path), MarkerOutcome::Failed);
        assert!(!path.exists());
    }
}
