//! BatchSorter: orchestrates one sorting run.
//!
//! Scanner → (per file) Classifier → Marker Writer → Pruner, strictly
//! sequential. Only scan errors end a run early, and those end it as a
//! soft stop. Per-file failures are recorded in the report and the run moves
//! on to the next file.

use std::time::Instant;

use chrono::Utc;
use encoding_rs::Encoding;
use uuid::Uuid;

use super::classifier::classify_file;
use super::error::SortError;
use super::marker::write_marker;
use super::pruner::prune_if_empty;
use super::scanner::{scan_input_dir, InputFile};
use super::types::*;
use crate::config::SorterConfig;

/// Generate a new batch ID.
pub fn new_batch_id() -> String {
    Uuid::new_v4().to_string()
}

/// Runs sorting batches for one configuration.
pub struct BatchSorter {
    config: SorterConfig,
    encoding: &'static Encoding,
}

impl BatchSorter {
    /// Validate `config` and resolve its encoding once, up front.
    pub fn new(config: SorterConfig) -> Result<Self, SortError> {
        config.validate()?;
        let encoding = config.text_encoding()?;
        Ok(Self { config, encoding })
    }

    /// Run one batch over the source directory. Always finishes.
    pub fn run_once(&self) -> BatchResult {
        let batch_id = new_batch_id();
        let started_at = Utc::now();
        let start = Instant::now();
        let span = tracing::info_span!("sort_batch", batch_id = %batch_id);
        let _guard = span.enter();

        tracing::info!(
            source = %self.config.source_dir.display(),
            encoding = self.encoding.name(),
            "Sorting CSV records into accepted and rejected outputs"
        );

        let inputs = match scan_input_dir(&self.config.source_dir, &self.config.input_extension) {
            Ok(inputs) => inputs,
            Err(e) => {
                let reason = match &e {
                    SortError::DirectoryNotFound(_) => {
                        tracing::error!(error = %e, "Source directory missing, nothing to do");
                        SoftStop::DirectoryNotFound
                    }
                    SortError::NoInputFiles(_) => {
                        tracing::warn!(error = %e, "No input files, nothing to do");
                        SoftStop::NoInputFiles
                    }
                    _ => {
                        tracing::error!(error = %e, "Source directory scan failed, nothing to do");
                        SoftStop::ScanFailed
                    }
                };
                let mut result = BatchResult::soft_stopped(batch_id, started_at, reason);
                result.duration_ms = start.elapsed().as_millis() as u64;
                return result;
            }
        };

        if self.config.create_output_dirs {
            self.ensure_output_dirs();
        }

        let files: Vec<FileReport> = inputs.iter().map(|input| self.process_file(input)).collect();

        let result = BatchResult {
            batch_id,
            started_at,
            status: RunStatus::Completed,
            files,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            files = result.files_processed(),
            failed = result.files_failed(),
            duration_ms = result.duration_ms,
            "Sorting batch finished"
        );
        result
    }

    /// Classify, mark and prune a single input file.
    pub fn process_file(&self, input: &InputFile) -> FileReport {
        let targets = SortTargets::new(
            input.path.clone(),
            input.base_name.clone(),
            &self.config.accepted_dir,
            &self.config.rejected_dir,
        );
        tracing::info!(file = %input.path.display(), "Processing input file");

        let classified = classify_file(
            &targets.input,
            &targets.accepted.data,
            &targets.rejected.data,
            self.encoding,
        );

        let mut report = FileReport {
            input: targets.input.clone(),
            base_name: targets.base_name.clone(),
            outcome: FileOutcome::Success,
            stats: ClassifyStats::default(),
            accepted_marker: MarkerOutcome::Skipped,
            rejected_marker: MarkerOutcome::Skipped,
            accepted_prune: PruneOutcome::NotApplicable,
            rejected_prune: PruneOutcome::NotApplicable,
            error: None,
        };

        match classified {
            Ok(stats) => {
                tracing::info!(
                    file = %input.path.display(),
                    accepted = stats.accepted_records,
                    rejected = stats.rejected_records,
                    malformed = stats.malformed_records,
                    unclassified = stats.unclassified_records,
                    "Input file classified"
                );
                report.stats = stats;
                // Markers go down before the empty check, so a marker may
                // outlive a data file that is pruned just below.
                report.accepted_marker = write_marker(&targets.accepted.marker);
                report.rejected_marker = write_marker(&targets.rejected.marker);
            }
            Err(failure) => {
                tracing::error!(
                    file = %input.path.display(),
                    outcome = ?failure.outcome,
                    error = %failure.error,
                    "Reading or writing CSV failed, skipping rest of file"
                );
                report.outcome = failure.outcome;
                report.stats = failure.stats;
                report.error = Some(failure.error.to_string());
            }
        }

        report.accepted_prune =
            prune_if_empty(&targets.accepted.data, StreamKind::Accepted.as_str());
        report.rejected_prune =
            prune_if_empty(&targets.rejected.data, StreamKind::Rejected.as_str());
        report
    }

    fn ensure_output_dirs(&self) {
        for dir in [&self.config.accepted_dir, &self.config.rejected_dir] {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!(dir = %dir.display(), error = %e, "Could not create output directory");
            }
        }
    }
}
