//! Types shared by the sorting pipeline steps.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════
// Output streams
// ═══════════════════════════════════════════

/// The two destinations a record can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// Key field starts with `A`.
    Accepted,
    /// Key field starts with `B`.
    Rejected,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Infix placed between the base name and the file extension.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Accepted => "ok",
            Self::Rejected => "ng",
        }
    }

    pub fn data_file_name(&self, base_name: &str) -> String {
        format!("{base_name}.{}.csv", self.tag())
    }

    pub fn marker_file_name(&self, base_name: &str) -> String {
        format!("{base_name}.{}.end", self.tag())
    }
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data file and completion marker for one stream of one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamPaths {
    pub data: PathBuf,
    pub marker: PathBuf,
}

impl StreamPaths {
    pub fn new(dir: &Path, kind: StreamKind, base_name: &str) -> Self {
        Self {
            data: dir.join(kind.data_file_name(base_name)),
            marker: dir.join(kind.marker_file_name(base_name)),
        }
    }
}

/// Every artifact path derived from one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortTargets {
    pub input: PathBuf,
    pub base_name: String,
    pub accepted: StreamPaths,
    pub rejected: StreamPaths,
}

impl SortTargets {
    pub fn new(input: PathBuf, base_name: String, accepted_dir: &Path, rejected_dir: &Path) -> Self {
        let accepted = StreamPaths::new(accepted_dir, StreamKind::Accepted, &base_name);
        let rejected = StreamPaths::new(rejected_dir, StreamKind::Rejected, &base_name);
        Self {
            input,
            base_name,
            accepted,
            rejected,
        }
    }
}

// ═══════════════════════════════════════════
// Per-step outcomes
// ═══════════════════════════════════════════

/// Counters gathered while classifying one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyStats {
    /// Lines read after the header.
    pub lines_read: u64,
    pub accepted_records: u64,
    pub rejected_records: u64,
    pub malformed_records: u64,
    pub unclassified_records: u64,
    /// At least one byte sequence could not be decoded and was replaced.
    pub had_decode_errors: bool,
}

impl ClassifyStats {
    pub fn received(&self, kind: StreamKind) -> bool {
        match kind {
            StreamKind::Accepted => self.accepted_records > 0,
            StreamKind::Rejected => self.rejected_records > 0,
        }
    }

    pub(crate) fn record_routed(&mut self, kind: StreamKind) {
        match kind {
            StreamKind::Accepted => self.accepted_records += 1,
            StreamKind::Rejected => self.rejected_records += 1,
        }
    }
}

/// How far one input file got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    /// Every line was read and both streams were flushed.
    Success,
    /// An I/O error stopped processing after the triad was open.
    Partial,
    /// The triad could not be opened; nothing was classified.
    Failed,
}

/// Result of a completion marker write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerOutcome {
    Created,
    AlreadyPresent,
    Failed,
    /// Classification did not complete, so no marker was attempted.
    Skipped,
}

/// Result of the empty-output check on one data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PruneOutcome {
    Deleted,
    DeleteFailed,
    /// Missing or non-empty; left alone.
    NotApplicable,
}

/// Everything that happened to one input file during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub base_name: String,
    pub outcome: FileOutcome,
    pub stats: ClassifyStats,
    pub accepted_marker: MarkerOutcome,
    pub rejected_marker: MarkerOutcome,
    pub accepted_prune: PruneOutcome,
    pub rejected_prune: PruneOutcome,
    pub error: Option<String>,
}

// ═══════════════════════════════════════════
// Batch result
// ═══════════════════════════════════════════

/// Why a run ended before classifying anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftStop {
    DirectoryNotFound,
    NoInputFiles,
    ScanFailed,
}

/// Terminal state of a run. Both variants mean "finished".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    SoftStopped { reason: SoftStop },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_id: String,
    pub started_at: DateTime<Utc>,
    pub status: RunStatus,
    pub files: Vec<FileReport>,
    pub duration_ms: u64,
}

impl BatchResult {
    pub fn soft_stopped(batch_id: String, started_at: DateTime<Utc>, reason: SoftStop) -> Self {
        Self {
            batch_id,
            started_at,
            status: RunStatus::SoftStopped { reason },
            files: Vec::new(),
            duration_ms: 0,
        }
    }

    /// The binary signal handed back to the trigger. A run never aborts.
    pub fn is_finished(&self) -> bool {
        matches!(
            self.status,
            RunStatus::Completed | RunStatus::SoftStopped { .. }
        )
    }

    pub fn files_processed(&self) -> usize {
        self.files.len()
    }

    pub fn files_failed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.outcome != FileOutcome::Success)
            .count()
    }

    pub fn report_for(&self, base_name: &str) -> Option<&FileReport> {
        self.files.iter().find(|f| f.base_name == base_name)
    }
}
