//! CSV Record Sorting Pipeline
//!
//! Splits each CSV file in a source directory into an accepted and a rejected
//! output, keyed on the leading character of the third field.
//!
//! ## Flow
//! ```text
//! Scanner → (per file) Classifier → Marker Writer → Pruner
//! ```
//!
//! ## Artifacts per input `<base>.csv`
//! - `<accepted_dir>/<base>.ok.csv` and `<accepted_dir>/<base>.ok.end`
//! - `<rejected_dir>/<base>.ng.csv` and `<rejected_dir>/<base>.ng.end`
//!
//! Data files that end up empty are deleted; markers are written before that
//! check and are never deleted.

pub mod error;
pub mod types;
pub mod codec;
pub mod scanner;
pub mod classifier;
pub mod marker;
pub mod pruner;
pub mod runner;
pub mod background;

pub use error::SortError;
pub use types::*;
pub use scanner::{scan_input_dir, InputFile};
pub use classifier::{classify_file, classify_record, split_fields, ClassifyFailure};
pub use marker::{create_marker, write_marker};
pub use pruner::prune_if_empty;
pub use runner::{new_batch_id, BatchSorter};
pub use background::{start_background_scheduler, BatchSchedulerHandle};
