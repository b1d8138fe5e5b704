//! Record Classifier: streams one input file into the accepted/rejected pair.
//!
//! The first line is a header and is never routed. Each following line is
//! split on `,` (no quoting) and routed on the prefix of its third field.
//! Lines are written back byte for byte as read, with the terminator
//! normalized to `\n`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;

use super::codec::{LegacyLineReader, RecordWriter};
use super::error::SortError;
use super::types::{ClassifyStats, FileOutcome, StreamKind};

pub const FIELD_DELIMITER: char = ',';
/// Zero-based index of the routing key.
pub const KEY_FIELD_INDEX: usize = 2;
pub const MIN_FIELDS: usize = KEY_FIELD_INDEX + 1;
pub const ACCEPTED_PREFIX: &str = "A";
pub const REJECTED_PREFIX: &str = "B";

/// Split a record on the delimiter, dropping trailing empty fields.
///
/// `a,b,` therefore has two fields, not three. A delimiter inside a value is
/// indistinguishable from a separator.
pub fn split_fields(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}

/// Decide which stream a record belongs to.
pub fn classify_record(line: &str) -> Result<StreamKind, SortError> {
    let fields = split_fields(line);
    if fields.len() < MIN_FIELDS {
        return Err(SortError::MalformedRecord {
            fields: fields.len(),
            min: MIN_FIELDS,
        });
    }

    let key = fields[KEY_FIELD_INDEX];
    if key.starts_with(ACCEPTED_PREFIX) {
        Ok(StreamKind::Accepted)
    } else if key.starts_with(REJECTED_PREFIX) {
        Ok(StreamKind::Rejected)
    } else {
        Err(SortError::UnclassifiedRecord(key.to_string()))
    }
}

/// Why classification of a file stopped early.
#[derive(Debug)]
pub struct ClassifyFailure {
    /// `Failed` if the triad never opened, `Partial` otherwise.
    pub outcome: FileOutcome,
    /// Counters up to the point of failure.
    pub stats: ClassifyStats,
    pub error: SortError,
}

/// Classify every record of `input` into `accepted` and `rejected`.
///
/// Both destinations are created (or truncated) before the first line is read.
/// All three handles are dropped before this returns, on every path.
pub fn classify_file(
    input: &Path,
    accepted: &Path,
    rejected: &Path,
    encoding: &'static Encoding,
) -> Result<ClassifyStats, ClassifyFailure> {
    let (mut reader, streams) =
        open_triad(input, accepted, rejected, encoding).map_err(|error| ClassifyFailure {
            outcome: FileOutcome::Failed,
            stats: ClassifyStats::default(),
            error,
        })?;

    let mut stats = ClassifyStats::default();
    match route_lines(input, &mut reader, streams, &mut stats) {
        Ok(()) => Ok(stats),
        Err(error) => Err(ClassifyFailure {
            outcome: FileOutcome::Partial,
            stats,
            error,
        }),
    }
}

type InputReader = LegacyLineReader<BufReader<File>>;

fn open_triad(
    input: &Path,
    accepted: &Path,
    rejected: &Path,
    encoding: &'static Encoding,
) -> Result<(InputReader, OutputStreams), SortError> {
    let file = File::open(input).map_err(|e| SortError::file_io(input, e))?;
    let reader = LegacyLineReader::new(BufReader::new(file), encoding);
    let accepted = OutputStream::create(accepted)?;
    let rejected = OutputStream::create(rejected)?;
    Ok((reader, OutputStreams { accepted, rejected }))
}

fn route_lines(
    input: &Path,
    reader: &mut InputReader,
    mut streams: OutputStreams,
    stats: &mut ClassifyStats,
) -> Result<(), SortError> {
    let read_err = |e| SortError::file_io(input, e);

    // Header
    if reader.read_line().map_err(read_err)?.is_none() {
        return streams.finish();
    }

    while let Some(line) = reader.read_line().map_err(read_err)? {
        stats.lines_read += 1;
        if line.had_errors && !stats.had_decode_errors {
            stats.had_decode_errors = true;
            tracing::warn!(
                file = %input.display(),
                line = stats.lines_read + 1,
                "Undecodable bytes replaced with U+FFFD"
            );
        }

        match classify_record(&line.text) {
            Ok(kind) => {
                streams.get_mut(kind).write_record(&line.raw)?;
                stats.record_routed(kind);
                tracing::debug!(stream = %kind, record = %line.text, "Record routed");
            }
            Err(e @ SortError::MalformedRecord { .. }) => {
                stats.malformed_records += 1;
                tracing::warn!(record = %line.text, error = %e, "Invalid record format");
            }
            Err(e) => {
                stats.unclassified_records += 1;
                tracing::debug!(record = %line.text, reason = %e, "Record dropped");
            }
        }
    }

    streams.finish()
}

struct OutputStream {
    path: PathBuf,
    writer: RecordWriter<File>,
}

impl OutputStream {
    fn create(path: &Path) -> Result<Self, SortError> {
        let file = File::create(path).map_err(|e| SortError::file_io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: RecordWriter::new(file),
        })
    }

    fn write_record(&mut self, raw: &[u8]) -> Result<(), SortError> {
        self.writer
            .write_record(raw)
            .map_err(|e| SortError::file_io(&self.path, e))
    }

    fn finish(self) -> Result<(), SortError> {
        let path = self.path;
        self.writer
            .finish()
            .map(drop)
            .map_err(|e| SortError::file_io(path, e))
    }
}

struct OutputStreams {
    accepted: OutputStream,
    rejected: OutputStream,
}

impl OutputStreams {
    fn get_mut(&mut self, kind: StreamKind) -> &mut OutputStream {
        match kind {
            StreamKind::Accepted => &mut self.accepted,
            StreamKind::Rejected => &mut self.rejected,
        }
    }

    fn finish(self) -> Result<(), SortError> {
        let rejected = self.rejected;
        self.accepted.finish()?;
        rejected.finish()
    }
}
