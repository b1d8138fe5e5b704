//! Directory Scanner: finds the input files for one run.

use std::path::{Path, PathBuf};

use super::error::SortError;

/// A discovered input file and the base name its outputs are named after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub base_name: String,
}

/// List regular files in `dir` whose name ends with `.<extension>`, sorted by name.
///
/// Directory listing order is filesystem-dependent; sorting makes the processing
/// order (and so marker timestamps) reproducible.
pub fn scan_input_dir(dir: &Path, extension: &str) -> Result<Vec<InputFile>, SortError> {
    if !dir.is_dir() {
        return Err(SortError::DirectoryNotFound(dir.to_path_buf()));
    }

    let suffix = format!(".{extension}");
    let entries = std::fs::read_dir(dir).map_err(|source| SortError::ScanFailed {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut inputs = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            tracing::warn!(name = ?entry.file_name(), "Skipping non UTF-8 file name");
            continue;
        };
        let Some(base_name) = name.strip_suffix(&suffix) else {
            continue;
        };
        if base_name.is_empty() {
            tracing::debug!(name, "Skipping file with an empty base name");
            continue;
        }

        let path = entry.path();
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "Skipping non-file entry");
            continue;
        }

        inputs.push(InputFile {
            path,
            base_name: base_name.to_string(),
        });
    }

    if inputs.is_empty() {
        return Err(SortError::NoInputFiles(dir.to_path_buf()));
    }

    inputs.sort_by(|a, b| a.base_name.cmp(&b.base_name));
    Ok(inputs)
}
