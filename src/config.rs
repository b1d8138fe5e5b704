use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::pipeline::sorting::SortError;

/// Application-level constants
pub const APP_NAME: &str = "RecordSorter";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Encoding label used when the configuration does not name one.
pub const DEFAULT_ENCODING: &str = "Shift_JIS";

/// Get the application data directory
/// ~/RecordSorter/ on all platforms, or ./RecordSorter when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the JSON configuration file.
pub fn default_config_path() -> PathBuf {
    app_data_dir().join("config.json")
}

/// Log filter applied when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,record_sorter_lib=info"
}

/// Directory roles and text handling for one sorter deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterConfig {
    /// Directory scanned for input files.
    pub source_dir: PathBuf,
    /// Receives `<base>.ok.csv` and `<base>.ok.end`.
    pub accepted_dir: PathBuf,
    /// Receives `<base>.ng.csv` and `<base>.ng.end`.
    pub rejected_dir: PathBuf,
    /// WHATWG encoding label for both input and output files.
    pub encoding: String,
    /// Input file extension, without the leading dot.
    pub input_extension: String,
    /// Create missing output directories once a run has work to do.
    pub create_output_dirs: bool,
    /// When set, the binary runs on this interval instead of once.
    pub schedule_interval_secs: Option<u64>,
}

impl Default for SorterConfig {
    fn default() -> Self {
        let csv_root = app_data_dir().join("csv");
        Self {
            source_dir: csv_root.join("backup"),
            accepted_dir: csv_root.join("output").join("ok"),
            rejected_dir: csv_root.join("output").join("ng"),
            encoding: DEFAULT_ENCODING.to_string(),
            input_extension: "csv".to_string(),
            create_output_dirs: true,
            schedule_interval_secs: None,
        }
    }
}

impl SorterConfig {
    /// Build a config for the three directory roles with every other option defaulted.
    pub fn with_dirs(
        source_dir: impl Into<PathBuf>,
        accepted_dir: impl Into<PathBuf>,
        rejected_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            accepted_dir: accepted_dir.into(),
            rejected_dir: rejected_dir.into(),
            ..Self::default()
        }
    }

    /// Load a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SortError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Check options that cannot be expressed in the type.
    pub fn validate(&self) -> Result<(), SortError> {
        self.text_encoding()?;
        if self.input_extension.is_empty() || self.input_extension.starts_with('.') {
            return Err(SortError::Config(format!(
                "input_extension must be non-empty and given without a dot, got {:?}",
                self.input_extension
            )));
        }
        if self.schedule_interval_secs == Some(0) {
            return Err(SortError::Config(
                "schedule_interval_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the configured label. Line and field splitting work on ASCII bytes,
    /// so only ASCII-compatible encodings are accepted.
    pub fn text_encoding(&self) -> Result<&'static Encoding, SortError> {
        let encoding = Encoding::for_label(self.encoding.as_bytes())
            .ok_or_else(|| SortError::UnsupportedEncoding(self.encoding.clone()))?;
        if !encoding.is_ascii_compatible() {
            return Err(SortError::UnsupportedEncoding(self.encoding.clone()));
        }
        Ok(encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("RecordSorter"));
    }

    #[test]
    fn default_dirs_under_app_data() {
        let config = SorterConfig::default();
        let app = app_data_dir();
        assert!(config.source_dir.starts_with(&app));
        assert!(config.accepted_dir.ends_with("ok"));
        assert!(config.rejected_dir.ends_with("ng"));
    }

    #[test]
    fn default_encoding_is_shift_jis() {
        let config = SorterConfig::default();
        assert_eq!(config.text_encoding().unwrap(), encoding_rs::SHIFT_JIS);
    }

    #[test]
    fn unknown_encoding_rejected() {
        let config = SorterConfig {
            encoding: "klingon-8".into(),
            ..SorterConfig::default()
        };
        assert!(matches!(
            config.text_encoding(),
            Err(SortError::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn utf16_rejected_as_not_ascii_compatible() {
        let config = SorterConfig {
            encoding: "UTF-16LE".into(),
            ..SorterConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SortError::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn dotted_extension_rejected() {
        let config = SorterConfig {
            input_extension: ".csv".into(),
            ..SorterConfig::default()
        };
        assert!(matches!(config.validate(), Err(SortError::Config(_))));
    }

    #[test]
    fn zero_interval_rejected() {
        let config = SorterConfig {
            schedule_interval_secs: Some(0),
            ..SorterConfig::default()
        };
        assert!(matches!(config.validate(), Err(SortError::Config(_))));
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SorterConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, SorterConfig::default());
    }

    #[test]
    fn load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "source_dir": "/data/in", "accepted_dir": "/data/ok", "rejected_dir": "/data/ng" }"#,
        )
        .unwrap();

        let config = SorterConfig::load(&path).unwrap();
        assert_eq!(config.source_dir, PathBuf::from("/data/in"));
        assert_eq!(config.accepted_dir, PathBuf::from("/data/ok"));
        assert_eq!(config.rejected_dir, PathBuf::from("/data/ng"));
        assert_eq!(config.encoding, DEFAULT_ENCODING);
        assert_eq!(config.input_extension, "csv");
        assert!(config.create_output_dirs);
    }

    #[test]
    fn load_malformed_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(SorterConfig::load(&path), Err(SortError::Json(_))));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
