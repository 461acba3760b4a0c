use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a cleaning run before any output is written.
///
/// Phrase drops are not represented here; they are counted in the
/// pipeline report instead.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("malformed token stream at line {line} (marker '{marker}'): {reason}")]
    MalformedStream {
        line: usize,
        marker: String,
        reason: String,
    },
    #[error("malformed row at line {line}: expected {expected} columns, found {found}")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown label '{label}' at line {line}")]
    UnknownLabel { line: usize, label: String },
    #[error("invalid phrase-start pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("failed to parse config {path}: {source}", path = path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to access {path}: {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("delimited format error in {path}: {source}", path = path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, CleanError>;

impl CleanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CleanError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        CleanError::Csv {
            path: path.into(),
            source,
        }
    }
}
