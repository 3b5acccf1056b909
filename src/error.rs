//! Error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::reader::ExtractError;

/// Errors surfaced by the extraction and checking pipelines.
#[derive(Debug, Error)]
pub enum Error {
    /// A file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A pipeline file is not valid YAML.
    #[error("unable to parse file {file}: {message}")]
    Parse { file: String, message: String },

    /// Two documents could not be merged into one tree.
    #[error("unable to merge {file}: {message}")]
    Merge { file: String, message: String },

    /// Script extraction aborted for a whole document.
    #[error("unable to extract scripts from {file}: {source}")]
    Extract {
        file: String,
        #[source]
        source: ExtractError,
    },

    /// Configuration file missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A file pattern is not a valid glob.
    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// The shellcheck process could not be run or failed.
    #[error("shellcheck failed: {0}")]
    Shellcheck(String),

    /// The shellcheck JSON report could not be decoded.
    #[error("unable to parse shellcheck report: {0}")]
    Report(#[from] serde_json::Error),

    /// Strict mode is on and no script was found.
    #[error("no scripts found in {0} file(s)")]
    NoScripts(usize),
}

impl Error {
    /// Wraps an [`std::io::Error`] with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
