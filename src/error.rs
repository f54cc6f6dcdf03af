//! Error types shared by every helper.

use rhai::EvalAltResult;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, UtilError>;

/// Errors raised by the structured-data helpers.
///
/// Missing nested paths are never errors; they resolve to a default value
/// (reads) or to a no-op (deletes).
#[derive(Error, Debug)]
pub enum UtilError {
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("unreadable source '{}': {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("unwritable destination '{}': {reason}", path.display())]
    Unwritable { path: PathBuf, reason: String },

    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config in {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl UtilError {
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn xml(err: impl std::fmt::Display) -> Self {
        Self::Xml(err.to_string())
    }
}

/// Convert a helper error into a Rhai runtime error.
///
/// Used at the script boundary so `?`-style propagation surfaces as a thrown
/// error inside the calling script.
pub fn script_error(err: UtilError) -> Box<EvalAltResult> {
    err.to_string().into()
}
