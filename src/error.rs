//! Error handling for csvprep.
//!
//! Every fallible library operation returns [`Result<T>`], whose error type is
//! [`PrepError`]. The variants follow the failure categories of the cleaning
//! run:
//!
//! | Variant          | Raised when                                             |
//! |------------------|---------------------------------------------------------|
//! | `FileNotFound`   | an input path does not exist or cannot be opened        |
//! | `Parse`          | a delimited file is empty or has ragged records         |
//! | `Schema`         | the rules file has no usable `FIELD` key column         |
//! | `Io`             | the prepared file cannot be created or written          |
//! | `DataProcessing` | the dataframe engine rejects an operation               |
//! | `Config`         | a separator or config file is invalid                   |
//!
//! ```
//! use csvprep::error::PrepError;
//!
//! fn describe(err: &PrepError) -> &'static str {
//!     match err {
//!         PrepError::FileNotFound(_) => "missing input",
//!         PrepError::Schema(_) => "bad rules file",
//!         _ => "other failure",
//!     }
//! }
//! ```
//!
//! The `ResultExt` trait adds a `.context()` method for wrapping any
//! convertible error with a message:
//!
//! ```no_run
//! use csvprep::error::ResultExt as _;
//!
//! fn read_settings() -> csvprep::error::Result<String> {
//!     std::fs::read_to_string("csvprep.json").context("Failed to read settings")
//! }
//! ```

use std::fmt;
use std::path::PathBuf;

/// Main error type for csvprep operations.
#[derive(Debug)]
pub enum PrepError {
    /// Input file missing or unreadable
    FileNotFound(PathBuf),

    /// Malformed delimited content
    Parse(String),

    /// Rules file lacks a valid `FIELD` key column
    Schema(String),

    /// I/O errors (output file creation, writes)
    Io(std::io::Error),

    /// Dataframe engine errors
    DataProcessing(String),

    /// Invalid separator or configuration file
    Config(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for PrepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound(path) => write!(f, "File not found: {}", path.display()),
            Self::Parse(msg) => write!(f, "Parse error: {msg}"),
            Self::Schema(msg) => write!(f, "Schema error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PrepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PrepError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<polars::error::PolarsError> for PrepError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<serde_json::Error> for PrepError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<csv::Error> for PrepError {
    fn from(err: csv::Error) -> Self {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(e) => Self::Io(e),
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => {
                let line = pos.map_or(0, |p| p.line());
                Self::Parse(format!(
                    "line {line}: expected {expected_len} fields, found {len}"
                ))
            }
            _ => Self::Parse(message),
        }
    }
}

/// Result type alias for csvprep operations.
pub type Result<T> = std::result::Result<T, PrepError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<PrepError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: PrepError = e.into();
            PrepError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: PrepError = e.into();
            PrepError::Other(format!("{}: {}", f(), err))
        })
    }
}
