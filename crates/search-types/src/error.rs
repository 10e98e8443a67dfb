//! Error types for the search-types crate.
//!
//! Loading a result set or a settings file can fail in a handful of
//! well-defined ways; each one gets its own variant so callers can report
//! where the bad input came from.

use thiserror::Error;

/// Errors that can occur while loading result sets and settings
#[derive(Error, Debug)]
pub enum LoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A line (or the whole document) was not valid JSON
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// Valid JSON, but a result record must be a JSON object
    #[error("Expected a JSON object at line {line} in {file}, found {found}")]
    NotAnObject {
        file: String,
        line: usize,
        found: String,
    },

    /// Settings document did not match the expected shape
    #[error("Invalid settings in {file}: {reason}")]
    InvalidSettings { file: String, reason: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, LoadError>;
