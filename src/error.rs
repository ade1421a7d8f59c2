//! Error handling utilities shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result type used throughout the crate.
pub type Result<T, E = NgramError> = std::result::Result<T, E>;

/// Domain-specific error describing failures during configuration, IO, parsing, or estimation.
#[derive(Debug, Error)]
pub enum NgramError {
    /// Counting or model configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Filesystem IO error with optional context path.
    #[error("io error while processing {path:?}: {source}")]
    Io {
        /// Underlying IO error returned by the standard library.
        source: std::io::Error,
        /// Target path associated with the IO failure if available.
        path: Option<PathBuf>,
    },
    /// A counts file line could not be interpreted.
    #[error("parse error in {path:?} at line {line}: {message}")]
    Parse {
        /// File being parsed, if the input came from disk.
        path: Option<PathBuf>,
        /// One-based line number of the offending line.
        line: usize,
        /// Human readable description of the problem.
        message: String,
    },
    /// Smoothing referenced a context that is absent from the lower-order table.
    #[error("context `{context}` of n-gram `{ngram}` is missing from the lower-order table")]
    MissingContext {
        /// N-gram whose probability was being estimated.
        ngram: String,
        /// Expected (n-1)-gram context.
        context: String,
    },
    /// Adding occurrences would overflow a count or a table total.
    #[error("count of `{ngram}` or its table total exceeds {}", u64::MAX)]
    CountOverflow {
        /// N-gram being added when the overflow was detected.
        ngram: String,
    },
    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Catch-all variant for invariants that should not occur.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for NgramError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl NgramError {
    /// Helper constructor that attaches an optional path when wrapping IO errors.
    pub fn io(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { source, path }
    }
}
