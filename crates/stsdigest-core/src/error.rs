//! Error types for stsdigest.
//!
//! Almost nothing in the compiler is fatal: missing reports, unparseable rows
//! and unmatched header clauses all degrade to absent data. The errors below
//! cover the document boundary only (writing the compiled JSON, or reading a
//! previously compiled one back).

use std::path::PathBuf;

/// Errors surfaced to callers of the compiler.
#[derive(thiserror::Error, Debug)]
pub enum DigestError {
    /// Filesystem access failed for a specific path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The compiled document could not be encoded or decoded.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A serialized outcome row mixes present and absent criterion fields.
    #[error("inconsistent outcome row for {test}: {reason}")]
    InconsistentRow { test: String, reason: &'static str },
}

impl DigestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for stsdigest operations.
pub type Result<T> = std::result::Result<T, DigestError>;
