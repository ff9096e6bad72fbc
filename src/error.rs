//! Crate error type.
//!
//! Mirrors the disposition table in the design: malformed input and join
//! cardinality violations are the only fatal conditions. Missing external
//! files, unparsable scalars, and empty candidate sets are never
//! represented here because they are handled as normal (non-error) control
//! flow elsewhere in the pipeline.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("roster is missing required column(s): {0}")]
    MissingColumns(String),

    #[error("row {row} has non-UTF-8 or otherwise malformed field {field}")]
    MalformedInput { row: usize, field: &'static str },

    #[error("external table {table} at {path} has duplicate rows on join key {key:?} (expected many-to-one)")]
    JoinCardinalityViolation {
        table: &'static str,
        path: PathBuf,
        key: String,
    },

    #[error("failed to read external table {table} at {path}: {source}")]
    ExternalTableRead {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read roster csv: {0}")]
    RosterRead(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize json output: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
