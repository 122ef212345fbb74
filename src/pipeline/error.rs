//! Error types for the ETL stages.
//!
//! `EtlError` is the tagged failure kind a stage can produce. `StageError`
//! wraps it with the run identifier and stage name so the runner (and the
//! operator reading the logs) can tell which run and which artifact failed.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Boxed source error from polars, calamine or the file system.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The four failure kinds a stage can report.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Input file extension is neither delimited text nor a spreadsheet.
    #[error("Unsupported input format '{extension}' for {}. Supported formats: csv, xlsx, xls, xlsm, ods", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// File is missing, corrupt or could not be parsed.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// Required columns are absent from the input.
    #[error("Missing required columns in {}: {missing:?}", .path.display())]
    SchemaValidation { path: PathBuf, missing: Vec<String> },

    /// Destination could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

impl EtlError {
    pub fn read(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        EtlError::Read {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        EtlError::Write {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Format and schema failures are deterministic; re-running cannot fix them.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EtlError::Read { .. } | EtlError::Write { .. })
    }

    /// Artifact path the failure relates to.
    pub fn path(&self) -> &PathBuf {
        match self {
            EtlError::UnsupportedFormat { path, .. }
            | EtlError::Read { path, .. }
            | EtlError::SchemaValidation { path, .. }
            | EtlError::Write { path, .. } => path,
        }
    }

    /// Short tag used in log fields.
    pub fn kind_name(&self) -> &'static str {
        match self {
            EtlError::UnsupportedFormat { .. } => "unsupported_format",
            EtlError::Read { .. } => "read_error",
            EtlError::SchemaValidation { .. } => "schema_validation_error",
            EtlError::Write { .. } => "write_error",
        }
    }
}

/// Pipeline stage names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Transform,
    Load,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extract => "extract",
            Stage::Transform => "transform",
            Stage::Load => "load",
        };
        write!(f, "{}", name)
    }
}

/// A stage failure with the context needed to identify the run.
#[derive(Debug, Error)]
#[error("[run {run_id}] {stage} stage failed: {kind}")]
pub struct StageError {
    pub run_id: String,
    pub stage: Stage,
    #[source]
    pub kind: EtlError,
}

impl StageError {
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
