//! Run-scoped context threaded through every stage
//!
//! Each run gets its own identifier and its own intermediate directory so two
//! runs scheduled at the same moment never read or delete each other's files.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::error;
use uuid::Uuid;

use super::error::{EtlError, Stage, StageError};

/// File name of the extractor's intermediate artifact
pub const RAW_ARTIFACT: &str = "raw_customer_data.csv";

/// File name of the transformer's intermediate artifact
pub const TRANSFORMED_ARTIFACT: &str = "transformed_customer_data.csv";

/// Timestamp format used in run identifiers and dated output names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Identity and storage locations of one pipeline run
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Unique run identifier: `<timestamp>_<8 hex chars>`
    pub run_id: String,
    /// Wall-clock time the run was created
    pub started_at: DateTime<Local>,
    /// Root for intermediate artifacts; each run writes under `<tmp_dir>/<run_id>`
    pub tmp_dir: PathBuf,
    /// Directory for dated final outputs
    pub processed_dir: PathBuf,
}

impl RunContext {
    /// Create a context with a fresh run identifier
    pub fn new(tmp_dir: impl Into<PathBuf>, processed_dir: impl Into<PathBuf>) -> Self {
        let started_at = Local::now();
        let suffix = Uuid::new_v4().simple().to_string();
        let run_id = format!("{}_{}", started_at.format(TIMESTAMP_FORMAT), &suffix[..8]);

        Self {
            run_id,
            started_at,
            tmp_dir: tmp_dir.into(),
            processed_dir: processed_dir.into(),
        }
    }

    /// Create a context rooted at a data directory (`<data_dir>/tmp`, `<data_dir>/processed`)
    pub fn under(data_dir: &Path) -> Self {
        Self::new(data_dir.join("tmp"), data_dir.join("processed"))
    }

    /// Directory holding this run's intermediates
    pub fn run_dir(&self) -> PathBuf {
        self.tmp_dir.join(&self.run_id)
    }

    /// Location of the extractor's artifact for this run
    pub fn raw_artifact_path(&self) -> PathBuf {
        self.run_dir().join(RAW_ARTIFACT)
    }

    /// Location of the transformer's artifact for this run
    pub fn transformed_artifact_path(&self) -> PathBuf {
        self.run_dir().join(TRANSFORMED_ARTIFACT)
    }

    /// Short tag appended to final output names
    pub fn tag(&self) -> &str {
        self.run_id.rsplit('_').next().unwrap_or(&self.run_id)
    }

    /// Attach run and stage context to a failure and log it
    pub fn fail(&self, stage: Stage, kind: EtlError) -> StageError {
        error!(
            run_id = %self.run_id,
            stage = %stage,
            kind = kind.kind_name(),
            path = %kind.path().display(),
            "{}",
            kind
        );
        StageError {
            run_id: self.run_id.clone(),
            stage,
            kind,
        }
    }
}
