//! Effective pipeline configuration

use std::path::PathBuf;

use serde::Serialize;

use crate::pipeline::{RetryPolicy, RunContext};

/// Settings for one invocation of the pipeline
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub data_dir: PathBuf,
    pub retry: RetryPolicy,
}

impl PipelineConfig {
    /// Root for per-run intermediate directories
    pub fn tmp_dir(&self) -> PathBuf {
        self.data_dir.join("tmp")
    }

    /// Directory for dated outputs
    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }

    /// Start a new run with its own identifier
    pub fn new_run(&self) -> RunContext {
        RunContext::new(self.tmp_dir(), self.processed_dir())
    }
}
