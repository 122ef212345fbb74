//! Command-line argument definitions using clap

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use super::config::PipelineConfig;
use crate::logging::LogFormat;
use crate::pipeline::RetryPolicy;

/// Default input location, matching the deployment's data volume layout
pub const DEFAULT_INPUT: &str = "data/customer_churn_large_dataset.xlsx";

/// Churn ETL - flag high-risk churn customers from a customer dataset
#[derive(Parser, Debug)]
#[command(name = "churn-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input file path (CSV, XLSX or XLS)
    #[arg(short, long, env = "CHURN_ETL_INPUT", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Data directory. Intermediates go under `<data-dir>/tmp`,
    /// dated outputs under `<data-dir>/processed`.
    #[arg(long, env = "CHURN_ETL_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Times a stage is re-invoked after a retryable failure (read/write errors)
    #[arg(long, env = "CHURN_ETL_RETRIES", default_value = "3")]
    pub retries: u32,

    /// Seconds to wait before each retry
    #[arg(long, env = "CHURN_ETL_RETRY_DELAY_SECS", default_value = "300")]
    pub retry_delay_secs: u64,

    /// Log output format (logs are written to stderr)
    #[arg(long, value_enum, env = "CHURN_ETL_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    /// Suppress banner, spinners and the summary table
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check an input file's format and required columns without writing anything
    Validate {
        /// Input file path (CSV, XLSX or XLS)
        input: PathBuf,
    },
}

impl Cli {
    /// Effective pipeline configuration for a full run
    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            input: self.input.clone(),
            data_dir: self.data_dir.clone(),
            retry: RetryPolicy::new(self.retries, Duration::from_secs(self.retry_delay_secs)),
        }
    }
}
