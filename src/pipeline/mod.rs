//! Pipeline module - the extract, transform and load stages

pub mod context;
pub mod error;
pub mod extract;
pub mod io;
pub mod load;
pub mod missing;
pub mod runner;
pub mod schema;
pub mod spreadsheet;
pub mod transform;

pub use context::RunContext;
pub use error::{EtlError, Stage, StageError};
pub use extract::{extract, validate_input, Extracted, Validated};
pub use io::InputFormat;
pub use load::{load, load_at, Cleanup, Loaded};
pub use runner::{
    run_pipeline, run_pipeline_observed, NoProgress, PipelineRun, RetryPolicy, StageObserver,
};
pub use transform::{transform, HighRiskThresholds, Transformed};
