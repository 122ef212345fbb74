//! Load stage: persist the dated high-risk output and summary, then clean up
//!
//! This is the only stage that deletes anything. The two final artifacts are
//! published together: if the summary cannot be written, the dated CSV is
//! removed again. Intermediates are removed only after both are on disk; a
//! failure before that point leaves them in place for inspection.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{info, warn};

use super::context::{RunContext, TIMESTAMP_FORMAT};
use super::error::{EtlError, Stage, StageError};
use super::io::{read_csv, write_bytes, write_csv};
use super::transform::Transformed;
use crate::report::RunSummary;

/// Result of deleting the intermediate artifacts
#[derive(Debug, Clone, Default)]
pub struct Cleanup {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// Output of the load stage
#[derive(Debug, Clone)]
pub struct Loaded {
    /// Dated CSV holding the high-risk subset
    pub final_path: PathBuf,
    /// Dated JSON holding the run summary
    pub summary_path: PathBuf,
    pub summary: RunSummary,
    /// Timestamp embedded in both output names
    pub timestamp: String,
    pub cleanup: Cleanup,
}

/// Dated location of the high-risk CSV
pub fn final_output_path(ctx: &RunContext, timestamp: &str) -> PathBuf {
    ctx.processed_dir
        .join(format!("high_risk_customers_{}_{}.csv", timestamp, ctx.tag()))
}

/// Dated location of the summary JSON
pub fn summary_output_path(ctx: &RunContext, timestamp: &str) -> PathBuf {
    ctx.processed_dir
        .join(format!("summary_{}_{}.json", timestamp, ctx.tag()))
}

/// Persist the transform stage's output using the current wall-clock time
pub fn load(ctx: &RunContext, transformed: &Transformed) -> Result<Loaded, StageError> {
    load_at(ctx, transformed, Local::now())
}

/// Persist the transform stage's output with a caller-supplied stage timestamp
pub fn load_at(
    ctx: &RunContext,
    transformed: &Transformed,
    now: DateTime<Local>,
) -> Result<Loaded, StageError> {
    let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
    let input_path = &transformed.path;
    info!(run_id = %ctx.run_id, input = %input_path.display(), "Starting data loading");

    let mut df = read_csv(input_path).map_err(|e| ctx.fail(Stage::Load, e))?;

    let summary = RunSummary::from_dataframe(&df)
        .map_err(|e| ctx.fail(Stage::Load, EtlError::read(input_path, e)))?;

    let final_path = final_output_path(ctx, &timestamp);
    let summary_path = summary_output_path(ctx, &timestamp);
    let json = serde_json::to_vec_pretty(&summary)
        .map_err(|e| ctx.fail(Stage::Load, EtlError::write(&summary_path, e)))?;

    write_csv(&mut df, &final_path).map_err(|e| ctx.fail(Stage::Load, e))?;
    if let Err(e) = write_bytes(&json, &summary_path) {
        discard_output(ctx, &final_path);
        return Err(ctx.fail(Stage::Load, e));
    }

    info!(
        run_id = %ctx.run_id,
        records = summary.total_records,
        path = %final_path.display(),
        "Successfully loaded records"
    );
    info!(run_id = %ctx.run_id, path = %summary_path.display(), "Summary statistics saved");

    let cleanup = remove_intermediates(
        ctx,
        &[input_path.as_path(), transformed.extracted_path.as_path()],
    );

    Ok(Loaded {
        final_path,
        summary_path,
        summary,
        timestamp,
        cleanup,
    })
}

/// Remove a final output whose companion artifact could not be written
fn discard_output(ctx: &RunContext, path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(
            run_id = %ctx.run_id,
            path = %path.display(),
            error = %e,
            "Failed to remove incomplete output"
        );
    }
}

/// Delete the given intermediates, then the run directory if it is now empty.
/// Failures are logged and reported, never raised.
fn remove_intermediates(ctx: &RunContext, paths: &[&Path]) -> Cleanup {
    let mut cleanup = Cleanup::default();

    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => cleanup.removed.push(path.to_path_buf()),
            Err(e) => {
                warn!(
                    run_id = %ctx.run_id,
                    path = %path.display(),
                    error = %e,
                    "Failed to remove intermediate artifact"
                );
                cleanup.failed.push(path.to_path_buf());
            }
        }
    }

    // Only succeeds when empty; leftovers stay for inspection
    let _ = fs::remove_dir(ctx.run_dir());

    info!(
        run_id = %ctx.run_id,
        removed = cleanup.removed.len(),
        failed = cleanup.failed.len(),
        "Cleaned up temporary files"
    );
    cleanup
}
