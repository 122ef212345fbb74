//! Extract stage: read the raw input, validate its shape, stage it as CSV

use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use tracing::info;

use super::context::RunContext;
use super::error::{EtlError, Stage, StageError};
use super::io::{column_names, read_table, write_csv, InputFormat};
use super::schema::missing_required_columns;

/// Output of the extract stage, consumed by the transform stage
#[derive(Debug, Clone)]
pub struct Extracted {
    /// Location of the raw intermediate artifact
    pub path: PathBuf,
    /// Rows written (equal to the input row count)
    pub rows: usize,
    pub columns: Vec<String>,
}

/// Result of checking an input without staging it
#[derive(Debug, Clone)]
pub struct Validated {
    pub format: InputFormat,
    pub rows: usize,
    pub columns: Vec<String>,
}

/// Check format, readability and required columns of an input file.
///
/// Nothing is written.
pub fn validate_input(input: &Path) -> Result<Validated, EtlError> {
    read_validated(input).map(|(_, validated)| validated)
}

fn read_validated(input: &Path) -> Result<(DataFrame, Validated), EtlError> {
    let format = InputFormat::detect(input)?;
    let df = read_table(input)?;

    let missing = missing_required_columns(&df);
    if !missing.is_empty() {
        return Err(EtlError::SchemaValidation {
            path: input.to_path_buf(),
            missing,
        });
    }

    let validated = Validated {
        format,
        rows: df.height(),
        columns: column_names(&df),
    };
    Ok((df, validated))
}

/// Read `input`, validate required columns and write every row to the run's
/// raw intermediate location.
pub fn extract(ctx: &RunContext, input: &Path) -> Result<Extracted, StageError> {
    info!(run_id = %ctx.run_id, input = %input.display(), "Starting data extraction");

    let (mut df, validated) = read_validated(input).map_err(|e| ctx.fail(Stage::Extract, e))?;
    info!(
        run_id = %ctx.run_id,
        format = ?validated.format,
        rows = validated.rows,
        "Successfully read input"
    );

    let path = ctx.raw_artifact_path();
    write_csv(&mut df, &path).map_err(|e| ctx.fail(Stage::Extract, e))?;
    info!(run_id = %ctx.run_id, path = %path.display(), "Saved raw data");

    Ok(Extracted {
        path,
        rows: validated.rows,
        columns: validated.columns,
    })
}
