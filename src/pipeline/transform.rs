//! Transform stage: deduplicate, impute and flag high-risk churn customers
//!
//! A customer is high-risk when they pay more than the median bill, use less
//! than the median data volume, and have been subscribed for under a year.
//! Medians are taken over the deduplicated, imputed dataset, so re-running the
//! filter on its own output is not a fixed point: the medians shift with the
//! smaller population.

use std::path::PathBuf;

use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use super::context::RunContext;
use super::error::{EtlError, Stage, StageError};
use super::extract::Extracted;
use super::io::{read_csv, write_csv};
use super::missing::{column_median, impute_with_median, Imputation};
use super::schema::{IMPUTED_COLUMNS, MONTHLY_BILL, SUBSCRIPTION_LENGTH_MONTHS, TOTAL_USAGE_GB};

/// Subscriptions shorter than this many months count toward high risk
pub const SUBSCRIPTION_MONTHS_THRESHOLD: f64 = 12.0;

/// Thresholds the high-risk rule was evaluated with
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HighRiskThresholds {
    /// Rows must have `Monthly_Bill` strictly above this
    pub monthly_bill_median: Option<f64>,
    /// Rows must have `Total_Usage_GB` strictly below this
    pub usage_gb_median: Option<f64>,
    /// Rows must have `Subscription_Length_Months` strictly below this
    pub subscription_months: f64,
}

impl HighRiskThresholds {
    /// Compute thresholds from the medians of a (cleaned) dataset
    pub fn from_medians(df: &DataFrame) -> PolarsResult<Self> {
        Ok(Self {
            monthly_bill_median: column_median(df, MONTHLY_BILL)?,
            usage_gb_median: column_median(df, TOTAL_USAGE_GB)?,
            subscription_months: SUBSCRIPTION_MONTHS_THRESHOLD,
        })
    }

    /// The rule as a boolean expression. Nulls and undefined medians evaluate to false.
    pub fn expr(&self) -> Expr {
        match (self.monthly_bill_median, self.usage_gb_median) {
            (Some(bill_median), Some(usage_median)) => col(MONTHLY_BILL)
                .cast(DataType::Float64)
                .gt(lit(bill_median))
                .and(col(TOTAL_USAGE_GB).cast(DataType::Float64).lt(lit(usage_median)))
                .and(
                    col(SUBSCRIPTION_LENGTH_MONTHS)
                        .cast(DataType::Float64)
                        .lt(lit(self.subscription_months)),
                )
                .fill_null(lit(false)),
            _ => lit(false),
        }
    }
}

/// Output of the transform stage, consumed by the load stage
#[derive(Debug, Clone)]
pub struct Transformed {
    /// Location of the high-risk intermediate artifact
    pub path: PathBuf,
    /// Location of the extract stage's artifact, deleted by the load stage
    pub extracted_path: PathBuf,
    pub input_rows: usize,
    pub deduplicated_rows: usize,
    /// Rows in the high-risk subset
    pub rows: usize,
    pub thresholds: HighRiskThresholds,
    pub imputations: Vec<Imputation>,
}

/// Drop exact duplicate rows, keeping the first occurrence in input order
pub fn deduplicate(df: DataFrame) -> PolarsResult<DataFrame> {
    df.lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()
}

/// Deduplicate then median-impute the numeric columns
pub fn clean(df: DataFrame) -> PolarsResult<(DataFrame, Vec<Imputation>)> {
    let mut df = deduplicate(df)?;
    let imputations = impute_with_median(&mut df, &IMPUTED_COLUMNS)?;
    Ok((df, imputations))
}

/// Select the high-risk rows of an already-cleaned dataset
pub fn filter_high_risk(df: &DataFrame) -> PolarsResult<(DataFrame, HighRiskThresholds)> {
    let thresholds = HighRiskThresholds::from_medians(df)?;
    let high_risk = df.clone().lazy().filter(thresholds.expr()).collect()?;
    Ok((high_risk, thresholds))
}

/// Clean the extracted rows and write the high-risk subset to the run's
/// transformed intermediate location. An empty subset is a valid result.
pub fn transform(ctx: &RunContext, extracted: &Extracted) -> Result<Transformed, StageError> {
    let input_path = &extracted.path;
    info!(run_id = %ctx.run_id, input = %input_path.display(), "Starting data transformation");

    let raw = read_csv(input_path).map_err(|e| ctx.fail(Stage::Transform, e))?;
    let input_rows = raw.height();

    let (cleaned, imputations) = clean(raw)
        .map_err(|e| ctx.fail(Stage::Transform, EtlError::read(input_path, e)))?;
    let deduplicated_rows = cleaned.height();

    for imputation in imputations.iter().filter(|i| i.filled > 0) {
        info!(
            run_id = %ctx.run_id,
            column = %imputation.column,
            filled = imputation.filled,
            median = ?imputation.median,
            "Imputed missing values"
        );
    }

    let (mut high_risk, thresholds) = filter_high_risk(&cleaned)
        .map_err(|e| ctx.fail(Stage::Transform, EtlError::read(input_path, e)))?;

    let path = ctx.transformed_artifact_path();
    write_csv(&mut high_risk, &path).map_err(|e| ctx.fail(Stage::Transform, e))?;

    info!(
        run_id = %ctx.run_id,
        input_rows,
        deduplicated_rows,
        high_risk = high_risk.height(),
        path = %path.display(),
        "Transformed data: records identified as high-risk"
    );

    Ok(Transformed {
        path,
        extracted_path: extracted.path.clone(),
        input_rows,
        deduplicated_rows,
        rows: high_risk.height(),
        thresholds,
        imputations,
    })
}
