//! Run summary statistics and terminal display

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::pipeline::missing::column_as_f64;
use crate::pipeline::schema::{MONTHLY_BILL, SUBSCRIPTION_LENGTH_MONTHS, TOTAL_USAGE_GB};

/// Aggregate statistics over the high-risk subset of one run.
///
/// An empty subset yields `total_records: 0` and `null` averages; a column
/// with no non-null values also yields a `null` average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_records: u64,
    pub average_monthly_bill: Option<f64>,
    pub average_usage_gb: Option<f64>,
    pub average_subscription_length: Option<f64>,
}

impl RunSummary {
    /// Compute the summary from the persisted high-risk rows
    pub fn from_dataframe(df: &DataFrame) -> PolarsResult<Self> {
        Ok(Self {
            total_records: df.height() as u64,
            average_monthly_bill: column_mean(df, MONTHLY_BILL)?,
            average_usage_gb: column_mean(df, TOTAL_USAGE_GB)?,
            average_subscription_length: column_mean(df, SUBSCRIPTION_LENGTH_MONTHS)?,
        })
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("RUN SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("🚩 High-risk customers"),
            Cell::new(self.total_records)
                .fg(if self.total_records == 0 {
                    Color::White
                } else {
                    Color::Red
                })
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("💳 Avg monthly bill"),
            average_cell(self.average_monthly_bill, 2),
        ]);
        table.add_row(vec![
            Cell::new("📶 Avg usage (GB)"),
            average_cell(self.average_usage_gb, 1),
        ]);
        table.add_row(vec![
            Cell::new("📅 Avg subscription (months)"),
            average_cell(self.average_subscription_length, 1),
        ]);

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }
    }
}

fn average_cell(value: Option<f64>, precision: usize) -> Cell {
    match value {
        Some(v) => Cell::new(format!("{:.*}", precision, v)).fg(Color::Cyan),
        None => Cell::new("n/a").fg(Color::DarkGrey),
    }
}

/// Mean of a column's non-null values
fn column_mean(df: &DataFrame, name: &str) -> PolarsResult<Option<f64>> {
    let values: Vec<f64> = column_as_f64(df, name)?.into_iter().flatten().collect();
    if values.is_empty() {
        return Ok(None);
    }
    Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
}
