//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use churn_etl::pipeline::io::read_csv;
use churn_etl::pipeline::RunContext;

/// Ten distinct customers where `Monthly_Bill` has median 70 and
/// `Total_Usage_GB` has median 500. Exactly customers 1 and 2
/// (bill 90, usage 200, 3 months) are high-risk.
pub fn create_churn_dataframe() -> DataFrame {
    df! {
        "CustomerID" => [1i64, 2, 3, 4, 5, 6, 7, 8, 9, 10],
        "Age" => [25i64, 34, 45, 52, 29, 61, 38, 47, 33, 56],
        "Gender" => ["Male", "Female", "Female", "Male", "Male", "Female", "Male", "Female", "Male", "Female"],
        "Location" => ["Houston", "Miami", "Chicago", "New York", "Los Angeles", "Houston", "Miami", "Chicago", "New York", "Los Angeles"],
        "Monthly_Bill" => [90.0f64, 90.0, 95.0, 100.0, 70.0, 70.0, 30.0, 40.0, 50.0, 60.0],
        "Total_Usage_GB" => [200i64, 200, 800, 300, 100, 600, 500, 900, 700, 500],
        "Subscription_Length_Months" => [3i64, 3, 3, 24, 1, 5, 2, 6, 10, 4],
        "Churn" => [1i64, 1, 0, 0, 1, 0, 0, 1, 0, 0],
    }
    .unwrap()
}

/// The churn fixture with the first two rows repeated and a few nulls
pub fn create_dirty_churn_dataframe() -> DataFrame {
    df! {
        "CustomerID" => [1i64, 2, 3, 4, 5, 6, 1, 2],
        "Age" => [Some(25i64), None, Some(45), Some(52), None, Some(61), Some(25), None],
        "Gender" => ["Male", "Female", "Female", "Male", "Male", "Female", "Male", "Female"],
        "Location" => ["Houston", "Miami", "Chicago", "New York", "Houston", "Miami", "Houston", "Miami"],
        "Monthly_Bill" => [Some(90.0f64), Some(85.0), None, Some(40.0), Some(55.0), Some(75.0), Some(90.0), Some(85.0)],
        "Total_Usage_GB" => [Some(200.0f64), Some(150.0), Some(800.0), None, Some(450.0), Some(650.0), Some(200.0), Some(150.0)],
        "Subscription_Length_Months" => [3i64, 8, 3, 2, 14, 1, 3, 8],
        "Churn" => [1i64, 1, 0, 0, 1, 0, 1, 1],
    }
    .unwrap()
}

/// Larger random customer dataset for property-style checks
pub fn create_large_churn_dataframe(rows: usize, seed: u64) -> DataFrame {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let ids: Vec<i64> = (0..rows as i64).collect();
    let ages: Vec<Option<i64>> = (0..rows)
        .map(|_| if rng.gen_bool(0.05) { None } else { Some(rng.gen_range(18..80)) })
        .collect();
    let bills: Vec<Option<f64>> = (0..rows)
        .map(|_| {
            if rng.gen_bool(0.05) {
                None
            } else {
                Some((rng.gen_range(30.0..100.0f64) * 100.0).round() / 100.0)
            }
        })
        .collect();
    let usage: Vec<Option<i64>> = (0..rows)
        .map(|_| if rng.gen_bool(0.05) { None } else { Some(rng.gen_range(50..500)) })
        .collect();
    let months: Vec<i64> = (0..rows).map(|_| rng.gen_range(1..25)).collect();
    let churn: Vec<i64> = (0..rows).map(|_| rng.gen_range(0..2)).collect();

    df! {
        "CustomerID" => ids,
        "Age" => ages,
        "Monthly_Bill" => bills,
        "Total_Usage_GB" => usage,
        "Subscription_Length_Months" => months,
        "Churn" => churn,
    }
    .unwrap()
}

/// Write a DataFrame as CSV inside `dir`
pub fn write_csv_fixture(dir: &Path, name: &str, df: &mut DataFrame) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
    path
}

/// Write a DataFrame as a single-sheet workbook inside `dir`.
/// Null cells are left blank.
pub fn write_xlsx_fixture(dir: &Path, name: &str, df: &DataFrame) -> PathBuf {
    let path = dir.join(name);
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col_idx, column) in df.get_columns().iter().enumerate() {
        let col_idx = col_idx as u16;
        worksheet.write_string(0, col_idx, column.name().as_str()).unwrap();

        let series = column.as_materialized_series();
        if series.dtype() == &DataType::String {
            for (row, value) in series.str().unwrap().into_iter().enumerate() {
                if let Some(text) = value {
                    worksheet.write_string(row as u32 + 1, col_idx, text).unwrap();
                }
            }
        } else {
            let floats = series.cast(&DataType::Float64).unwrap();
            for (row, value) in floats.f64().unwrap().into_iter().enumerate() {
                if let Some(number) = value {
                    worksheet.write_number(row as u32 + 1, col_idx, number).unwrap();
                }
            }
        }
    }

    workbook.save(&path).unwrap();
    path
}

/// Create a temporary directory with the churn fixture as `customers.csv`
pub fn create_temp_input() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let mut df = create_churn_dataframe();
    let path = write_csv_fixture(temp_dir.path(), "customers.csv", &mut df);
    (temp_dir, path)
}

/// Run context rooted at `<dir>/data`
pub fn context_in(dir: &Path) -> RunContext {
    RunContext::under(&dir.join("data"))
}

/// Read a CSV artifact back
pub fn read_artifact(path: &Path) -> DataFrame {
    read_csv(path).unwrap()
}

/// Values of a numeric column as f64
pub fn f64_values(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
    churn_etl::pipeline::missing::column_as_f64(df, column).unwrap()
}

/// Files directly inside a directory (empty if it does not exist)
pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut files: Vec<PathBuf> = entries.map(|e| e.unwrap().path()).collect();
            files.sort();
            files
        }
        Err(_) => Vec::new(),
    }
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}
