//! Dataset reading and writing for CSV and spreadsheet files

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use polars::prelude::*;

use super::error::EtlError;
use super::spreadsheet::read_spreadsheet;

/// Cell texts read as missing values in CSV and spreadsheet inputs
pub const MISSING_VALUE_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Supported input file kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Comma-delimited text
    Csv,
    /// Excel / OpenDocument workbook (first worksheet is read)
    Spreadsheet,
}

impl InputFormat {
    /// Determine the file kind from the path's extension
    pub fn detect(path: &Path) -> Result<Self, EtlError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "csv" => Ok(InputFormat::Csv),
            "xlsx" | "xls" | "xlsm" | "ods" => Ok(InputFormat::Spreadsheet),
            _ => Err(EtlError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// Load a dataset from a file (CSV or spreadsheet based on extension)
pub fn read_table(path: &Path) -> Result<DataFrame, EtlError> {
    match InputFormat::detect(path)? {
        InputFormat::Csv => read_csv(path),
        InputFormat::Spreadsheet => read_spreadsheet(path),
    }
}

/// Load a CSV file fully into memory.
///
/// Schema inference scans the whole file so a float appearing late in an
/// otherwise-integer column does not abort the read. Cells matching
/// [`MISSING_VALUE_TOKENS`] become nulls.
pub fn read_csv(path: &Path) -> Result<DataFrame, EtlError> {
    if !path.is_file() {
        return Err(EtlError::read(
            path,
            io::Error::new(io::ErrorKind::NotFound, "file does not exist"),
        ));
    }

    LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_null_values(Some(NullValues::AllColumns(
            MISSING_VALUE_TOKENS.iter().map(|t| (*t).into()).collect(),
        )))
        .finish()
        .and_then(|lf| lf.collect())
        .map_err(|e| EtlError::read(path, e))
}

/// Write a DataFrame to CSV, creating parent directories as needed.
///
/// Data goes to a sibling `.partial` file first and is renamed into place, so
/// readers never observe a half-written artifact.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), EtlError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| EtlError::write(path, e))?;
    }

    let partial = partial_path(path);
    let result = File::create(&partial)
        .map_err(|e| EtlError::write(path, e))
        .and_then(|mut file| {
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(df)
                .map_err(|e| EtlError::write(path, e))
        })
        .and_then(|_| fs::rename(&partial, path).map_err(|e| EtlError::write(path, e)));

    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

/// Write bytes atomically in the same manner as [`write_csv`]
pub fn write_bytes(bytes: &[u8], path: &Path) -> Result<(), EtlError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| EtlError::write(path, e))?;
    }

    let partial = partial_path(path);
    let result = fs::write(&partial, bytes)
        .and_then(|_| fs::rename(&partial, path))
        .map_err(|e| EtlError::write(path, e));

    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Column names of a DataFrame as owned strings
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}
