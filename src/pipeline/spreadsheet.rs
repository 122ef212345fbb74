//! Spreadsheet (xlsx/xls/ods) ingestion
//!
//! Reads the first worksheet, treats its first row as the header and infers one
//! polars dtype per column from the cell values.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;

use super::error::EtlError;
use super::io::MISSING_VALUE_TOKENS;

/// Load the first worksheet of a workbook into a DataFrame
pub fn read_spreadsheet(path: &Path) -> Result<DataFrame, EtlError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| EtlError::read(path, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EtlError::read(path, "workbook contains no worksheets"))?
        .map_err(|e| EtlError::read(path, e))?;

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(cells) => cells
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell {
                Data::Empty => format!("Unnamed: {}", i),
                other => other.to_string().trim().to_string(),
            })
            .collect(),
        None => return Ok(DataFrame::empty()),
    };

    let body: Vec<&[Data]> = rows.collect();
    let columns: Vec<Column> = header
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(idx).unwrap_or(&Data::Empty))
                .collect();
            build_column(name, &cells)
        })
        .collect();

    DataFrame::new(columns).map_err(|e| EtlError::read(path, e))
}

/// Empty cells, error cells and missing-value texts all read as nulls
fn is_missing(cell: &Data) -> bool {
    match cell {
        Data::Empty | Data::Error(_) => true,
        Data::String(s) => MISSING_VALUE_TOKENS.contains(&s.trim()),
        _ => false,
    }
}

/// Inferred column kind for a slice of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Integer,
    Float,
    Boolean,
    Text,
}

fn infer_kind(cells: &[&Data]) -> CellKind {
    let mut kind: Option<CellKind> = None;

    for cell in cells {
        if is_missing(cell) {
            continue;
        }
        let cell_kind = match cell {
            Data::Int(_) => CellKind::Integer,
            Data::Float(f) if f.fract() == 0.0 && f.is_finite() => CellKind::Integer,
            Data::Float(_) => CellKind::Float,
            Data::Bool(_) => CellKind::Boolean,
            _ => CellKind::Text,
        };

        kind = Some(match (kind, cell_kind) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(CellKind::Integer), CellKind::Float) | (Some(CellKind::Float), CellKind::Integer) => {
                CellKind::Float
            }
            _ => return CellKind::Text,
        });
    }

    // An all-empty column has no values to type; nulls fit a float column
    kind.unwrap_or(CellKind::Float)
}

fn as_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        _ => None,
    }
}

fn build_column(name: &str, cells: &[&Data]) -> Column {
    match infer_kind(cells) {
        CellKind::Integer => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| match c {
                    Data::Int(i) => Some(*i),
                    Data::Float(f) => Some(*f as i64),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), values)
        }
        CellKind::Float => {
            let values: Vec<Option<f64>> = cells.iter().map(|c| as_f64(c)).collect();
            Column::new(name.into(), values)
        }
        CellKind::Boolean => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|c| match c {
                    Data::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), values)
        }
        CellKind::Text => {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|c| (!is_missing(c)).then(|| c.to_string()))
                .collect();
            Column::new(name.into(), values)
        }
    }
}
