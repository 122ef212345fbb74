//! Missing value imputation

use polars::prelude::*;
use rayon::prelude::*;

/// Outcome of imputing one column
#[derive(Debug, Clone, PartialEq)]
pub struct Imputation {
    pub column: String,
    /// Median of the non-null values; `None` when the column is entirely null
    pub median: Option<f64>,
    /// Number of cells that were filled
    pub filled: usize,
}

/// Median of a set of values, averaging the two middle values for even counts.
///
/// NaN values are ignored. Returns `None` for an empty input.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Values of a numeric column as `f64`, preserving nulls
pub fn column_as_f64(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let float_col = df.column(name)?.cast(&DataType::Float64)?;
    Ok(float_col.f64()?.into_iter().collect())
}

/// Median of a column's non-null values
pub fn column_median(df: &DataFrame, name: &str) -> PolarsResult<Option<f64>> {
    let values: Vec<f64> = column_as_f64(df, name)?.into_iter().flatten().collect();
    Ok(median(&values))
}

/// Fill missing cells in each named column with that column's own median.
///
/// A cell is missing when it is null, NaN, or cannot be read as a number.
/// Medians are computed independently per column (in parallel) before any
/// column is modified. Columns without missing cells keep their original
/// dtype; filled columns become `Float64`.
pub fn impute_with_median(df: &mut DataFrame, columns: &[&str]) -> PolarsResult<Vec<Imputation>> {
    let snapshot: &DataFrame = df;
    let scanned: Vec<(String, Vec<Option<f64>>, Option<f64>, usize)> = columns
        .par_iter()
        .map(|name| -> PolarsResult<(String, Vec<Option<f64>>, Option<f64>, usize)> {
            let values = column_as_f64(snapshot, name)?;
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            let missing = values.len() - present.iter().filter(|v| !v.is_nan()).count();
            Ok((name.to_string(), values, median(&present), missing))
        })
        .collect::<PolarsResult<Vec<_>>>()?;

    let mut report = Vec::with_capacity(scanned.len());

    for (name, values, median, missing) in scanned {
        let filled = match median {
            Some(m) if missing > 0 => {
                let filled: Float64Chunked = values
                    .into_iter()
                    .map(|v| Some(v.filter(|x| !x.is_nan()).unwrap_or(m)))
                    .collect();
                df.with_column(filled.with_name(name.as_str().into()).into_series())?;
                missing
            }
            _ => 0,
        };

        report.push(Imputation {
            column: name,
            median,
            filled,
        });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[7.0]), Some(7.0));
    }

    #[test]
    fn test_median_empty_and_nan() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[f64::NAN]), None);
        assert_eq!(median(&[f64::NAN, 5.0, 1.0]), Some(3.0));
    }

    #[test]
    fn test_impute_fills_each_column_with_its_own_median() {
        let mut df = df! {
            "Age" => [Some(20i64), None, Some(40), Some(60)],
            "Monthly_Bill" => [Some(10.0f64), Some(30.0), None, None],
            "Total_Usage_GB" => [100.0f64, 200.0, 300.0, 400.0],
        }
        .unwrap();

        let report = impute_with_median(&mut df, &["Age", "Monthly_Bill", "Total_Usage_GB"]).unwrap();

        assert_eq!(report[0], Imputation { column: "Age".into(), median: Some(40.0), filled: 1 });
        assert_eq!(report[1], Imputation { column: "Monthly_Bill".into(), median: Some(20.0), filled: 2 });
        assert_eq!(report[2].filled, 0);

        let age = column_as_f64(&df, "Age").unwrap();
        assert_eq!(age, vec![Some(20.0), Some(40.0), Some(40.0), Some(60.0)]);
        let bill = column_as_f64(&df, "Monthly_Bill").unwrap();
        assert_eq!(bill, vec![Some(10.0), Some(30.0), Some(20.0), Some(20.0)]);

        // Untouched column keeps its dtype
        assert_eq!(df.column("Total_Usage_GB").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_impute_treats_nan_and_unparsed_text_as_missing() {
        let mut df = df! {
            "Age" => ["25", "NA", "45", "?"],
            "Monthly_Bill" => [10.0f64, f64::NAN, 30.0, 20.0],
        }
        .unwrap();

        let report = impute_with_median(&mut df, &["Age", "Monthly_Bill"]).unwrap();

        assert_eq!(report[0], Imputation { column: "Age".into(), median: Some(35.0), filled: 2 });
        assert_eq!(report[1], Imputation { column: "Monthly_Bill".into(), median: Some(20.0), filled: 1 });
        assert_eq!(
            column_as_f64(&df, "Age").unwrap(),
            vec![Some(25.0), Some(35.0), Some(45.0), Some(35.0)]
        );
        assert_eq!(
            column_as_f64(&df, "Monthly_Bill").unwrap(),
            vec![Some(10.0), Some(20.0), Some(30.0), Some(20.0)]
        );
    }

    #[test]
    fn test_impute_all_null_column_stays_null() {
        let mut df = df! {
            "Age" => [None::<f64>, None, None],
        }
        .unwrap();

        let report = impute_with_median(&mut df, &["Age"]).unwrap();

        assert_eq!(report[0].median, None);
        assert_eq!(report[0].filled, 0);
        assert_eq!(df.column("Age").unwrap().null_count(), 3);
    }

    #[test]
    fn test_impute_missing_column_errors() {
        let mut df = df! { "Age" => [1.0f64] }.unwrap();
        assert!(impute_with_median(&mut df, &["Monthly_Bill"]).is_err());
    }
}
