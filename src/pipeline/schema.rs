//! Customer dataset column names and required-field validation

use polars::prelude::*;

pub const CUSTOMER_ID: &str = "CustomerID";
pub const AGE: &str = "Age";
pub const GENDER: &str = "Gender";
pub const LOCATION: &str = "Location";
pub const MONTHLY_BILL: &str = "Monthly_Bill";
pub const TOTAL_USAGE_GB: &str = "Total_Usage_GB";
pub const SUBSCRIPTION_LENGTH_MONTHS: &str = "Subscription_Length_Months";
pub const CHURN: &str = "Churn";

/// Columns every input must carry for the transform stage to work
pub const REQUIRED_COLUMNS: [&str; 4] = [AGE, MONTHLY_BILL, TOTAL_USAGE_GB, SUBSCRIPTION_LENGTH_MONTHS];

/// Numeric columns whose nulls are filled with the column median
pub const IMPUTED_COLUMNS: [&str; 3] = [AGE, MONTHLY_BILL, TOTAL_USAGE_GB];

/// Required columns absent from the DataFrame, in `REQUIRED_COLUMNS` order
pub fn missing_required_columns(df: &DataFrame) -> Vec<String> {
    let present = df.get_column_names();
    REQUIRED_COLUMNS
        .iter()
        .filter(|required| !present.iter().any(|name| name.as_str() == **required))
        .map(|s| s.to_string())
        .collect()
}
