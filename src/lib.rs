//! Churn ETL: high-risk churn customer pipeline
//!
//! A three-stage batch pipeline: extract a customer dataset (CSV or
//! spreadsheet), clean it and select high-risk churn customers, then load a
//! dated result plus summary statistics and remove the run's intermediates.

pub mod cli;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod utils;
