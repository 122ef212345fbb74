//! Report module - run summary statistics

pub mod summary;

pub use summary::*;
