//! CLI module - argument parsing and configuration

mod args;
pub mod config;

pub use args::{Cli, Commands, DEFAULT_INPUT};
pub use config::PipelineConfig;
