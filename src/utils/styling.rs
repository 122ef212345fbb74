//! Terminal styling utilities for the run report

use console::{style, Emoji};
use std::path::Path;

use crate::cli::PipelineConfig;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static RETRY: Emoji<'_, '_> = Emoji("🔁 ", "");
pub static TAG: Emoji<'_, '_> = Emoji("🏷️  ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("churn-etl").cyan().bold(),
        style("High-risk churn customer pipeline").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(config: &PipelineConfig, run_id: &str) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Input:    {:<37}│",
        FOLDER,
        truncate_path(&config.input, 36)
    );
    println!(
        "    │  {} Data dir: {:<37}│",
        SAVE,
        truncate_path(&config.data_dir, 36)
    );
    println!(
        "    │  {} Run:      {:<37}│",
        TAG,
        truncate_string(run_id, 36)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Retries:  {:<37}│",
        RETRY,
        style(format!(
            "{} (every {}s)",
            config.retry.max_retries,
            config.retry.delay.as_secs()
        ))
        .yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a labelled path
pub fn print_path(label: &str, path: &Path) {
    println!("      {} {}", style(label).dim(), path.display());
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Churn ETL run complete!").green().bold()
    );
    println!();
}

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}
