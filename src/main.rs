//! Churn ETL: command-line entry point
//!
//! Runs extract → transform → load once for the configured input, retrying
//! stages per the configured policy.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::ProgressBar;
use tracing::info;

use churn_etl::cli::{Cli, Commands};
use churn_etl::logging::init_logging;
use churn_etl::pipeline::{
    run_pipeline_observed, validate_input, Extracted, Loaded, NoProgress, Stage, StageError,
    StageObserver, Transformed,
};
use churn_etl::utils::{
    create_spinner, finish_with_failure, finish_with_success, print_banner, print_completion,
    print_config, print_info, print_path, print_step_header, print_success,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    if let Some(command) = &cli.command {
        return match command {
            Commands::Validate { input } => run_validate(input, cli.quiet),
        };
    }

    let config = cli.config();
    info!(config = %serde_json::to_string(&config)?, "Effective configuration");

    let ctx = config.new_run();

    if cli.quiet {
        run_pipeline_observed(&ctx, &config.input, &config.retry, &mut NoProgress)?;
        return Ok(());
    }

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&config, &ctx.run_id);

    let mut console = ConsoleProgress::default();
    let run = run_pipeline_observed(&ctx, &config.input, &config.retry, &mut console)?;

    run.loaded.summary.display();
    print_completion();

    Ok(())
}

/// Step headers, spinners and per-stage details on the terminal
#[derive(Default)]
struct ConsoleProgress {
    current: Option<(Stage, ProgressBar, Instant)>,
}

impl ConsoleProgress {
    fn finish(&mut self) {
        if let Some((stage, spinner, started)) = self.current.take() {
            finish_with_success(
                &spinner,
                &format!("{} complete ({:.2}s)", title(stage), started.elapsed().as_secs_f64()),
            );
        }
    }
}

fn title(stage: Stage) -> &'static str {
    match stage {
        Stage::Extract => "Extract",
        Stage::Transform => "Transform",
        Stage::Load => "Load",
    }
}

impl StageObserver for ConsoleProgress {
    fn stage_started(&mut self, stage: Stage) {
        let (step, message) = match stage {
            Stage::Extract => (1, "Reading input..."),
            Stage::Transform => (2, "Cleaning and filtering..."),
            Stage::Load => (3, "Writing outputs..."),
        };
        print_step_header(step, title(stage));
        self.current = Some((stage, create_spinner(message, false), Instant::now()));
    }

    fn extracted(&mut self, extracted: &Extracted) {
        self.finish();
        print_success(&format!("Extracted {} record(s)", extracted.rows));
        print_path("staged at", &extracted.path);
    }

    fn transformed(&mut self, transformed: &Transformed) {
        self.finish();
        print_info(&format!(
            "{} duplicate row(s) removed",
            transformed.input_rows - transformed.deduplicated_rows
        ));
        for imputation in transformed.imputations.iter().filter(|i| i.filled > 0) {
            print_info(&format!(
                "{} missing {} value(s) filled with median {:.2}",
                imputation.filled,
                imputation.column,
                imputation.median.unwrap_or(f64::NAN)
            ));
        }
        print_success(&format!(
            "{} record(s) identified as high-risk",
            style(transformed.rows).yellow().bold()
        ));
    }

    fn loaded(&mut self, loaded: &Loaded) {
        self.finish();
        print_path("output ", &loaded.final_path);
        print_path("summary", &loaded.summary_path);
        if !loaded.cleanup.failed.is_empty() {
            print_info(&format!(
                "{} intermediate file(s) could not be removed",
                loaded.cleanup.failed.len()
            ));
        }
    }

    fn stage_failed(&mut self, error: &StageError) {
        if let Some((stage, spinner, _)) = self.current.take() {
            finish_with_failure(&spinner, &format!("{} failed: {}", title(stage), error.kind));
        }
    }
}

/// Check an input file without staging it
fn run_validate(input: &Path, quiet: bool) -> Result<()> {
    let spinner = create_spinner("Validating input...", quiet);

    match validate_input(input) {
        Ok(validated) => {
            finish_with_success(&spinner, &format!("{} is valid", input.display()));
            println!(
                "      {:?} file, {} row(s), {} column(s)",
                validated.format,
                validated.rows,
                validated.columns.len()
            );
            println!("      Columns: {}", validated.columns.join(", "));
            Ok(())
        }
        Err(err) => {
            finish_with_failure(&spinner, &format!("{} is not valid", input.display()));
            Err(err.into())
        }
    }
}
