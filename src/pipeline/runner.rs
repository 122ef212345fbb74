//! Stage composition and retry policy
//!
//! Stages are plain functions; the runner feeds each stage's typed output to
//! the next and re-invokes a failed stage while its error is retryable and the
//! retry budget lasts.

use std::path::Path;
use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use super::context::RunContext;
use super::error::{Stage, StageError};
use super::extract::{extract, Extracted};
use super::load::{load, Loaded};
use super::transform::{transform, Transformed};

/// Bounded retry with a fixed delay between attempts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RetryPolicy {
    /// Re-invocations allowed after the first failure
    pub max_retries: u32,
    /// Pause before each re-invocation
    #[serde(with = "duration_secs")]
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(5 * 60),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Policy with no retries at all
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Run `attempt` until it succeeds, fails with a non-retryable error, or
    /// the retry budget is spent. The last error is returned.
    pub fn run<T, F>(&self, mut attempt: F) -> Result<T, StageError>
    where
        F: FnMut() -> Result<T, StageError>,
    {
        let mut retries = 0;
        loop {
            match attempt() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    warn!(
                        run_id = %err.run_id,
                        stage = %err.stage,
                        retry = retries,
                        max_retries = self.max_retries,
                        delay_secs = self.delay.as_secs(),
                        "Stage failed, retrying"
                    );
                    if !self.delay.is_zero() {
                        thread::sleep(self.delay);
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }
}

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub run_id: String,
    pub extracted: Extracted,
    pub transformed: Transformed,
    pub loaded: Loaded,
}

/// Callbacks around each stage of a run, for progress display.
///
/// Every method defaults to doing nothing. `stage_started` fires once per
/// stage, not per retry attempt.
pub trait StageObserver {
    fn stage_started(&mut self, _stage: Stage) {}
    fn extracted(&mut self, _extracted: &Extracted) {}
    fn transformed(&mut self, _transformed: &Transformed) {}
    fn loaded(&mut self, _loaded: &Loaded) {}
    fn stage_failed(&mut self, _error: &StageError) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl StageObserver for NoProgress {}

/// Run extract → transform → load for one input, retrying each stage under `policy`
pub fn run_pipeline(
    ctx: &RunContext,
    input: &Path,
    policy: &RetryPolicy,
) -> Result<PipelineRun, StageError> {
    run_pipeline_observed(ctx, input, policy, &mut NoProgress)
}

/// [`run_pipeline`] reporting each stage to `observer`
pub fn run_pipeline_observed<O: StageObserver + ?Sized>(
    ctx: &RunContext,
    input: &Path,
    policy: &RetryPolicy,
    observer: &mut O,
) -> Result<PipelineRun, StageError> {
    info!(run_id = %ctx.run_id, input = %input.display(), "Pipeline run started");

    let extracted = run_stage(policy, observer, Stage::Extract, || extract(ctx, input))?;
    observer.extracted(&extracted);

    let transformed = run_stage(policy, observer, Stage::Transform, || {
        transform(ctx, &extracted)
    })?;
    observer.transformed(&transformed);

    let loaded = run_stage(policy, observer, Stage::Load, || load(ctx, &transformed))?;
    observer.loaded(&loaded);

    info!(
        run_id = %ctx.run_id,
        high_risk = loaded.summary.total_records,
        output = %loaded.final_path.display(),
        "Pipeline run finished"
    );

    Ok(PipelineRun {
        run_id: ctx.run_id.clone(),
        extracted,
        transformed,
        loaded,
    })
}

fn run_stage<T, O, F>(
    policy: &RetryPolicy,
    observer: &mut O,
    stage: Stage,
    attempt: F,
) -> Result<T, StageError>
where
    O: StageObserver + ?Sized,
    F: FnMut() -> Result<T, StageError>,
{
    observer.stage_started(stage);
    policy.run(attempt).inspect_err(|err| observer.stage_failed(err))
}
