//! `clug mb` - download multibeam bathymetry surveys.

use std::path::PathBuf;

use clug_core::{RetrievalOutcome, RetrievalRequest};
use clug_retrieval::run_retrieval;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::outcome_lines;

/// Arguments for the mb command.
#[derive(Debug, Clone)]
pub struct MbArgs {
    /// Survey identifiers as typed.
    pub surveys: Vec<String>,
    /// Directory to download into.
    pub target_dir: PathBuf,
}

/// Execute the mb command.
///
/// Prints the outcome summary (suppressed with `--json`, where the events
/// already describe the run) and returns the outcome for the caller.
pub async fn execute(ctx: &CliContext, args: MbArgs) -> Result<RetrievalOutcome, CliError> {
    let request =
        RetrievalRequest::new(args.surveys, args.target_dir).with_workers(ctx.workers);

    let outcome = run_retrieval(request, &ctx.options, &ctx.deps).await?;

    if !ctx.json {
        for line in outcome_lines(&outcome) {
            println!("{line}");
        }
    }
    Ok(outcome)
}
