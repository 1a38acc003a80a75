//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<_, CliError>`
//! - Build the request from CLI input, call the pipeline, print the outcome
//!
//! Handlers should not talk to the bucket or the disk directly.

pub mod mb;
