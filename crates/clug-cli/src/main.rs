//! `clug` binary - the composition root.
//!
//! Loads `.env`, parses arguments, installs logging, bootstraps the context
//! and dispatches the subcommand. Errors are printed once here and mapped to
//! the process exit code.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use clug_cli::handlers::mb::{self, MbArgs};
use clug_cli::{Cli, CliConfig, CliError, Commands, bootstrap, cancel_on_ctrl_c};

/// Filter used with `--verbose` when `RUST_LOG` is unset.
const VERBOSE_FILTER: &str =
    "warn,clug=debug,clug_cli=debug,clug_core=debug,clug_retrieval=debug,clug_s3=debug";

fn init_tracing(verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = bootstrap(CliConfig::from_cli(&cli))
        .await
        .context("failed to set up the survey source")?;
    cancel_on_ctrl_c(ctx.cancel_token());

    match cli.command {
        Commands::Mb {
            surveys,
            target_dir,
        } => {
            mb::execute(
                &ctx,
                MbArgs {
                    surveys,
                    target_dir,
                },
            )
            .await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before parsing so they feed clap's env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}
