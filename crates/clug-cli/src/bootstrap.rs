//! CLI bootstrap - the composition root.
//!
//! This module is the only place where infrastructure is wired together for
//! the CLI adapter:
//! - S3 object store (via clug-s3) for listing and fetching
//! - Local free-space probe (via clug-retrieval)
//! - Console or JSON-lines event emitter
//!
//! Command handlers receive the composed `CliContext` and hand its
//! dependencies to `run_retrieval`.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use clug_core::{RetrievalEventEmitterPort, RetrievalOptions, WorkerCount};
use clug_retrieval::{LocalDiskSpace, RetrievalDeps};
use clug_s3::{S3ObjectStore, S3StoreConfig};

use crate::error::CliError;
use crate::parser::Cli;
use crate::presentation::{ConsoleEmitter, JsonEmitter};

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// S3 adapter settings.
    pub store: S3StoreConfig,
    /// Pipeline options.
    pub options: RetrievalOptions,
    /// Parallel transfer count.
    pub workers: WorkerCount,
    /// Print events as JSON lines instead of console text.
    pub json: bool,
}

impl CliConfig {
    /// Build the configuration from parsed arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            store: cli.store_config(),
            options: cli.retrieval_options(),
            workers: cli.workers(),
            json: cli.json,
        }
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// Everything the retrieval pipeline talks to.
    pub deps: RetrievalDeps,
    /// Pipeline options.
    pub options: RetrievalOptions,
    /// Parallel transfer count.
    pub workers: WorkerCount,
    /// Whether output is JSON lines.
    pub json: bool,
}

impl CliContext {
    /// Token that cancels the transfer phase.
    pub fn cancel_token(&self) -> CancellationToken {
        self.deps.cancel.clone()
    }
}

/// Bootstrap the CLI application.
///
/// Builds the S3 client (no request is sent yet), the disk probe and the
/// emitter, and returns them with a fresh cancellation token.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let store = Arc::new(S3ObjectStore::connect(&config.store).await?);

    let emitter: Arc<dyn RetrievalEventEmitterPort> = if config.json {
        Arc::new(JsonEmitter::new())
    } else {
        Arc::new(ConsoleEmitter::new())
    };

    tracing::debug!(
        bucket = store.bucket(),
        workers = config.workers.get(),
        check_disk = config.options.check_disk,
        dry_run = config.options.dry_run,
        "CLI context ready"
    );

    Ok(CliContext {
        deps: RetrievalDeps {
            lister: store.clone(),
            fetcher: store,
            disk: Arc::new(LocalDiskSpace::new()),
            emitter,
            cancel: CancellationToken::new(),
        },
        options: config.options,
        workers: config.workers,
        json: config.json,
    })
}

/// Cancel `token` on the first Ctrl-C.
///
/// In-flight transfers finish; no new transfer starts.
pub fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, finishing in-flight transfers");
                token.cancel();
            }
            Err(err) => tracing::warn!(error = %err, "Unable to listen for Ctrl-C"),
        }
    });
}
