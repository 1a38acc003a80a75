//! Command-line adapter for cruise-lug.
//!
//! The `clug` binary parses arguments, wires the S3 adapter, the local disk
//! probe and a console emitter into `clug-retrieval`, and maps the outcome to
//! an exit code. Everything here is glue; the retrieval logic lives in the
//! library crates.

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap, cancel_on_ctrl_c};
pub use commands::Commands;
pub use error::CliError;
pub use parser::{Cli, Source};

// Used only by the binary target
use anyhow as _;
use dotenvy as _;
use tracing_subscriber as _;

#[cfg(test)]
use tokio_test as _;
