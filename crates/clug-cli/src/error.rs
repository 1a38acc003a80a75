//! CLI-specific error types and mappings.
//!
//! Library errors are mapped to a small set of categories, each with a
//! sysexits-style exit code.

use clug_core::{RetrievalError, StoragePortError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// The retrieval pipeline failed.
    #[error("{0}")]
    Retrieval(String),

    /// Local filesystem problem (missing or unwritable target, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Bad source or client configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: Retrieval failed
    /// - 2: Misuse of shell command (reported by clap before a `CliError` exists)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Retrieval(_) => 1,
            Self::Io(_) => 74,     // EX_IOERR
            Self::Config(_) => 78, // EX_CONFIG
        }
    }
}

impl From<RetrievalError> for CliError {
    fn from(err: RetrievalError) -> Self {
        match err {
            RetrievalError::LocalEnvironment { .. } => Self::Io(err.to_string()),
            other => Self::Retrieval(other.to_string()),
        }
    }
}

impl From<StoragePortError> for CliError {
    fn from(err: StoragePortError) -> Self {
        match err {
            StoragePortError::Configuration { .. } => Self::Config(err.to_string()),
            StoragePortError::Io { .. } => Self::Io(err.to_string()),
            other => Self::Retrieval(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clug_core::{TransferFailures, TransferReport, UnitFailure};
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Retrieval("x".into()).exit_code(), 1);
        assert_eq!(CliError::Io("x".into()).exit_code(), 74);
        assert_eq!(CliError::Config("x".into()).exit_code(), 78);
    }

    #[test]
    fn test_local_environment_maps_to_io() {
        let err = RetrievalError::local("/nope", "directory does not exist");
        let cli: CliError = err.into();
        assert_eq!(cli.exit_code(), 74);
        assert!(cli.to_string().contains("/nope"));
    }

    #[test]
    fn test_transfer_failures_keep_every_line() {
        let report = TransferReport {
            transferred: 1,
            failures: vec![
                UnitFailure {
                    key: "mb/a".into(),
                    destination: PathBuf::from("/t/mb/a"),
                    error: StoragePortError::Network {
                        message: "reset".into(),
                    },
                },
                UnitFailure {
                    key: "mb/b".into(),
                    destination: PathBuf::from("/t/mb/b"),
                    error: StoragePortError::NotFound { key: "mb/b".into() },
                },
            ],
            ..TransferReport::default()
        };
        let cli: CliError = RetrievalError::Transfers(TransferFailures { report }).into();

        assert_eq!(cli.exit_code(), 1);
        let msg = cli.to_string();
        assert!(msg.contains("mb/a"));
        assert!(msg.contains("mb/b"));
    }

    #[test]
    fn test_storage_configuration_maps_to_config() {
        let err = StoragePortError::Configuration {
            message: "bucket name is empty".into(),
        };
        assert_eq!(CliError::from(err).exit_code(), 78);
    }
}
