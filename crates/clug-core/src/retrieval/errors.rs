//! Retrieval error types.
//!
//! `RetrievalError` is the single terminal error of a pipeline run. Every
//! stage returns it and the orchestrator stops at the first one, except for
//! per-unit transfer failures, which are collected into `TransferFailures`
//! after the whole queue has been drained.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::types::TransferReport;
use crate::paths::PathError;
use crate::ports::{DiskSpaceError, StoragePortError};
use crate::utils::format::format_gb;

/// A single unit that could not be transferred.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitFailure {
    /// Source key.
    pub key: String,
    /// Where the object was supposed to land.
    pub destination: PathBuf,
    /// Why it failed.
    pub error: StoragePortError,
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.error)
    }
}

/// Every per-unit failure from one transfer phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferFailures {
    /// The report of the phase that produced the failures.
    pub report: TransferReport,
}

impl TransferFailures {
    /// The failed units.
    pub fn failures(&self) -> &[UnitFailure] {
        &self.report.failures
    }
}

impl fmt::Display for TransferFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} transfers failed",
            self.report.failures.len(),
            self.report.attempted()
        )?;
        for failure in &self.report.failures {
            write!(f, "\n  {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for TransferFailures {}

/// Terminal error of a retrieval run.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The target directory is missing, unwritable, or its free space unreadable.
    #[error("Local environment error at {}: {reason}", path.display())]
    LocalEnvironment {
        /// Path being checked
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// A listing call failed while resolving survey identifiers.
    #[error("Listing failed under '{prefix}': {source}")]
    Listing {
        /// Prefix being listed
        prefix: String,
        /// Port error
        #[source]
        source: StoragePortError,
    },

    /// Enumerating objects for the size estimate failed.
    #[error("Unable to estimate transfer size under '{prefix}': {source}")]
    SizeEstimate {
        /// Prefix being enumerated
        prefix: String,
        /// Port error
        #[source]
        source: StoragePortError,
    },

    /// Not enough free space at the target directory.
    #[error(
        "Not enough available space at {}: {} needed, {} available",
        path.display(),
        format_gb(*needed),
        format_gb(*available)
    )]
    InsufficientSpace {
        /// Bytes the transfer needs
        needed: u64,
        /// Bytes free at the target
        available: u64,
        /// Target directory
        path: PathBuf,
    },

    /// A listed key cannot be mirrored safely under the target directory.
    #[error("Refusing to write object with unsafe key '{key}'")]
    UnsafeKey {
        /// The offending key
        key: String,
    },

    /// One or more units failed; siblings ran to completion.
    #[error(transparent)]
    Transfers(TransferFailures),

    /// The run was cancelled before every unit was attempted.
    #[error("Retrieval cancelled: {} transferred, {} not started", report.transferred, report.skipped)]
    Cancelled {
        /// What was done before cancellation
        report: TransferReport,
    },
}

impl RetrievalError {
    /// Create a local environment error.
    pub fn local(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::LocalEnvironment {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<PathError> for RetrievalError {
    fn from(err: PathError) -> Self {
        let path = err.path().cloned().unwrap_or_default();
        Self::local(path, err.to_string())
    }
}

impl From<DiskSpaceError> for RetrievalError {
    fn from(err: DiskSpaceError) -> Self {
        match err {
            DiskSpaceError::Unavailable { path, reason } => {
                Self::local(path, format!("unable to read free space: {reason}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(key: &str) -> UnitFailure {
        UnitFailure {
            key: key.to_string(),
            destination: PathBuf::from("/data").join(key),
            error: StoragePortError::Network {
                message: "connection reset".to_string(),
            },
        }
    }

    #[test]
    fn test_transfer_failures_lists_every_unit() {
        let err = RetrievalError::Transfers(TransferFailures {
            report: TransferReport {
                transferred: 8,
                failures: vec![failure("mb/ship/EX2201/a.all"), failure("mb/ship/EX2201/b.all")],
                ..TransferReport::default()
            },
        });

        let msg = err.to_string();
        assert!(msg.starts_with("2 of 10 transfers failed"));
        assert!(msg.contains("mb/ship/EX2201/a.all: Network error: connection reset"));
        assert!(msg.contains("mb/ship/EX2201/b.all"));
    }

    #[test]
    fn test_insufficient_space_names_both_quantities() {
        let err = RetrievalError::InsufficientSpace {
            needed: 2_500_000_000,
            available: 1_000_000_000,
            path: PathBuf::from("/data"),
        };
        let msg = err.to_string();
        assert!(msg.contains("2.500 GB needed"));
        assert!(msg.contains("1.000 GB available"));
    }

    #[test]
    fn test_path_error_becomes_local_environment() {
        let err: RetrievalError = PathError::DirectoryNotFound(PathBuf::from("/missing")).into();
        match err {
            RetrievalError::LocalEnvironment { path, reason } => {
                assert_eq!(path, PathBuf::from("/missing"));
                assert!(reason.contains("does not exist"));
            }
            other => panic!("Expected LocalEnvironment, got {other:?}"),
        }
    }

    #[test]
    fn test_listing_error_keeps_source() {
        let err = RetrievalError::Listing {
            prefix: "mb/ship/".to_string(),
            source: StoragePortError::AccessDenied {
                message: "anonymous access disabled".to_string(),
            },
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("mb/ship/"));
    }
}
