//! Disk space probe port.
//!
//! Abstracts the free-space query used by the capacity gate. The production
//! implementation lives in `clug-retrieval`; tests use the generated mock.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while probing local free space.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiskSpaceError {
    /// The filesystem query itself failed.
    #[error("Unable to read free space for {}: {reason}", path.display())]
    Unavailable { path: PathBuf, reason: String },
}

/// Port for querying bytes available to the current user at a path.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait DiskSpacePort: Send + Sync {
    /// Bytes available for new files on the filesystem containing `path`.
    fn available_bytes(&self, path: &Path) -> Result<u64, DiskSpaceError>;
}
