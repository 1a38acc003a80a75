//! Local free-space probe.

use std::path::Path;

use clug_core::{DiskSpaceError, DiskSpacePort};

/// `DiskSpacePort` backed by the filesystem containing the queried path.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDiskSpace;

impl LocalDiskSpace {
    /// Create a new probe.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DiskSpacePort for LocalDiskSpace {
    fn available_bytes(&self, path: &Path) -> Result<u64, DiskSpaceError> {
        fs2::available_space(path).map_err(|e| DiskSpaceError::Unavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
