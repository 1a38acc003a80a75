//! Object storage ports.
//!
//! The retrieval core only ever needs two capabilities from a bucket: list one
//! page of keys under a prefix, and copy one object to a local file. Both are
//! owned here so the resolver and engine can be exercised against an
//! in-memory fake instead of a live service.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from object storage port operations.
///
/// Adapter-specific errors (SDK, HTTP, XML) are mapped to these at the
/// boundary. The type is `Clone` so per-unit failures can be aggregated and
/// carried in events.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoragePortError {
    /// The key or bucket does not exist.
    #[error("Not found: {key}")]
    NotFound {
        /// The key (or bucket) that wasn't found
        key: String,
    },

    /// Credentials were rejected or the caller lacks permission.
    #[error("Access denied: {message}")]
    AccessDenied {
        /// Service-provided detail
        message: String,
    },

    /// Network, timeout, or service-side failure.
    #[error("Network error: {message}")]
    Network {
        /// Description of the failure
        message: String,
    },

    /// The service answered with something we could not interpret.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// What was invalid
        message: String,
    },

    /// Local filesystem failure while writing an object.
    #[error("I/O error at {}: {message}", path.display())]
    Io {
        /// Local path being written
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// Client configuration is unusable (bad endpoint, region, etc.).
    #[error("Configuration error: {message}")]
    Configuration {
        /// What's wrong with the configuration
        message: String,
    },
}

impl StoragePortError {
    /// Build an I/O error from a path and a `std::io::Error`.
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for storage port operations.
pub type StorageResult<T> = Result<T, StoragePortError>;

/// One leaf object returned by a listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    /// Full key relative to the bucket root.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
}

impl ObjectSummary {
    /// Create a new object summary.
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }
}

/// Parameters for one listing call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListRequest {
    /// Only keys starting with this prefix are returned.
    pub prefix: String,
    /// When set, keys sharing the next path segment are rolled up into groups.
    pub delimiter: Option<char>,
    /// Token from the previous page, `None` for the first page.
    pub continuation: Option<String>,
}

impl ListRequest {
    /// First page of a grouped listing (one hierarchy level below `prefix`).
    pub fn groups(prefix: impl Into<String>, delimiter: char) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: Some(delimiter),
            continuation: None,
        }
    }

    /// First page of an ungrouped listing (every key under `prefix`).
    pub fn objects(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: None,
            continuation: None,
        }
    }

    /// Same request, continuing from the given token.
    #[must_use]
    pub fn with_continuation(mut self, token: Option<String>) -> Self {
        self.continuation = token;
        self
    }
}

/// One page of listing results.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Common prefixes one level below the request prefix (grouped listings only).
    pub groups: Vec<String>,
    /// Leaf objects on this page.
    pub objects: Vec<ObjectSummary>,
    /// Token for the next page, `None` when this is the last page.
    pub next_continuation: Option<String>,
}

impl ListPage {
    /// Whether another page follows this one.
    pub const fn has_more(&self) -> bool {
        self.next_continuation.is_some()
    }
}

/// Port for paginated listing of a bucket.
///
/// Implementations are bound to a single bucket; keys are relative to its
/// root. Must be safe for concurrent use.
#[async_trait]
pub trait ObjectListerPort: Send + Sync {
    /// Fetch one page of results for the request.
    async fn list_page(&self, request: &ListRequest) -> StorageResult<ListPage>;
}

/// Port for copying a single object to local disk.
#[async_trait]
pub trait ObjectFetcherPort: Send + Sync {
    /// Write the full content of `key` to `destination`, returning bytes written.
    ///
    /// The parent directory of `destination` already exists when this is called.
    async fn fetch_object(&self, key: &str, destination: &Path) -> StorageResult<u64>;
}
