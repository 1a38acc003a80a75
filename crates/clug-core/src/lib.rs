//! Core domain types and ports for cruise-lug.
//!
//! This crate owns everything the retrieval pipeline needs to talk about
//! without knowing how storage, disks, or consoles actually work:
//!
//! - `retrieval` - request/option types, plans, reports, events and errors
//! - `ports` - trait abstractions implemented by adapters (`clug-s3`, the CLI)
//! - `paths` - target directory verification
//! - `utils` - small formatting helpers shared by adapters
//!
//! Enable the `test-utils` feature to get `testing::MemoryBucket`, an
//! in-memory bucket that implements the storage ports.

#![deny(unsafe_code)]

pub mod paths;
pub mod ports;
pub mod retrieval;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use paths::{PathError, verify_target_dir, verify_writable};
pub use ports::{
    DiskSpaceError, DiskSpacePort, ListPage, ListRequest, NoopEventEmitter, ObjectFetcherPort,
    ObjectListerPort, ObjectSummary, RetrievalEventEmitterPort, StoragePortError, StorageResult,
};
pub use retrieval::{
    DownloadUnit, HierarchyLayout, ObjectManifest, ResolvedSurveys, RetrievalError,
    RetrievalEvent, RetrievalOptions, RetrievalOutcome, RetrievalRequest, SurveyMatch,
    TransferFailures, TransferPlan, TransferReport, UnitFailure, WorkerCount, distinct_surveys,
};
pub use utils::format::{bytes_to_gb, format_gb};

// Silence unused dev-dependency warnings
#[cfg(test)]
use serde_json as _;
