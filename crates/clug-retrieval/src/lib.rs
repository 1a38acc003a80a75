//! Survey retrieval for cruise-lug.
//!
//! - `resolver` - survey identifier to key prefix resolution
//! - `capacity` - transfer size estimate against local free space
//! - `engine` - transfer planning and the bounded worker pool
//! - `pipeline` - `run_retrieval`, which composes the stages
//!
//! All remote access goes through the ports in `clug-core`, so the whole
//! pipeline runs against `clug_core::testing::MemoryBucket` in tests.

#![deny(unsafe_code)]

// Re-export core types for convenience
pub use clug_core::{
    DownloadUnit, HierarchyLayout, ObjectManifest, ResolvedSurveys, RetrievalError,
    RetrievalEvent, RetrievalOptions, RetrievalOutcome, RetrievalRequest, TransferPlan,
    TransferReport, WorkerCount,
};

mod capacity;
mod engine;
mod listing;
mod pipeline;
mod resolver;

pub use capacity::{CapacityDecision, CapacityGate, LocalDiskSpace, has_capacity};
pub use engine::{
    PARTIAL_SUFFIX, RetrievalEngine, destination_for, partial_path, plan_transfers, run_unit,
};
pub use listing::{EnumerationError, enumerate_objects};
pub use pipeline::{RetrievalDeps, run_retrieval};
pub use resolver::PrefixResolver;
