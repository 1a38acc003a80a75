//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the retrieval core expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No SDK types in any signature
//! - One capability per trait, so fakes stay small
//! - Everything is `Send + Sync` and shared through `Arc<dyn ...>`

pub mod disk_space;
pub mod event_emitter;
pub mod storage;

pub use disk_space::{DiskSpaceError, DiskSpacePort};
pub use event_emitter::{NoopEventEmitter, RetrievalEventEmitterPort};
pub use storage::{
    ListPage, ListRequest, ObjectFetcherPort, ObjectListerPort, ObjectSummary, StoragePortError,
    StorageResult,
};

#[cfg(any(test, feature = "test-utils"))]
pub use disk_space::MockDiskSpacePort;
