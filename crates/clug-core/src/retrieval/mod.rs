//! Retrieval domain types.
//!
//! Everything the pipeline passes between stages: the request and options a
//! caller builds, the resolution result, the manifest and plan, the final
//! report, the progress events, and the terminal error.

mod errors;
mod events;
mod types;

pub use errors::{RetrievalError, TransferFailures, UnitFailure};
pub use events::RetrievalEvent;
pub use types::{
    DEFAULT_ROOT_PREFIX, DownloadUnit, HierarchyLayout, ObjectManifest, ResolvedSurveys,
    RetrievalOptions, RetrievalOutcome, RetrievalRequest, SurveyMatch, TransferPlan,
    TransferReport, WorkerCount, distinct_surveys,
};
