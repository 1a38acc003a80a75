//! Terminal rendering of retrieval progress and outcomes.
//!
//! Keep this module format-only: emitters turn `RetrievalEvent`s into lines
//! and the summary turns a `RetrievalOutcome` into lines. No retrieval
//! decisions are made here.

pub mod console;
pub mod json;
pub mod summary;

pub use console::{ConsoleEmitter, describe_event};
pub use json::JsonEmitter;
pub use summary::outcome_lines;
