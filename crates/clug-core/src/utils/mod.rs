//! Small helpers shared by the pipeline and its adapters.

pub mod format;
