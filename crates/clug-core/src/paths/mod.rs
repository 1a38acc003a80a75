//! Target directory checks.
//!
//! The pipeline mirrors bucket keys under a user-chosen directory. That
//! directory is never created on the user's behalf; it must already exist
//! and accept writes before the first remote call is made.

mod ensure;
mod error;

pub use ensure::{verify_target_dir, verify_writable};
pub use error::PathError;
