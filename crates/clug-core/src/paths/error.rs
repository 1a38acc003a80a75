//! Path-related error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while validating a target directory.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A path was expected to be a directory but was not.
    #[error("{} exists but is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// The directory does not exist.
    #[error("Directory {} does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    /// A directory is not writable.
    #[error("Directory {} is not writable: {reason}", path.display())]
    NotWritable { path: PathBuf, reason: String },

    /// An empty path was provided.
    #[error("Path cannot be empty")]
    EmptyPath,
}

impl PathError {
    /// The path the error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::NotADirectory(path) | Self::DirectoryNotFound(path) => Some(path),
            Self::NotWritable { path, .. } => Some(path),
            Self::EmptyPath => None,
        }
    }
}
