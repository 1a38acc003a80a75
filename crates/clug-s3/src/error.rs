//! Internal error types for S3 operations.
//!
//! These errors are internal to `clug-s3` and are mapped to core port errors
//! at the boundary.

use std::path::PathBuf;

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// Result type alias for S3 operations.
pub type S3Result<T> = Result<T, S3Error>;

/// Errors related to S3 operations.
#[derive(Debug, Error)]
pub enum S3Error {
    /// The service answered with an error.
    #[error("{operation} failed ({}): {message}", code.as_deref().unwrap_or("no error code"))]
    Service {
        /// API operation name
        operation: &'static str,
        /// Service error code, e.g. `NoSuchKey`
        code: Option<String>,
        /// Full error context
        message: String,
    },

    /// The request never got a usable response (DNS, TLS, timeout, reset).
    #[error("{operation} failed in transit: {message}")]
    Transport {
        /// API operation name
        operation: &'static str,
        /// Full error context
        message: String,
    },

    /// The response could not be interpreted.
    #[error("Invalid response from {operation}: {message}")]
    InvalidResponse {
        /// API operation name
        operation: &'static str,
        /// Description of what was invalid
        message: String,
    },

    /// The client is misconfigured.
    #[error("Invalid S3 configuration: {message}")]
    Configuration {
        /// What's wrong
        message: String,
    },

    /// Writing the object body to disk failed.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        /// Local destination
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl S3Error {
    /// Classify an SDK error from the given operation.
    pub(crate) fn from_sdk<E, R>(operation: &'static str, err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        let message = DisplayErrorContext(&err).to_string();
        match &err {
            SdkError::ServiceError(service) => Self::Service {
                operation,
                code: service.err().code().map(str::to_string),
                message,
            },
            SdkError::ConstructionFailure(_) => Self::Configuration { message },
            SdkError::ResponseError(_) => Self::InvalidResponse { operation, message },
            _ => Self::Transport { operation, message },
        }
    }

    /// The service error code, if the service returned one.
    pub(crate) fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
