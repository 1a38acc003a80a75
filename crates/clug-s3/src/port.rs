//! Port trait implementations for `S3ObjectStore`.
//!
//! This module implements the core-owned storage ports, handling the
//! conversion from internal S3 errors to `StoragePortError`.

use std::path::Path;

use async_trait::async_trait;
use clug_core::ports::{
    ListPage, ListRequest, ObjectFetcherPort, ObjectListerPort, StoragePortError, StorageResult,
};

use crate::client::S3ObjectStore;
use crate::error::S3Error;

// ============================================================================
// Error Mapping
// ============================================================================

const NOT_FOUND_CODES: &[&str] = &["NoSuchKey", "NoSuchBucket", "NotFound"];

const ACCESS_DENIED_CODES: &[&str] = &[
    "AccessDenied",
    "AllAccessDisabled",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "Forbidden",
];

/// Convert internal `S3Error` to core `StoragePortError`.
///
/// `subject` names what was being accessed (key, prefix, or bucket) and is
/// used for `NotFound`.
pub(crate) fn map_error(err: S3Error, subject: &str) -> StoragePortError {
    let code = err.code().unwrap_or_default();
    if NOT_FOUND_CODES.contains(&code) {
        return StoragePortError::NotFound {
            key: subject.to_string(),
        };
    }
    if ACCESS_DENIED_CODES.contains(&code) {
        return StoragePortError::AccessDenied {
            message: err.to_string(),
        };
    }

    match err {
        S3Error::Service { .. } | S3Error::Transport { .. } => StoragePortError::Network {
            message: err.to_string(),
        },
        S3Error::InvalidResponse { .. } => StoragePortError::InvalidResponse {
            message: err.to_string(),
        },
        S3Error::Configuration { message } => StoragePortError::Configuration { message },
        S3Error::Io { path, source } => StoragePortError::io(path, &source),
    }
}

// ============================================================================
// Port Implementation
// ============================================================================

#[async_trait]
impl ObjectListerPort for S3ObjectStore {
    async fn list_page(&self, request: &ListRequest) -> StorageResult<ListPage> {
        self.list_objects_page(request)
            .await
            .map_err(|e| map_error(e, &request.prefix))
    }
}

#[async_trait]
impl ObjectFetcherPort for S3ObjectStore {
    async fn fetch_object(&self, key: &str, destination: &Path) -> StorageResult<u64> {
        self.download_to(key, destination)
            .await
            .map_err(|e| map_error(e, key))
    }
}
