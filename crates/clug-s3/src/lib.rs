//! S3 adapter for the cruise-lug storage ports.
//!
//! `S3ObjectStore` implements `ObjectListerPort` and `ObjectFetcherPort`
//! from `clug-core` over `aws_sdk_s3::Client`. SDK errors never leave this
//! crate; they are classified into `StoragePortError` at the port boundary.
//!
//! ```no_run
//! use clug_s3::{S3ObjectStore, S3StoreConfig};
//!
//! # async fn run() -> Result<(), clug_core::StoragePortError> {
//! // Anonymous access to the NODD bathymetry bucket
//! let store = S3ObjectStore::connect(&S3StoreConfig::new()).await?;
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

mod client;
mod config;
mod error;
mod port;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::S3ObjectStore;

// Configuration
pub use config::{DEFAULT_BUCKET, DEFAULT_MAX_ATTEMPTS, DEFAULT_REGION, S3StoreConfig};
