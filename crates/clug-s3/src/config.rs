//! Public configuration for the S3 store.
//!
//! Defaults point at the NOAA Open Data Dissemination multibeam bucket,
//! which is public and read anonymously.

use crate::error::{S3Error, S3Result};

/// Bucket holding NODD bathymetry data.
pub const DEFAULT_BUCKET: &str = "noaa-dcdb-bathymetry-pds";

/// Region of the NODD bathymetry bucket.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Total attempts per request, initial try included.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Service-side ceiling for `max-keys`.
const MAX_PAGE_SIZE: i32 = 1000;

/// Configuration for `S3ObjectStore`.
///
/// Use the builder pattern methods to customize the store.
///
/// # Example
///
/// ```
/// use clug_s3::S3StoreConfig;
///
/// let config = S3StoreConfig::new()
///     .with_endpoint_url("http://localhost:9000")
///     .with_max_attempts(5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3StoreConfig {
    /// Bucket every key is relative to
    pub(crate) bucket: String,
    /// Region the bucket lives in
    pub(crate) region: String,
    /// Skip credential resolution and send unsigned requests
    pub(crate) anonymous: bool,
    /// Custom endpoint (S3-compatible services, local mocks)
    pub(crate) endpoint_url: Option<String>,
    /// Attempts per request for the SDK's standard retry mode
    pub(crate) max_attempts: u32,
    /// Optional `max-keys` for listing calls
    pub(crate) page_size: Option<i32>,
}

impl Default for S3StoreConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            region: DEFAULT_REGION.to_string(),
            anonymous: true,
            endpoint_url: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            page_size: None,
        }
    }
}

impl S3StoreConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bucket name.
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Set the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Use the default credential chain instead of anonymous access.
    #[must_use]
    pub const fn with_anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = anonymous;
        self
    }

    /// Send requests to a custom endpoint, with path-style addressing.
    #[must_use]
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Set an optional custom endpoint.
    #[must_use]
    pub fn with_optional_endpoint_url(mut self, url: Option<String>) -> Self {
        self.endpoint_url = url;
        self
    }

    /// Set the total attempts per request (minimum 1).
    ///
    /// Defaults to 3.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Limit the number of keys per listing page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = Some(page_size.clamp(1, MAX_PAGE_SIZE));
        self
    }

    /// Bucket this configuration targets.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Region this configuration targets.
    pub fn region(&self) -> &str {
        &self.region
    }

    pub(crate) fn validate(&self) -> S3Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(S3Error::Configuration {
                message: "bucket name cannot be empty".to_string(),
            });
        }
        if self.region.trim().is_empty() {
            return Err(S3Error::Configuration {
                message: "region cannot be empty".to_string(),
            });
        }
        if let Some(url) = &self.endpoint_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(S3Error::Configuration {
                    message: format!("endpoint URL must be http(s): {url}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = S3StoreConfig::new();
        assert_eq!(config.bucket(), "noaa-dcdb-bathymetry-pds");
        assert_eq!(config.region(), "us-east-1");
        assert!(config.anonymous);
        assert!(config.endpoint_url.is_none());
        assert_eq!(config.max_attempts, 3);
        assert!(config.page_size.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = S3StoreConfig::new()
            .with_bucket("survey-mirror")
            .with_region("us-west-2")
            .with_anonymous(false)
            .with_endpoint_url("http://localhost:9000")
            .with_max_attempts(0)
            .with_page_size(5000);

        assert_eq!(config.bucket(), "survey-mirror");
        assert_eq!(config.region(), "us-west-2");
        assert!(!config.anonymous);
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.page_size, Some(1000));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(S3StoreConfig::new().with_bucket(" ").validate().is_err());
        assert!(S3StoreConfig::new().with_region("").validate().is_err());
        assert!(
            S3StoreConfig::new()
                .with_optional_endpoint_url(Some("localhost:9000".into()))
                .validate()
                .is_err()
        );
    }
}
