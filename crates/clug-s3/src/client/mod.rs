//! S3 client for listing and downloading objects from one bucket.

mod listing;
mod transfer;

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_config::retry::RetryConfig;
use aws_sdk_s3::Client;
use clug_core::StoragePortError;
use tracing::debug;

use crate::config::S3StoreConfig;
use crate::port::map_error;

/// Object store bound to a single S3 bucket.
///
/// Cheap to clone; the underlying SDK client is reference counted and safe
/// to share across worker tasks.
#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    pub(crate) client: Client,
    pub(crate) bucket: String,
    pub(crate) page_size: Option<i32>,
}

impl S3ObjectStore {
    /// Build the SDK client described by `config`.
    ///
    /// No request is sent here; connectivity problems surface on the first
    /// listing call.
    pub async fn connect(config: &S3StoreConfig) -> Result<Self, StoragePortError> {
        config.validate().map_err(|e| map_error(e, &config.bucket))?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .retry_config(RetryConfig::standard().with_max_attempts(config.max_attempts));
        if config.anonymous {
            loader = loader.no_credentials();
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(url) = &config.endpoint_url {
            builder = builder.endpoint_url(url).force_path_style(true);
        }

        debug!(
            bucket = %config.bucket,
            region = %config.region,
            anonymous = config.anonymous,
            endpoint = ?config.endpoint_url,
            max_attempts = config.max_attempts,
            "S3 client configured"
        );

        Ok(Self::from_client(
            Client::from_conf(builder.build()),
            config.bucket.clone(),
        )
        .with_page_size(config.page_size))
    }

    /// Wrap an existing SDK client.
    pub fn from_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            page_size: None,
        }
    }

    /// Set `max-keys` for listing calls.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: Option<i32>) -> Self {
        self.page_size = page_size;
        self
    }

    /// Bucket this store reads from.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}
