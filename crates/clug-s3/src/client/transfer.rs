//! `GetObject` streamed to a local file.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use super::S3ObjectStore;
use crate::error::{S3Error, S3Result};

const OPERATION: &str = "GetObject";

impl S3ObjectStore {
    /// Stream the body of `key` into `destination`, returning bytes written.
    ///
    /// The file is created (or truncated) before the request is sent so a
    /// bad destination fails without network traffic.
    pub(crate) async fn download_to(&self, key: &str, destination: &Path) -> S3Result<u64> {
        let io_err = |source| S3Error::Io {
            path: destination.to_path_buf(),
            source,
        };

        let file = File::create(destination).await.map_err(io_err)?;

        let mut output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| S3Error::from_sdk(OPERATION, e))?;

        let mut writer = BufWriter::new(file);
        let mut bytes = 0u64;
        while let Some(chunk) = output
            .body
            .try_next()
            .await
            .map_err(|e| S3Error::Transport {
                operation: OPERATION,
                message: e.to_string(),
            })?
        {
            writer.write_all(&chunk).await.map_err(io_err)?;
            bytes += chunk.len() as u64;
        }
        writer.flush().await.map_err(io_err)?;
        writer.into_inner().sync_all().await.map_err(io_err)?;

        debug!(key = %key, bytes, "Downloaded object");
        Ok(bytes)
    }
}
