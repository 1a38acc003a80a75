//! Exhaustive object enumeration under a set of prefixes.

use clug_core::{ListRequest, ObjectListerPort, ObjectManifest, RetrievalError, StoragePortError};
use thiserror::Error;

/// A listing call failed while enumerating `prefix`.
///
/// The caller decides which pipeline error this becomes: a size-estimate
/// failure inside the capacity gate, a listing failure otherwise.
#[derive(Debug, Error)]
#[error("Listing '{prefix}' failed: {source}")]
pub struct EnumerationError {
    /// Prefix whose listing failed.
    pub prefix: String,
    /// Port error.
    #[source]
    pub source: StoragePortError,
}

impl EnumerationError {
    /// Map to the capacity gate's error.
    pub fn into_size_estimate(self) -> RetrievalError {
        RetrievalError::SizeEstimate {
            prefix: self.prefix,
            source: self.source,
        }
    }

    /// Map to a plain listing error.
    pub fn into_listing(self) -> RetrievalError {
        RetrievalError::Listing {
            prefix: self.prefix,
            source: self.source,
        }
    }
}

/// List every leaf object under each prefix, following every page.
///
/// Objects come back in prefix order, then listing order. Stops at the
/// first failed call.
pub async fn enumerate_objects<'a, I>(
    lister: &dyn ObjectListerPort,
    prefixes: I,
) -> Result<ObjectManifest, EnumerationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut manifest = ObjectManifest::default();

    for prefix in prefixes {
        let mut continuation = None;
        let mut pages = 0usize;
        loop {
            let request = ListRequest::objects(prefix).with_continuation(continuation.take());
            let page = lister
                .list_page(&request)
                .await
                .map_err(|source| EnumerationError {
                    prefix: prefix.to_string(),
                    source,
                })?;
            pages += 1;

            manifest.objects.extend(page.objects);
            match page.next_continuation {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }
        tracing::debug!(prefix = %prefix, pages, objects = manifest.len(), "Enumerated prefix");
    }

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clug_core::testing::MemoryBucket;

    #[tokio::test]
    async fn test_enumerates_every_page_of_every_prefix() {
        let bucket = MemoryBucket::new()
            .with_sized_object("mb/ship/A/1", 10)
            .with_sized_object("mb/ship/A/sub/2", 20)
            .with_sized_object("mb/ship/A/3", 30)
            .with_sized_object("mb/ship/B/4", 40)
            .with_sized_object("mb/ship/C/5", 50)
            .with_page_size(2);

        let manifest = enumerate_objects(&bucket, ["mb/ship/A/", "mb/ship/B/"])
            .await
            .unwrap();

        let keys: Vec<_> = manifest.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["mb/ship/A/1", "mb/ship/A/3", "mb/ship/A/sub/2", "mb/ship/B/4"]);
        assert_eq!(manifest.total_bytes(), 100);
        // two pages for A, one for B
        assert_eq!(bucket.list_calls(), 3);
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let bucket = MemoryBucket::new()
            .with_sized_object("mb/ship/A/1", 1)
            .failing_list("mb/ship/A/");

        let err = enumerate_objects(&bucket, ["mb/ship/A/", "mb/ship/B/"])
            .await
            .unwrap_err();
        assert_eq!(err.prefix, "mb/ship/A/");
        assert_eq!(bucket.list_calls(), 1);
        assert!(matches!(
            err.into_size_estimate(),
            RetrievalError::SizeEstimate { .. }
        ));
    }
}
