//! `ListObjectsV2` pagination.

use clug_core::{ListPage, ListRequest, ObjectSummary};
use tracing::debug;

use super::S3ObjectStore;
use crate::error::{S3Error, S3Result};

const OPERATION: &str = "ListObjectsV2";

impl S3ObjectStore {
    /// Fetch one page of keys and common prefixes.
    pub(crate) async fn list_objects_page(&self, request: &ListRequest) -> S3Result<ListPage> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&request.prefix)
            .set_delimiter(request.delimiter.map(String::from))
            .set_continuation_token(request.continuation.clone())
            .set_max_keys(self.page_size)
            .send()
            .await
            .map_err(|e| S3Error::from_sdk(OPERATION, e))?;

        let groups = output
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix().map(str::to_string))
            .collect::<Vec<_>>();

        let objects = output
            .contents()
            .iter()
            .map(|object| {
                let key = object.key().ok_or_else(|| S3Error::InvalidResponse {
                    operation: OPERATION,
                    message: "object entry without a key".to_string(),
                })?;
                to_summary(key, object.size())
            })
            .collect::<S3Result<Vec<_>>>()?;

        // A truncated page must carry a token; anything else would loop forever
        let next_continuation = match (
            output.is_truncated().unwrap_or(false),
            output.next_continuation_token(),
        ) {
            (true, Some(token)) => Some(token.to_string()),
            (true, None) => {
                return Err(S3Error::InvalidResponse {
                    operation: OPERATION,
                    message: format!(
                        "truncated listing of '{}' without a continuation token",
                        request.prefix
                    ),
                });
            }
            (false, _) => None,
        };

        debug!(
            prefix = %request.prefix,
            groups = groups.len(),
            objects = objects.len(),
            more = next_continuation.is_some(),
            "Listed page"
        );

        Ok(ListPage {
            groups,
            objects,
            next_continuation,
        })
    }
}

fn to_summary(key: &str, size: Option<i64>) -> S3Result<ObjectSummary> {
    let size = u64::try_from(size.unwrap_or(0)).map_err(|_| S3Error::InvalidResponse {
        operation: OPERATION,
        message: format!("negative size for '{key}'"),
    })?;
    Ok(ObjectSummary::new(key, size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_summary() {
        let summary = to_summary("mb/ship/EX2201/a.all", Some(42)).unwrap();
        assert_eq!(summary, ObjectSummary::new("mb/ship/EX2201/a.all", 42));

        assert_eq!(to_summary("k", None).unwrap().size, 0);
        assert!(matches!(
            to_summary("k", Some(-1)),
            Err(S3Error::InvalidResponse { .. })
        ));
    }
}
