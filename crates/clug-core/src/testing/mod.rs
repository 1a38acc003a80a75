//! In-memory bucket for tests.
//!
//! `MemoryBucket` implements both storage ports over a sorted key map. It
//! paginates like the real service (groups and objects share the page
//! budget), counts every call, records which prefixes were listed, can be
//! told to fail specific listings or fetches, and tracks how many fetches
//! were in flight at once.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::ports::{
    ListPage, ListRequest, ObjectFetcherPort, ObjectListerPort, ObjectSummary, StoragePortError,
    StorageResult,
};

const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Clone, Debug)]
struct StoredObject {
    size: u64,
    content: Option<Vec<u8>>,
}

enum Entry {
    Group(String),
    Object(ObjectSummary),
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An in-memory bucket implementing `ObjectListerPort` and `ObjectFetcherPort`.
pub struct MemoryBucket {
    objects: BTreeMap<String, StoredObject>,
    page_size: usize,
    fetch_delay: Option<Duration>,
    failing_lists: HashSet<String>,
    failing_fetches: HashSet<String>,
    list_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    listed: Mutex<Vec<String>>,
}

impl MemoryBucket {
    /// Create an empty bucket with the service's default page size.
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            page_size: DEFAULT_PAGE_SIZE,
            fetch_delay: None,
            failing_lists: HashSet::new(),
            failing_fetches: HashSet::new(),
            list_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            listed: Mutex::new(Vec::new()),
        }
    }

    /// Add an object with the given content.
    #[must_use]
    pub fn with_object(mut self, key: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        self.objects.insert(
            key.into(),
            StoredObject {
                size: content.len() as u64,
                content: Some(content),
            },
        );
        self
    }

    /// Add an object that only has a listed size.
    ///
    /// Fetching it writes `size` zero bytes, so keep sizes small unless the
    /// object is only ever listed.
    #[must_use]
    pub fn with_sized_object(mut self, key: impl Into<String>, size: u64) -> Self {
        self.objects
            .insert(key.into(), StoredObject { size, content: None });
        self
    }

    /// Limit the number of entries (groups plus objects) per page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Hold every fetch open for `delay` so concurrency becomes observable.
    #[must_use]
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    /// Fail every listing of exactly this prefix with a network error.
    #[must_use]
    pub fn failing_list(mut self, prefix: impl Into<String>) -> Self {
        self.failing_lists.insert(prefix.into());
        self
    }

    /// Fail every fetch of this key with a network error.
    #[must_use]
    pub fn failing_fetch(mut self, key: impl Into<String>) -> Self {
        self.failing_fetches.insert(key.into());
        self
    }

    /// Number of `list_page` calls so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_object` calls so far.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Highest number of fetches observed running at the same time.
    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Prefixes passed to `list_page`, in call order.
    pub fn listed_prefixes(&self) -> Vec<String> {
        lock(&self.listed).clone()
    }

    fn entries(&self, prefix: &str, delimiter: Option<char>) -> Vec<Entry> {
        let mut entries: Vec<Entry> = Vec::new();

        for (key, stored) in self.objects.range(prefix.to_string()..) {
            let Some(rest) = key.strip_prefix(prefix) else {
                break;
            };

            let group = delimiter
                .and_then(|d| rest.find(d).map(|idx| (d, idx)))
                .map(|(d, idx)| format!("{prefix}{}", &rest[..idx + d.len_utf8()]));

            match group {
                Some(group) => {
                    // keys sharing a group prefix are contiguous in sorted order
                    if !matches!(entries.last(), Some(Entry::Group(last)) if *last == group) {
                        entries.push(Entry::Group(group));
                    }
                }
                None => entries.push(Entry::Object(ObjectSummary::new(key.clone(), stored.size))),
            }
        }

        entries
    }
}

impl Default for MemoryBucket {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectListerPort for MemoryBucket {
    async fn list_page(&self, request: &ListRequest) -> StorageResult<ListPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.listed).push(request.prefix.clone());

        if self.failing_lists.contains(&request.prefix) {
            return Err(StoragePortError::Network {
                message: format!("injected listing failure for '{}'", request.prefix),
            });
        }

        let start = match &request.continuation {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| StoragePortError::InvalidResponse {
                    message: format!("unknown continuation token '{token}'"),
                })?,
        };

        let entries = self.entries(&request.prefix, request.delimiter);
        let total = entries.len();
        let end = (start + self.page_size).min(total);

        let mut page = ListPage::default();
        for entry in entries.into_iter().take(end).skip(start) {
            match entry {
                Entry::Group(group) => page.groups.push(group),
                Entry::Object(object) => page.objects.push(object),
            }
        }
        if end < total {
            page.next_continuation = Some(end.to_string());
        }

        Ok(page)
    }
}

#[async_trait]
impl ObjectFetcherPort for MemoryBucket {
    async fn fetch_object(&self, key: &str, destination: &Path) -> StorageResult<u64> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }

        let result = self.write_object(key, destination).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl MemoryBucket {
    async fn write_object(&self, key: &str, destination: &Path) -> StorageResult<u64> {
        if self.failing_fetches.contains(key) {
            return Err(StoragePortError::Network {
                message: format!("injected fetch failure for '{key}'"),
            });
        }

        let stored = self
            .objects
            .get(key)
            .ok_or_else(|| StoragePortError::NotFound {
                key: key.to_string(),
            })?;

        let content = stored.content.clone().unwrap_or_else(|| {
            #[allow(clippy::cast_possible_truncation)]
            let len = stored.size as usize;
            vec![0u8; len]
        });

        tokio::fs::write(destination, &content)
            .await
            .map_err(|e| StoragePortError::io(destination, &e))?;

        Ok(content.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket() -> MemoryBucket {
        MemoryBucket::new()
            .with_object("mb/ship/EX2201/a.all", b"aa".to_vec())
            .with_object("mb/ship/EX2201/b.all", b"bbb".to_vec())
            .with_object("mb/ship/EX2202/c.all", b"c".to_vec())
            .with_object("mb/auv/Sentry/S1/d.all", b"d".to_vec())
            .with_object("mb/readme.txt", b"hello".to_vec())
    }

    #[tokio::test]
    async fn test_grouped_listing_rolls_up_common_prefixes() {
        let bucket = bucket();
        let page = bucket
            .list_page(&ListRequest::groups("mb/", '/'))
            .await
            .unwrap();

        assert_eq!(page.groups, vec!["mb/auv/", "mb/ship/"]);
        assert_eq!(page.objects, vec![ObjectSummary::new("mb/readme.txt", 5)]);
        assert!(!page.has_more());
    }

    #[tokio::test]
    async fn test_pagination_follows_tokens() {
        let bucket = bucket().with_page_size(1);
        let request = ListRequest::objects("mb/ship/");

        let first = bucket.list_page(&request).await.unwrap();
        assert_eq!(first.objects.len(), 1);
        assert_eq!(first.next_continuation.as_deref(), Some("1"));

        let second = bucket
            .list_page(&request.clone().with_continuation(first.next_continuation))
            .await
            .unwrap();
        assert_eq!(second.objects[0].key, "mb/ship/EX2201/b.all");

        assert_eq!(bucket.list_calls(), 2);
        assert_eq!(bucket.listed_prefixes(), vec!["mb/ship/", "mb/ship/"]);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let bucket = bucket()
            .failing_list("mb/ship/")
            .failing_fetch("mb/readme.txt");

        let err = bucket
            .list_page(&ListRequest::groups("mb/ship/", '/'))
            .await
            .unwrap_err();
        assert!(matches!(err, StoragePortError::Network { .. }));

        let dir = tempfile::tempdir().unwrap();
        let err = bucket
            .fetch_object("mb/readme.txt", &dir.path().join("readme.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoragePortError::Network { .. }));
        assert_eq!(bucket.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_writes_content() {
        let bucket = bucket().with_sized_object("mb/ship/EX2201/zero.bin", 4);
        let dir = tempfile::tempdir().unwrap();

        let dest = dir.path().join("b.all");
        let written = bucket
            .fetch_object("mb/ship/EX2201/b.all", &dest)
            .await
            .unwrap();
        assert_eq!(written, 3);
        assert_eq!(std::fs::read(&dest).unwrap(), b"bbb");

        let zero = dir.path().join("zero.bin");
        bucket
            .fetch_object("mb/ship/EX2201/zero.bin", &zero)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&zero).unwrap(), vec![0u8; 4]);

        let missing = bucket
            .fetch_object("mb/nope", &dir.path().join("nope"))
            .await;
        tokio_test::assert_err!(missing);
        assert_eq!(bucket.max_concurrent_fetches(), 1);
    }
}
