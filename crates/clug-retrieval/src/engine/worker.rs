//! Transfer worker.
//!
//! A worker pulls units from the shared queue until it is empty or the run
//! is cancelled. It operates on cloned `Arc` dependencies and keeps its own
//! tally, so the only shared mutable state is the queue itself.
//!
//! # Design Principles
//!
//! - Cancellation is checked when dequeuing and again right before a transfer
//! - An in-flight transfer is never interrupted
//! - Objects are streamed into a `.clug-part` sibling and renamed on success

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use clug_core::{
    DownloadUnit, ObjectFetcherPort, RetrievalEvent, RetrievalEventEmitterPort, StoragePortError,
    UnitFailure,
};

use super::paths::partial_path;

/// Queue shared by every worker of one run.
pub type UnitQueue = Arc<Mutex<VecDeque<DownloadUnit>>>;

/// Dependencies for a transfer worker.
#[derive(Clone)]
pub struct WorkerDeps {
    /// Port used to copy objects to disk.
    pub fetcher: Arc<dyn ObjectFetcherPort>,
    /// Port for progress events.
    pub emitter: Arc<dyn RetrievalEventEmitterPort>,
    /// Run-wide cancellation.
    pub cancel: CancellationToken,
}

/// What one worker got done.
#[derive(Debug, Default)]
pub struct WorkerTally {
    /// Units written successfully.
    pub transferred: usize,
    /// Bytes written by successful units.
    pub bytes: u64,
    /// Units that failed.
    pub failures: Vec<UnitFailure>,
}

/// Pull and run units until the queue is empty or the run is cancelled.
pub async fn run_worker(id: usize, queue: UnitQueue, deps: WorkerDeps) -> WorkerTally {
    let mut tally = WorkerTally::default();

    loop {
        if deps.cancel.is_cancelled() {
            tracing::debug!(worker = id, "Cancelled before dequeue");
            break;
        }
        let Some(unit) = queue.lock().await.pop_front() else {
            break;
        };
        if deps.cancel.is_cancelled() {
            // never started; leave it for the skipped count
            queue.lock().await.push_front(unit);
            break;
        }

        match run_unit(&unit, deps.fetcher.as_ref()).await {
            Ok(bytes) => {
                tracing::debug!(worker = id, key = %unit.key, bytes, "Transferred object");
                deps.emitter
                    .emit(RetrievalEvent::unit_completed(unit.key.clone(), bytes));
                tally.transferred += 1;
                tally.bytes = tally.bytes.saturating_add(bytes);
            }
            Err(error) => {
                tracing::warn!(worker = id, key = %unit.key, error = %error, "Transfer failed");
                deps.emitter
                    .emit(RetrievalEvent::unit_failed(unit.key.clone(), &error));
                tally.failures.push(UnitFailure {
                    key: unit.key,
                    destination: unit.destination,
                    error,
                });
            }
        }
    }

    tally
}

/// Transfer a single unit to its destination.
///
/// Creates missing parent directories, streams into the partial sibling,
/// then renames it into place. A failed transfer leaves no partial file.
pub async fn run_unit(
    unit: &DownloadUnit,
    fetcher: &dyn ObjectFetcherPort,
) -> Result<u64, StoragePortError> {
    if let Some(parent) = unit.parent_dir() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoragePortError::io(parent, &e))?;
    }

    let partial = partial_path(&unit.destination);
    let bytes = match fetcher.fetch_object(&unit.key, &partial).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
    };

    tokio::fs::rename(&partial, &unit.destination)
        .await
        .map_err(|e| StoragePortError::io(&unit.destination, &e))?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clug_core::testing::MemoryBucket;
    use std::path::PathBuf;

    fn unit(root: &std::path::Path, key: &str) -> DownloadUnit {
        DownloadUnit {
            key: key.to_string(),
            destination: root.join(key),
            size: 0,
        }
    }

    #[tokio::test]
    async fn run_unit_creates_dirs_and_renames() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = MemoryBucket::new().with_object("mb/ship/EX2201/a.all", b"abc".to_vec());
        let unit = unit(dir.path(), "mb/ship/EX2201/a.all");

        let bytes = run_unit(&unit, &bucket).await.unwrap();

        assert_eq!(bytes, 3);
        assert_eq!(std::fs::read(&unit.destination).unwrap(), b"abc");
        assert!(!partial_path(&unit.destination).exists());
    }

    #[tokio::test]
    async fn failed_unit_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = MemoryBucket::new()
            .with_object("mb/a.all", b"abc".to_vec())
            .failing_fetch("mb/a.all");
        let unit = unit(dir.path(), "mb/a.all");

        tokio_test::assert_err!(run_unit(&unit, &bucket).await);
        assert!(!unit.destination.exists());
        assert!(!partial_path(&unit.destination).exists());
    }

    #[tokio::test]
    async fn cancelled_worker_starts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = Arc::new(MemoryBucket::new().with_object("mb/a.all", b"a".to_vec()));
        let queue: UnitQueue = Arc::new(Mutex::new(VecDeque::from([unit(dir.path(), "mb/a.all")])));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let tally = run_worker(
            0,
            queue.clone(),
            WorkerDeps {
                fetcher: bucket.clone(),
                emitter: Arc::new(clug_core::NoopEventEmitter::new()),
                cancel,
            },
        )
        .await;

        assert_eq!(tally.transferred, 0);
        assert_eq!(bucket.fetch_calls(), 0);
        assert_eq!(queue.lock().await.len(), 1);
        assert!(!PathBuf::from(dir.path()).join("mb").exists());
    }
}
