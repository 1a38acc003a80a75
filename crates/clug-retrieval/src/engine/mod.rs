//! Retrieval engine.
//!
//! Runs a `TransferPlan` with a fixed-size worker pool.
//!
//! # Concurrency Model
//!
//! - `min(workers, units)` tasks in one `JoinSet`, all pulling from one queue
//! - No per-unit retry; a failure is recorded and the queue keeps draining
//! - After cancellation no new transfer starts and the leftovers are counted
//!   as skipped

mod paths;
mod worker;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use clug_core::{
    ObjectFetcherPort, RetrievalEvent, RetrievalEventEmitterPort, TransferPlan, TransferReport,
    WorkerCount,
};

pub use paths::{PARTIAL_SUFFIX, destination_for, partial_path, plan_transfers};
pub use worker::run_unit;

use worker::{UnitQueue, WorkerDeps, run_worker};

/// Executes transfer plans with bounded parallelism.
pub struct RetrievalEngine {
    deps: WorkerDeps,
    workers: WorkerCount,
}

impl RetrievalEngine {
    /// Create a new engine.
    pub fn new(
        fetcher: Arc<dyn ObjectFetcherPort>,
        emitter: Arc<dyn RetrievalEventEmitterPort>,
        workers: WorkerCount,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            deps: WorkerDeps {
                fetcher,
                emitter,
                cancel,
            },
            workers,
        }
    }

    /// Number of worker tasks a plan of `units` units gets.
    pub fn pool_size(&self, units: usize) -> usize {
        self.workers.get().min(units)
    }

    /// Transfer every unit in the plan.
    ///
    /// Never fails as a whole: per-unit failures and cancellation are
    /// reported in the returned `TransferReport`.
    pub async fn execute(&self, plan: TransferPlan) -> TransferReport {
        let started = Instant::now();
        let pool = self.pool_size(plan.len());

        tracing::info!(
            units = plan.len(),
            bytes = plan.total_bytes,
            workers = pool,
            "Starting transfers"
        );

        let queue: UnitQueue = Arc::new(Mutex::new(VecDeque::from(plan.units)));
        let mut set = JoinSet::new();
        for id in 0..pool {
            set.spawn(run_worker(id, Arc::clone(&queue), self.deps.clone()));
        }

        let mut report = TransferReport::default();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(tally) => {
                    report.transferred += tally.transferred;
                    report.bytes = report.bytes.saturating_add(tally.bytes);
                    report.failures.extend(tally.failures);
                }
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(err) => tracing::warn!(error = %err, "Transfer worker aborted"),
            }
        }

        report.skipped = queue.lock().await.len();
        report.elapsed = started.elapsed();

        self.deps.emitter.emit(RetrievalEvent::TransferFinished {
            transferred: report.transferred,
            failed: report.failures.len(),
            skipped: report.skipped,
            bytes: report.bytes,
            elapsed: report.elapsed,
        });
        tracing::info!(
            transferred = report.transferred,
            failed = report.failures.len(),
            skipped = report.skipped,
            elapsed_hours = report.elapsed.as_secs_f64() / 3600.0,
            "Transfers finished"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clug_core::testing::MemoryBucket;
    use clug_core::{DownloadUnit, NoopEventEmitter, StorageResult};
    use std::path::Path;
    use std::time::Duration;

    fn plan(root: &Path, count: usize) -> (MemoryBucket, TransferPlan) {
        let mut bucket = MemoryBucket::new().with_fetch_delay(Duration::from_millis(20));
        let mut units = Vec::new();
        for i in 0..count {
            let key = format!("mb/ship/EX2201/file{i:02}.all");
            bucket = bucket.with_object(key.clone(), vec![b'x'; i + 1]);
            units.push(DownloadUnit {
                destination: root.join(&key),
                key,
                size: (i + 1) as u64,
            });
        }
        let total_bytes = units.iter().map(|u| u.size).sum();
        (bucket, TransferPlan { units, total_bytes })
    }

    fn engine(
        fetcher: Arc<dyn ObjectFetcherPort>,
        workers: i64,
        cancel: CancellationToken,
    ) -> RetrievalEngine {
        RetrievalEngine::new(
            fetcher,
            Arc::new(NoopEventEmitter::new()),
            WorkerCount::new(workers),
            cancel,
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn ten_units_three_workers() {
        let dir = tempfile::tempdir().unwrap();
        let (bucket, plan) = plan(dir.path(), 10);
        let bucket = Arc::new(
            bucket
                .failing_fetch("mb/ship/EX2201/file03.all")
                .failing_fetch("mb/ship/EX2201/file07.all"),
        );

        let report = engine(bucket.clone(), 3, CancellationToken::new())
            .execute(plan)
            .await;

        assert_eq!(bucket.fetch_calls(), 10);
        assert!(bucket.max_concurrent_fetches() <= 3);
        assert_eq!(report.transferred, 8);
        assert_eq!(report.skipped, 0);

        let mut failed: Vec<_> = report.failures.iter().map(|f| f.key.as_str()).collect();
        failed.sort_unstable();
        assert_eq!(
            failed,
            vec!["mb/ship/EX2201/file03.all", "mb/ship/EX2201/file07.all"]
        );
        assert!(dir.path().join("mb/ship/EX2201/file00.all").exists());
        assert!(!dir.path().join("mb/ship/EX2201/file03.all").exists());
    }

    #[tokio::test]
    async fn pool_never_exceeds_unit_count() {
        let engine = engine(Arc::new(MemoryBucket::new()), 100, CancellationToken::new());
        assert_eq!(engine.pool_size(2), 2);
        assert_eq!(engine.pool_size(0), 0);

        let report = engine.execute(TransferPlan::default()).await;
        assert_eq!(report.attempted(), 0);
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn cancellation_stops_new_transfers() {
        let dir = tempfile::tempdir().unwrap();
        let (bucket, plan) = plan(dir.path(), 6);
        let cancel = CancellationToken::new();
        let fetcher = Arc::new(CancelAfter::new(bucket, 2, cancel.clone()));

        let report = engine(fetcher.clone(), 1, cancel).execute(plan).await;

        assert_eq!(report.transferred, 2);
        assert_eq!(report.skipped, 4);
        assert_eq!(fetcher.inner.fetch_calls(), 2);
    }

    /// Fetcher wrapper that cancels the run after a number of fetches.
    struct CancelAfter {
        inner: MemoryBucket,
        limit: usize,
        cancel: CancellationToken,
    }

    impl CancelAfter {
        fn new(inner: MemoryBucket, limit: usize, cancel: CancellationToken) -> Self {
            Self {
                inner,
                limit,
                cancel,
            }
        }
    }

    #[async_trait::async_trait]
    impl ObjectFetcherPort for CancelAfter {
        async fn fetch_object(&self, key: &str, destination: &Path) -> StorageResult<u64> {
            let result = self.inner.fetch_object(key, destination).await;
            if self.inner.fetch_calls() >= self.limit {
                self.cancel.cancel();
            }
            result
        }
    }
}
