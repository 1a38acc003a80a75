//! Retrieval pipeline orchestration.
//!
//! One entry point, `run_retrieval`, composes the stages in order:
//! verify target, resolve, gate, plan, transfer. Each stage returns a
//! `Result` and the first error ends the run, so nothing downstream of a
//! failure ever touches the bucket or the disk.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use clug_core::{
    DiskSpacePort, ObjectFetcherPort, ObjectListerPort, RetrievalError, RetrievalEvent,
    RetrievalEventEmitterPort, RetrievalOptions, RetrievalOutcome, RetrievalRequest,
    TransferFailures, TransferReport, verify_target_dir,
};

use crate::capacity::CapacityGate;
use crate::engine::{RetrievalEngine, plan_transfers};
use crate::listing::{EnumerationError, enumerate_objects};
use crate::resolver::PrefixResolver;

/// Everything the pipeline talks to.
///
/// Handles are shared and read-only; the same deps can serve several runs.
#[derive(Clone)]
pub struct RetrievalDeps {
    /// Paginated listing of the bucket.
    pub lister: Arc<dyn ObjectListerPort>,
    /// Object download.
    pub fetcher: Arc<dyn ObjectFetcherPort>,
    /// Free space at the target directory.
    pub disk: Arc<dyn DiskSpacePort>,
    /// Progress events.
    pub emitter: Arc<dyn RetrievalEventEmitterPort>,
    /// Cancels the transfer phase.
    pub cancel: CancellationToken,
}

/// Fetch every requested survey into the request's target directory.
///
/// Returns `NoSurveysFound` (not an error) when none of the identifiers
/// exist. With `dry_run` the plan is built and returned but nothing is
/// downloaded. Partial transfer failure is reported only after every unit
/// has been attempted.
pub async fn run_retrieval(
    request: RetrievalRequest,
    options: &RetrievalOptions,
    deps: &RetrievalDeps,
) -> Result<RetrievalOutcome, RetrievalError> {
    let RetrievalRequest {
        surveys,
        target_dir,
        workers,
    } = request;

    verify_target_dir(&target_dir)?;

    let resolver = PrefixResolver::new(
        Arc::clone(&deps.lister),
        Arc::clone(&deps.emitter),
        options.layout.clone(),
    );
    let resolved = resolver.resolve(&surveys).await?;

    if resolved.is_empty() {
        tracing::info!(requested = surveys.len(), "No matching surveys found");
        return Ok(RetrievalOutcome::NoSurveysFound);
    }

    let gate = CapacityGate::new(
        Arc::clone(&deps.lister),
        Arc::clone(&deps.disk),
        Arc::clone(&deps.emitter),
    );
    let manifest = if options.check_disk {
        gate.check(&resolved, &target_dir).await?.manifest
    } else {
        gate.skip();
        enumerate_objects(deps.lister.as_ref(), resolved.prefixes())
            .await
            .map_err(EnumerationError::into_listing)?
    };

    let plan = plan_transfers(manifest, &target_dir, options.layout.delimiter)?;

    let engine = RetrievalEngine::new(
        Arc::clone(&deps.fetcher),
        Arc::clone(&deps.emitter),
        workers,
        deps.cancel.clone(),
    );
    deps.emitter.emit(RetrievalEvent::WorkPlanned {
        units: plan.len(),
        total_bytes: plan.total_bytes,
        workers: if options.dry_run {
            0
        } else {
            engine.pool_size(plan.len())
        },
        dry_run: options.dry_run,
    });

    if options.dry_run {
        tracing::info!(units = plan.len(), bytes = plan.total_bytes, "Dry run, nothing fetched");
        return Ok(RetrievalOutcome::DryRun {
            surveys: resolved,
            plan,
        });
    }

    if deps.cancel.is_cancelled() {
        return Err(RetrievalError::Cancelled {
            report: TransferReport {
                skipped: plan.len(),
                ..TransferReport::default()
            },
        });
    }

    let report = engine.execute(plan).await;

    if report.skipped > 0 {
        return Err(RetrievalError::Cancelled { report });
    }
    if !report.failures.is_empty() {
        return Err(RetrievalError::Transfers(TransferFailures { report }));
    }

    Ok(RetrievalOutcome::Completed {
        surveys: resolved,
        report,
    })
}
