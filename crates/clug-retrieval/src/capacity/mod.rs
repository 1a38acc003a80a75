//! Capacity gate.
//!
//! Sums the size of every object under the resolved prefixes and refuses the
//! transfer unless the target filesystem has strictly more free bytes than
//! that. The measured manifest is handed on so the engine transfers exactly
//! what was counted.

mod probe;

use std::path::Path;
use std::sync::Arc;

use clug_core::{
    DiskSpacePort, ObjectListerPort, ObjectManifest, ResolvedSurveys, RetrievalError,
    RetrievalEvent, RetrievalEventEmitterPort, format_gb,
};

use crate::listing::enumerate_objects;

pub use probe::LocalDiskSpace;

/// Result of a passed capacity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityDecision {
    /// Every object that will be transferred.
    pub manifest: ObjectManifest,
    /// Bytes needed.
    pub needed: u64,
    /// Bytes free at the target when checked.
    pub available: u64,
}

/// Whether `available` bytes are enough for `needed` bytes.
///
/// Strict: an exactly full disk after the transfer is not acceptable.
#[must_use]
pub const fn has_capacity(needed: u64, available: u64) -> bool {
    available > needed
}

/// Compares the transfer size of resolved surveys to local free space.
pub struct CapacityGate {
    lister: Arc<dyn ObjectListerPort>,
    disk: Arc<dyn DiskSpacePort>,
    emitter: Arc<dyn RetrievalEventEmitterPort>,
}

impl CapacityGate {
    /// Create a new gate.
    pub fn new(
        lister: Arc<dyn ObjectListerPort>,
        disk: Arc<dyn DiskSpacePort>,
        emitter: Arc<dyn RetrievalEventEmitterPort>,
    ) -> Self {
        Self {
            lister,
            disk,
            emitter,
        }
    }

    /// Record that the check was turned off. No listing call is made.
    pub fn skip(&self) {
        tracing::info!("Skipping disk space check");
        self.emitter.emit(RetrievalEvent::CapacityCheckSkipped);
    }

    /// Measure the surveys and compare against free space at `target_dir`.
    ///
    /// Free space is read before any listing so a bad target fails fast.
    pub async fn check(
        &self,
        surveys: &ResolvedSurveys,
        target_dir: &Path,
    ) -> Result<CapacityDecision, RetrievalError> {
        let available = self.disk.available_bytes(target_dir)?;

        let manifest = enumerate_objects(self.lister.as_ref(), surveys.prefixes())
            .await
            .map_err(crate::listing::EnumerationError::into_size_estimate)?;
        let needed = manifest.total_bytes();
        let passed = has_capacity(needed, available);

        self.emitter.emit(RetrievalEvent::CapacityChecked {
            needed_bytes: needed,
            available_bytes: available,
            passed,
        });
        tracing::info!(
            needed,
            available,
            passed,
            "Transfer needs {}, {} available",
            format_gb(needed),
            format_gb(available)
        );

        if !passed {
            return Err(RetrievalError::InsufficientSpace {
                needed,
                available,
                path: target_dir.to_path_buf(),
            });
        }

        Ok(CapacityDecision {
            manifest,
            needed,
            available,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clug_core::ports::MockDiskSpacePort;
    use clug_core::testing::MemoryBucket;
    use clug_core::{DiskSpaceError, NoopEventEmitter, SurveyMatch};

    fn surveys(prefixes: &[&str]) -> ResolvedSurveys {
        ResolvedSurveys {
            matches: prefixes
                .iter()
                .map(|p| SurveyMatch {
                    survey: p.to_string(),
                    prefix: p.to_string(),
                })
                .collect(),
            missing: Vec::new(),
        }
    }

    fn gate(bucket: Arc<MemoryBucket>, available: u64) -> CapacityGate {
        let mut disk = MockDiskSpacePort::new();
        disk.expect_available_bytes()
            .returning(move |_| Ok(available));
        CapacityGate::new(bucket, Arc::new(disk), Arc::new(NoopEventEmitter::new()))
    }

    fn hundred_bytes() -> Arc<MemoryBucket> {
        Arc::new(
            MemoryBucket::new()
                .with_sized_object("mb/ship/EX2201/a.all", 60)
                .with_sized_object("mb/ship/EX2201/b.all", 40),
        )
    }

    #[test]
    fn capacity_rule_is_strict() {
        assert!(!has_capacity(100, 100));
        assert!(has_capacity(100, 101));
        assert!(has_capacity(0, 1));
        assert!(!has_capacity(0, 0));
    }

    #[tokio::test]
    async fn equal_space_fails() {
        let err = gate(hundred_bytes(), 100)
            .check(&surveys(&["mb/ship/EX2201/"]), Path::new("/data"))
            .await
            .unwrap_err();

        match err {
            RetrievalError::InsufficientSpace {
                needed, available, ..
            } => {
                assert_eq!(needed, 100);
                assert_eq!(available, 100);
            }
            other => panic!("Expected InsufficientSpace, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn one_spare_byte_passes_and_returns_manifest() {
        let decision = gate(hundred_bytes(), 101)
            .check(&surveys(&["mb/ship/EX2201/"]), Path::new("/data"))
            .await
            .unwrap();

        assert_eq!(decision.needed, 100);
        assert_eq!(decision.manifest.len(), 2);
    }

    #[tokio::test]
    async fn probe_failure_is_local_environment_error() {
        let bucket = hundred_bytes();
        let mut disk = MockDiskSpacePort::new();
        disk.expect_available_bytes().returning(|p| {
            Err(DiskSpaceError::Unavailable {
                path: p.to_path_buf(),
                reason: "statvfs failed".to_string(),
            })
        });
        let gate = CapacityGate::new(
            bucket.clone(),
            Arc::new(disk),
            Arc::new(NoopEventEmitter::new()),
        );

        let err = gate
            .check(&surveys(&["mb/ship/EX2201/"]), Path::new("/data"))
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::LocalEnvironment { .. }));
        assert_eq!(bucket.list_calls(), 0);
    }

    #[tokio::test]
    async fn enumeration_failure_is_size_estimate_error() {
        let bucket = Arc::new(
            MemoryBucket::new()
                .with_sized_object("mb/ship/EX2201/a.all", 1)
                .failing_list("mb/ship/EX2201/"),
        );
        let err = gate(bucket, 1_000)
            .check(&surveys(&["mb/ship/EX2201/"]), Path::new("/data"))
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::SizeEstimate { .. }));
    }
}
