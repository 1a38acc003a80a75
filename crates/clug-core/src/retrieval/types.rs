//! Retrieval request, plan, and report types.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::UnitFailure;
use crate::ports::ObjectSummary;

/// Root prefix of multibeam survey data in the NODD bathymetry bucket.
pub const DEFAULT_ROOT_PREFIX: &str = "mb/";

/// Bounded number of concurrent transfers.
///
/// Always within `MIN..=MAX`; out-of-range requests are clamped rather than
/// rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerCount(usize);

impl WorkerCount {
    /// Floor for the worker pool.
    pub const MIN: usize = 1;
    /// Hard ceiling for the worker pool.
    pub const MAX: usize = 100;
    /// Pool size when nothing is configured.
    pub const DEFAULT: usize = 3;

    /// Clamp a requested worker count into `MIN..=MAX`.
    #[must_use]
    pub fn new(requested: i64) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 1..=100 first
        let clamped = requested.clamp(Self::MIN as i64, Self::MAX as i64) as usize;
        Self(clamped)
    }

    /// The clamped worker count.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for WorkerCount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Shape of the survey hierarchy inside the bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyLayout {
    /// Prefix every survey lives under (e.g. `mb/`).
    pub root_prefix: String,
    /// Hierarchy delimiter used for grouped listings.
    pub delimiter: char,
    /// Number of group levels below the root at which survey prefixes sit.
    ///
    /// The NODD layout is `mb/<platform type>/<platform>/<survey>/`, so 3.
    pub survey_depth: usize,
}

impl Default for HierarchyLayout {
    fn default() -> Self {
        Self {
            root_prefix: DEFAULT_ROOT_PREFIX.to_string(),
            delimiter: '/',
            survey_depth: 3,
        }
    }
}

impl HierarchyLayout {
    /// Last segment of a group prefix, ignoring the trailing delimiter.
    ///
    /// `mb/ship/EX2201/` becomes `EX2201`.
    pub fn basename<'a>(&self, prefix: &'a str) -> &'a str {
        let trimmed = prefix.trim_end_matches(self.delimiter);
        trimmed
            .rsplit(self.delimiter)
            .next()
            .unwrap_or(trimmed)
    }
}

/// Behavior toggles for one retrieval run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalOptions {
    /// Estimate transfer size and compare it to free space before downloading.
    pub check_disk: bool,
    /// Plan the transfer (listing included) but do not download anything.
    pub dry_run: bool,
    /// Where surveys live in the bucket.
    pub layout: HierarchyLayout,
}

/// A request to fetch one or more surveys into a local directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetrievalRequest {
    /// Survey identifiers, matched exactly and case-sensitively.
    pub surveys: Vec<String>,
    /// Existing, writable directory that mirrors the bucket layout.
    pub target_dir: PathBuf,
    /// Upper bound on concurrent transfers.
    pub workers: WorkerCount,
}

impl RetrievalRequest {
    /// Create a request with the default worker count.
    pub fn new(surveys: Vec<String>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            surveys,
            target_dir: target_dir.into(),
            workers: WorkerCount::default(),
        }
    }

    /// Set the worker count.
    #[must_use]
    pub const fn with_workers(mut self, workers: WorkerCount) -> Self {
        self.workers = workers;
        self
    }
}

/// Survey identifiers with duplicates removed, first occurrence kept.
pub fn distinct_surveys(surveys: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    surveys
        .iter()
        .filter(|s| seen.insert(s.as_str()))
        .cloned()
        .collect()
}

/// A requested survey and the prefix it resolved to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyMatch {
    /// The identifier as requested.
    pub survey: String,
    /// Full group prefix, including the trailing delimiter.
    pub prefix: String,
}

/// Result of walking the hierarchy for a request's identifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSurveys {
    /// Matches in discovery order.
    pub matches: Vec<SurveyMatch>,
    /// Requested identifiers that were not found.
    pub missing: Vec<String>,
}

impl ResolvedSurveys {
    /// Matched prefixes in discovery order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().map(|m| m.prefix.as_str())
    }

    /// True when nothing matched.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// True when every requested identifier matched.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Every leaf object under a set of resolved prefixes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectManifest {
    /// Objects in prefix order, then listing order.
    pub objects: Vec<ObjectSummary>,
}

impl ObjectManifest {
    /// Exact byte total of the manifest.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .iter()
            .fold(0u64, |acc, o| acc.saturating_add(o.size))
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when there are no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// One object to transfer and where it lands locally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadUnit {
    /// Source key in the bucket.
    pub key: String,
    /// Destination file under the target directory.
    pub destination: PathBuf,
    /// Size reported by the listing.
    pub size: u64,
}

impl DownloadUnit {
    /// Directory that must exist before the transfer starts.
    pub fn parent_dir(&self) -> Option<&Path> {
        self.destination.parent()
    }
}

/// The full set of units for a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferPlan {
    /// Units in manifest order.
    pub units: Vec<DownloadUnit>,
    /// Sum of unit sizes.
    pub total_bytes: u64,
}

impl TransferPlan {
    /// Number of units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// True when there is nothing to transfer.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// What happened during the transfer phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferReport {
    /// Units fetched successfully.
    pub transferred: usize,
    /// Bytes written by successful units.
    pub bytes: u64,
    /// Every unit that failed, in completion order.
    pub failures: Vec<UnitFailure>,
    /// Units never started because the run was cancelled.
    pub skipped: usize,
    /// Wall-clock duration of the transfer phase.
    pub elapsed: Duration,
}

impl TransferReport {
    /// Units that were actually attempted.
    pub fn attempted(&self) -> usize {
        self.transferred + self.failures.len()
    }

    /// True when every unit transferred.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0
    }
}

/// Terminal state of a successful pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RetrievalOutcome {
    /// None of the requested identifiers exist in the bucket.
    NoSurveysFound,
    /// Dry run: the plan that would have been executed.
    DryRun {
        /// Resolution result.
        surveys: ResolvedSurveys,
        /// Units that would have been transferred.
        plan: TransferPlan,
    },
    /// Every unit transferred.
    Completed {
        /// Resolution result.
        surveys: ResolvedSurveys,
        /// Transfer statistics.
        report: TransferReport,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_count_clamps_to_bounds() {
        assert_eq!(WorkerCount::new(-5).get(), 1);
        assert_eq!(WorkerCount::new(0).get(), 1);
        assert_eq!(WorkerCount::new(7).get(), 7);
        assert_eq!(WorkerCount::new(100).get(), 100);
        assert_eq!(WorkerCount::new(10_000).get(), 100);
        assert_eq!(WorkerCount::default().get(), 3);
    }

    #[test]
    fn basename_trims_trailing_delimiter() {
        let layout = HierarchyLayout::default();
        assert_eq!(layout.basename("mb/ship/Okeanos_Explorer/EX2201/"), "EX2201");
        assert_eq!(layout.basename("mb/ship/"), "ship");
        assert_eq!(layout.basename("EX2201"), "EX2201");
    }

    #[test]
    fn distinct_surveys_keeps_first_occurrence() {
        let surveys = vec!["B".to_string(), "A".to_string(), "B".to_string()];
        assert_eq!(distinct_surveys(&surveys), vec!["B", "A"]);
    }

    #[test]
    fn manifest_total_saturates() {
        let manifest = ObjectManifest {
            objects: vec![
                ObjectSummary::new("a", u64::MAX),
                ObjectSummary::new("b", 10),
            ],
        };
        assert_eq!(manifest.total_bytes(), u64::MAX);
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn report_success_requires_no_failures_or_skips() {
        let report = TransferReport {
            transferred: 2,
            ..TransferReport::default()
        };
        assert!(report.is_success());

        let cancelled = TransferReport {
            skipped: 1,
            ..report.clone()
        };
        assert!(!cancelled.is_success());
    }
}
