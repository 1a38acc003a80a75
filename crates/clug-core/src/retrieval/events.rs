//! Retrieval events - discriminated union for every pipeline progress signal.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Single discriminated union for all retrieval events.
///
/// Events carry raw counts, byte totals and keys; rendering them into
/// sentences is the emitter's job. Serialized with a `type` tag:
///
/// ```json
/// { "type": "survey_matched", "survey": "EX2201", "prefix": "mb/ship/Okeanos_Explorer/EX2201/" }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RetrievalEvent {
    /// The hierarchy walk is starting.
    ResolutionStarted {
        /// Distinct identifiers being searched for.
        requested: Vec<String>,
        /// Prefix the walk starts from.
        root: String,
    },

    /// A group prefix is being listed.
    ScanningGroup {
        /// The group prefix.
        prefix: String,
        /// Depth below the root (root is 0).
        depth: usize,
    },

    /// A requested identifier was found.
    SurveyMatched {
        /// The identifier as requested.
        survey: String,
        /// Full prefix it resolved to.
        prefix: String,
    },

    /// The walk ended, either early or after exhausting the hierarchy.
    ResolutionFinished {
        /// Number of identifiers matched.
        found: usize,
        /// Number of distinct identifiers requested.
        requested: usize,
        /// Identifiers that were not found.
        missing: Vec<String>,
    },

    /// The capacity gate is disabled for this run.
    CapacityCheckSkipped,

    /// The capacity gate compared the estimate to free space.
    CapacityChecked {
        /// Bytes the transfer needs.
        needed_bytes: u64,
        /// Bytes free at the target.
        available_bytes: u64,
        /// Whether the gate passed.
        passed: bool,
    },

    /// Work generation finished.
    WorkPlanned {
        /// Number of objects to transfer.
        units: usize,
        /// Total bytes to transfer.
        total_bytes: u64,
        /// Worker tasks that will run (0 in a dry run).
        workers: usize,
        /// True when nothing will be fetched.
        dry_run: bool,
    },

    /// One object was written to disk.
    UnitCompleted {
        /// Source key.
        key: String,
        /// Bytes written.
        bytes: u64,
    },

    /// One object failed to transfer.
    UnitFailed {
        /// Source key.
        key: String,
        /// Error message.
        error: String,
    },

    /// The transfer phase ended.
    TransferFinished {
        /// Units transferred.
        transferred: usize,
        /// Units that failed.
        failed: usize,
        /// Units never started because of cancellation.
        skipped: usize,
        /// Bytes written.
        bytes: u64,
        /// Wall-clock duration of the phase.
        elapsed: Duration,
    },
}

impl RetrievalEvent {
    /// Create a unit completed event.
    pub fn unit_completed(key: impl Into<String>, bytes: u64) -> Self {
        Self::UnitCompleted {
            key: key.into(),
            bytes,
        }
    }

    /// Create a unit failed event.
    pub fn unit_failed(key: impl Into<String>, error: impl ToString) -> Self {
        Self::UnitFailed {
            key: key.into(),
            error: error.to_string(),
        }
    }

    /// Get the event name for log lines and wire protocols.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::ResolutionStarted { .. } => "resolve:started",
            Self::ScanningGroup { .. } => "resolve:scanning",
            Self::SurveyMatched { .. } => "resolve:matched",
            Self::ResolutionFinished { .. } => "resolve:finished",
            Self::CapacityCheckSkipped => "capacity:skipped",
            Self::CapacityChecked { .. } => "capacity:checked",
            Self::WorkPlanned { .. } => "transfer:planned",
            Self::UnitCompleted { .. } => "transfer:unit_completed",
            Self::UnitFailed { .. } => "transfer:unit_failed",
            Self::TransferFinished { .. } => "transfer:finished",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_type_tag() {
        let event = RetrievalEvent::SurveyMatched {
            survey: "EX2201".into(),
            prefix: "mb/ship/EX2201/".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "survey_matched");
        assert_eq!(json["prefix"], "mb/ship/EX2201/");

        let back: RetrievalEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_unit_event_helpers() {
        let failed = RetrievalEvent::unit_failed("mb/a.all", "Network error: reset");
        assert_eq!(failed.event_name(), "transfer:unit_failed");
        match failed {
            RetrievalEvent::UnitFailed { error, .. } => assert_eq!(error, "Network error: reset"),
            other => panic!("Expected UnitFailed, got {other:?}"),
        }

        assert_eq!(
            RetrievalEvent::CapacityCheckSkipped.event_name(),
            "capacity:skipped"
        );
    }
}
