//! Human-readable event emitter.
//!
//! Status lines go to stdout. During the transfer phase an `indicatif` bar
//! tracks bytes written, and status lines are printed above it.

use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard, PoisonError};

use indicatif::{ProgressBar, ProgressStyle};

use clug_core::{RetrievalEvent, RetrievalEventEmitterPort, format_gb};

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}";

/// Progress of the running transfer phase.
struct TransferBar {
    bar: ProgressBar,
    units: usize,
    completed: usize,
}

impl TransferBar {
    fn new(units: usize, total_bytes: u64) -> Self {
        let bar = ProgressBar::new(total_bytes);
        match ProgressStyle::with_template(BAR_TEMPLATE) {
            Ok(style) => bar.set_style(style.progress_chars("█▓░")),
            Err(err) => tracing::debug!(error = %err, "Falling back to default progress style"),
        }
        let state = Self {
            bar,
            units,
            completed: 0,
        };
        state.refresh_message();
        state
    }

    fn refresh_message(&self) {
        self.bar
            .set_message(format!("{}/{} files", self.completed, self.units));
    }
}

/// Console emitter with a transfer progress bar.
pub struct ConsoleEmitter {
    transfer: Mutex<Option<TransferBar>>,
}

impl ConsoleEmitter {
    /// Create a new console emitter.
    pub const fn new() -> Self {
        Self {
            transfer: Mutex::new(None),
        }
    }

    fn transfer(&self) -> MutexGuard<'_, Option<TransferBar>> {
        self.transfer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn print(&self, line: &str) {
        match self.transfer().as_ref() {
            // a hidden bar (no terminal) swallows println
            Some(state) if !state.bar.is_hidden() => state.bar.println(line),
            _ => println!("{line}"),
        }
    }

    fn on_work_planned(&self, units: usize, total_bytes: u64, dry_run: bool) {
        if dry_run || units == 0 {
            return;
        }
        *self.transfer() = Some(TransferBar::new(units, total_bytes));
    }

    fn on_unit_completed(&self, bytes: u64) {
        if let Some(state) = self.transfer().as_mut() {
            state.completed += 1;
            state.bar.inc(bytes);
            state.refresh_message();
        }
    }

    fn finish_bar(&self) {
        if let Some(state) = self.transfer().take() {
            state.bar.finish_and_clear();
        }
    }
}

impl Default for ConsoleEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl RetrievalEventEmitterPort for ConsoleEmitter {
    fn emit(&self, event: RetrievalEvent) {
        match &event {
            RetrievalEvent::WorkPlanned {
                units,
                total_bytes,
                dry_run,
                ..
            } => {
                if let Some(line) = describe_event(&event) {
                    self.print(&line);
                }
                self.on_work_planned(*units, *total_bytes, *dry_run);
                return;
            }
            RetrievalEvent::UnitCompleted { bytes, .. } => self.on_unit_completed(*bytes),
            RetrievalEvent::TransferFinished { .. } => self.finish_bar(),
            _ => {}
        }

        if let Some(line) = describe_event(&event) {
            self.print(&line);
        }
    }
}

/// Render an event as one status line.
///
/// Returns `None` for events that only drive the progress bar.
pub fn describe_event(event: &RetrievalEvent) -> Option<String> {
    match event {
        RetrievalEvent::ResolutionStarted { requested, root } => Some(format!(
            "Searching {root} for {} survey(s): {}",
            requested.len(),
            requested.join(", ")
        )),
        RetrievalEvent::ScanningGroup { .. } | RetrievalEvent::UnitCompleted { .. } => None,
        RetrievalEvent::SurveyMatched { survey, prefix } => {
            Some(format!("Found {survey} at {prefix}"))
        }
        RetrievalEvent::ResolutionFinished {
            found,
            requested,
            missing,
        } => {
            let mut line = format!("Found {found} of {requested} surveys");
            if !missing.is_empty() {
                let _ = write!(line, " (not found: {})", missing.join(", "));
            }
            Some(line)
        }
        RetrievalEvent::CapacityCheckSkipped => {
            Some("Skipping disk space check".to_string())
        }
        RetrievalEvent::CapacityChecked {
            needed_bytes,
            available_bytes,
            passed,
        } => Some(format!(
            "Download size {}, available space {}{}",
            format_gb(*needed_bytes),
            format_gb(*available_bytes),
            if *passed { "" } else { " (not enough space)" }
        )),
        RetrievalEvent::WorkPlanned {
            units,
            total_bytes,
            workers,
            dry_run,
        } => Some(if *dry_run {
            format!(
                "Dry run: {units} files ({}) would be downloaded",
                format_gb(*total_bytes)
            )
        } else {
            format!(
                "Downloading {units} files ({}) with {workers} workers",
                format_gb(*total_bytes)
            )
        }),
        RetrievalEvent::UnitFailed { key, error } => Some(format!("Failed {key}: {error}")),
        RetrievalEvent::TransferFinished {
            transferred,
            failed,
            skipped,
            bytes,
            elapsed,
        } => {
            let mut line = format!(
                "Downloaded {transferred} files ({}) in {:.4} hours",
                format_gb(*bytes),
                elapsed.as_secs_f64() / 3600.0
            );
            if *failed > 0 {
                let _ = write!(line, ", {failed} failed");
            }
            if *skipped > 0 {
                let _ = write!(line, ", {skipped} not started");
            }
            Some(line)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_resolution_lines() {
        let started = RetrievalEvent::ResolutionStarted {
            requested: vec!["EX2201".into(), "EX2202".into()],
            root: "mb/".into(),
        };
        assert_eq!(
            describe_event(&started).unwrap(),
            "Searching mb/ for 2 survey(s): EX2201, EX2202"
        );

        let finished = RetrievalEvent::ResolutionFinished {
            found: 1,
            requested: 2,
            missing: vec!["EX2202".into()],
        };
        assert_eq!(
            describe_event(&finished).unwrap(),
            "Found 1 of 2 surveys (not found: EX2202)"
        );
    }

    #[test]
    fn test_progress_only_events_have_no_line() {
        assert!(describe_event(&RetrievalEvent::unit_completed("mb/a", 3)).is_none());
        assert!(
            describe_event(&RetrievalEvent::ScanningGroup {
                prefix: "mb/ship/".into(),
                depth: 1,
            })
            .is_none()
        );
    }

    #[test]
    fn test_capacity_line_uses_decimal_gigabytes() {
        let line = describe_event(&RetrievalEvent::CapacityChecked {
            needed_bytes: 2_500_000_000,
            available_bytes: 1_000_000_000,
            passed: false,
        })
        .unwrap();
        assert_eq!(
            line,
            "Download size 2.500 GB, available space 1.000 GB (not enough space)"
        );
    }

    #[test]
    fn test_transfer_finished_mentions_failures() {
        let line = describe_event(&RetrievalEvent::TransferFinished {
            transferred: 8,
            failed: 2,
            skipped: 0,
            bytes: 0,
            elapsed: Duration::from_secs(36),
        })
        .unwrap();
        assert_eq!(line, "Downloaded 8 files (0.000 GB) in 0.0100 hours, 2 failed");
    }

    #[test]
    fn test_emitter_tracks_transfer_bar() {
        let emitter = ConsoleEmitter::new();
        emitter.emit(RetrievalEvent::WorkPlanned {
            units: 2,
            total_bytes: 10,
            workers: 2,
            dry_run: false,
        });
        emitter.emit(RetrievalEvent::unit_completed("mb/a", 4));
        {
            let transfer = emitter.transfer();
            let state = transfer.as_ref().unwrap();
            assert_eq!(state.bar.position(), 4);
            assert_eq!(state.bar.message(), "1/2 files");
        }

        emitter.emit(RetrievalEvent::TransferFinished {
            transferred: 2,
            failed: 0,
            skipped: 0,
            bytes: 10,
            elapsed: Duration::from_secs(1),
        });
        assert!(emitter.transfer().is_none());
    }

    #[test]
    fn test_dry_run_creates_no_bar() {
        let emitter = ConsoleEmitter::new();
        emitter.emit(RetrievalEvent::WorkPlanned {
            units: 2,
            total_bytes: 10,
            workers: 0,
            dry_run: true,
        });
        assert!(emitter.transfer().is_none());
    }
}
