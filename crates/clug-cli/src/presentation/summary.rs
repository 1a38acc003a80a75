//! Final summary of a successful run.

use clug_core::{RetrievalOutcome, format_gb};

/// Lines printed after the pipeline returns `Ok`.
pub fn outcome_lines(outcome: &RetrievalOutcome) -> Vec<String> {
    match outcome {
        RetrievalOutcome::NoSurveysFound => {
            vec!["No matching surveys found, nothing to download".to_string()]
        }
        RetrievalOutcome::DryRun { surveys, plan } => {
            let mut lines: Vec<String> = surveys
                .matches
                .iter()
                .map(|m| format!("{} -> {}", m.survey, m.prefix))
                .collect();
            lines.extend(
                plan.units
                    .iter()
                    .map(|unit| format!("  {} ({} bytes)", unit.key, unit.size)),
            );
            lines.push(format!(
                "Would download {} files ({})",
                plan.len(),
                format_gb(plan.total_bytes)
            ));
            lines
        }
        RetrievalOutcome::Completed { surveys, report } => {
            let mut lines = vec![format!(
                "Retrieved {} of {} requested surveys: {} files, {}",
                surveys.matches.len(),
                surveys.matches.len() + surveys.missing.len(),
                report.transferred,
                format_gb(report.bytes)
            )];
            if !surveys.missing.is_empty() {
                lines.push(format!("Not found: {}", surveys.missing.join(", ")));
            }
            lines
        }
    }
}
