//! Survey identifier resolution.
//!
//! Walks the bucket hierarchy depth first with an explicit stack and turns
//! survey identifiers into concrete key prefixes. Each frame owns its own
//! pagination state and only asks for its next page once the children it
//! already has are used up, so listing calls interleave with descent the same
//! way nested paginators would.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use clug_core::{
    HierarchyLayout, ListRequest, ObjectListerPort, ResolvedSurveys, RetrievalError,
    RetrievalEvent, RetrievalEventEmitterPort, SurveyMatch, distinct_surveys,
};

/// One group prefix on the walk stack.
struct Frame {
    prefix: String,
    depth: usize,
    children: VecDeque<String>,
    continuation: Option<String>,
    listed: bool,
}

impl Frame {
    const fn new(prefix: String, depth: usize) -> Self {
        Self {
            prefix,
            depth,
            children: VecDeque::new(),
            continuation: None,
            listed: false,
        }
    }

    /// True once every page of this group has been fetched.
    const fn exhausted(&self) -> bool {
        self.listed && self.continuation.is_none()
    }
}

/// Resolves survey identifiers to key prefixes using the lister port.
pub struct PrefixResolver {
    lister: Arc<dyn ObjectListerPort>,
    emitter: Arc<dyn RetrievalEventEmitterPort>,
    layout: HierarchyLayout,
}

impl PrefixResolver {
    /// Create a new resolver.
    pub fn new(
        lister: Arc<dyn ObjectListerPort>,
        emitter: Arc<dyn RetrievalEventEmitterPort>,
        layout: HierarchyLayout,
    ) -> Self {
        Self {
            lister,
            emitter,
            layout,
        }
    }

    /// Find the prefix of every requested survey.
    ///
    /// Matching is exact and case-sensitive against the last segment of a
    /// group at survey depth. Duplicate identifiers count once and only the
    /// first occurrence of a survey in walk order is kept. The walk ends
    /// immediately after the last identifier is found. Identifiers that never
    /// match are reported in `missing`, which is not an error.
    pub async fn resolve(&self, surveys: &[String]) -> Result<ResolvedSurveys, RetrievalError> {
        let requested = distinct_surveys(surveys);
        let mut pending: HashSet<&str> = requested.iter().map(String::as_str).collect();
        let mut matches = Vec::new();

        self.emitter.emit(RetrievalEvent::ResolutionStarted {
            requested: requested.clone(),
            root: self.layout.root_prefix.clone(),
        });
        tracing::info!(
            surveys = requested.len(),
            root = %self.layout.root_prefix,
            "Resolving survey prefixes"
        );

        let survey_depth = self.layout.survey_depth.max(1);
        let mut stack = if pending.is_empty() {
            Vec::new()
        } else {
            vec![Frame::new(self.layout.root_prefix.clone(), 0)]
        };

        while let Some(frame) = stack.last_mut() {
            if let Some(child) = frame.children.pop_front() {
                let depth = frame.depth + 1;
                if depth < survey_depth {
                    stack.push(Frame::new(child, depth));
                    continue;
                }

                let name = self.layout.basename(&child);
                if let Some(survey) = pending.take(name) {
                    tracing::debug!(survey = %survey, prefix = %child, "Matched survey");
                    self.emitter.emit(RetrievalEvent::SurveyMatched {
                        survey: survey.to_string(),
                        prefix: child.clone(),
                    });
                    matches.push(SurveyMatch {
                        survey: survey.to_string(),
                        prefix: child,
                    });
                    if pending.is_empty() {
                        break;
                    }
                }
                continue;
            }

            if frame.exhausted() {
                stack.pop();
                continue;
            }

            if !frame.listed {
                self.emitter.emit(RetrievalEvent::ScanningGroup {
                    prefix: frame.prefix.clone(),
                    depth: frame.depth,
                });
            }

            let request = ListRequest::groups(frame.prefix.clone(), self.layout.delimiter)
                .with_continuation(frame.continuation.take());
            let page = self
                .lister
                .list_page(&request)
                .await
                .map_err(|source| RetrievalError::Listing {
                    prefix: frame.prefix.clone(),
                    source,
                })?;

            tracing::debug!(
                prefix = %frame.prefix,
                groups = page.groups.len(),
                more = page.has_more(),
                "Listed group page"
            );

            frame.listed = true;
            frame.children.extend(page.groups);
            frame.continuation = page.next_continuation;
        }

        let missing: Vec<String> = requested
            .iter()
            .filter(|s| pending.contains(s.as_str()))
            .cloned()
            .collect();

        self.emitter.emit(RetrievalEvent::ResolutionFinished {
            found: matches.len(),
            requested: requested.len(),
            missing: missing.clone(),
        });
        tracing::info!(
            found = matches.len(),
            requested = requested.len(),
            "Found {} of {} surveys",
            matches.len(),
            requested.len()
        );

        Ok(ResolvedSurveys { matches, missing })
    }
}
