//! Per-project aggregation: fetch every source, merge, order.
//!
//! Sources of one project are fetched concurrently on scoped threads and
//! joined in declaration order, then stably sorted by date.  Same-day items
//! therefore keep source order, then the order the provider listed them,
//! so repeated runs over the same input render identically.

use std::thread;

use tracing::{error, info, warn};

use crate::config::{ProjectConfig, SourceConfig};
use crate::error::DigestError;
use crate::range::DateRange;
use crate::source::{FeedItem, SourceRegistry};

/// What to do when one source cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Fail the whole run.
    #[default]
    Abort,
    /// Log, drop the source, keep going.
    Skip,
}

/// A project's items for one run, in digest order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReport<'a> {
    pub project: &'a ProjectConfig,
    pub items: Vec<FeedItem>,
}

impl ProjectReport<'_> {
    /// Empty reports are left out of the digest entirely.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Turns one project's configuration into a [`ProjectReport`].
///
/// Holds no per-run state beyond the shared registry, so one aggregator
/// serves every project of a digest.
pub struct ProjectAggregator<'r> {
    registry: &'r SourceRegistry,
    policy: FailurePolicy,
}

impl<'r> ProjectAggregator<'r> {
    pub fn new(registry: &'r SourceRegistry, policy: FailurePolicy) -> Self {
        Self { registry, policy }
    }

    /// Check that every source of `project` names a known, usable kind.
    ///
    /// Performs no I/O.
    pub fn validate(&self, project: &ProjectConfig) -> Result<(), DigestError> {
        for source in &project.sources {
            let kind = source.kind(&project.name)?;
            self.registry.lookup(kind)?;
        }
        Ok(())
    }

    /// Fetch every source of `project` and merge the items in date order.
    ///
    /// Under [`FailurePolicy::Skip`] a failing source contributes nothing;
    /// under [`FailurePolicy::Abort`] its error is returned.
    pub fn aggregate<'a>(&self, project: &'a ProjectConfig, range: &DateRange) -> Result<ProjectReport<'a>, DigestError> {
        self.validate(project)?;

        let results: Vec<Result<Vec<FeedItem>, DigestError>> = thread::scope(|scope| {
            let handles: Vec<_> = project
                .sources
                .iter()
                .map(|source| scope.spawn(move || self.fetch_source(project, source, range)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        let mut items = Vec::new();
        for result in results {
            match result {
                Ok(fetched) => items.extend(fetched),
                Err(e) if self.policy == FailurePolicy::Skip => {
                    warn!(project = %project.name, error = %e, "skipping source");
                }
                Err(e) => return Err(e),
            }
        }
        items.sort_by_key(|item| item.date);

        info!(project = %project.name, items = items.len(), "aggregated project");
        Ok(ProjectReport { project, items })
    }

    fn fetch_source(&self, project: &ProjectConfig, source: &SourceConfig, range: &DateRange) -> Result<Vec<FeedItem>, DigestError> {
        let kind = source.kind(&project.name)?;
        self.registry
            .lookup(kind)?
            .fetch(source, range)
            .map_err(|e| {
                error!(
                    project = %project.name,
                    location = %source.location,
                    kind = %kind,
                    error = %e,
                    "parse error"
                );
                DigestError::Fetch {
                    project: project.name.clone(),
                    location: source.location.clone(),
                    kind,
                    source: e,
                }
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
