//! Digest orchestration: select projects, aggregate each, render.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::aggregate::{FailurePolicy, ProjectAggregator, ProjectReport};
use crate::config::ProjectConfig;
use crate::error::DigestError;
use crate::format::{render_digest, HeaderStyle};
use crate::range::DateRange;
use crate::source::SourceRegistry;

/// Which projects a digest covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    All,
    /// Every project with exactly this name.
    Project(String),
}

impl Target {
    fn selects(&self, project: &ProjectConfig) -> bool {
        match self {
            Target::All => true,
            Target::Project(name) => project.name == *name,
        }
    }
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        match s {
            "all" => Target::All,
            name => Target::Project(name.to_string()),
        }
    }
}

impl FromStr for Target {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Target::from(s))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::All => f.write_str("all"),
            Target::Project(name) => f.write_str(name),
        }
    }
}

/// The projects with activity in `range`, in configured order.
#[derive(Debug)]
pub struct Digest<'a> {
    pub range: DateRange,
    pub reports: Vec<ProjectReport<'a>>,
}

impl Digest<'_> {
    /// Markdown for the whole digest.
    pub fn render(&self, style: HeaderStyle) -> String {
        render_digest(&self.range, &self.reports, style)
    }
}

/// Top-level orchestration of a run.
///
/// Selects projects, validates all their sources up front, aggregates each
/// in configured order, and renders the result with the chosen header.
pub struct DigestBuilder<'r> {
    aggregator: ProjectAggregator<'r>,
    header: HeaderStyle,
}

impl<'r> DigestBuilder<'r> {
    pub fn new(registry: &'r SourceRegistry, policy: FailurePolicy, header: HeaderStyle) -> Self {
        Self {
            aggregator: ProjectAggregator::new(registry, policy),
            header,
        }
    }

    /// Aggregate the selected projects, dropping those without items.
    ///
    /// Every selected source is validated before anything is fetched, so a
    /// configuration mistake or missing credential fails without network
    /// traffic.
    pub fn collect<'a>(&self, projects: &'a [ProjectConfig], range: &DateRange, target: &Target) -> Result<Digest<'a>, DigestError> {
        let selected: Vec<&ProjectConfig> = projects.iter().filter(|p| target.selects(p)).collect();
        for project in &selected {
            self.aggregator.validate(project)?;
        }
        info!(%target, projects = selected.len(), %range, "building digest");

        let mut reports = Vec::new();
        for project in selected {
            let report = self.aggregator.aggregate(project, range)?;
            if !report.is_empty() {
                reports.push(report);
            }
        }
        Ok(Digest { range: *range, reports })
    }

    /// [`DigestBuilder::collect`], rendered to markdown.
    pub fn build(&self, projects: &[ProjectConfig], range: &DateRange, target: &Target) -> Result<String, DigestError> {
        Ok(self.collect(projects, range, target)?.render(self.header))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
