//! The configuration document: which projects to report on and where their
//! activity comes from.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, DigestError};
use crate::source::SourceKind;

/// The whole document; only `targets` is read.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub targets: Vec<ProjectConfig>,
}

impl Config {
    /// Read and parse the YAML file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// A named project and the sources tracking its activity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    /// Link for the project heading.
    #[serde(default, rename = "url")]
    pub display_url: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// One content origin of a project.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    /// Raw `type` value; resolved with [`SourceConfig::kind`].
    #[serde(rename = "type")]
    pub kind: String,
    /// Feed URL or page identifier.
    #[serde(rename = "url", alias = "id")]
    pub location: String,
    #[serde(default)]
    pub title_from: TitlePolicy,
}

impl SourceConfig {
    /// Resolve the `type` string, attributing failures to `project`.
    pub fn kind(&self, project: &str) -> Result<SourceKind, DigestError> {
        self.kind
            .parse()
            .map_err(|_| DigestError::UnknownSourceType {
                kind: self.kind.clone(),
                project: project.to_string(),
                location: self.location.clone(),
            })
    }
}

/// Where a feed entry's displayed title comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitlePolicy {
    /// The entry's own title, verbatim.
    #[default]
    Title,
    /// The entry's description with markup stripped, truncated.
    Description,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
