//! Error taxonomy for a digest run.

use thiserror::Error;

use crate::source::SourceKind;

/// Failure retrieving or decoding a single source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed parse error: {0}")]
    Rss(#[from] rss::Error),

    #[error("unexpected API response: {0}")]
    Api(String),
}

/// Errors that stop a digest from being built.
#[derive(Debug, Error)]
pub enum DigestError {
    #[error("unknown source type `{kind}` in project {project} (source: {location})")]
    UnknownSourceType {
        kind: String,
        project: String,
        location: String,
    },

    #[error("parse error: {project} url: {location} type: {kind}")]
    Fetch {
        project: String,
        location: String,
        kind: SourceKind,
        #[source]
        source: FetchError,
    },

    #[error("missing credentials for {kind} sources: environment variable {var} is not set")]
    MissingCredentials { kind: SourceKind, var: &'static str },
}

/// Failure loading the configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
