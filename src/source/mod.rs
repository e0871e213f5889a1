//! Data source abstraction layer.
//!
//! This module defines the [`DataSource`] trait, the [`SourceKind`] values a
//! configuration may name, and the [`SourceRegistry`] that maps each kind to
//! its fetcher.  Concrete sources live in sub-modules ([`rss`] and
//! [`facebook`]).
//!
//! ## Adding a new source kind
//!
//! 1. Create a new file in this directory (e.g. `atom.rs`) and implement
//!    [`DataSource`] for it.
//! 2. Add a [`SourceKind`] variant and its configuration name in
//!    [`SourceKind::as_str`] / `FromStr`.
//! 3. Register an instance in `main.rs`.

pub mod facebook;
mod feed_item;
pub mod rss;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub use self::facebook::{Credentials, FacebookSource};
pub use self::feed_item::FeedItem;
pub use self::rss::RssSource;

use crate::config::SourceConfig;
use crate::error::{DigestError, FetchError};
use crate::range::DateRange;

/// The source types a configuration may name in its `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Rss,
    Facebook,
}

impl SourceKind {
    /// The name used in a configuration's `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Rss => "rss",
            SourceKind::Facebook => "facebook",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `type` value naming no [`SourceKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind;

impl FromStr for SourceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rss" => Ok(SourceKind::Rss),
            "facebook" => Ok(SourceKind::Facebook),
            _ => Err(UnknownKind),
        }
    }
}

// ---------------------------------------------------------------------------
// Source trait and registry
// ---------------------------------------------------------------------------

/// Trait that every data source must implement.
///
/// Sources of one project are fetched from scoped threads, so
/// implementations must be [`Send`] and [`Sync`].
pub trait DataSource: Send + Sync {
    /// Fetch the entries of `source` dated within `range`.
    ///
    /// Implementations do their own HTTP work and return only in-range
    /// items, in the order the provider listed them.
    fn fetch(&self, source: &SourceConfig, range: &DateRange) -> Result<Vec<FeedItem>, FetchError>;
}

/// Lookup table from [`SourceKind`] to the fetcher serving it.
///
/// A kind can also be registered as unavailable, recording the environment
/// variable whose absence disabled it, so that lookups fail with
/// [`DigestError::MissingCredentials`] instead of a later, vaguer error.
#[derive(Default)]
pub struct SourceRegistry {
    sources: HashMap<SourceKind, Box<dyn DataSource>>,
    unavailable: HashMap<SourceKind, &'static str>,
}

impl SourceRegistry {
    /// An empty registry; every lookup fails until kinds are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `kind` with `source`, replacing any earlier registration.
    pub fn register(&mut self, kind: SourceKind, source: Box<dyn DataSource>) -> &mut Self {
        self.unavailable.remove(&kind);
        self.sources.insert(kind, source);
        self
    }

    /// Mark `kind` as unusable because `var` is not set.
    pub fn mark_unavailable(&mut self, kind: SourceKind, var: &'static str) -> &mut Self {
        self.sources.remove(&kind);
        self.unavailable.insert(kind, var);
        self
    }

    /// The fetcher for `kind`, or [`DigestError::MissingCredentials`] naming
    /// the variable that disabled it.
    pub fn lookup(&self, kind: SourceKind) -> Result<&dyn DataSource, DigestError> {
        if let Some(source) = self.sources.get(&kind) {
            return Ok(source.as_ref());
        }
        let var = self.unavailable.get(&kind).copied().unwrap_or("(not registered)");
        Err(DigestError::MissingCredentials { kind, var })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
