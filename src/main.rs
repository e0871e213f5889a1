//! weekly-digest — a weekly markdown report of project activity.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ per project ┌──────────────┐ per source ┌───────────┐
//! │ digest.rs │ ──────────► │ aggregate.rs │ ─────────► │ source/   │
//! │ (select)  │             │ (merge, sort)│  (threads) │ rss, fb   │
//! └───────────┘             └──────────────┘            └───────────┘
//!       │
//!       ▼
//! ┌───────────┐
//! │ format.rs │  markdown
//! └───────────┘
//! ```
//!
//! * **`source/`** — the `DataSource` trait, the `SourceKind` lookup table
//!   and the RSS / Facebook implementations.
//! * **`aggregate`** — fetches a project's sources and orders the items.
//! * **`digest`** — picks the target projects and drops quiet ones.
//! * **`format`** — pure markdown rendering.
//! * **`config`**, **`range`**, **`error`** — shared types.
//! * **`main`** — parses arguments, wires the registry, prints the digest.

mod aggregate;
mod config;
mod digest;
mod error;
mod format;
mod range;
mod source;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use reqwest::blocking::Client;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use aggregate::FailurePolicy;
use config::Config;
use digest::{DigestBuilder, Target};
use error::DigestError;
use format::HeaderStyle;
use range::DateRange;
use source::{Credentials, FacebookSource, RssSource, SourceKind, SourceRegistry};

#[derive(Parser, Debug)]
#[command(name = "weekly-digest", about = "Weekly markdown digest of project activity")]
struct Args {
    /// Project to report on, or `all`
    #[arg(default_value = "all")]
    project: String,

    /// Path to the YAML project list
    #[arg(long, value_name = "FILE", default_value = "config.yml")]
    config: PathBuf,

    /// Report on the week before this date (default: today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,

    /// Digest header format
    #[arg(long, value_enum, default_value_t = HeaderArg::FrontMatter)]
    header: HeaderArg,

    /// Log and skip sources that fail to fetch instead of aborting
    #[arg(long)]
    skip_failed: bool,

    /// Per-request HTTP timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,
}

/// Command-line spelling of [`HeaderStyle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HeaderArg {
    /// Static-site front matter (`layout`, `title`, `date`)
    FrontMatter,
    /// A one-line `<start> 〜 <end>` banner
    Plain,
}

impl From<HeaderArg> for HeaderStyle {
    fn from(arg: HeaderArg) -> Self {
        match arg {
            HeaderArg::FrontMatter => HeaderStyle::FrontMatter,
            HeaderArg::Plain => HeaderStyle::Plain,
        }
    }
}

fn init_tracing() {
    // Logs go to stderr; stdout carries the digest.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
}

/// One shared HTTP client; Facebook only when credentials are present.
fn build_registry(http: Client) -> Result<SourceRegistry> {
    let mut registry = SourceRegistry::new();
    registry.register(SourceKind::Rss, Box::new(RssSource::new(http.clone())));
    match Credentials::from_env() {
        Ok(credentials) => {
            registry.register(SourceKind::Facebook, Box::new(FacebookSource::new(http, credentials)));
        }
        Err(DigestError::MissingCredentials { var, .. }) => {
            debug!(var, "facebook sources unavailable");
            registry.mark_unavailable(SourceKind::Facebook, var);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(registry)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();

    // -- parse arguments -----------------------------------------------------
    let args = Args::parse();

    // -- load the project list -----------------------------------------------
    let config = Config::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    // -- configure data sources ----------------------------------------------
    let http = Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;
    let registry = build_registry(http)?;

    // -- build and print the digest ------------------------------------------
    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    let range = DateRange::last_week(today);
    let policy = if args.skip_failed {
        FailurePolicy::Skip
    } else {
        FailurePolicy::Abort
    };
    info!(%range, project = %args.project, "reporting");

    let digest = DigestBuilder::new(&registry, policy, args.header.into())
        .build(&config.targets, &range, &Target::from(args.project.as_str()))
        .context("failed to build digest")?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(digest.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["weekly-digest"]).unwrap();
        assert_eq!(args.project, "all");
        assert_eq!(args.config, PathBuf::from("config.yml"));
        assert_eq!(HeaderStyle::from(args.header), HeaderStyle::FrontMatter);
        assert!(args.date.is_none());
        assert!(!args.skip_failed);
        assert_eq!(args.timeout, 30);
    }

    #[test]
    fn parses_project_date_and_header() {
        let args = Args::try_parse_from([
            "weekly-digest",
            "Alpha",
            "--date",
            "2024-01-10",
            "--header",
            "plain",
            "--skip-failed",
        ])
        .unwrap();
        assert_eq!(Target::from(args.project.as_str()), Target::Project("Alpha".into()));
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 1, 10));
        assert_eq!(HeaderStyle::from(args.header), HeaderStyle::Plain);
        assert!(args.skip_failed);
    }

    #[test]
    fn rejects_zero_timeout() {
        assert!(Args::try_parse_from(["weekly-digest", "--timeout", "0"]).is_err());
        let args = Args::try_parse_from(["weekly-digest", "--timeout", "5"]).unwrap();
        assert_eq!(args.timeout, 5);
    }

    #[test]
    fn rejects_bad_date() {
        assert!(Args::try_parse_from(["weekly-digest", "--date", "last tuesday"]).is_err());
    }
}
