//! Facebook page timeline source, read through the Graph API.

use std::env;
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use super::{DataSource, FeedItem, SourceKind};
use crate::config::SourceConfig;
use crate::error::{DigestError, FetchError};
use crate::range::DateRange;

pub const GRAPH_API_URL: &str = "https://graph.facebook.com/v19.0";

pub const CLIENT_ID_VAR: &str = "FACEBOOK_CLIENT_ID";
pub const SECRET_VAR: &str = "FACEBOOK_SECRET_ID";
pub const TOKEN_VAR: &str = "FACEBOOK_TOKEN";

/// Graph API credentials, provisioned out of band.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
}

impl Credentials {
    /// Read all three credentials from the environment.
    pub fn from_env() -> Result<Self, DigestError> {
        let read = |var: &'static str| {
            env::var(var).map_err(|_| DigestError::MissingCredentials {
                kind: SourceKind::Facebook,
                var,
            })
        };
        Ok(Self {
            client_id: read(CLIENT_ID_VAR)?,
            client_secret: read(SECRET_VAR)?,
            access_token: read(TOKEN_VAR)?,
        })
    }

    /// The access token, or the app token `id|secret` when it is empty.
    fn token(&self) -> String {
        if self.access_token.is_empty() {
            format!("{}|{}", self.client_id, self.client_secret)
        } else {
            self.access_token.clone()
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct Page {
    link: String,
}

#[derive(Debug, Deserialize)]
struct Timeline {
    #[serde(default)]
    data: Option<Vec<Post>>,
    #[serde(default)]
    paging: Option<Paging>,
}

impl Timeline {
    /// Whether the API has another page beyond this one.
    fn has_more(&self) -> bool {
        self.paging.as_ref().is_some_and(|p| p.next.is_some())
    }
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: String,
    #[serde(default)]
    message: Option<String>,
    created_time: String,
}

/// A Facebook page's timeline as a data source.
///
/// Constructed once per run; the same session serves every page.
pub struct FacebookSource {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

impl FacebookSource {
    /// A session against the public Graph API.
    pub fn new(http: Client, credentials: Credentials) -> Self {
        Self::with_base_url(http, credentials, GRAPH_API_URL)
    }

    /// A session against another Graph endpoint (a proxy or a test server).
    pub fn with_base_url(http: Client, credentials: Credentials, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Canonical public URL of the page.
    fn page_link(&self, page_id: &str) -> Result<String, FetchError> {
        let page: Page = self
            .http
            .get(format!("{}/{}", self.base_url, page_id))
            .query(&[("fields", "link".to_string()), ("access_token", self.credentials.token())])
            .send()?
            .error_for_status()?
            .json()?;
        Ok(page.link.trim_end_matches('/').to_string())
    }

    fn posts(&self, page_id: &str, range: &DateRange) -> Result<Vec<Post>, FetchError> {
        // `until` is exclusive at midnight, so ask for the day after the range.
        let until = range.end() + Duration::days(1);
        let timeline: Timeline = self
            .http
            .get(format!("{}/{}/feed", self.base_url, page_id))
            .query(&[
                ("fields", "id,message,created_time".to_string()),
                ("since", range.start().to_string()),
                ("until", until.to_string()),
                ("access_token", self.credentials.token()),
            ])
            .send()?
            .error_for_status()?
            .json()?;
        if timeline.has_more() {
            debug!(page = page_id, "timeline has more posts than one page; later pages are not read");
        }
        Ok(timeline.data.unwrap_or_default())
    }
}

impl DataSource for FacebookSource {
    fn fetch(&self, source: &SourceConfig, range: &DateRange) -> Result<Vec<FeedItem>, FetchError> {
        let page_id = source.location.as_str();
        let link = self.page_link(page_id)?;
        let posts = self.posts(page_id, range)?;
        debug!(page = page_id, posts = posts.len(), "fetched timeline");

        let mut items = Vec::with_capacity(posts.len());
        for post in posts {
            let date = created_date(&post.created_time)?;
            if !range.contains(date) {
                continue;
            }
            let title = post.message.unwrap_or_else(|| "(untitled)".to_string());
            items.push(FeedItem::new(date, title, format!("{}/posts/{}", link, post_suffix(&post.id))));
        }
        Ok(items)
    }
}

/// Graph timestamps look like `2024-01-02T10:00:00+0000`.
fn created_date(created_time: &str) -> Result<NaiveDate, FetchError> {
    DateTime::parse_from_str(created_time, "%Y-%m-%dT%H:%M:%S%z")
        .map(|dt| dt.date_naive())
        .map_err(|e| FetchError::Api(format!("bad created_time `{created_time}`: {e}")))
}

/// Post ids are `<page id>_<post id>`; the public URL uses the latter.
fn post_suffix(id: &str) -> &str {
    id.rsplit('_').next().unwrap_or(id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
