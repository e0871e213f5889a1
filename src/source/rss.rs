//! RSS feed source.
//!
//! Fetches a feed over HTTP with a shared blocking [`reqwest`] client and
//! parses it with the [`rss`] crate, which reads RSS 0.9x, 1.0 and 2.0.

use chrono::{DateTime, NaiveDate};
use reqwest::blocking::Client;
use scraper::Html;
use tracing::{debug, debug_span};

use super::{DataSource, FeedItem};
use crate::config::{SourceConfig, TitlePolicy};
use crate::error::FetchError;
use crate::range::DateRange;

/// Longest title, in characters, produced by [`TitlePolicy::Description`].
pub const MAX_DESCRIPTION_TITLE: usize = 101;

/// An RSS feed data source.
pub struct RssSource {
    http: Client,
}

impl RssSource {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Convert an already-fetched [`rss::Channel`] into in-range
    /// [`FeedItem`]s.
    ///
    /// This is a pure function (no I/O) so that tests can exercise the
    /// parsing logic without hitting the network.  Items without a usable
    /// date are dropped.
    pub fn parse_channel(channel: &rss::Channel, range: &DateRange, policy: TitlePolicy) -> Vec<FeedItem> {
        channel
            .items()
            .iter()
            .filter_map(|item| {
                let Some(date) = item_date(item) else {
                    debug!(
                        feed = channel.title(),
                        title = item.title().unwrap_or_default(),
                        pub_date = item.pub_date().unwrap_or_default(),
                        "dropping item without a readable date"
                    );
                    return None;
                };
                if !range.contains(date) {
                    return None;
                }
                Some(FeedItem::new(date, item_title(item, policy), item.link().unwrap_or_default()))
            })
            .collect()
    }
}

impl DataSource for RssSource {
    fn fetch(&self, source: &SourceConfig, range: &DateRange) -> Result<Vec<FeedItem>, FetchError> {
        let _span = debug_span!("rss", url = %source.location).entered();
        let body = self
            .http
            .get(&source.location)
            .send()?
            .error_for_status()?
            .bytes()?;
        let channel = rss::Channel::read_from(body.as_ref())?;
        debug!(url = %source.location, entries = channel.items().len(), "parsed feed");
        Ok(Self::parse_channel(&channel, range, source.title_from))
    }
}

/// `pubDate`, falling back to the RSS 1.0 `dc:date` when it is missing or
/// unreadable.
fn item_date(item: &rss::Item) -> Option<NaiveDate> {
    item.pub_date().and_then(parse_date).or_else(|| {
        item.dublin_core_ext()
            .and_then(|dc| dc.dates().first())
            .and_then(|d| parse_date(d))
    })
}

/// RFC 2822, then RFC 3339, then RFC 2822 with a `UTC`/`Z` zone spelled as
/// `+0000`.  The calendar date is taken in the timestamp's own offset.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    let zoned = raw
        .strip_suffix("UTC")
        .or_else(|| raw.strip_suffix('Z'))
        .map(|rest| format!("{} +0000", rest.trim_end()))?;
    DateTime::parse_from_rfc2822(&zoned).ok().map(|dt| dt.date_naive())
}

fn item_title(item: &rss::Item, policy: TitlePolicy) -> String {
    let title = item.title().unwrap_or("(untitled)");
    match (policy, item.description()) {
        (TitlePolicy::Description, Some(html)) => truncate(&strip_markup(html), MAX_DESCRIPTION_TITLE),
        _ => title.to_string(),
    }
}

/// Text content of an HTML fragment with whitespace runs collapsed.
pub fn strip_markup(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The first `max` characters of `text`.
pub fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn first_week() -> DateRange {
        DateRange::new(d(2024, 1, 1), d(2024, 1, 7)).unwrap()
    }

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <item>
      <title>Before</title>
      <link>https://example.com/0</link>
      <pubDate>Sun, 31 Dec 2023 23:00:00 +0000</pubDate>
    </item>
    <item>
      <title>First Post</title>
      <link>https://example.com/1</link>
      <pubDate>Tue, 02 Jan 2024 12:00:00 +0000</pubDate>
      <description>&lt;p&gt;Hello &lt;b&gt;world&lt;/b&gt;&lt;/p&gt;</description>
    </item>
    <item>
      <title>Last Day</title>
      <link>https://example.com/2</link>
      <pubDate>Sun, 07 Jan 2024 23:59:59 +0000</pubDate>
    </item>
    <item>
      <title>After</title>
      <link>https://example.com/3</link>
      <pubDate>Wed, 10 Jan 2024 09:00:00 +0000</pubDate>
    </item>
    <item>
      <title>Undated</title>
      <link>https://example.com/4</link>
    </item>
  </channel>
</rss>"#;

    fn channel(xml: &str) -> rss::Channel {
        rss::Channel::read_from(xml.as_bytes()).unwrap()
    }

    #[test]
    fn keeps_only_items_within_range() {
        let range = first_week();
        let items = RssSource::parse_channel(&channel(FEED), &range, TitlePolicy::Title);

        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["First Post", "Last Day"]);
        assert!(items.iter().all(|i| range.contains(i.date)));
    }

    #[test]
    fn produces_date_title_and_link() {
        let items = RssSource::parse_channel(&channel(FEED), &first_week(), TitlePolicy::Title);
        assert_eq!(items[0], FeedItem::new(d(2024, 1, 2), "First Post", "https://example.com/1"));
    }

    #[test]
    fn date_uses_the_timestamps_own_offset() {
        let xml = r#"<rss version="2.0"><channel><title>t</title>
<item><title>Late</title><link>l</link><pubDate>Sun, 07 Jan 2024 23:30:00 -0500</pubDate></item>
</channel></rss>"#;
        let items = RssSource::parse_channel(&channel(xml), &first_week(), TitlePolicy::Title);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].date, d(2024, 1, 7));
    }

    #[test]
    fn unparseable_date_is_dropped() {
        let xml = r#"<rss version="2.0"><channel><title>t</title>
<item><title>Bad</title><pubDate>not-a-real-date</pubDate></item>
</channel></rss>"#;
        assert!(RssSource::parse_channel(&channel(xml), &first_week(), TitlePolicy::Title).is_empty());
    }

    #[test]
    fn falls_back_to_dublin_core_date() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>t</title>
    <item>
      <title>DC dated</title>
      <link>https://example.com/dc</link>
      <dc:date>2024-01-03T10:00:00+09:00</dc:date>
    </item>
  </channel>
</rss>"#;
        let items = RssSource::parse_channel(&channel(xml), &first_week(), TitlePolicy::Title);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].date, d(2024, 1, 3));
    }

    #[test]
    fn reads_utc_and_iso_pub_dates() {
        let xml = r#"<rss version="2.0"><channel><title>t</title>
<item><title>Utc</title><pubDate>Tue, 02 Jan 2024 12:00:00 UTC</pubDate></item>
<item><title>Iso</title><pubDate>2024-01-03T12:00:00+09:00</pubDate></item>
<item><title>Zulu</title><pubDate>Thu, 04 Jan 2024 08:00:00 Z</pubDate></item>
</channel></rss>"#;
        let items = RssSource::parse_channel(&channel(xml), &first_week(), TitlePolicy::Title);
        let dates: Vec<_> = items.iter().map(|i| i.date).collect();
        assert_eq!(dates, [d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)]);
    }

    #[test]
    fn malformed_pub_date_falls_back_to_dublin_core() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>t</title>
    <item>
      <title>Odd pubDate</title>
      <link>https://example.com/odd</link>
      <pubDate>sometime last week</pubDate>
      <dc:date>2024-01-05T10:00:00Z</dc:date>
    </item>
  </channel>
</rss>"#;
        let items = RssSource::parse_channel(&channel(xml), &first_week(), TitlePolicy::Title);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].date, d(2024, 1, 5));
    }

    #[test]
    fn parse_date_formats() {
        assert_eq!(parse_date("Mon, 01 Jan 2024 00:00:00 GMT"), Some(d(2024, 1, 1)));
        assert_eq!(parse_date(" 2024-01-06T23:00:00-05:00 "), Some(d(2024, 1, 6)));
        assert_eq!(parse_date("Tue, 02 Jan 2024 12:00:00 UTC"), Some(d(2024, 1, 2)));
        assert_eq!(parse_date("not-a-real-date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn handles_missing_title_and_link() {
        let xml = r#"<rss version="2.0"><channel><title>t</title>
<item><pubDate>Mon, 01 Jan 2024 00:00:00 +0000</pubDate></item>
</channel></rss>"#;
        let items = RssSource::parse_channel(&channel(xml), &first_week(), TitlePolicy::Title);
        assert_eq!(items[0].title, "(untitled)");
        assert_eq!(items[0].link, "");
    }

    #[test]
    fn description_policy_strips_markup() {
        let items = RssSource::parse_channel(&channel(FEED), &first_week(), TitlePolicy::Description);
        assert_eq!(items[0].title, "Hello world");
        // No description: keeps the title.
        assert_eq!(items[1].title, "Last Day");
    }

    #[test]
    fn strip_markup_collapses_whitespace() {
        assert_eq!(strip_markup("<div>\n  one\n\n<span>two</span>  </div>"), "one two");
    }

    #[test]
    fn truncate_limits_long_text_to_max() {
        let long = "あ".repeat(150);
        let cut = truncate(&long, MAX_DESCRIPTION_TITLE);
        assert_eq!(cut.chars().count(), 101);
    }

    #[test]
    fn truncate_leaves_short_text_alone() {
        let exact = "x".repeat(101);
        assert_eq!(truncate(&exact, MAX_DESCRIPTION_TITLE), exact);
        assert_eq!(truncate("short", MAX_DESCRIPTION_TITLE), "short");
    }

    #[test]
    fn fetch_reads_feed_over_http() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/feed.xml")
            .with_status(200)
            .with_header("content-type", "application/rss+xml")
            .with_body(FEED)
            .create();

        let source = SourceConfig {
            kind: "rss".into(),
            location: format!("{}/feed.xml", server.url()),
            title_from: TitlePolicy::Title,
        };
        let items = RssSource::new(Client::new()).fetch(&source, &first_week()).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn fetch_reports_http_errors() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/gone.xml").with_status(404).create();

        let source = SourceConfig {
            kind: "rss".into(),
            location: format!("{}/gone.xml", server.url()),
            title_from: TitlePolicy::Title,
        };
        let err = RssSource::new(Client::new()).fetch(&source, &first_week()).unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
    }

    #[test]
    fn fetch_reports_parse_errors() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/broken.xml")
            .with_status(200)
            .with_body("<html>not a feed</html>")
            .create();

        let source = SourceConfig {
            kind: "rss".into(),
            location: format!("{}/broken.xml", server.url()),
            title_from: TitlePolicy::Title,
        };
        let err = RssSource::new(Client::new()).fetch(&source, &first_week()).unwrap_err();
        assert!(matches!(err, FetchError::Rss(_)));
    }
}
