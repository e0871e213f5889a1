//! The record every source produces.
//!
//! `FeedItem` is one dated entry from any source (an RSS item, a Facebook
//! post, ...).  Each source converts its native format into `FeedItem`s so the
//! aggregation and rendering stages stay source-agnostic.

use chrono::NaiveDate;

/// A single entry, normalised from any data source.
///
/// Items carry no ordering of their own: a project's items are put in order
/// by [`crate::aggregate::ProjectAggregator`], which sorts stably on
/// [`FeedItem::date`] so that same-day entries keep their source and fetch
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Calendar date of publication, in the timestamp's own offset.
    pub date: NaiveDate,

    /// Headline shown in the digest.
    pub title: String,

    /// URL of the full content.
    pub link: String,
}

impl FeedItem {
    pub fn new(date: NaiveDate, title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            date,
            title: title.into(),
            link: link.into(),
        }
    }
}
