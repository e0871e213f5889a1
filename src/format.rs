//! Markdown rendering.  Pure functions, no I/O.

use crate::aggregate::ProjectReport;
use crate::range::DateRange;
use crate::source::FeedItem;

/// How the digest opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderStyle {
    /// Static-site front matter (`layout`, `title`, `date`).
    #[default]
    FrontMatter,
    /// A one-line `<start> 〜 <end>` banner.
    Plain,
}

/// `* <date> [<title>](<link>)` on its own line.
pub fn render_item(item: &FeedItem) -> String {
    format!("* {} [{}]({})\n", item.date, escape_title(&item.title), item.link)
}

/// Level-1 heading, blank line, then one bullet per item.
pub fn render_project(report: &ProjectReport<'_>) -> String {
    let project = report.project;
    let mut out = match &project.display_url {
        Some(url) => format!("# [{}]({})", project.name, url),
        None => format!("# {}", project.name),
    };
    out.push_str("\n\n");
    for item in &report.items {
        out.push_str(&render_item(item));
    }
    out
}

/// Opening of the digest, dated by the last day of `range`, followed by a
/// blank line.
pub fn render_header(range: &DateRange, style: HeaderStyle) -> String {
    let end = range.end();
    match style {
        HeaderStyle::FrontMatter => format!(
            "---\nlayout: post\ntitle:  \"{}までの各ユニットの活動\"\ndate:   {} 00:00:00\n---\n\n",
            end.format("%Y年%m月%d日"),
            end,
        ),
        HeaderStyle::Plain => format!("{} 〜 {}\n\n", range.start(), end),
    }
}

/// Header followed by the non-empty project sections, one blank line apart.
pub fn render_digest(range: &DateRange, reports: &[ProjectReport<'_>], style: HeaderStyle) -> String {
    let sections: Vec<String> = reports
        .iter()
        .filter(|report| !report.is_empty())
        .map(render_project)
        .collect();
    let mut out = render_header(range, style);
    out.push_str(&sections.join("\n"));
    out
}

/// Single line, with link-text brackets escaped.
fn escape_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('[', "\\[")
        .replace(']', "\\]")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
