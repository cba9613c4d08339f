//! HTML report pages
//!
//! Renders the `/view` and `/accesslog` pages. URLs come straight from
//! request query strings, so every interpolated value is escaped.

use crate::cache::CacheEntry;
use chrono::{DateTime, Utc};
use html_escape::encode_text;
use std::collections::BTreeMap;

/// Timestamp format used on report pages
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Renders the list of cached URLs with their last refresh time
///
/// One `<div class='entry'>` block per entry, in the order given.
pub fn render_cache_view(entries: &[CacheEntry]) -> String {
    let mut html = String::from("<h1>Crawled Data</h1>");

    for entry in entries {
        html.push_str(&format!(
            "<div class='entry'><strong>URL:</strong> {}<br><strong>Timestamp:</strong> {}</div>",
            encode_text(&entry.url),
            format_timestamp(&entry.refreshed_at)
        ));
    }

    html
}

/// Renders every URL with its chronological access timestamps
///
/// One `<h2>` heading and `<ul>` list per URL.
pub fn render_access_log(records: &BTreeMap<String, Vec<DateTime<Utc>>>) -> String {
    let mut html = String::from("<h1>Access Log</h1>");

    for (url, times) in records {
        html.push_str(&format!("<h2>URL: {}</h2>", encode_text(url)));
        html.push_str("<ul>");
        for time in times {
            html.push_str(&format!("<li>{}</li>", format_timestamp(time)));
        }
        html.push_str("</ul>");
    }

    html
}
