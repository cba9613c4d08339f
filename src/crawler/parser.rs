//! Text extraction from fetched HTML
//!
//! Turns a downloaded document into the plain text that gets cached:
//! - Every text node under `<html>` is kept, in document order
//! - Text inside `<script>`, `<style>`, `<noscript>` and `<template>` is dropped
//! - Runs of whitespace collapse to a single space

use scraper::Html;

/// Elements whose text content is never part of the extracted page text
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracts the visible text of an HTML document
///
/// # Arguments
///
/// * `html` - The HTML content to parse
///
/// # Returns
///
/// The whitespace-normalized text. Empty if the document has no text.
///
/// # Example
///
/// ```
/// use pagecache::crawler::extract_text;
///
/// let html = r#"<html><head><title>Test</title></head><body><p>Hello   world</p></body></html>"#;
/// assert_eq!(extract_text(html), "Test Hello world");
/// ```
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut words: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| SKIPPED_ELEMENTS.contains(&element.name()))
        });

        if !hidden {
            words.extend(text.split_whitespace());
        }
    }

    words.join(" ")
}
