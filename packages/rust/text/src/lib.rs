//! Text sanitization and rich-text extraction.
//!
//! Free-text fields pass through [`sanitize`] before they are embedded in the
//! export document. Rich-text fields (bibliographies, learning objectives) are
//! parsed leniently with `scraper` and split into entries; malformed markup is
//! recovered by the HTML5 parser and never fails.

mod sanitize;

use scraper::{Html, Selector};
use sha2::{Digest, Sha256};
use tracing::debug;

pub use sanitize::sanitize;

/// Display-label length limit, in characters.
pub const LABEL_MAX_CHARS: usize = 255;

// ---------------------------------------------------------------------------
// Plain text
// ---------------------------------------------------------------------------

/// Markup-free, single-line text of a rich-text field, without escaping.
///
/// Runs the idempotent sanitizer passes and trims the result; feeding the
/// output to [`sanitize`] later only adds the escaping.
pub fn plain_text(html: &str) -> String {
    sanitize::plain_text(html).trim().to_string()
}

// ---------------------------------------------------------------------------
// Rich-text extraction
// ---------------------------------------------------------------------------

/// Split a bibliography field into paragraph-level entries.
///
/// Each `<p>` element yields its text content. A field without paragraph
/// markup falls back to its non-empty text lines. Entries are returned
/// untrimmed; whitespace-only entries are left for the caller to drop.
pub fn paragraphs(html: &str) -> Vec<String> {
    if html.trim().is_empty() {
        return Vec::new();
    }

    let doc = parse_fragment(html);
    let p_sel = Selector::parse("p").expect("valid selector");

    let entries: Vec<String> = doc
        .select(&p_sel)
        .map(|el| el.text().collect::<String>())
        .collect();

    if !entries.is_empty() {
        return entries;
    }

    doc.root_element()
        .text()
        .collect::<String>()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Extract the text of every list item (`<li>`) in a rich-text field.
///
/// Nested items are returned both on their own and as part of their parent's
/// text, in document order.
pub fn list_items(html: &str) -> Vec<String> {
    if html.trim().is_empty() {
        return Vec::new();
    }

    let doc = parse_fragment(html);
    let li_sel = Selector::parse("li").expect("valid selector");

    doc.select(&li_sel)
        .map(|el| el.text().collect::<String>())
        .collect()
}

/// Parse a fragment, logging (and otherwise ignoring) recoverable errors.
fn parse_fragment(html: &str) -> Html {
    let doc = Html::parse_fragment(html);
    if !doc.errors.is_empty() {
        debug!(
            errors = doc.errors.len(),
            "rich text parsed with recoverable errors"
        );
    }
    doc
}

// ---------------------------------------------------------------------------
// Keys and truncation
// ---------------------------------------------------------------------------

/// Deduplication key for a text entity: SHA-256 hex of the trimmed text.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.trim().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The first `max` characters of `text` (character count, not bytes).
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
