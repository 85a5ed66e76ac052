//! Free-text sanitization passes.
//!
//! Each pass is a function `&str -> String` applied in sequence. The first
//! three passes are idempotent; [`escape_quotes`] is not and must run exactly
//! once per field per output.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full sanitizer on a free-text field.
pub fn sanitize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    escape_quotes(&plain_text(text))
}

/// Entity decoding, line-ending collapsing and tag stripping, without escaping.
///
/// The passes repeat until the text stops changing, so double-encoded
/// entities and tags exposed by an inner strip are removed too. Every
/// changing round shortens the text or removes its last line ending, so the
/// loop terminates.
pub(crate) fn plain_text(text: &str) -> String {
    let mut result = text.to_string();
    loop {
        let next = strip_tags(&collapse_line_endings(&decode_entities(&result)));
        if next == result {
            return result;
        }
        result = next;
    }
}

// ---------------------------------------------------------------------------
// Pass 1: Decode the handled entities
// ---------------------------------------------------------------------------

/// Replace curly single quotes, `&amp;` and `&nbsp;` with their plain forms.
///
/// Both the named entities and the already-decoded characters are handled,
/// since parsed rich text arrives with entities decoded.
fn decode_entities(text: &str) -> String {
    text.replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace("&amp;", "&")
        .replace("&nbsp;", " ")
        .replace('\u{a0}', " ")
}

// ---------------------------------------------------------------------------
// Pass 2: Collapse line endings
// ---------------------------------------------------------------------------

/// Turn each line-ending sequence (CRLF + tab, CRLF, CR, LF) into one space.
fn collapse_line_endings(text: &str) -> String {
    static EOL_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\r\n\t|\r\n|\r|\n").expect("valid regex"));

    EOL_RE.replace_all(text, " ").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Strip markup
// ---------------------------------------------------------------------------

/// Remove every tag (and comment), keeping inner text.
fn strip_tags(text: &str) -> String {
    static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
        // A `<` must be followed by a name, `/`, `!` or `?` to count as markup,
        // so comparisons like `a < b` survive.
        Regex::new(r"<!--.*?-->|</?[A-Za-z!?][^>]*>").expect("valid regex")
    });

    TAG_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 4: Escape
// ---------------------------------------------------------------------------

/// Backslash-escape backslashes and double quotes.
fn escape_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
