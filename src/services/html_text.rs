//! HTML helpers for bookmark enrichment.
//!
//! Pulls the document title and a plain-text rendition of a fetched page.
//! These are heuristics over raw markup, not a parser; they only need to be
//! good enough to label a bookmark and feed a summarizer.

use std::sync::LazyLock;

use regex::Regex;

static RE_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("static regex"));
static RE_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("static regex"));
static RE_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("static regex"));
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static regex"));
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Returns the trimmed text of the first `<title>` element, if it has any.
pub fn extract_title(html: &str) -> Option<String> {
    let raw = RE_TITLE.captures(html)?.get(1)?.as_str();
    let title = collapse_whitespace(&decode_entities(raw));
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Visible text of a page, at most `max_chars` characters.
///
/// Drops `<script>` and `<style>` blocks with their contents, replaces every
/// other tag with a space and collapses whitespace runs.
pub fn visible_text(html: &str, max_chars: usize) -> String {
    let without_scripts = RE_SCRIPT.replace_all(html, "");
    let without_styles = RE_STYLE.replace_all(&without_scripts, "");
    let without_tags = RE_TAG.replace_all(&without_styles, " ");
    let text = collapse_whitespace(&without_tags);
    truncate_chars(&text, max_chars).to_string()
}

/// Longest prefix of `s` with at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn collapse_whitespace(s: &str) -> String {
    RE_WHITESPACE.replace_all(s, " ").trim().to_string()
}

/// Decodes the handful of entities that routinely appear in titles.
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
