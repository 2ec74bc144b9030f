//! crates/lectern_core/src/ingest/markup.rs
//!
//! Minimal HTML-to-text stripping for EPUB content documents. This is not a
//! general HTML renderer: chapters only need readable plain text, so script
//! and style blocks are dropped, tags are removed, a handful of common
//! entities are decoded and whitespace runs collapse to single spaces.

use std::sync::OnceLock;

use regex::Regex;

use crate::chunker::normalize_whitespace;

fn script_style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").unwrap())
}

fn comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").unwrap())
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&[a-zA-Z0-9#]+;").unwrap())
}

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h[1-3][^>]*>(.*?)</h[1-3]\s*>").unwrap())
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<(?:b|strong)[^>]*>(.*?)</(?:b|strong)\s*>").unwrap())
}

/// Strips markup from an HTML fragment and collapses whitespace.
pub fn html_to_text(html: &str) -> String {
    let without_blocks = script_style_re().replace_all(html, " ");
    let without_comments = comment_re().replace_all(&without_blocks, " ");
    // Tags become spaces so adjacent block elements do not fuse words.
    let without_tags = tag_re().replace_all(&without_comments, " ");
    let decoded = decode_entities(&without_tags);
    normalize_whitespace(&decoded)
}

/// Derives a chapter title from its markup: the first `h1`/`h2`/`h3`
/// heading, else the first bold run, else `None`.
pub fn extract_title(html: &str) -> Option<String> {
    for re in [heading_re(), bold_re()] {
        if let Some(captures) = re.captures(html) {
            let title = html_to_text(captures.get(1).map_or("", |m| m.as_str()));
            if !title.is_empty() {
                return Some(title);
            }
        }
    }
    None
}

fn decode_entities(text: &str) -> String {
    let named = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");
    // Anything left unrecognized becomes a space, like other stray markup.
    entity_re().replace_all(&named, " ").into_owned()
}
