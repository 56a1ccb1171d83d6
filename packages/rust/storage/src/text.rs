//! Plain-text normalization applied to fragments before indexing.

use std::sync::LazyLock;

use regex::Regex;

/// Strip markup and collapse whitespace.
///
/// Every `<...>` tag becomes a single space, then whitespace runs collapse to
/// one space and the ends are trimmed. Search assumes its input went through this.
pub fn plain_text(html: &str) -> String {
    static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    let without_tags = TAG_RE.replace_all(html, " ");
    WS_RE.replace_all(&without_tags, " ").trim().to_string()
}
