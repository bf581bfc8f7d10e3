//! TOC script parser.
//!
//! The documentation TOC ships as a JavaScript file embedding object literals
//! such as `{"title": "Per Assignment", "href": "PER_ASSIGN.html#section"}`
//! inside arbitrary surrounding syntax. Only brace blocks without nested
//! braces that carry both a `title` and an `href` string are recognized.

use regex::Regex;
use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A raw `{title, href}` pair as it appears in the TOC script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocLink {
    pub title: String,
    pub href: String,
}

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Matches a flat `{...}` block holding `"title"` and `"href"` in either order.
static LINK_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"\{[^{}]*(?:"#,
        r#""title"\s*:\s*"(?P<title_a>[^"]+)"[^{}]*"href"\s*:\s*"(?P<href_a>[^"]+)""#,
        r#"|"#,
        r#""href"\s*:\s*"(?P<href_b>[^"]+)"[^{}]*"title"\s*:\s*"(?P<title_b>[^"]+)""#,
        r#")[^{}]*\}"#,
    ))
    .expect("TOC link regex")
});

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Scan the whole TOC content and return every link block, in match order.
///
/// Blocks that do not match (partial literals, parents with nested `topics`)
/// are skipped silently; an input without matches yields an empty list.
pub fn parse_toc(content: &str) -> Vec<TocLink> {
    LINK_BLOCK_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let title = caps.name("title_a").or_else(|| caps.name("title_b"))?;
            let href = caps.name("href_a").or_else(|| caps.name("href_b"))?;
            Some(TocLink {
                title: title.as_str().to_string(),
                href: href.as_str().to_string(),
            })
        })
        .collect()
}
