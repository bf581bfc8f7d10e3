//! DOM navigation helpers shared by the section extractors.
//!
//! Documentation pages are flat: each named section is an `<h2>` followed by
//! paragraphs and, usually, a data `<table>` somewhere after it.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

// ---------------------------------------------------------------------------
// Selectors (compiled once)
// ---------------------------------------------------------------------------

pub(crate) static H2: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").expect("h2"));
pub(crate) static TR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("tr"));
pub(crate) static TD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("td"));
pub(crate) static P: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").expect("p"));

// ---------------------------------------------------------------------------
// Section headings
// ---------------------------------------------------------------------------

/// A named `<h2>` section of a documentation page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Details,
    Columns,
    PrimaryKey,
    Indexes,
    Query,
}

impl Section {
    /// Case-insensitive pattern searched in the heading text.
    fn pattern(self) -> &'static Regex {
        static DETAILS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Details").expect("re"));
        static COLUMNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Columns").expect("re"));
        static PRIMARY_KEY: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"(?i)Primary Key").expect("re"));
        static INDEXES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Indexes").expect("re"));
        static QUERY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Query").expect("re"));

        match self {
            Self::Details => &DETAILS,
            Self::Columns => &COLUMNS,
            Self::PrimaryKey => &PRIMARY_KEY,
            Self::Indexes => &INDEXES,
            Self::Query => &QUERY,
        }
    }

    /// First `<h2>` in the document whose text matches this section.
    pub(crate) fn heading(self, doc: &Html) -> Option<ElementRef<'_>> {
        let pattern = self.pattern();
        doc.select(&H2)
            .find(|h| pattern.is_match(&h.text().collect::<String>()))
    }

    /// First `<table>` following this section's heading in document order.
    pub(crate) fn table(self, doc: &Html) -> Option<ElementRef<'_>> {
        self.heading(doc)
            .and_then(|heading| next_element_after(doc, heading, "table"))
    }
}

/// First element named `tag` after `anchor` in document order (descendants included).
pub(crate) fn next_element_after<'a>(
    doc: &'a Html,
    anchor: ElementRef<'a>,
    tag: &str,
) -> Option<ElementRef<'a>> {
    doc.tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != anchor.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == tag)
}

/// `<td>` cells of every row after the header row.
pub(crate) fn data_rows<'a>(table: ElementRef<'a>) -> impl Iterator<Item = Vec<ElementRef<'a>>> {
    table
        .select(&TR)
        .skip(1)
        .map(|row| row.select(&TD).collect())
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// All text of the element concatenated, then trimmed.
pub(crate) fn plain_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Each text node trimmed, empty ones dropped, joined without a separator.
pub(crate) fn compact_text(el: ElementRef<'_>) -> String {
    joined_text(el, "")
}

/// Each text node trimmed, empty ones dropped, joined with single spaces.
pub(crate) fn spaced_text(el: ElementRef<'_>) -> String {
    joined_text(el, " ")
}

fn joined_text(el: ElementRef<'_>, sep: &str) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Split a comma-separated column list, trimming each entry.
pub(crate) fn split_columns(text: &str) -> Vec<String> {
    text.split(',').map(|c| c.trim().to_string()).collect()
}
