//! HTML → metadata records for OEDMH documentation pages.
//!
//! A page is classified from its "Details" section, then read with either the
//! view layout (columns + query) or the table layout (columns, primary key,
//! indexes). Missing sections produce empty values.

mod details;
mod sections;
mod tables;

use std::sync::LazyLock;

use hcmdoc_shared::{HcmDocError, ObjectMetadata, Result, TableMetadata, ViewMetadata};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

pub use details::{Details, classify_object_type};

use sections::{compact_text, plain_text};

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1, h2").expect("title"));
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.body").expect("body"));

/// Parse one rendered documentation page into a table or view record.
///
/// `name` is the TOC title and is only used when the page carries no `h1`
/// or `h2` heading. An empty document is a parse error.
pub fn extract_object_metadata(html: &str, url: &str, name: &str) -> Result<ObjectMetadata> {
    if html.trim().is_empty() {
        return Err(HcmDocError::parse(format!("{url}: empty page body")));
    }

    let doc = Html::parse_document(html);
    let title = page_title(&doc).unwrap_or_else(|| name.trim().to_string());
    let description = page_description(&doc);
    let details = details::parse_details(&doc);

    debug!(url, title, object_type = %details.object_type, "page classified");

    if details.object_type.is_view() {
        return Ok(ObjectMetadata::View(ViewMetadata {
            view_name: title,
            url: url.to_string(),
            description,
            details: details.text,
            columns: tables::view_columns(&doc),
            sql_query: tables::view_query(&doc),
        }));
    }

    Ok(ObjectMetadata::Table(TableMetadata {
        table_name: title,
        url: url.to_string(),
        description,
        details: details.text,
        columns: tables::table_columns(&doc),
        primary_key: tables::primary_key(&doc),
        indexes: tables::indexes(&doc),
    }))
}

fn page_title(doc: &Html) -> Option<String> {
    doc.select(&TITLE).next().map(plain_text)
}

/// First non-empty paragraph directly under the first `div.body`.
fn page_description(doc: &Html) -> String {
    let Some(body) = doc.select(&BODY).next() else {
        return String::new();
    };

    body.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "p")
        .map(compact_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}
