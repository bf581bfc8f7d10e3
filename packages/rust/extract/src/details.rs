//! "Details" section parsing and TABLE/VIEW classification.

use std::sync::LazyLock;

use hcmdoc_shared::ObjectType;
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::sections::{Section, spaced_text};

/// Matches `Object type: <TOKEN>` anywhere in a details line.
static OBJECT_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Object type:\s*(\w+)").expect("object type regex"));

/// Text and classification read from the "Details" section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Details {
    /// Space-joined section text.
    pub text: String,
    /// Raw classification; [`ObjectType::Unknown`] is handled as a table.
    pub object_type: ObjectType,
}

/// Read the "Details" section: every `p`, `ul` or `li` sibling after the
/// heading, up to the next `h2`.
pub(crate) fn parse_details(doc: &Html) -> Details {
    let Some(heading) = Section::Details.heading(doc) else {
        return Details::default();
    };

    let lines: Vec<String> = heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|sibling| sibling.value().name() != "h2")
        .filter(|sibling| matches!(sibling.value().name(), "p" | "ul" | "li"))
        .map(spaced_text)
        .filter(|text| !text.is_empty())
        .collect();

    Details {
        text: space_before_object(&lines.join(" ")).trim().to_string(),
        object_type: classify_object_type(lines.as_slice()),
    }
}

/// Decide TABLE/VIEW from details lines.
///
/// The last `Object type:` token wins. No token, or a token other than TABLE
/// or VIEW, yields [`ObjectType::Unknown`], which callers extract as a table.
pub fn classify_object_type<S: AsRef<str>>(lines: &[S]) -> ObjectType {
    lines
        .iter()
        .filter_map(|line| OBJECT_TYPE_RE.captures(line.as_ref()))
        .last()
        .map(|caps| ObjectType::from_token(&caps[1]))
        .unwrap_or_default()
}

/// Insert a space before every `Object` that directly follows an ASCII letter.
///
/// Source markup often glues consecutive detail entries together
/// (`FUSIONObject owner`).
fn space_before_object(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut prev: Option<char> = None;

    for (i, c) in text.char_indices() {
        if text[i..].starts_with("Object") && prev.is_some_and(|p| p.is_ascii_alphabetic()) {
            out.push(' ');
        }
        out.push(c);
        prev = Some(c);
    }

    out
}
