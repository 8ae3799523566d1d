//! Keyword/tag narrowing of page content
//!
//! Cuts a page down to the elements of a few candidate tags whose name, placeholder,
//! aria-label or text mention a keyword, so the selector query only sees likely targets.

use crate::dom::sanitize::is_valid_tag_name;
use indexmap::IndexSet;
use scraper::{ElementRef, Html, Selector};

/// Separator placed between kept elements
pub const KEYWORD_SEPARATOR: &str = "\n---\n";

/// Lower-cased haystack an element is matched against
fn searchable_text(element: &ElementRef<'_>) -> String {
    let attr = |name: &str| element.value().attr(name).unwrap_or("");
    let text: String = element.text().collect();

    format!("{} {} {} {}", attr("name"), attr("placeholder"), attr("aria-label"), text).to_lowercase()
}

/// Build a selector list (`button, a, input`) from candidate tag names
fn tag_selector<S: AsRef<str>>(tags: &[S]) -> Option<Selector> {
    let tags: IndexSet<String> = tags
        .iter()
        .map(|t| t.as_ref().trim().to_ascii_lowercase())
        .filter(|t| {
            let valid = is_valid_tag_name(t);
            if !valid && !t.is_empty() {
                log::debug!("Skipping invalid tag name '{}'", t);
            }
            valid
        })
        .collect();

    if tags.is_empty() {
        return None;
    }

    let list = tags.into_iter().collect::<Vec<_>>().join(", ");
    Selector::parse(&list).ok()
}

/// Keep the outer markup of every element of `tags` mentioning `keyword` (case-insensitive).
///
/// Returns an empty string when no tag is given or nothing matches; callers decide whether
/// that means "fall back to the full content" or "nothing to resolve".
pub fn filter_by_keyword<S: AsRef<str>>(content: &str, keyword: &str, tags: &[S]) -> String {
    let Some(selector) = tag_selector(tags) else {
        return String::new();
    };

    let needle = keyword.to_lowercase();
    let document = Html::parse_document(content);

    document
        .select(&selector)
        .filter(|element| searchable_text(element).contains(&needle))
        .map(|element| element.html())
        .collect::<Vec<_>>()
        .join(KEYWORD_SEPARATOR)
}

/// Concatenate the outer markup of every element of `tags`, in document order.
///
/// Offline counterpart of the live-DOM clone used by extraction.
pub fn filter_by_tags<S: AsRef<str>>(content: &str, tags: &[S]) -> String {
    let Some(selector) = tag_selector(tags) else {
        return String::new();
    };

    let document = Html::parse_document(content);
    document.select(&selector).map(|element| element.html()).collect()
}
