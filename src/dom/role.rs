//! ARIA role and accessible-name computation over a parsed document
//!
//! A pragmatic subset of the HTML-AAM mappings: enough to answer "the button named
//! 'Log in'" the same way the in-page locator script does.

use scraper::{ElementRef, Html, Selector};

/// Roles whose accessible name is computed from their content
const NAME_FROM_CONTENT: &[&str] = &[
    "button", "link", "heading", "checkbox", "radio", "option", "tab", "menuitem", "cell", "columnheader", "row",
    "listitem", "switch", "treeitem", "tooltip",
];

/// Collapse runs of whitespace and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Implicit ARIA role of an element, if it has one
pub fn implicit_role(element: &ElementRef<'_>) -> Option<&'static str> {
    let el = element.value();
    let tag = el.name();

    let role = match tag {
        "a" | "area" if el.attr("href").is_some() => "link",
        "button" => "button",
        "input" => {
            let kind = el.attr("type").unwrap_or("text").trim().to_ascii_lowercase();
            match kind.as_str() {
                "button" | "submit" | "reset" | "image" => "button",
                "checkbox" => "checkbox",
                "radio" => "radio",
                "range" => "slider",
                "number" => "spinbutton",
                "search" => "searchbox",
                // password fields are addressed as text boxes by users
                "text" | "email" | "tel" | "url" | "password" | "" => "textbox",
                _ => return None,
            }
        }
        "textarea" => "textbox",
        "select" => {
            let size = el.attr("size").and_then(|s| s.trim().parse::<u32>().ok()).unwrap_or(0);
            if el.attr("multiple").is_some() || size > 1 { "listbox" } else { "combobox" }
        }
        "option" => "option",
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "heading",
        "img" if el.attr("alt") == Some("") => "presentation",
        "img" => "img",
        "ul" | "ol" => "list",
        "li" => "listitem",
        "nav" => "navigation",
        "main" => "main",
        "form" => "form",
        "table" => "table",
        "tr" => "row",
        "td" => "cell",
        "th" => "columnheader",
        "dialog" => "dialog",
        "article" => "article",
        "aside" => "complementary",
        "p" => "paragraph",
        _ => return None,
    };

    Some(role)
}

/// Effective role: the first token of an explicit `role` attribute, else the implicit role
pub fn role_of(element: &ElementRef<'_>) -> Option<String> {
    element
        .value()
        .attr("role")
        .and_then(|r| r.split_whitespace().next())
        .map(|r| r.to_ascii_lowercase())
        .or_else(|| implicit_role(element).map(str::to_string))
}

/// Whether the element is excluded from the accessibility tree by markup alone
pub fn is_hidden(element: &ElementRef<'_>) -> bool {
    std::iter::once(*element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .any(|el| {
            let value = el.value();
            let inline_hidden = value
                .attr("style")
                .map(|s| {
                    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
                    compact.to_ascii_lowercase().contains("display:none")
                })
                .unwrap_or(false);

            value.attr("hidden").is_some()
                || value.attr("aria-hidden") == Some("true")
                || inline_hidden
                || matches!(value.name(), "head" | "script" | "style" | "template" | "noscript")
        })
}

fn text_of(element: &ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(normalize_whitespace).filter(|v| !v.is_empty())
}

/// Text of the `<label>` elements pointing at a form control
fn label_text(element: &ElementRef<'_>, document: &Html) -> Option<String> {
    if let Some(id) = element.value().attr("id") {
        if let Ok(selector) = Selector::parse("label[for]") {
            let texts: Vec<String> = document
                .select(&selector)
                .filter(|label| label.value().attr("for") == Some(id))
                .map(|label| text_of(&label))
                .filter(|t| !t.is_empty())
                .collect();
            if !texts.is_empty() {
                return Some(texts.join(" "));
            }
        }
    }

    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "label")
        .map(|label| text_of(&label))
        .filter(|t| !t.is_empty())
}

/// Accessible name of an element (whitespace-normalized)
pub fn accessible_name(element: &ElementRef<'_>, document: &Html) -> String {
    let el = element.value();

    if let Some(ids) = el.attr("aria-labelledby") {
        let parts: Vec<String> = ids
            .split_whitespace()
            .filter_map(|id| {
                document
                    .root_element()
                    .descendants()
                    .filter_map(ElementRef::wrap)
                    .find(|candidate| candidate.value().attr("id") == Some(id))
            })
            .map(|labelled| text_of(&labelled))
            .filter(|t| !t.is_empty())
            .collect();
        if !parts.is_empty() {
            return parts.join(" ");
        }
    }

    if let Some(label) = non_empty(el.attr("aria-label")) {
        return label;
    }

    match el.name() {
        "input" | "textarea" | "select" => {
            let kind = el.attr("type").unwrap_or("text").to_ascii_lowercase();
            match kind.as_str() {
                "submit" => return non_empty(el.attr("value")).unwrap_or_else(|| "Submit".to_string()),
                "reset" => return non_empty(el.attr("value")).unwrap_or_else(|| "Reset".to_string()),
                "button" => return non_empty(el.attr("value")).unwrap_or_default(),
                "image" => {
                    return non_empty(el.attr("alt"))
                        .or_else(|| non_empty(el.attr("value")))
                        .unwrap_or_else(|| "Submit".to_string());
                }
                _ => {}
            }
            if let Some(label) = label_text(element, document) {
                return label;
            }
            if let Some(name) = non_empty(el.attr("title")).or_else(|| non_empty(el.attr("placeholder"))) {
                return name;
            }
            return String::new();
        }
        "img" | "area" => {
            if let Some(alt) = non_empty(el.attr("alt")) {
                return alt;
            }
        }
        _ => {}
    }

    let from_content = role_of(element)
        .map(|role| NAME_FROM_CONTENT.contains(&role.as_str()))
        .unwrap_or(false);
    if from_content {
        let text = text_of(element);
        if !text.is_empty() {
            return text;
        }
    }

    non_empty(el.attr("title")).unwrap_or_default()
}

/// Whether an accessible name satisfies a role query name.
///
/// Exact matching compares whole, whitespace-normalized strings case-sensitively; inexact
/// matching is a case-insensitive substring test.
pub fn name_matches(accessible: &str, wanted: &str, exact: bool) -> bool {
    let wanted = normalize_whitespace(wanted);
    if exact {
        accessible == wanted
    } else {
        accessible.to_lowercase().contains(&wanted.to_lowercase())
    }
}
