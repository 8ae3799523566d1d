use crate::{browser::PageDriver,
            dom::{filter_by_tags, role, xpath},
            error::{CuehandError, Result},
            locator::Locator};
use scraper::{ElementRef, Html, Selector};
use std::{cell::RefCell, time::Duration};

/// An interaction recorded by [`StaticPage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Navigate(String),
    Click(Locator),
    Fill { locator: Locator, value: String },
    Press(String),
    Wait(Duration),
}

/// In-memory page over captured HTML.
///
/// Locators are evaluated against the markup with the same rules the in-page script uses;
/// interactions are recorded instead of performed, and waits return immediately.
#[derive(Debug, Default)]
pub struct StaticPage {
    html: RefCell<String>,
    interactions: RefCell<Vec<Interaction>>,
}

impl StaticPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: RefCell::new(html.into()),
            interactions: RefCell::new(Vec::new()),
        }
    }

    /// Replace the page markup
    pub fn set_content(&self, html: impl Into<String>) {
        *self.html.borrow_mut() = html.into();
    }

    /// Interactions recorded so far, oldest first
    pub fn interactions(&self) -> Vec<Interaction> {
        self.interactions.borrow().clone()
    }

    pub fn clear_interactions(&self) {
        self.interactions.borrow_mut().clear();
    }

    fn record(&self, interaction: Interaction) {
        self.interactions.borrow_mut().push(interaction);
    }

    /// Evaluate a locator and hand its matches to `f`
    fn with_matches<R>(&self, locator: &Locator, f: impl FnOnce(Vec<ElementRef<'_>>) -> R) -> Result<R> {
        let document = Html::parse_document(&self.html.borrow());
        let matches = find(&document, locator)?;
        Ok(f(matches))
    }

    /// Check that a locator designates exactly one actionable element
    fn target(&self, locator: &Locator, action: &str) -> Result<bool> {
        let (count, fillable) = self.with_matches(locator, |matches| {
            (matches.len(), matches.first().map(is_fillable).unwrap_or(false))
        })?;

        if count == 0 {
            return Err(CuehandError::ElementNotFound(locator.to_string()));
        }
        if locator.is_strict() && count > 1 {
            return Err(CuehandError::ActionFailed {
                action: action.to_string(),
                reason: format!("strict mode violation: {} resolved to {} elements", locator, count),
            });
        }
        Ok(fillable)
    }
}

/// Elements matching a locator, narrowed to `nth` when set
fn find<'a>(document: &'a Html, locator: &Locator) -> Result<Vec<ElementRef<'a>>> {
    let mut matches = match locator {
        Locator::Css { selector, .. } => {
            let parsed = Selector::parse(selector)
                .map_err(|e| CuehandError::InvalidSelector(format!("'{}': {}", selector, e)))?;
            document.select(&parsed).collect::<Vec<_>>()
        }
        Locator::XPath { expression, .. } => xpath::select(document, expression)?,
        Locator::Role { role: wanted, name, exact, .. } => {
            let all = Selector::parse("*").map_err(|e| CuehandError::InvalidSelector(e.to_string()))?;
            document
                .select(&all)
                .filter(|el| role::role_of(el).as_deref() == Some(wanted.as_str()))
                .filter(|el| !role::is_hidden(el))
                .filter(|el| role::name_matches(&role::accessible_name(el, document), name, *exact))
                .collect()
        }
    };

    if let Some(index) = locator.index() {
        matches = matches.into_iter().nth(index).into_iter().collect();
    }
    Ok(matches)
}

fn is_fillable(element: &ElementRef<'_>) -> bool {
    let el = element.value();
    if el.attr("contenteditable").is_some_and(|v| v != "false") {
        return true;
    }
    match el.name() {
        "textarea" => true,
        "input" => {
            let kind = el.attr("type").unwrap_or("text").trim().to_ascii_lowercase();
            !matches!(
                kind.as_str(),
                "button" | "submit" | "reset" | "image" | "checkbox" | "radio" | "file" | "hidden" | "range" | "color"
            )
        }
        _ => false,
    }
}

impl PageDriver for StaticPage {
    fn content(&self) -> Result<String> {
        Ok(self.html.borrow().clone())
    }

    fn navigate(&self, url: &str) -> Result<()> {
        self.record(Interaction::Navigate(url.to_string()));
        Ok(())
    }

    fn count(&self, locator: &Locator) -> Result<usize> {
        self.with_matches(locator, |matches| matches.len())
    }

    fn click(&self, locator: &Locator) -> Result<()> {
        self.target(locator, "click")?;
        self.record(Interaction::Click(locator.clone()));
        Ok(())
    }

    fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        if !self.target(locator, "fill")? {
            return Err(CuehandError::ActionFailed {
                action: "fill".to_string(),
                reason: "Element is not an <input>, <textarea> or [contenteditable] element".to_string(),
            });
        }
        self.record(Interaction::Fill {
            locator: locator.clone(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn press_key(&self, key: &str) -> Result<()> {
        self.record(Interaction::Press(key.to_string()));
        Ok(())
    }

    fn select_outer_html(&self, tags: &[&str]) -> Result<String> {
        Ok(filter_by_tags(&self.html.borrow(), tags))
    }

    fn wait(&self, duration: Duration) {
        self.record(Interaction::Wait(duration));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM: &str = r#"<html><body>
        <form>
            <label for="user">Username</label><input id="user" name="username">
            <input type="password" aria-label="Password">
            <button type="submit">Log in</button>
            <button hidden>Log in</button>
            <span contenteditable="true">Notes</span>
        </form>
        <p>Welcome</p>
    </body></html>"#;

    #[test]
    fn test_count_css_and_xpath() {
        let page = StaticPage::new(FORM);
        assert_eq!(page.count(&Locator::css("input")).unwrap(), 2);
        assert_eq!(page.count(&Locator::css("input").nth(1)).unwrap(), 1);
        assert_eq!(page.count(&Locator::css("input").nth(2)).unwrap(), 0);
        assert_eq!(page.count(&Locator::xpath("//button[contains(text(), \"Log\")]")).unwrap(), 2);
    }

    #[test]
    fn test_role_skips_hidden_elements() {
        let page = StaticPage::new(FORM);
        assert_eq!(page.count(&Locator::role("button", "Log in")).unwrap(), 1);
        assert_eq!(page.count(&Locator::role("textbox", "Username")).unwrap(), 1);
        assert_eq!(page.count(&Locator::role("textbox", "Password")).unwrap(), 1);
    }

    #[test]
    fn test_invalid_css_selector() {
        let page = StaticPage::new(FORM);
        assert!(matches!(page.count(&Locator::css("button[")), Err(CuehandError::InvalidSelector(_))));
    }

    #[test]
    fn test_click_records_interaction() {
        let page = StaticPage::new(FORM);
        let locator = Locator::role("button", "Log in");
        page.click(&locator).unwrap();
        assert_eq!(page.interactions(), vec![Interaction::Click(locator)]);
    }

    #[test]
    fn test_click_missing_element() {
        let page = StaticPage::new(FORM);
        let result = page.click(&Locator::css("#missing"));
        assert!(matches!(result, Err(CuehandError::ElementNotFound(_))));
        assert!(page.interactions().is_empty());
    }

    #[test]
    fn test_strict_role_locator_rejects_ambiguity() {
        let page = StaticPage::new("<button>Go</button><button>Go</button>");
        let result = page.click(&Locator::role("button", "Go"));
        assert!(matches!(result, Err(CuehandError::ActionFailed { .. })));

        // selector locators act on the first match
        page.click(&Locator::css("button")).unwrap();
        assert_eq!(page.interactions().len(), 1);
    }

    #[test]
    fn test_fill_requires_fillable_element() {
        let page = StaticPage::new(FORM);
        page.fill(&Locator::css("input[name=\"username\"]"), "alice").unwrap();
        page.fill(&Locator::css("[contenteditable]"), "remember milk").unwrap();

        let result = page.fill(&Locator::css("p"), "nope");
        match result {
            Err(CuehandError::ActionFailed { action, reason }) => {
                assert_eq!(action, "fill");
                assert!(reason.contains("not an <input>"));
            }
            other => panic!("Expected ActionFailed, got {:?}", other),
        }
        assert_eq!(page.interactions().len(), 2);
    }

    #[test]
    fn test_wait_is_recorded() {
        let page = StaticPage::new(FORM);
        page.wait(Duration::from_millis(250));
        page.press_key("Enter").unwrap();
        assert_eq!(
            page.interactions(),
            vec![Interaction::Wait(Duration::from_millis(250)), Interaction::Press("Enter".to_string())]
        );
    }

    #[test]
    fn test_select_outer_html() {
        let page = StaticPage::new(FORM);
        let html = page.select_outer_html(&["p"]).unwrap();
        assert_eq!(html, "<p>Welcome</p>");
    }
}
