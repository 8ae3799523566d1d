use crate::{browser::PageDriver,
            error::{CuehandError, Result},
            locator::Locator};
use headless_chrome::Tab;
use serde::Deserialize;
use std::{cell::Cell, sync::Arc};

const LOCATE_JS: &str = include_str!("locate.js");
const OUTER_HTML_JS: &str = include_str!("outer_html.js");

const CLEAR_VALUE_JS: &str = r#"function() {
    if ('value' in this) { this.value = ''; } else { this.textContent = ''; }
    this.dispatchEvent(new Event('input', { bubbles: true }));
}"#;

/// Reply of `locate.js`
#[derive(Debug, Deserialize)]
struct LocateReply {
    #[serde(default)]
    count: usize,
    #[serde(default)]
    fillable: bool,
    error: Option<String>,
}

/// A Chrome tab driven over CDP
pub struct ChromePage {
    tab: Arc<Tab>,
    next_marker: Cell<u64>,
}

impl ChromePage {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab, next_marker: Cell::new(0) }
    }

    /// Get the underlying tab
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    /// Evaluate an expression that returns a JSON string and decode it
    fn evaluate_json<T: for<'de> Deserialize<'de>>(&self, expression: &str) -> Result<T> {
        let result = self
            .tab
            .evaluate(expression, false)
            .map_err(|e| CuehandError::EvaluationFailed(e.to_string()))?;

        let value = result
            .value
            .ok_or_else(|| CuehandError::EvaluationFailed("No value returned from page script".to_string()))?;

        // The scripts return a JSON string, decode the string first
        let json_str: String = serde_json::from_value(value)
            .map_err(|e| CuehandError::EvaluationFailed(format!("Expected a JSON string: {}", e)))?;

        serde_json::from_str(&json_str).map_err(|e| CuehandError::EvaluationFailed(format!("Malformed script reply: {}", e)))
    }

    /// Run the locator script; `mark` tags the first match so CDP can find it
    fn locate(&self, locator: &Locator, marker: Option<&str>) -> Result<LocateReply> {
        let spec = serde_json::to_string(locator).map_err(|e| CuehandError::EvaluationFailed(e.to_string()))?;
        let op = if marker.is_some() { "\"mark\"" } else { "\"count\"" };
        let marker = serde_json::to_string(marker.unwrap_or("")).map_err(|e| CuehandError::EvaluationFailed(e.to_string()))?;

        let expression = format!("({})({}, {}, {})", LOCATE_JS.trim().trim_end_matches(';'), spec, op, marker);
        let reply: LocateReply = self.evaluate_json(&expression)?;

        if let Some(error) = reply.error {
            return Err(CuehandError::InvalidSelector(format!("{}: {}", locator, error)));
        }
        Ok(reply)
    }

    /// Mark the single element an interaction should target and return its marker selector
    fn target(&self, locator: &Locator, action: &str) -> Result<(String, LocateReply)> {
        let id = self.next_marker.get() + 1;
        self.next_marker.set(id);
        let marker = format!("t{}", id);

        let reply = self.locate(locator, Some(&marker))?;
        if reply.count == 0 {
            return Err(CuehandError::ElementNotFound(locator.to_string()));
        }
        if locator.is_strict() && reply.count > 1 {
            return Err(CuehandError::ActionFailed {
                action: action.to_string(),
                reason: format!("strict mode violation: {} resolved to {} elements", locator, reply.count),
            });
        }

        Ok((format!("[data-cuehand-target=\"{}\"]", marker), reply))
    }
}

impl PageDriver for ChromePage {
    fn content(&self) -> Result<String> {
        self.tab
            .get_content()
            .map_err(|e| CuehandError::EvaluationFailed(format!("Failed to read page content: {}", e)))
    }

    fn navigate(&self, url: &str) -> Result<()> {
        let url = normalize_url(url);

        self.tab
            .navigate_to(&url)
            .map_err(|e| CuehandError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| CuehandError::NavigationFailed(format!("Navigation to {} did not complete: {}", url, e)))?;

        log::debug!("Navigated to {}", url);
        Ok(())
    }

    fn count(&self, locator: &Locator) -> Result<usize> {
        Ok(self.locate(locator, None)?.count)
    }

    fn click(&self, locator: &Locator) -> Result<()> {
        let (selector, _) = self.target(locator, "click")?;
        let element = self.tab.find_element(&selector).map_err(action_failed("click"))?;
        element.click().map_err(action_failed("click"))?;
        Ok(())
    }

    fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        let (selector, reply) = self.target(locator, "fill")?;
        if !reply.fillable {
            return Err(CuehandError::ActionFailed {
                action: "fill".to_string(),
                reason: "Element is not an <input>, <textarea> or [contenteditable] element".to_string(),
            });
        }

        let element = self.tab.find_element(&selector).map_err(action_failed("fill"))?;
        element.click().map_err(action_failed("fill"))?;
        element
            .call_js_fn(CLEAR_VALUE_JS, vec![], false)
            .map_err(action_failed("fill"))?;
        if !value.is_empty() {
            element.type_into(value).map_err(action_failed("fill"))?;
        }
        Ok(())
    }

    fn press_key(&self, key: &str) -> Result<()> {
        self.tab.press_key(key).map_err(action_failed("press"))?;
        Ok(())
    }

    fn select_outer_html(&self, tags: &[&str]) -> Result<String> {
        let selector = tags.join(", ");
        let selector = serde_json::to_string(&selector).map_err(|e| CuehandError::EvaluationFailed(e.to_string()))?;
        let expression = format!("({})({})", OUTER_HTML_JS.trim().trim_end_matches(';'), selector);
        self.evaluate_json(&expression)
    }
}

fn action_failed<E: std::fmt::Display>(action: &'static str) -> impl Fn(E) -> CuehandError {
    move |e| CuehandError::ActionFailed {
        action: action.to_string(),
        reason: e.to_string(),
    }
}

/// Complete a user-typed URL with a scheme
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();

    const SCHEMES: &[&str] = &["http://", "https://", "file://", "data:", "about:", "chrome://", "chrome-extension://"];
    if SCHEMES.iter().any(|scheme| trimmed.starts_with(scheme)) {
        return trimmed.to_string();
    }

    if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") {
        return format!("http://{}", trimmed);
    }

    format!("https://{}", trimmed)
}
