//! Schema-driven extraction

use crate::{browser::PageDriver,
            dom::{SanitizeOptions, classify, sanitize},
            error::Result,
            oracle::{IntentOracle, infer, infer_value, prompts}};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extracts structured data from the current page
pub struct ExtractionEngine<'a, D: PageDriver + ?Sized, O: IntentOracle + ?Sized> {
    driver: &'a D,
    oracle: &'a O,
    sanitize: &'a SanitizeOptions,
}

impl<'a, D: PageDriver + ?Sized, O: IntentOracle + ?Sized> ExtractionEngine<'a, D, O> {
    pub fn new(driver: &'a D, oracle: &'a O, sanitize: &'a SanitizeOptions) -> Self {
        Self {
            driver,
            oracle,
            sanitize,
        }
    }

    /// Content the oracle sees for `instruction`.
    ///
    /// When the instruction names a tag family, only that family's elements are kept (cloned
    /// from the live page); otherwise, or when the family has no element, the sanitized page.
    pub fn content_for(&self, instruction: &str) -> Result<String> {
        if let Some(family) = classify(instruction) {
            let filtered = self.driver.select_outer_html(family.tags)?;
            if !filtered.trim().is_empty() {
                log::debug!("Filtered content by tag: {} ({} bytes)", family.selector(), filtered.len());
                return Ok(filtered);
            }
            log::warn!("No {} element on the page, using the full content", family.name);
        }

        Ok(sanitize(&self.driver.content()?, self.sanitize))
    }

    /// Extract a `T`, with the output schema derived from the type
    pub fn extract<T: DeserializeOwned + JsonSchema>(&self, instruction: &str) -> Result<T> {
        let content = self.content_for(instruction)?;
        let data = infer(
            self.oracle,
            prompts::EXTRACT_SYSTEM,
            &prompts::extract_prompt(instruction, &content),
        )?;
        log::info!("Extracted data");
        Ok(data)
    }

    /// Extract a JSON value matching a caller-supplied JSON schema
    pub fn extract_value(&self, instruction: &str, schema: &Value) -> Result<Value> {
        let content = self.content_for(instruction)?;
        let data = infer_value(
            self.oracle,
            prompts::EXTRACT_SYSTEM,
            &prompts::extract_prompt(instruction, &content),
            schema,
        )?;
        log::info!("Extracted data");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::StaticPage;
    use crate::oracle::ScriptedOracle;
    use serde::Deserialize;
    use serde_json::json;

    const PAGE: &str = r#"<html><head><script>track()</script></head><body>
        <div><a href="/a">First</a> <a href="/b">Second</a></div>
        <img src="logo.png" alt="Logo">
        <p>Hello</p>
    </body></html>"#;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Links {
        links: Vec<String>,
    }

    #[test]
    fn test_family_content_is_cloned_elements() {
        let page = StaticPage::new(PAGE);
        let oracle = ScriptedOracle::new();
        let options = SanitizeOptions::default();
        let engine = ExtractionEngine::new(&page, &oracle, &options);

        let content = engine.content_for("get all the links and images").unwrap();
        assert_eq!(content, r#"<a href="/a">First</a><a href="/b">Second</a>"#);
    }

    #[test]
    fn test_no_family_uses_sanitized_content() {
        let page = StaticPage::new(PAGE);
        let oracle = ScriptedOracle::new();
        let options = SanitizeOptions::default();
        let engine = ExtractionEngine::new(&page, &oracle, &options);

        let content = engine.content_for("what is this page about?").unwrap();
        assert!(!content.contains("<script"));
        assert!(!content.contains("<div"));
        assert!(content.contains("<p>Hello</p>"));
    }

    #[test]
    fn test_empty_family_falls_back() {
        let page = StaticPage::new(PAGE);
        let oracle = ScriptedOracle::new();
        let options = SanitizeOptions::default();
        let engine = ExtractionEngine::new(&page, &oracle, &options);

        let content = engine.content_for("read the table").unwrap();
        assert!(content.contains("<p>Hello</p>"));
    }

    #[test]
    fn test_extract_typed() {
        let page = StaticPage::new(PAGE);
        let oracle = ScriptedOracle::new().respond(json!({"links": ["/a", "/b"]}));
        let options = SanitizeOptions::default();
        let engine = ExtractionEngine::new(&page, &oracle, &options);

        let links: Links = engine.extract("list the link targets").unwrap();
        assert_eq!(links.links, vec!["/a", "/b"]);

        let requests = oracle.requests();
        assert_eq!(requests[0].system, prompts::EXTRACT_SYSTEM);
        assert!(requests[0].prompt.starts_with("Instruction: list the link targets\nHTML Content: <a href"));
    }

    #[test]
    fn test_extract_value_with_caller_schema() {
        let page = StaticPage::new(PAGE);
        let oracle = ScriptedOracle::new().respond(json!({"greeting": "Hello"}));
        let options = SanitizeOptions::default();
        let engine = ExtractionEngine::new(&page, &oracle, &options);

        let schema = json!({"type": "object", "properties": {"greeting": {"type": "string"}}});
        let value = engine.extract_value("get the paragraph", &schema).unwrap();
        assert_eq!(value, json!({"greeting": "Hello"}));
        assert_eq!(oracle.requests()[0].schema, schema);
    }
}
