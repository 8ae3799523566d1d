use crate::{actions::{ActOptions, ActResult, ActionExecutor, ActionIntent, substitute_variables},
            browser::PageDriver,
            config::{CuehandConfig, ResolutionStrategy},
            dom::{filter_by_keyword, sanitize},
            error::{CuehandError, Result},
            extract::ExtractionEngine,
            intent::{KeywordQuery, RoleIntent, RoleQuery, SelectorChoice},
            locator::{ElementResolver, Resolution, TargetDescriptor},
            oracle::{IntentOracle, infer, prompts}};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::time::Duration;

/// Outcome of `observe`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserveResult {
    /// Whether the described element is on the page
    pub found: bool,
    /// Live match count of the resolved locator
    pub count: usize,
    /// The element the oracle described
    pub target: String,
}

/// Natural-language actions and extraction over one page
pub struct Cuehand<D: PageDriver, O: IntentOracle> {
    driver: D,
    oracle: O,
    config: CuehandConfig,
}

impl<D: PageDriver, O: IntentOracle> Cuehand<D, O> {
    pub fn new(driver: D, oracle: O) -> Self {
        Self::with_config(driver, oracle, CuehandConfig::default())
    }

    pub fn with_config(driver: D, oracle: O, config: CuehandConfig) -> Self {
        Self { driver, oracle, config }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn config(&self) -> &CuehandConfig {
        &self.config
    }

    /// Navigate to `url` and wait for the load to finish
    pub fn goto(&self, url: &str) -> Result<()> {
        self.driver.navigate(url)?;
        log::info!("Navigated to '{}'", url);
        Ok(())
    }

    /// Sanitized snapshot of the current page
    pub fn content(&self) -> Result<String> {
        log::debug!("Getting content");
        Ok(sanitize(&self.driver.content()?, &self.config.sanitize))
    }

    /// Press a key on the focused element
    pub fn press(&self, key: &str) -> Result<()> {
        self.driver.press_key(key)?;
        log::info!("Pressed '{}'", key);
        Ok(())
    }

    pub fn wait(&self, duration: Duration) {
        log::info!("Waiting for {:?}", duration);
        self.driver.wait(duration);
    }

    /// Perform the action an instruction describes
    pub fn act(&self, instruction: &str) -> Result<ActResult> {
        self.act_with(instruction, &ActOptions::default())
    }

    /// Perform the action an instruction describes, with variables and a strategy override.
    ///
    /// Oracle failures are returned as `Err`; element and driver problems come back as an
    /// unsuccessful [`ActResult`] unless the not-found policy is `Abort`.
    pub fn act_with(&self, instruction: &str, options: &ActOptions) -> Result<ActResult> {
        let instruction = substitute_variables(instruction, &options.variables);
        let strategy = options.strategy.unwrap_or(self.config.strategy);

        let (intent, target) = match strategy {
            ResolutionStrategy::Selector => {
                let target = self
                    .select_target(&instruction, prompts::SELECTOR_SYSTEM, self.config.keyword_narrowing)?
                    .ok_or_else(|| CuehandError::Oracle("selector cannot be empty".to_string()))?;
                let intent: ActionIntent =
                    infer(&self.oracle, prompts::ACTION_SYSTEM, &prompts::instruction_prompt(&instruction))?;
                (intent, target)
            }
            ResolutionStrategy::Role => {
                let role: RoleIntent = infer(&self.oracle, prompts::ROLE_INTENT_SYSTEM, &instruction)?;
                role.into_parts()
            }
        };
        log::debug!("Intent: {} on {}", intent.action.as_str(), target.describe());

        let resolution = match self.resolve(&target)? {
            Some(resolution) => resolution,
            None => {
                return Ok(ActResult::failure(format!(
                    "Invalid selector {}. The instruction \"{}\" could not be executed.",
                    target.describe(),
                    instruction
                )));
            }
        };

        ActionExecutor::new(&self.driver, self.config.settle_delay, self.config.not_found).execute(
            &intent,
            &resolution,
            &instruction,
        )
    }

    /// Check whether the element an instruction describes is on the page
    pub fn observe(&self, instruction: &str) -> Result<ObserveResult> {
        let target = match self.config.strategy {
            ResolutionStrategy::Selector => match self.select_target(instruction, prompts::OBSERVE_SYSTEM, false)? {
                Some(target) => target,
                None => {
                    log::warn!("Not found: no selector for \"{}\"", instruction);
                    return Ok(ObserveResult {
                        found: false,
                        count: 0,
                        target: String::new(),
                    });
                }
            },
            ResolutionStrategy::Role => {
                let query: RoleQuery = infer(&self.oracle, prompts::ROLE_QUERY_SYSTEM, instruction)?;
                TargetDescriptor::from(query)
            }
        };

        let count = self.resolve(&target)?.map(|r| r.count).unwrap_or(0);
        if count > 0 {
            log::info!("Found {}", target.describe());
        } else {
            log::warn!("Not found: {}", target.describe());
        }

        Ok(ObserveResult {
            found: count > 0,
            count,
            target: target.describe(),
        })
    }

    /// Extract a `T` from the page, with the schema derived from the type
    pub fn extract<T: DeserializeOwned + JsonSchema>(&self, instruction: &str) -> Result<T> {
        ExtractionEngine::new(&self.driver, &self.oracle, &self.config.sanitize).extract(instruction)
    }

    /// Extract a JSON value matching a caller-supplied JSON schema
    pub fn extract_value(&self, instruction: &str, schema: &Value) -> Result<Value> {
        ExtractionEngine::new(&self.driver, &self.oracle, &self.config.sanitize).extract_value(instruction, schema)
    }

    /// Selector pipeline: optional keyword narrowing, then a selector query over the content.
    /// `None` when the oracle returns an empty selector.
    fn select_target(&self, instruction: &str, system: &str, narrow: bool) -> Result<Option<TargetDescriptor>> {
        let raw = self.driver.content()?;

        let narrowed = if narrow {
            let query: KeywordQuery =
                infer(&self.oracle, prompts::KEYWORD_SYSTEM, &prompts::instruction_prompt(instruction))?;
            log::debug!("Keyword '{}' in tags {:?}", query.keyword, query.tags);
            filter_by_keyword(&raw, &query.keyword, &query.tags)
        } else {
            String::new()
        };

        let content = if narrowed.is_empty() {
            if narrow {
                log::warn!("Keyword narrowing matched nothing, using the full content");
            }
            sanitize(&raw, &self.config.sanitize)
        } else {
            log::debug!("Narrowed content to {} bytes", narrowed.len());
            narrowed
        };

        let choice: SelectorChoice = infer(&self.oracle, system, &prompts::content_prompt(&content, instruction))?;
        let selector = choice.selector.trim();
        if selector.is_empty() {
            return Ok(None);
        }
        log::debug!("Generated selector: {}", selector);
        Ok(Some(TargetDescriptor::Selector(selector.to_string())))
    }

    /// Resolve a target; `None` when the page rejects the selector syntax
    fn resolve(&self, target: &TargetDescriptor) -> Result<Option<Resolution>> {
        match ElementResolver::new(&self.driver).resolve(target) {
            Ok(resolution) => Ok(Some(resolution)),
            Err(CuehandError::InvalidSelector(reason)) => {
                log::warn!("Invalid selector {}: {}", target.describe(), reason);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{Interaction, StaticPage};
    use crate::oracle::ScriptedOracle;
    use serde_json::json;

    #[test]
    fn test_content_is_sanitized() {
        let page = StaticPage::new("<html><body><!-- x --><div><button>Go</button></div></body></html>");
        let cuehand = Cuehand::new(&page, ScriptedOracle::new());
        assert_eq!(cuehand.content().unwrap(), "<button>Go</button>");
    }

    #[test]
    fn test_goto_and_press_reach_driver() {
        let page = StaticPage::new("");
        let cuehand = Cuehand::new(&page, ScriptedOracle::new());
        cuehand.goto("https://example.com").unwrap();
        cuehand.press("Enter").unwrap();
        cuehand.wait(Duration::from_millis(10));
        assert_eq!(
            page.interactions(),
            vec![
                Interaction::Navigate("https://example.com".to_string()),
                Interaction::Press("Enter".to_string()),
                Interaction::Wait(Duration::from_millis(10)),
            ]
        );
    }

    #[test]
    fn test_empty_selector_is_oracle_failure() {
        let page = StaticPage::new("<button>Go</button>");
        let oracle = ScriptedOracle::new().respond(json!({"selector": "  "}));
        let config = CuehandConfig::new().keyword_narrowing(false);
        let cuehand = Cuehand::with_config(&page, oracle, config);

        let err = cuehand.act("click go").unwrap_err();
        assert!(err.is_oracle_failure());
        assert!(page.interactions().is_empty());
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let page = StaticPage::new("<button>Go</button>");
        let oracle = ScriptedOracle::new()
            .respond(json!({"selector": "button[[["}))
            .respond(json!({"action": "click"}));
        let config = CuehandConfig::new().keyword_narrowing(false);
        let cuehand = Cuehand::with_config(&page, oracle, config);

        let result = cuehand.act("click go").unwrap();
        assert!(!result.success);
        assert!(result.message.contains("\"click go\""));
    }

    #[test]
    fn test_observe_counts_live_matches() {
        let page = StaticPage::new("<a href=\"/1\">Docs</a><a href=\"/2\">Docs</a>");
        let oracle = ScriptedOracle::new().respond(json!({"targetText": "Docs", "role": "link"}));
        let config = CuehandConfig::new().strategy(ResolutionStrategy::Role);
        let cuehand = Cuehand::with_config(&page, oracle, config);

        let observed = cuehand.observe("is there a docs link?").unwrap();
        assert_eq!(
            observed,
            ObserveResult {
                found: true,
                count: 2,
                target: "'Docs' (link)".to_string(),
            }
        );
    }

    #[test]
    fn test_observe_empty_selector_is_not_found() {
        let page = StaticPage::new("<form><input name=\"email\"></form>");
        let oracle = ScriptedOracle::new().respond(json!({"selector": ""}));
        let cuehand = Cuehand::new(&page, &oracle);

        let observed = cuehand.observe("is there a newsletter checkbox?").unwrap();
        assert_eq!(
            observed,
            ObserveResult {
                found: false,
                count: 0,
                target: String::new(),
            }
        );
        assert_eq!(oracle.requests().len(), 1);
        assert!(page.interactions().is_empty());
    }
}
