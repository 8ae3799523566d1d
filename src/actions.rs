//! Action intents and their execution against a resolved locator

use crate::{browser::PageDriver,
            config::{NotFoundPolicy, ResolutionStrategy},
            error::{CuehandError, Result},
            locator::Resolution};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The three things an instruction can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Click on the element
    Click,
    /// Fill the element with a value
    Fill,
    /// Only check that the element is there
    Locate,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Fill => "fill",
            ActionKind::Locate => "locate",
        }
    }
}

/// Action chosen by the oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ActionIntent {
    pub action: ActionKind,

    /// Value to fill (fill actions only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ActionIntent {
    pub fn click() -> Self {
        Self {
            action: ActionKind::Click,
            value: None,
        }
    }

    pub fn fill(value: impl Into<String>) -> Self {
        Self {
            action: ActionKind::Fill,
            value: Some(value.into()),
        }
    }

    pub fn locate() -> Self {
        Self {
            action: ActionKind::Locate,
            value: None,
        }
    }
}

/// Outcome of `act`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActResult {
    pub success: bool,
    pub message: String,
}

impl ActResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Replace every `%key%` with its value
pub fn substitute_variables(instruction: &str, variables: &IndexMap<String, String>) -> String {
    variables
        .iter()
        .fold(instruction.to_string(), |text, (key, value)| text.replace(&format!("%{}%", key), value))
}

/// Per-call options for `act`
#[derive(Debug, Clone, Default)]
pub struct ActOptions {
    /// `%key%` placeholders substituted before the instruction reaches the oracle
    pub variables: IndexMap<String, String>,

    /// Override the configured strategy for this call
    pub strategy: Option<ResolutionStrategy>,
}

impl ActOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: add a variable
    pub fn variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Builder method: use a specific strategy
    pub fn strategy(mut self, strategy: ResolutionStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
}

/// Dispatches an action intent on a resolved locator
pub struct ActionExecutor<'a, D: PageDriver + ?Sized> {
    driver: &'a D,
    settle_delay: Duration,
    not_found: NotFoundPolicy,
}

impl<'a, D: PageDriver + ?Sized> ActionExecutor<'a, D> {
    pub fn new(driver: &'a D, settle_delay: Duration, not_found: NotFoundPolicy) -> Self {
        Self {
            driver,
            settle_delay,
            not_found,
        }
    }

    /// Run `intent` on `resolution`.
    ///
    /// Nothing touches the page when the resolution matched no element. Driver errors while
    /// clicking or filling become unsuccessful results quoting `instruction`.
    pub fn execute(&self, intent: &ActionIntent, resolution: &Resolution, instruction: &str) -> Result<ActResult> {
        let locator = &resolution.locator;

        if !resolution.found() {
            log::warn!("Not found: {}", locator);
            return match self.not_found {
                NotFoundPolicy::Abort => Err(CuehandError::ElementNotFound(format!(
                    "{} (instruction \"{}\")",
                    locator, instruction
                ))),
                NotFoundPolicy::Report => Ok(ActResult::failure(format!(
                    "Element not found: {}. The instruction \"{}\" could not be executed.",
                    locator, instruction
                ))),
            };
        }

        let outcome = match intent.action {
            ActionKind::Click => self.driver.click(locator).map(|_| {
                log::info!("Clicked {}", locator);
                format!("Clicked {}", locator)
            }),
            ActionKind::Fill => {
                let value = intent.value.as_deref().unwrap_or("");
                self.driver.fill(locator, value).map(|_| {
                    self.driver.wait(self.settle_delay);
                    log::info!("Filled {} with {} character(s)", locator, value.chars().count());
                    format!("Filled {}", locator)
                })
            }
            ActionKind::Locate => {
                log::info!("Located {} ({} match(es))", locator, resolution.count);
                Ok(format!("Located {}", locator))
            }
        };

        Ok(match outcome {
            Ok(message) => ActResult::success(message),
            Err(e) => {
                log::warn!("{} on {} failed: {}", intent.action.as_str(), locator, e);
                ActResult::failure(format!(
                    "Action failed: {}. The instruction \"{}\" could not be executed.",
                    e, instruction
                ))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{Interaction, StaticPage};
    use crate::locator::Locator;

    const SETTLE: Duration = Duration::from_millis(500);

    fn resolve(page: &StaticPage, locator: Locator) -> Resolution {
        let count = page.count(&locator).unwrap();
        Resolution { locator, count }
    }

    #[test]
    fn test_substitute_variables() {
        let mut variables = IndexMap::new();
        variables.insert("user".to_string(), "alice".to_string());
        variables.insert("pass".to_string(), "secret".to_string());
        assert_eq!(substitute_variables("type %user% then %pass%", &variables), "type alice then secret");

        let mut reversed = IndexMap::new();
        reversed.insert("pass".to_string(), "secret".to_string());
        reversed.insert("user".to_string(), "alice".to_string());
        assert_eq!(substitute_variables("type %user% then %pass%", &reversed), "type alice then secret");
    }

    #[test]
    fn test_unknown_placeholder_is_kept() {
        let options = ActOptions::new().variable("user", "alice");
        assert_eq!(substitute_variables("%user% and %other%", &options.variables), "alice and %other%");
    }

    #[test]
    fn test_action_intent_schema_fields() {
        let intent: ActionIntent = serde_json::from_str(r#"{"action":"fill","value":"alice"}"#).unwrap();
        assert_eq!(intent, ActionIntent::fill("alice"));
        let intent: ActionIntent = serde_json::from_str(r#"{"action":"locate"}"#).unwrap();
        assert_eq!(intent, ActionIntent::locate());
        assert!(serde_json::from_str::<ActionIntent>(r#"{"action":"hover"}"#).is_err());
    }

    #[test]
    fn test_click_does_not_wait() {
        let page = StaticPage::new("<button>Log in</button>");
        let executor = ActionExecutor::new(&page, SETTLE, NotFoundPolicy::Report);
        let resolution = resolve(&page, Locator::role("button", "Log in"));

        let result = executor.execute(&ActionIntent::click(), &resolution, "click log in").unwrap();
        assert!(result.success);
        assert_eq!(page.interactions(), vec![Interaction::Click(resolution.locator.clone())]);
    }

    #[test]
    fn test_fill_waits_after_success() {
        let page = StaticPage::new("<input name=\"username\">");
        let executor = ActionExecutor::new(&page, SETTLE, NotFoundPolicy::Report);
        let resolution = resolve(&page, Locator::css("input[name=\"username\"]"));

        let result = executor.execute(&ActionIntent::fill("alice"), &resolution, "type alice").unwrap();
        assert!(result.success);
        assert_eq!(
            page.interactions(),
            vec![
                Interaction::Fill {
                    locator: resolution.locator.clone(),
                    value: "alice".to_string(),
                },
                Interaction::Wait(SETTLE),
            ]
        );
    }

    #[test]
    fn test_fill_without_value_fills_empty() {
        let page = StaticPage::new("<textarea></textarea>");
        let executor = ActionExecutor::new(&page, SETTLE, NotFoundPolicy::Report);
        let resolution = resolve(&page, Locator::css("textarea"));
        let intent = ActionIntent {
            action: ActionKind::Fill,
            value: None,
        };

        assert!(executor.execute(&intent, &resolution, "clear it").unwrap().success);
        assert!(matches!(&page.interactions()[0], Interaction::Fill { value, .. } if value.is_empty()));
    }

    #[test]
    fn test_locate_never_mutates() {
        let page = StaticPage::new("<a href=\"/docs\">Docs</a>");
        let executor = ActionExecutor::new(&page, SETTLE, NotFoundPolicy::Report);
        let resolution = resolve(&page, Locator::role("link", "Docs"));

        assert!(executor.execute(&ActionIntent::locate(), &resolution, "find docs").unwrap().success);
        assert!(page.interactions().is_empty());
    }

    #[test]
    fn test_not_found_policies() {
        let page = StaticPage::new("<button>Log</button>");
        let resolution = resolve(&page, Locator::role("button", "Log in"));
        assert_eq!(resolution.count, 0);

        let report = ActionExecutor::new(&page, SETTLE, NotFoundPolicy::Report);
        let result = report
            .execute(&ActionIntent::click(), &resolution, "click the 'Log in' button")
            .unwrap();
        assert!(!result.success);
        assert!(result.message.contains("Log in"));

        let abort = ActionExecutor::new(&page, SETTLE, NotFoundPolicy::Abort);
        let err = abort
            .execute(&ActionIntent::click(), &resolution, "click the 'Log in' button")
            .unwrap_err();
        assert!(matches!(err, CuehandError::ElementNotFound(_)));

        assert!(page.interactions().is_empty());
    }

    #[test]
    fn test_driver_error_becomes_failed_result() {
        let page = StaticPage::new("<p>Welcome</p>");
        let executor = ActionExecutor::new(&page, SETTLE, NotFoundPolicy::Report);
        let resolution = resolve(&page, Locator::css("p"));

        let result = executor.execute(&ActionIntent::fill("x"), &resolution, "type x into welcome").unwrap();
        assert!(!result.success);
        assert!(result.message.starts_with("Action failed:"));
        assert!(result.message.contains("\"type x into welcome\""));
        assert!(page.interactions().is_empty());
    }
}
