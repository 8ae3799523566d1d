//! Output shapes requested from the oracle while resolving an instruction

use crate::{actions::{ActionIntent, ActionKind},
            locator::{RoleDescriptor, TargetDescriptor}};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Keyword and candidate tags used to narrow page content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct KeywordQuery {
    /// Word (or quoted phrase) identifying the target element
    pub keyword: String,

    /// Tag names the keyword is likely to appear in
    pub tags: Vec<String>,
}

/// A selector picked from page content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SelectorChoice {
    /// CSS selector, or XPath prefixed with `xpath=`
    pub selector: String,
}

/// Role-based intent: which element and what to do with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleIntent {
    /// Exact, case-sensitive accessible name
    pub target_text: String,
    pub role: String,
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Position among elements sharing role and name (0 = first)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl RoleIntent {
    /// Split into the action to run and the element to run it on
    pub fn into_parts(self) -> (ActionIntent, TargetDescriptor) {
        let intent = ActionIntent {
            action: self.action,
            value: self.value,
        };
        let target = TargetDescriptor::Role(RoleDescriptor {
            role: self.role,
            target_text: self.target_text,
            index: self.index,
        });
        (intent, target)
    }
}

/// Role-based query used by observe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleQuery {
    pub target_text: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl From<RoleQuery> for TargetDescriptor {
    fn from(query: RoleQuery) -> Self {
        TargetDescriptor::Role(RoleDescriptor {
            role: query.role,
            target_text: query.target_text,
            index: query.index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::schema_of;

    #[test]
    fn test_role_intent_wire_names() {
        let intent: RoleIntent =
            serde_json::from_str(r#"{"role":"button","targetText":"Log in","action":"click"}"#).unwrap();
        let (action, target) = intent.into_parts();
        assert_eq!(action, ActionIntent::click());
        assert_eq!(target.describe(), "'Log in' (button)");
    }

    #[test]
    fn test_role_intent_rejects_negative_index() {
        let result = serde_json::from_str::<RoleIntent>(
            r#"{"role":"button","targetText":"Go","action":"click","index":-1}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_role_query_schema_is_camel_case() {
        let schema = schema_of::<RoleQuery>();
        assert!(schema["properties"]["targetText"].is_object());
        assert!(schema["properties"].get("target_text").is_none());
    }

    #[test]
    fn test_keyword_query_schema() {
        let schema = schema_of::<KeywordQuery>();
        assert_eq!(schema["properties"]["tags"]["type"], "array");
    }
}
