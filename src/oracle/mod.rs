//! Structured-generation oracle boundary
//!
//! The oracle is the only source of non-determinism in the engine: it maps a system prompt,
//! a user prompt and a JSON schema to a JSON value that must fit the schema. Failures are
//! never retried; they end the current top-level call.

#[cfg(feature = "gemini")]
pub mod gemini;
pub mod prompts;
pub mod scripted;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiOptions, GeminiOracle};
pub use scripted::{RecordedRequest, ScriptedOracle};

use crate::error::{CuehandError, Result};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One structured-generation call
#[derive(Debug, Clone, Copy)]
pub struct OracleRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    /// JSON schema the output must satisfy
    pub schema: &'a Value,
}

/// Text-to-structured-data capability
pub trait IntentOracle {
    /// Produce a JSON value for the request, or fail
    fn generate(&self, request: &OracleRequest<'_>) -> Result<Value>;
}

impl<T: IntentOracle + ?Sized> IntentOracle for &T {
    fn generate(&self, request: &OracleRequest<'_>) -> Result<Value> {
        (**self).generate(request)
    }
}

impl<T: IntentOracle + ?Sized> IntentOracle for Box<T> {
    fn generate(&self, request: &OracleRequest<'_>) -> Result<Value> {
        (**self).generate(request)
    }
}

/// JSON schema of `T`
pub fn schema_of<T: JsonSchema>() -> Value {
    schemars::schema_for!(T).to_value()
}

/// Ask the oracle for a `T`, deriving the output schema from the type
pub fn infer<T, O>(oracle: &O, system: &str, prompt: &str) -> Result<T>
where
    T: DeserializeOwned + JsonSchema,
    O: IntentOracle + ?Sized,
{
    let schema = schema_of::<T>();
    let value = oracle.generate(&OracleRequest {
        system,
        prompt,
        schema: &schema,
    })?;

    serde_json::from_value(value).map_err(|e| CuehandError::SchemaMismatch {
        schema: T::schema_name().to_string(),
        reason: e.to_string(),
    })
}

/// Ask the oracle for a value matching a caller-supplied schema
///
/// The schema is compiled before the oracle is called; output that does not validate
/// against it is a [`CuehandError::SchemaMismatch`].
pub fn infer_value<O: IntentOracle + ?Sized>(oracle: &O, system: &str, prompt: &str, schema: &Value) -> Result<Value> {
    if !schema.is_object() {
        return Err(CuehandError::Config("extraction schema must be a JSON object".to_string()));
    }
    let validator = jsonschema::validator_for(schema)
        .map_err(|e| CuehandError::Config(format!("invalid extraction schema: {}", e)))?;

    let value = oracle.generate(&OracleRequest { system, prompt, schema })?;

    if let Some(error) = validator.iter_errors(&value).next() {
        return Err(CuehandError::SchemaMismatch {
            schema: schema_title(schema),
            reason: format!("{} at '{}'", error, error.instance_path),
        });
    }
    Ok(value)
}

fn schema_title(schema: &Value) -> String {
    schema
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("extraction schema")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, JsonSchema, PartialEq)]
    struct Headline {
        title: String,
        points: Option<u32>,
    }

    #[test]
    fn test_schema_of_lists_fields() {
        let schema = schema_of::<Headline>();
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"]["title"].is_object());
        assert_eq!(schema["required"], json!(["title"]));
    }

    #[test]
    fn test_infer_typed_value() {
        let oracle = ScriptedOracle::new().respond(json!({"title": "Rust 2024", "points": 42}));
        let headline: Headline = infer(&oracle, "system", "prompt").unwrap();
        assert_eq!(
            headline,
            Headline {
                title: "Rust 2024".to_string(),
                points: Some(42),
            }
        );

        let requests = oracle.requests();
        assert_eq!(requests[0].system, "system");
        assert!(requests[0].schema["properties"]["points"].is_object());
    }

    #[test]
    fn test_infer_schema_mismatch() {
        let oracle = ScriptedOracle::new().respond(json!({"points": "many"}));
        let err = infer::<Headline, _>(&oracle, "system", "prompt").unwrap_err();
        assert!(matches!(err, CuehandError::SchemaMismatch { ref schema, .. } if schema == "Headline"));
        assert!(err.is_oracle_failure());
    }

    #[test]
    fn test_infer_value_requires_object_schema() {
        let oracle = ScriptedOracle::new();
        let err = infer_value(&oracle, "system", "prompt", &json!("string")).unwrap_err();
        assert!(matches!(err, CuehandError::Config(_)));
        assert!(oracle.requests().is_empty());
    }

    fn greeting_schema() -> Value {
        json!({
            "type": "object",
            "properties": {"greeting": {"type": "string"}},
            "required": ["greeting"]
        })
    }

    #[test]
    fn test_infer_value_validates_output() {
        let oracle = ScriptedOracle::new()
            .respond(json!({"greeting": "hello"}))
            .respond(json!({"greeting": 5}))
            .respond(json!({}));

        let value = infer_value(&oracle, "system", "prompt", &greeting_schema()).unwrap();
        assert_eq!(value, json!({"greeting": "hello"}));

        let err = infer_value(&oracle, "system", "prompt", &greeting_schema()).unwrap_err();
        match &err {
            CuehandError::SchemaMismatch { schema, reason } => {
                assert_eq!(schema, "extraction schema");
                assert!(reason.contains("greeting"), "{}", reason);
            }
            other => panic!("Expected schema mismatch, got {:?}", other),
        }
        assert!(err.is_oracle_failure());

        let err = infer_value(&oracle, "system", "prompt", &greeting_schema()).unwrap_err();
        assert!(matches!(err, CuehandError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_infer_value_rejects_invalid_schema_before_calling() {
        let oracle = ScriptedOracle::new().respond(json!({"greeting": "hello"}));
        let err = infer_value(&oracle, "system", "prompt", &json!({"type": "no-such-type"})).unwrap_err();
        assert!(matches!(err, CuehandError::Config(_)));
        assert!(oracle.requests().is_empty());
    }
}
