//! AI recommendation collaborator interface

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Generation timed out after {0} ms")]
    Timeout(u64),

    #[error("Unparsable response: {0}")]
    Parse(String),

    #[error("Empty response")]
    Empty,

    #[error("AI collaborator not configured")]
    NotConfigured,
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Http(err.to_string())
    }
}

/// Drafts recommendations from an issue digest
///
/// Returns raw JSON objects; validation happens in the synthesizer. Callers
/// must wrap `generate` in their own deadline.
#[async_trait]
pub trait RecommendationGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, digest: &str) -> Result<Vec<Value>, GenerationError>;
}

/// Extract the recommendation array from model output
///
/// Accepts a bare JSON array or an object with a `recommendations` array,
/// optionally wrapped in a markdown code fence.
pub fn parse_generation_payload(text: &str) -> Result<Vec<Value>, GenerationError> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Err(GenerationError::Empty);
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| GenerationError::Parse(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("recommendations") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(GenerationError::Parse(
                    "object has no 'recommendations' array".to_string(),
                ))
            }
        },
        other => {
            return Err(GenerationError::Parse(format!(
                "expected array or object, got {}",
                json_kind(&other)
            )))
        }
    };

    if items.is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(items)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_array() {
        let items = parse_generation_payload(r#"[{"title": "a"}, {"title": "b"}]"#).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_wrapped_object_in_fence() {
        let text = "```json\n{\"recommendations\": [{\"title\": \"a\"}]}\n```";
        let items = parse_generation_payload(text).unwrap();
        assert_eq!(items[0]["title"], "a");
    }

    #[test]
    fn test_fence_without_language() {
        let text = "```\n[{\"title\": \"a\"}]\n```\n";
        assert_eq!(parse_generation_payload(text).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_and_invalid() {
        assert!(matches!(parse_generation_payload("   "), Err(GenerationError::Empty)));
        assert!(matches!(parse_generation_payload("[]"), Err(GenerationError::Empty)));
        assert!(matches!(
            parse_generation_payload("Sure! Here are some ideas"),
            Err(GenerationError::Parse(_))
        ));
        assert!(matches!(
            parse_generation_payload(r#"{"items": []}"#),
            Err(GenerationError::Parse(_))
        ));
        assert!(matches!(parse_generation_payload("42"), Err(GenerationError::Parse(_))));
    }
}
