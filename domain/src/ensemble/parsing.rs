//! Structured-output parsing for generator responses.
//!
//! Generators are asked to reply with a JSON object carrying one final
//! answer. Anything that cannot be read that way is malformed and becomes
//! a generation failure instead of a candidate.
//!
//! # Accepted shapes
//!
//! | Shape | Example |
//! |-------|---------|
//! | Bare JSON | `{"final_answer": "42"}` |
//! | Fenced block | ```` ```json {"answer": 42} ``` ```` |
//! | Embedded object | `Sure! {"result": 0.5} Hope that helps.` |

use serde_json::Value;
use thiserror::Error;

/// Keys recognized as the final answer field, in priority order.
pub const ANSWER_KEYS: &[&str] = &["final_answer", "answer", "result"];

/// Why a response could not be read as a single final answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutputParseError {
    #[error("response contains no JSON object")]
    NoJson,

    #[error("JSON object has no final answer field")]
    MissingAnswer,

    #[error("final answer field holds unsupported value: {0}")]
    UnsupportedValue(String),
}

/// Extract the final answer text from a generator response.
pub fn parse_final_answer(response: &str) -> Result<String, OutputParseError> {
    let object = find_json_object(response).ok_or(OutputParseError::NoJson)?;
    let value = lookup_answer(&object).ok_or(OutputParseError::MissingAnswer)?;

    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(OutputParseError::UnsupportedValue(other.to_string())),
    }
}

fn find_json_object(response: &str) -> Option<serde_json::Map<String, Value>> {
    let trimmed = response.trim();

    let mut attempts: Vec<&str> = vec![trimmed];
    if let Some(block) = fenced_block(trimmed) {
        attempts.push(block);
    }
    if let Some(start) = trimmed.find('{')
        && let Some(end) = trimmed.rfind('}')
        && end > start
    {
        attempts.push(&trimmed[start..=end]);
    }

    attempts.into_iter().find_map(|text| {
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    })
}

/// Contents of the first ```` ``` ```` fence, skipping an optional language tag.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}

fn lookup_answer(object: &serde_json::Map<String, Value>) -> Option<&Value> {
    for key in ANSWER_KEYS {
        if let Some(v) = object.get(*key) {
            return Some(v);
        }
    }
    // Models sometimes capitalize keys
    object.iter().find_map(|(k, v)| {
        ANSWER_KEYS
            .iter()
            .any(|key| k.eq_ignore_ascii_case(key))
            .then_some(v)
    })
}
