//! Raw completion text → [`Command`].

use serde_json::Value;
use thiserror::Error;

use super::Command;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response is empty")]
    Empty,

    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("response does not match the command shape: {0}")]
    Shape(#[source] serde_json::Error),
}

/// Deserialize a command. Only the structure is checked; values are left
/// for the executor to resolve.
pub fn parse(raw: &str) -> Result<Command, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }

    let value: Value = serde_json::from_str(raw).map_err(ParseError::InvalidJson)?;
    if !value.is_object() {
        return Err(ParseError::NotAnObject(json_kind(&value)));
    }

    serde_json::from_value(value).map_err(ParseError::Shape)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
