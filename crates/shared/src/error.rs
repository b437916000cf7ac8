use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Body of a non-2xx response from the backend.
///
/// `detail` is usually a message string; request validation failures carry a
/// list of `{loc, msg, type}` objects instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: Value,
}

impl ErrorDetail {
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            Value::Array(items) => items.iter().find_map(|item| {
                item.get("msg")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or_else(|| item.as_str().map(str::to_string))
            }),
            Value::Object(object) => object
                .get("message")
                .or_else(|| object.get("msg"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ShapeError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}
