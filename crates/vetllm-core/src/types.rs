//! Wire types shared by the relay, the chat client and the backend client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body accepted by the relay query routes.
///
/// `query` is accepted in place of `message`; `message` wins when both are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl RelayRequest {
    /// The query text, from `message` or else `query`.
    pub fn text(&self) -> Option<&str> {
        self.message.as_deref().or(self.query.as_deref())
    }
}

/// Body returned by the relay query routes.
///
/// `response` is usually a string (sometimes JSON-encoded structured data);
/// `matches` carries the backend's reference text, or `""` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayResponse {
    #[serde(default = "empty_string")]
    pub response: Value,
    #[serde(default = "empty_string")]
    pub matches: Value,
}

impl RelayResponse {
    /// A failed exchange: `"Error: <message>"` with empty matches.
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            response: Value::String(format!("Error: {}", message)),
            matches: empty_string(),
        }
    }
}

/// JSON error body: `{ "error": "<message>" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Either shape the relay can answer with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RelayReply {
    Failure(ErrorResponse),
    Success(RelayResponse),
}

/// Body the relay posts to the external backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendRequest {
    pub query: String,
    pub endpoint: String,
    pub provider: String,
}

/// Body the external backend answers with.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BackendReply {
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub reference: Option<Value>,
}

impl BackendReply {
    /// Convert into the relay's response shape, defaulting missing, null or
    /// empty fields to `""`.
    pub fn into_relay_response(self) -> RelayResponse {
        RelayResponse {
            response: or_empty(self.response),
            matches: or_empty(self.reference),
        }
    }
}

fn empty_string() -> Value {
    Value::String(String::new())
}

fn or_empty(value: Option<Value>) -> Value {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => empty_string(),
        Some(v) => v,
    }
}

/// Whether a value is empty in the relay's sense (`""`, null, `false`).
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
