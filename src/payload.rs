//! Raw error payloads and field extraction
//!
//! The API reports application-level failures as JSON bodies of the form
//! `{"err_msg": ..., "metadata": {"warnings": [...], "request_id": "<uuid>"}}`.
//! Anything else that reaches the error path is either plain text or an
//! arbitrary value that is only ever shown in its string form.

use crate::error::ContractViolation;
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Key holding the error message in a structured API error body
pub const ERR_MSG_KEY: &str = "err_msg";

const METADATA_KEY: &str = "metadata";
const WARNINGS_KEY: &str = "warnings";
const REQUEST_ID_KEY: &str = "request_id";

/// A raw payload, classified once when it is constructed
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Free-form message text
    Text(String),
    /// API error body; always contains [`ERR_MSG_KEY`]
    Structured(Map<String, Value>),
    /// Any other value, only used through its string form
    Opaque(Value),
}

impl Payload {
    /// Decide which shape a JSON value has. First match wins.
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Object(map) if map.contains_key(ERR_MSG_KEY) => Payload::Structured(map),
            Value::String(text) => Payload::Text(text),
            other => Payload::Opaque(other),
        }
    }

    pub(crate) fn into_fields(self) -> Result<PayloadFields, ContractViolation> {
        match self {
            Payload::Structured(map) => {
                let error = ErrorContent::from_err_msg(
                    map.get(ERR_MSG_KEY).cloned().unwrap_or(Value::Null),
                );
                let warnings = extract_warnings(&map);
                let request_id = extract_request_id(&map)?;
                debug!(
                    has_warnings = warnings.is_some(),
                    has_request_id = request_id.is_some(),
                    "Classified structured API error"
                );
                Ok(PayloadFields {
                    error,
                    warnings,
                    request_id,
                    body: Some(map),
                })
            }
            Payload::Text(text) => Ok(PayloadFields::message(text)),
            Payload::Opaque(value) => Ok(PayloadFields::message(value.to_string())),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::classify(value)
    }
}

/// The primary content of a normalized error
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorContent {
    Message(String),
    /// `err_msg` itself was a JSON object
    Body(Map<String, Value>),
}

impl ErrorContent {
    fn from_err_msg(value: Value) -> Self {
        match value {
            Value::String(text) => ErrorContent::Message(text),
            Value::Object(map) => ErrorContent::Body(map),
            other => ErrorContent::Message(other.to_string()),
        }
    }

    pub fn as_message(&self) -> Option<&str> {
        match self {
            ErrorContent::Message(text) => Some(text.as_str()),
            ErrorContent::Body(_) => None,
        }
    }

    pub fn as_body(&self) -> Option<&Map<String, Value>> {
        match self {
            ErrorContent::Message(_) => None,
            ErrorContent::Body(map) => Some(map),
        }
    }
}

impl fmt::Display for ErrorContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorContent::Message(text) => f.write_str(text),
            ErrorContent::Body(map) => {
                let json = serde_json::to_string(map).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

pub(crate) struct PayloadFields {
    pub(crate) error: ErrorContent,
    pub(crate) warnings: Option<Vec<String>>,
    pub(crate) request_id: Option<Uuid>,
    pub(crate) body: Option<Map<String, Value>>,
}

impl PayloadFields {
    pub(crate) fn message(text: String) -> Self {
        Self {
            error: ErrorContent::Message(text),
            warnings: None,
            request_id: None,
            body: None,
        }
    }
}

fn metadata(map: &Map<String, Value>) -> Option<&Map<String, Value>> {
    map.get(METADATA_KEY).and_then(Value::as_object)
}

/// `metadata.warnings` wins over the top-level `warnings` list, which only
/// appears when warnings were escalated into the error body.
fn extract_warnings(map: &Map<String, Value>) -> Option<Vec<String>> {
    let raw = metadata(map)
        .and_then(|meta| meta.get(WARNINGS_KEY))
        .or_else(|| map.get(WARNINGS_KEY))?;

    match raw {
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect(),
        ),
        Value::Null => None,
        other => {
            debug!(warnings = %other, "Ignoring warnings field that is not a list");
            None
        }
    }
}

fn extract_request_id(map: &Map<String, Value>) -> Result<Option<Uuid>, ContractViolation> {
    let Some(raw) = metadata(map).and_then(|meta| meta.get(REQUEST_ID_KEY)) else {
        return Ok(None);
    };

    match raw {
        Value::String(text) => Uuid::parse_str(text).map(Some).map_err(|source| {
            warn!(request_id = %text, "API returned a malformed request id");
            ContractViolation::MalformedRequestId {
                value: text.clone(),
                source,
            }
        }),
        Value::Null => Ok(None),
        other => {
            warn!(request_id = %other, "API returned a non-text request id");
            Err(ContractViolation::RequestIdNotText {
                value: other.clone(),
            })
        }
    }
}
