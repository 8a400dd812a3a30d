//! Turning failed API responses into errors
//!
//! The REST clients call [`ensure_success`] (async) or
//! [`ensure_success_blocking`] on every response; the streaming client calls
//! [`handshake_failure`] when the WebSocket upgrade is rejected.

use crate::error::DeepgramError;
use crate::normalized::NormalizedError;
use crate::options::ClientOptions;
use crate::payload::ERR_MSG_KEY;
use crate::transport::TransportFailure;
use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use tokio_tungstenite::tungstenite;
use tracing::{instrument, warn};

/// Message used when response warnings are escalated into an error
pub const WARNINGS_AS_ERRORS_MESSAGE: &str = "Response contained warnings";

/// Return the response unchanged when it succeeded, otherwise its body as an error
#[instrument(skip(response), fields(status = %response.status(), url = %response.url()))]
pub async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, DeepgramError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let failure = response
        .error_for_status_ref()
        .err()
        .map(TransportFailure::from_async);

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Failed to read error response body");
            return Err(unreadable_body(status, e, failure, TransportFailure::from_async).into());
        }
    };

    Err(error_from_body(status, &body, failure)?.into())
}

/// Blocking counterpart of [`ensure_success`]
#[instrument(skip(response), fields(status = %response.status(), url = %response.url()))]
pub fn ensure_success_blocking(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, DeepgramError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let failure = response
        .error_for_status_ref()
        .err()
        .map(TransportFailure::from_blocking);

    let body = match response.text() {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Failed to read error response body");
            return Err(unreadable_body(status, e, failure, TransportFailure::from_blocking).into());
        }
    };

    Err(error_from_body(status, &body, failure)?.into())
}

/// The read error becomes the message. It is also kept as the transport
/// failure when the status did not already produce one.
fn unreadable_body(
    status: StatusCode,
    err: reqwest::Error,
    failure: Option<TransportFailure>,
    wrap: fn(reqwest::Error) -> TransportFailure,
) -> NormalizedError {
    let message = format!("{}: failed to read error body: {}", status, err);
    let failure = failure.or_else(|| Some(wrap(err)));
    NormalizedError::from_message(message, failure)
}

/// An empty error body falls back to the status line.
fn error_from_body(
    status: StatusCode,
    body: &str,
    failure: Option<TransportFailure>,
) -> Result<NormalizedError, DeepgramError> {
    if body.trim().is_empty() {
        return Ok(NormalizedError::from_message(status.to_string(), failure));
    }
    Ok(NormalizedError::from_body(body, failure)?)
}

/// Error for a rejected or failed streaming upgrade
pub fn handshake_failure(err: tungstenite::Error) -> NormalizedError {
    warn!(error = %err, "WebSocket handshake failed");
    NormalizedError::from_message(err.to_string(), Some(TransportFailure::from(err)))
}

/// Raise `metadata.warnings` of a successful response as an error when the
/// options ask for it.
///
/// The escalated body carries the warnings at the top level, next to
/// `err_msg`, and keeps `metadata.request_id`.
pub fn check_warnings(body: &Value, options: &ClientOptions) -> Result<(), DeepgramError> {
    if !options.warnings_are_errors() {
        return Ok(());
    }

    let Some(metadata) = body.get("metadata").and_then(Value::as_object) else {
        return Ok(());
    };
    let Some(warnings) = metadata
        .get("warnings")
        .and_then(Value::as_array)
        .filter(|warnings| !warnings.is_empty())
    else {
        return Ok(());
    };

    warn!(count = warnings.len(), "Raising response warnings as error");

    let mut escalated = Map::new();
    escalated.insert(ERR_MSG_KEY.to_string(), json!(WARNINGS_AS_ERRORS_MESSAGE));
    escalated.insert("warnings".to_string(), Value::Array(warnings.clone()));
    if let Some(request_id) = metadata.get("request_id") {
        escalated.insert("metadata".to_string(), json!({ "request_id": request_id }));
    }

    Err(NormalizedError::new(Value::Object(escalated), None)?.into())
}
