//! The normalized API error value
//!
//! Every failure that happens during or after a network call ends up as a
//! [`NormalizedError`], whatever transport raised it. Callers branch on
//! [`NormalizedError::http_status`], [`NormalizedError::request_id`] and
//! [`NormalizedError::warnings`] instead of parsing the rendered message.

use crate::error::ContractViolation;
use crate::payload::{ErrorContent, Payload, PayloadFields};
use crate::transport::TransportFailure;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

/// An error returned by the Deepgram API or raised by one of its transports
#[derive(Debug, Clone)]
pub struct NormalizedError {
    error: ErrorContent,
    warnings: Option<Vec<String>>,
    request_id: Option<Uuid>,
    http_status: Option<u16>,
    body: Option<Map<String, Value>>,
    transport_failure: Option<TransportFailure>,
}

impl NormalizedError {
    /// Build the error from a raw payload and the transport failure that
    /// triggered it, if any.
    ///
    /// Fails only when the payload breaks the API contract, e.g. a request id
    /// that is not a UUID.
    pub fn new(
        payload: impl Into<Payload>,
        transport_failure: Option<TransportFailure>,
    ) -> Result<Self, ContractViolation> {
        let fields = payload.into().into_fields()?;
        Ok(Self::from_fields(fields, transport_failure))
    }

    /// Build the error from plain message text; this cannot fail
    pub fn from_message(
        message: impl Into<String>,
        transport_failure: Option<TransportFailure>,
    ) -> Self {
        Self::from_fields(PayloadFields::message(message.into()), transport_failure)
    }

    fn from_fields(fields: PayloadFields, transport_failure: Option<TransportFailure>) -> Self {
        let http_status = transport_failure.as_ref().and_then(TransportFailure::status);

        debug!(
            request_id = ?fields.request_id,
            http_status = ?http_status,
            transport = ?transport_failure.as_ref().map(TransportFailure::kind),
            "Normalized API error"
        );

        Self {
            error: fields.error,
            warnings: fields.warnings,
            request_id: fields.request_id,
            http_status,
            body: fields.body,
            transport_failure,
        }
    }

    /// Build the error from a raw response body.
    ///
    /// JSON bodies are classified like any other payload; anything else is
    /// kept as text. An empty body means there is nothing to normalize.
    pub fn from_body(
        body: &str,
        transport_failure: Option<TransportFailure>,
    ) -> Result<Self, ContractViolation> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ContractViolation::MissingPayload);
        }

        let payload = match serde_json::from_str::<Value>(body) {
            Ok(value) => Payload::classify(value),
            Err(_) => Payload::Text(body.to_string()),
        };
        Self::new(payload, transport_failure)
    }

    pub fn error(&self) -> &ErrorContent {
        &self.error
    }

    /// Plain message form of [`NormalizedError::error`]
    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn warnings(&self) -> Option<&[String]> {
        self.warnings.as_deref()
    }

    pub fn request_id(&self) -> Option<Uuid> {
        self.request_id
    }

    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    /// The full API error body, when the payload was a structured API error
    pub fn body(&self) -> Option<&Map<String, Value>> {
        self.body.as_ref()
    }

    pub fn transport_failure(&self) -> Option<&TransportFailure> {
        self.transport_failure.as_ref()
    }
}

impl std::error::Error for NormalizedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.transport_failure
            .as_ref()
            .map(|failure| failure as &(dyn std::error::Error + 'static))
    }
}
