use crate::normalized::NormalizedError;
use std::fmt;
use thiserror::Error;

/// Invalid client configuration, detected before any request is sent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SetupError {
    message: String,
}

impl SetupError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The remote API or the calling code broke an assumption this crate relies on.
///
/// These are never folded into a [`NormalizedError`].
#[derive(Debug, Error)]
pub enum ContractViolation {
    #[error("API returned a malformed request id `{value}`: {source}")]
    MalformedRequestId {
        value: String,
        #[source]
        source: uuid::Error,
    },

    #[error("API returned a non-text request id: {value}")]
    RequestIdNotText { value: serde_json::Value },

    #[error("No error payload was supplied")]
    MissingPayload,
}

/// Which of the error kinds a [`DeepgramError`] holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Setup,
    Api,
    Contract,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Setup => write!(f, "setup"),
            ErrorKind::Api => write!(f, "api"),
            ErrorKind::Contract => write!(f, "contract"),
        }
    }
}

/// Any error surfaced to callers of the client library
#[derive(Debug, Error)]
pub enum DeepgramError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Api(#[from] NormalizedError),

    #[error(transparent)]
    Contract(#[from] ContractViolation),
}

impl DeepgramError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeepgramError::Setup(_) => ErrorKind::Setup,
            DeepgramError::Api(_) => ErrorKind::Api,
            DeepgramError::Contract(_) => ErrorKind::Contract,
        }
    }

    /// The normalized API error, if this is one
    pub fn as_api(&self) -> Option<&NormalizedError> {
        match self {
            DeepgramError::Api(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_display() {
        let err = SetupError::new("Deepgram API key is not set");
        assert_eq!(err.to_string(), "Deepgram API key is not set");
        assert_eq!(err.message(), "Deepgram API key is not set");
    }

    #[test]
    fn test_kind_tags() {
        let setup: DeepgramError = SetupError::new("bad").into();
        assert_eq!(setup.kind(), ErrorKind::Setup);
        assert!(setup.as_api().is_none());

        let api: DeepgramError = NormalizedError::from_message("connection reset", None).into();
        assert_eq!(api.kind(), ErrorKind::Api);
        assert_eq!(api.as_api().map(|e| e.message()), Some("connection reset".to_string()));

        let contract: DeepgramError = ContractViolation::MissingPayload.into();
        assert_eq!(contract.kind(), ErrorKind::Contract);
        assert_eq!(contract.to_string(), "No error payload was supplied");
    }

    #[test]
    fn test_malformed_request_id_keeps_source() {
        let source = uuid::Uuid::parse_str("not-a-uuid").unwrap_err();
        let err = ContractViolation::MalformedRequestId {
            value: "not-a-uuid".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("API returned a malformed request id `not-a-uuid`"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
