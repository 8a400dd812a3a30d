//! Transport-level failures
//!
//! Each transport (blocking HTTP, async HTTP, streaming) fails in its own way.
//! [`TransportFailure`] is the closed set of those failure kinds. Only the two
//! HTTP response kinds carry a status code.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// The original lower-level error, shared and never mutated
pub type TransportSource = Arc<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Clone, Error)]
pub enum TransportFailure {
    /// Blocking HTTP call answered with an error status
    #[error("HTTP error {status}: {source}")]
    HttpResponse { status: u16, source: TransportSource },

    /// Blocking HTTP call that never produced a response
    #[error("Connection error: {source}")]
    Connection { source: TransportSource },

    /// Streaming upgrade failed
    #[error("WebSocket handshake failed: {source}")]
    Handshake { source: TransportSource },

    /// Async HTTP call answered with an error status
    #[error("HTTP client response error {status}: {source}")]
    ClientResponse { status: u16, source: TransportSource },

    /// Async HTTP client failure without a response
    #[error("HTTP client error: {source}")]
    Client { source: TransportSource },
}

/// Kind tag for a [`TransportFailure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    HttpResponse,
    Connection,
    Handshake,
    ClientResponse,
    Client,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::HttpResponse => write!(f, "http response"),
            TransportKind::Connection => write!(f, "connection"),
            TransportKind::Handshake => write!(f, "handshake"),
            TransportKind::ClientResponse => write!(f, "client response"),
            TransportKind::Client => write!(f, "client"),
        }
    }
}

impl TransportFailure {
    pub fn http_response<E>(status: u16, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        TransportFailure::HttpResponse {
            status,
            source: Arc::new(source),
        }
    }

    pub fn connection<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        TransportFailure::Connection {
            source: Arc::new(source),
        }
    }

    pub fn handshake<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        TransportFailure::Handshake {
            source: Arc::new(source),
        }
    }

    pub fn client_response<E>(status: u16, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        TransportFailure::ClientResponse {
            status,
            source: Arc::new(source),
        }
    }

    pub fn client<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        TransportFailure::Client {
            source: Arc::new(source),
        }
    }

    /// Wrap an error from the blocking `reqwest` client
    pub fn from_blocking(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::http_response(status.as_u16(), err),
            None => Self::connection(err),
        }
    }

    /// Wrap an error from the async `reqwest` client
    pub fn from_async(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::client_response(status.as_u16(), err),
            None => Self::client(err),
        }
    }

    pub fn kind(&self) -> TransportKind {
        match self {
            TransportFailure::HttpResponse { .. } => TransportKind::HttpResponse,
            TransportFailure::Connection { .. } => TransportKind::Connection,
            TransportFailure::Handshake { .. } => TransportKind::Handshake,
            TransportFailure::ClientResponse { .. } => TransportKind::ClientResponse,
            TransportFailure::Client { .. } => TransportKind::Client,
        }
    }

    /// HTTP status, for the kinds that always carry one
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportFailure::HttpResponse { status, .. }
            | TransportFailure::ClientResponse { status, .. } => Some(*status),
            TransportFailure::Connection { .. }
            | TransportFailure::Handshake { .. }
            | TransportFailure::Client { .. } => None,
        }
    }

    /// The original error as produced by the transport
    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        match self {
            TransportFailure::HttpResponse { source, .. }
            | TransportFailure::Connection { source }
            | TransportFailure::Handshake { source }
            | TransportFailure::ClientResponse { source, .. }
            | TransportFailure::Client { source } => &**source,
        }
    }
}

impl From<tungstenite::Error> for TransportFailure {
    fn from(err: tungstenite::Error) -> Self {
        Self::handshake(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn io_error(msg: &str) -> io::Error {
        io::Error::other(msg.to_string())
    }

    #[test]
    fn test_status_only_on_response_kinds() {
        assert_eq!(
            TransportFailure::http_response(429, io_error("too many")).status(),
            Some(429)
        );
        assert_eq!(
            TransportFailure::client_response(503, io_error("unavailable")).status(),
            Some(503)
        );
        assert_eq!(TransportFailure::connection(io_error("refused")).status(), None);
        assert_eq!(TransportFailure::handshake(io_error("bad upgrade")).status(), None);
        assert_eq!(TransportFailure::client(io_error("timed out")).status(), None);
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(
            TransportFailure::http_response(400, io_error("x")).kind(),
            TransportKind::HttpResponse
        );
        assert_eq!(
            TransportFailure::connection(io_error("x")).kind(),
            TransportKind::Connection
        );
        assert_eq!(
            TransportFailure::handshake(io_error("x")).kind(),
            TransportKind::Handshake
        );
        assert_eq!(
            TransportFailure::client_response(400, io_error("x")).kind(),
            TransportKind::ClientResponse
        );
        assert_eq!(
            TransportFailure::client(io_error("x")).kind(),
            TransportKind::Client
        );
        assert_eq!(TransportKind::Handshake.to_string(), "handshake");
    }

    #[test]
    fn test_handshake_ignores_http_status_on_source() {
        let response = tungstenite::http::Response::builder()
            .status(401)
            .body(None)
            .expect("valid response");
        let failure = TransportFailure::from(tungstenite::Error::Http(response));
        assert_eq!(failure.kind(), TransportKind::Handshake);
        assert_eq!(failure.status(), None);
    }

    #[test]
    fn test_source_is_kept() {
        let failure = TransportFailure::connection(io_error("connection refused"));
        assert_eq!(failure.inner().to_string(), "connection refused");
        assert_eq!(failure.to_string(), "Connection error: connection refused");
        assert!(StdError::source(&failure).is_some());
    }

    #[test]
    fn test_clone_shares_source() {
        let failure = TransportFailure::client(io_error("reset"));
        let copy = failure.clone();
        match (&failure, &copy) {
            (TransportFailure::Client { source: a }, TransportFailure::Client { source: b }) => {
                assert!(Arc::ptr_eq(a, b));
            }
            _ => panic!("expected client failures"),
        }
    }
}
