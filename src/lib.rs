//! Error normalization for Deepgram speech API clients
//!
//! Blocking HTTP, async HTTP and WebSocket streaming each fail with their own
//! error types, and the API reports application errors in a JSON body. This
//! crate folds all of them into one [`NormalizedError`] with a message, an
//! optional request id, warnings and HTTP status. Configuration problems found
//! before any request is sent are reported as [`SetupError`] instead.

#![deny(clippy::all)]

mod error;
mod normalized;
pub mod options;
pub mod payload;
mod render;
pub mod response;
pub mod transport;

pub use error::{ContractViolation, DeepgramError, ErrorKind, SetupError};
pub use normalized::NormalizedError;
pub use options::ClientOptions;
pub use payload::{ErrorContent, Payload};
pub use transport::{TransportFailure, TransportKind};
