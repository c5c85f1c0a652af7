//! Error types for the companion client.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body reported by the companion server.
///
/// Also synthesized locally when the server gives no usable body or the
/// request never reached it, so every failed call carries one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(default)]
    pub status_code: Option<i32>,
    /// Fine-grained reason, only sent for some failures
    /// (e.g. `AUTHORIZATION_DISABLED`).
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiError {
    /// Build an error for a failure that happened on our side of the wire.
    pub(crate) fn client_side(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            code: None,
            error: Some("Unknown Exception".to_string()),
            message: Some(message.into()),
        }
    }

    /// True when every field is populated, which is how the server shapes
    /// errors it sends with a success status.
    pub(crate) fn is_complete(&self) -> bool {
        self.status_code.is_some()
            && self.code.is_some()
            && self.error.is_some()
            && self.message.is_some()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(status) = self.status_code {
            write!(f, "{status} ")?;
        }
        f.write_str(self.error.as_deref().unwrap_or("Unknown Error"))?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

/// Main error type for companion client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A settings field failed validation.
    #[error("invalid {field}: {reason}")]
    Configuration { field: &'static str, reason: String },

    /// Caller-supplied arguments are insufficient for the request.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The server reported a failure.
    #[error("API error: {0}")]
    Api(ApiError),

    /// The request could not be built, sent or read.
    #[error("request failed: {error}")]
    Request {
        error: ApiError,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A successful response carried no body where one was required.
    #[error("empty response from {path}")]
    EmptyResponse { path: &'static str },

    /// JSON decoding error.
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The Socket.IO client failed to open or close a connection.
    #[error("Socket.IO error: {0}")]
    Socket(#[from] Box<rust_socketio::Error>),

    /// Error reported by the realtime connection after it was opened,
    /// including a namespace refusal from the server.
    #[error("realtime error: {0}")]
    Transport(String),

    /// The realtime server stopped answering in time.
    #[error("timed out waiting for server")]
    Timeout,
}

impl Error {
    pub(crate) fn configuration(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Configuration {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn request(
        error: ApiError,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Request {
            error,
            source: Box::new(source),
        }
    }

    /// The API error carried by this failure, whether the server sent it or
    /// it was synthesized from a transport failure.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(error) | Error::Request { error, .. } => Some(error),
            _ => None,
        }
    }
}
