//! Transport error for the reference adapter.

use daedalus_core::BindingError;
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// An HTTP status and message, ready to be rendered as a response.
///
/// # Example
///
/// ```rust
/// use daedalus_http::HttpError;
/// use http::StatusCode;
///
/// let err = HttpError::new(StatusCode::BAD_REQUEST, "required query parameter 'q' is empty");
/// assert_eq!(err.status(), StatusCode::BAD_REQUEST);
/// assert_eq!(
///     err.to_json(),
///     r#"{"status":400,"message":"required query parameter 'q' is empty"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct Envelope<'a> {
    status: u16,
    message: &'a str,
}

impl HttpError {
    /// Creates an error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Creates a `400 Bad Request` error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a `500 Internal Server Error` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// The HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Renders the error as a JSON envelope.
    #[must_use]
    pub fn to_json(&self) -> String {
        let envelope = Envelope {
            status: self.status.as_u16(),
            message: &self.message,
        };
        serde_json::to_string(&envelope).unwrap_or_default()
    }
}

impl From<BindingError> for HttpError {
    fn from(err: BindingError) -> Self {
        Self::new(err.status_code(), err.to_string())
    }
}
